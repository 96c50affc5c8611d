//! CMS-backed client registration lookup
//!
//! Bridges the generic content client to the client-lookup interface an
//! identity provider consumes. OAuth client registrations live in the CMS
//! as content items of the `clients` schema; the store projects them into
//! the minimal record the identity provider needs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use strata_client::client::CmsClient;
use strata_client::contents::ContentClient;
use strata_client::errors::ApiError;
use strata_client::query::QueryContext;
use tracing::debug;

/// Schema holding OAuth client registrations.
const CLIENTS_SCHEMA: &str = "clients";

/// An OAuth client record as consumed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRegistration {
    pub client_id: String,
    pub client_name: Option<String>,
}

/// Client-lookup interface served to the identity provider.
///
/// `Ok(None)` means "no such client" and must never surface as an error.
#[async_trait]
pub trait ClientRegistrationStore: Send + Sync {
    /// Look up a client registration by its OAuth client id.
    async fn find_client_by_id(
        &self,
        client_id: &str,
    ) -> Result<Option<ClientRegistration>, ApiError>;
}

/// Data payload of a `clients` content item.
///
/// The store requests flattened data, so localized field objects arrive
/// as plain values.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientData {
    #[serde(rename = "clientName", default)]
    pub client_name: Option<String>,
}

/// [`ClientRegistrationStore`] backed by the CMS `clients` schema.
pub struct CmsClientStore {
    contents: ContentClient<ClientData>,
    context: QueryContext,
}

impl CmsClientStore {
    /// Create a store over the given gateway.
    pub fn new(client: Arc<CmsClient>) -> Self {
        Self {
            contents: ContentClient::new(client, CLIENTS_SCHEMA),
            context: QueryContext::new().flatten(),
        }
    }
}

#[async_trait]
impl ClientRegistrationStore for CmsClientStore {
    /// Fetch the `clients` content item for `client_id` and project it.
    ///
    /// The `None` path is reserved for the content endpoint reporting no
    /// entity for the id; every other gateway failure propagates
    /// untranslated.
    async fn find_client_by_id(
        &self,
        client_id: &str,
    ) -> Result<Option<ClientRegistration>, ApiError> {
        let Some(content) = self.contents.get_with(client_id, &self.context).await? else {
            debug!(%client_id, "no client registration");
            return Ok(None);
        };

        Ok(Some(ClientRegistration {
            client_id: client_id.to_string(),
            client_name: content.data.client_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_data_decodes_wire_names() {
        let data: ClientData =
            serde_json::from_str(r#"{ "clientName": "Portal" }"#).unwrap();
        assert_eq!(data.client_name.as_deref(), Some("Portal"));
    }

    #[test]
    fn client_name_is_optional() {
        let data: ClientData = serde_json::from_str("{}").unwrap();
        assert!(data.client_name.is_none());
    }
}
