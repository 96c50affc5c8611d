//! Bearer token acquisition
//!
//! The gateway owns no token state; it asks an [`Authenticator`] for the
//! current bearer token before each request and hands the token back for
//! invalidation when the service answers 401.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::errors::ApiError;
use crate::http::HttpClient;

/// Provides bearer tokens for CMS API calls.
///
/// Both operations must be safe to invoke concurrently from multiple
/// in-flight requests.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Retrieve the current bearer token, acquiring one if necessary.
    async fn bearer_token(&self) -> Result<String, ApiError>;

    /// Invalidate a token the service rejected.
    ///
    /// Implementations must only discard `token` itself; a newer token
    /// obtained by a concurrent request stays valid.
    async fn remove_token(&self, token: &str) -> Result<(), ApiError>;
}

/// Authenticator with a fixed token.
///
/// Useful for API keys and tests. `remove_token` is a no-op since there is
/// nothing to refresh.
pub struct StaticAuthenticator {
    token: String,
}

impl StaticAuthenticator {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn bearer_token(&self) -> Result<String, ApiError> {
        Ok(self.token.clone())
    }

    async fn remove_token(&self, _token: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Token endpoint response (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 client-credentials authenticator.
///
/// Fetches a token from the configured token endpoint on first use and
/// keeps the current one in memory until it is removed. Removal compares
/// the supplied token against the stored one, so invalidating a stale
/// token never discards a fresh one won by a concurrent request.
pub struct ClientCredentialsAuthenticator {
    token_url: Url,
    client_id: String,
    client_secret: String,
    http: HttpClient,
    current: RwLock<Option<String>>,
}

impl ClientCredentialsAuthenticator {
    /// Create a new client-credentials authenticator.
    ///
    /// # Arguments
    /// * `token_url` - OAuth2 token endpoint
    /// * `client_id` / `client_secret` - client credentials
    /// * `http` - shared transport used for the token request
    pub fn new(
        token_url: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        http: HttpClient,
    ) -> Self {
        Self {
            token_url,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http,
            current: RwLock::new(None),
        }
    }

    async fn fetch_token(&self) -> Result<String, ApiError> {
        debug!(url = %self.token_url, "requesting access token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let request = self
            .http
            .request(reqwest::Method::POST, self.token_url.clone())
            .form(&params);

        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "token endpoint returned status {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("invalid token response: {e}")))?;

        info!("acquired new access token");

        Ok(token.access_token)
    }
}

#[async_trait]
impl Authenticator for ClientCredentialsAuthenticator {
    async fn bearer_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.current.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut slot = self.current.write().await;
        // Another request may have filled the slot while we waited.
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self.fetch_token().await?;
        *slot = Some(token.clone());

        Ok(token)
    }

    async fn remove_token(&self, token: &str) -> Result<(), ApiError> {
        let mut slot = self.current.write().await;
        if slot.as_deref() == Some(token) {
            *slot = None;
            debug!("removed rejected access token");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    fn authenticator_for(server: &MockServer) -> ClientCredentialsAuthenticator {
        let token_url = Url::parse(&format!("{}/connect/token", server.uri())).unwrap();
        ClientCredentialsAuthenticator::new(
            token_url,
            "strata-app",
            "secret",
            HttpClient::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn static_authenticator_returns_fixed_token() {
        let auth = StaticAuthenticator::new("api-key");

        assert_eq!(auth.bearer_token().await.unwrap(), "api-key");
        auth.remove_token("api-key").await.unwrap();
        assert_eq!(auth.bearer_token().await.unwrap(), "api-key");
    }

    #[tokio::test]
    async fn fetches_token_with_client_credentials_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=strata-app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = authenticator_for(&server);
        assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn reuses_token_until_removed_then_refetches() {
        let server = MockServer::start().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(move |_req: &Request| {
                let n = calls_clone.fetch_add(1, Ordering::SeqCst);
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "access_token": format!("token-{}", n + 1),
                    "token_type": "Bearer",
                    "expires_in": 3600,
                }))
            })
            .expect(2)
            .mount(&server)
            .await;

        let auth = authenticator_for(&server);

        assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
        assert_eq!(auth.bearer_token().await.unwrap(), "token-1");

        auth.remove_token("token-1").await.unwrap();

        assert_eq!(auth.bearer_token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn removing_a_stale_token_keeps_the_current_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "token-1",
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = authenticator_for(&server);
        assert_eq!(auth.bearer_token().await.unwrap(), "token-1");

        // A competing request may try to invalidate a token that has
        // already been replaced; the stored one must survive.
        auth.remove_token("token-0").await.unwrap();
        assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn token_endpoint_failure_surfaces_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let auth = authenticator_for(&server);
        let result = auth.bearer_token().await;

        assert!(matches!(result, Err(ApiError::Auth(_))));
    }
}
