//! Request gateway for the CMS API
//!
//! [`CmsClient`] performs one authenticated HTTP call per invocation:
//! resolve the path against the service endpoint, inject a bearer token,
//! merge per-call context headers, send, and normalize non-success
//! responses into [`ApiError`]. Response bodies are left to the caller;
//! the gateway never deserializes a successful response.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::auth::Authenticator;
use crate::errors::ApiError;
use crate::http::HttpClient;
use crate::query::QueryContext;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Immutable gateway configuration, validated once at construction.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Base address of the remote API. Standard URI-resolution rules
    /// apply when joining request paths, so the address should normally
    /// end with a trailing slash.
    pub service_url: Url,
    /// Logical tenant/app name; becomes part of every content path.
    pub app_name: String,
    /// Upper bound on one request, token acquisition excluded.
    pub timeout: Duration,
}

impl CmsConfig {
    /// Create a configuration with the default timeout.
    pub fn new(service_url: Url, app_name: impl Into<String>) -> Self {
        Self {
            service_url,
            app_name: app_name.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.app_name.trim().is_empty() {
            return Err(ApiError::Config("app name must not be empty".to_string()));
        }
        if self.service_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "service url '{}' cannot be used as a base address",
                self.service_url
            )));
        }
        Ok(())
    }
}

/// Opaque request payload carrying its own media type.
///
/// The gateway forwards the declared type untouched; it never inspects
/// or re-encodes the bytes.
#[derive(Debug, Clone)]
pub struct RequestBody {
    content_type: String,
    bytes: Vec<u8>,
}

impl RequestBody {
    /// Create a payload with the given media type.
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { content_type: content_type.into(), bytes: bytes.into() }
    }
}

/// Authenticated request gateway.
///
/// Holds no token state of its own; token lifecycle is delegated to the
/// injected [`Authenticator`]. The transport is shared and reusable:
/// several gateways built over one `HttpClient` use the same connection
/// pool.
pub struct CmsClient {
    config: CmsConfig,
    http: HttpClient,
    auth: Arc<dyn Authenticator>,
}

impl CmsClient {
    /// Create a new gateway.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the app name is empty or the
    /// service URL cannot serve as a base address.
    pub fn new(
        config: CmsConfig,
        http: HttpClient,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self { config, http, auth })
    }

    /// Create a builder for fluent assembly.
    pub fn builder() -> CmsClientBuilder {
        CmsClientBuilder::default()
    }

    /// The configured tenant/app name.
    pub fn app_name(&self) -> &str {
        &self.config.app_name
    }

    /// Perform one authenticated request and validate the response.
    ///
    /// `path` is resolved against the configured service URL; an absolute
    /// path overrides the endpoint's path component, per standard URI
    /// resolution. The body, if any, is sent verbatim with the media type
    /// it declares. On success (2xx) the raw response is returned for the
    /// caller to read.
    ///
    /// # Errors
    /// Non-success statuses map to typed errors: 404 to
    /// [`ApiError::NotFound`], 429 to [`ApiError::RateLimited`], anything
    /// else to [`ApiError::Api`] with a body-derived message. A 401
    /// additionally invalidates the just-used token through the
    /// authenticator before the failure is returned.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        context: Option<&QueryContext>,
    ) -> Result<Response, ApiError> {
        let url = self
            .config
            .service_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid request path '{path}': {e}")))?;

        let token = self.auth.bearer_token().await?;

        let mut builder = self.http.request(method.clone(), url.clone()).bearer_auth(&token);

        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, body.content_type)
                .body(body.bytes);
        }

        if let Some(context) = context {
            builder = context.apply(builder);
        }

        debug!(%method, %url, "dispatching CMS request");

        self.dispatch(builder, &token).await
    }

    /// Perform one authenticated request with a JSON body.
    pub async fn request_json<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        context: Option<&QueryContext>,
    ) -> Result<Response, ApiError> {
        let url = self
            .config
            .service_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid request path '{path}': {e}")))?;

        let token = self.auth.bearer_token().await?;

        let mut builder =
            self.http.request(method.clone(), url.clone()).bearer_auth(&token).json(body);

        if let Some(context) = context {
            builder = context.apply(builder);
        }

        debug!(%method, %url, "dispatching CMS request");

        self.dispatch(builder, &token).await
    }

    /// Send the prepared request bounded by the configured timeout, then
    /// validate the response.
    async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
        token: &str,
    ) -> Result<Response, ApiError> {
        let response = tokio::time::timeout(self.config.timeout, self.http.send(builder))
            .await
            .map_err(|_| ApiError::Timeout(self.config.timeout))??;

        self.ensure_valid(response, token).await
    }

    /// Map a non-success response to its typed error, first match wins.
    ///
    /// The 401 branch removes the rejected token and then falls through
    /// to the generic body-derived error; no retry is attempted here.
    async fn ensure_valid(&self, response: Response, token: &str) -> Result<Response, ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(%status, "token rejected, removing it");
            self.auth.remove_token(token).await?;
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }

        let body = response.text().await?;
        warn!(%status, "CMS request failed");

        Err(ApiError::api_failure(&body))
    }
}

/// Builder for [`CmsClient`].
#[derive(Default)]
pub struct CmsClientBuilder {
    service_url: Option<Url>,
    app_name: Option<String>,
    timeout: Option<Duration>,
    http: Option<HttpClient>,
    auth: Option<Arc<dyn Authenticator>>,
}

impl CmsClientBuilder {
    pub fn service_url(mut self, url: Url) -> Self {
        self.service_url = Some(url);
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Inject a shared transport; a default one is built otherwise.
    pub fn http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    pub fn authenticator(mut self, auth: Arc<dyn Authenticator>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if a required field is missing or
    /// configuration validation fails.
    pub fn build(self) -> Result<CmsClient, ApiError> {
        let service_url = self
            .service_url
            .ok_or_else(|| ApiError::Config("service url not set".to_string()))?;
        let app_name =
            self.app_name.ok_or_else(|| ApiError::Config("app name not set".to_string()))?;
        let auth =
            self.auth.ok_or_else(|| ApiError::Config("authenticator not set".to_string()))?;

        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new()?,
        };

        let mut config = CmsConfig::new(service_url, app_name);
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }

        CmsClient::new(config, http, auth)
    }
}
