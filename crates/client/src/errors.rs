//! Error types for CMS API operations
//!
//! A single [`ApiError`] enum covers every failure the client can surface.
//! Callers that need to branch on the failure class use [`ApiError::kind`]
//! instead of matching variants directly.

use std::time::Duration;

use thiserror::Error;

/// Failure classes for API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The app, schema or entity does not exist (HTTP 404)
    NotFound,
    /// Remote quota exceeded (HTTP 429)
    RateLimited,
    /// Any other non-success response, or a response that could not be decoded
    Generic,
    /// Transport-level failure (connect, TLS, timeout)
    Network,
    /// Token acquisition or removal failed
    Auth,
    /// Invalid client configuration
    Config,
}

/// CMS API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("the app, schema or entity does not exist")]
    NotFound,

    #[error("too many requests, please upgrade your subscription")]
    RateLimited,

    /// Non-success response; the message is derived from the response body.
    #[error("{0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Get the failure class for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound => ErrorKind::NotFound,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Api(_) | Self::Decode(_) => ErrorKind::Generic,
            Self::Network(_) | Self::Timeout(_) => ErrorKind::Network,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Build the generic failure for a non-success response body.
    ///
    /// A blank body (empty or whitespace-only) yields the internal-error
    /// message; anything else is reported verbatim.
    pub fn api_failure(body: &str) -> Self {
        if body.trim().is_empty() {
            Self::Api("API failed with internal error".to_string())
        } else {
            Self::Api(format!("Request failed: {body}"))
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Result type alias for CMS client operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ApiError::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::RateLimited.kind(), ErrorKind::RateLimited);
        assert_eq!(ApiError::Api("x".to_string()).kind(), ErrorKind::Generic);
        assert_eq!(ApiError::Decode("x".to_string()).kind(), ErrorKind::Generic);
        assert_eq!(ApiError::Network("x".to_string()).kind(), ErrorKind::Network);
        assert_eq!(ApiError::Timeout(Duration::from_secs(5)).kind(), ErrorKind::Network);
        assert_eq!(ApiError::Auth("x".to_string()).kind(), ErrorKind::Auth);
        assert_eq!(ApiError::Config("x".to_string()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_status_messages_are_exact() {
        assert_eq!(ApiError::NotFound.to_string(), "the app, schema or entity does not exist");
        assert_eq!(
            ApiError::RateLimited.to_string(),
            "too many requests, please upgrade your subscription"
        );
    }

    #[test]
    fn test_api_failure_with_blank_body() {
        assert_eq!(ApiError::api_failure("").to_string(), "API failed with internal error");
        assert_eq!(ApiError::api_failure("   \n\t").to_string(), "API failed with internal error");
    }

    #[test]
    fn test_api_failure_with_body() {
        assert_eq!(ApiError::api_failure("B").to_string(), "Request failed: B");
        assert_eq!(
            ApiError::api_failure("schema is locked").to_string(),
            "Request failed: schema is locked"
        );
    }
}
