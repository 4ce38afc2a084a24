//! Heimdall error types

/// Heimdall error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Routing could not resolve a provider/model combination from the
    /// request hints. User-correctable: the hint names something the
    /// registry doesn't know about.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The request payload is missing required fields or malformed
    /// (e.g. an empty prompt).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A resolved model has no backend client implementation. This is a
    /// deployment misconfiguration, not a retryable condition.
    #[error("no client registered for model: {0}")]
    NoSupportingClient(String),

    // Upstream/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("upstream API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Cache backend failure. Never surfaced to callers: the caching
    /// filter degrades to pass-through on any cache error.
    #[error("cache unavailable: {0}")]
    CacheUnavailable(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => GatewayError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => GatewayError::Http(err.to_string()),
        }
    }
}

/// Result type alias for Heimdall operations
pub type Result<T> = std::result::Result<T, GatewayError>;
