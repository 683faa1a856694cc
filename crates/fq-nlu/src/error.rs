//! Remote classifier error types.

use thiserror::Error;

/// Errors from the remote zero-shot classifier. Never surfaced to callers:
/// every variant results in a fallback to the rules tier.
#[derive(Debug, Error)]
pub enum ZeroShotError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("classifier rate limited the request")]
    RateLimited,

    #[error("classifier returned status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<reqwest::Error> for ZeroShotError {
    fn from(err: reqwest::Error) -> Self {
        ZeroShotError::Http(err.to_string())
    }
}
