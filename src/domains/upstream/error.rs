//! Upstream-specific error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to the upstream API.
///
/// Rate limiting and server errors are not represented here: they are
/// retried by [`super::BackoffClient`] and the final response is passed
/// through as-is.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request did not complete within its timeout.
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The upstream could not be reached (DNS, connect, reset...).
    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    /// The upstream answered with a body that is not valid JSON.
    #[error("Invalid upstream response (status {status}): {source}")]
    Format {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Create an "unreachable" error.
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }
}
