//! Error types for server startup and lifecycle.
//!
//! Tool-level failures never reach this type: they are turned into error
//! results for the client inside the tools domain. What remains here are
//! the failures that stop the server itself.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream client could not be built.
    #[error("Upstream error: {0}")]
    Upstream(#[from] crate::domains::upstream::UpstreamError),

    /// A transport failed to start or stopped abnormally.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::TransportError;

    #[test]
    fn test_transport_error_converts() {
        let err: Error = TransportError::init("handshake failed").into();
        assert_eq!(
            err.to_string(),
            "Transport error: Server initialization error: handshake failed"
        );
    }
}
