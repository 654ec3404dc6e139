//! Tool-specific error types.

use thiserror::Error;

use super::validation::ValidationError;
use crate::domains::upstream::UpstreamError;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The arguments could not be decoded into the tool's parameters.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The arguments decoded but violate a field constraint.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The upstream call failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// The client cancelled the call before it finished.
    #[error("Cancelled by the client")]
    Cancelled,

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Caused by the caller's input rather than by the server or upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidArguments(_) | Self::Validation(_) | Self::Cancelled
        )
    }
}
