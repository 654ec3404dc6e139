//! Transport layer for the MCP server.
//!
//! - **STDIO**: standard input/output, the default - feature: `stdio`
//! - **TCP**: line-delimited JSON-RPC over a socket - feature: `tcp`
//! - **HTTP**: JSON-RPC over POST plus a `/health` probe - feature: `http`
//!
//! Every transport hands tool calls to the same [`McpServer`](crate::core::McpServer),
//! so validation, projection and upstream handling do not depend on how a
//! client connected.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::{TransportService, shutdown_signal};

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
