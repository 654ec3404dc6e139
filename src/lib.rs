//! Company data MCP server.
//!
//! Exposes a company-data HTTP API to MCP clients as five tools: usage
//! limits, company search, lookup by id, bulk enrichment and delta updates.
//! Every tool validates its arguments, restricts requested output fields to
//! an allowlist, forwards the call upstream with retry and backoff, and wraps
//! the response in an envelope recording where the data came from.
//!
//! # Architecture
//!
//! - **core**: configuration, field projection, the MCP server handler and
//!   the transports (stdio, TCP, HTTP)
//! - **domains**
//!   - **tools**: parameter validation, tool definitions, routing and
//!     outcome mapping
//!   - **upstream**: the HTTP transport seam, the backoff client and the
//!     provenance envelope
//!
//! # Example
//!
//! ```rust,no_run
//! use company_data_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

pub use core::{Config, Error, McpServer, Result};
