//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Each tool validates its arguments, applies the projection and paging
//! policy, forwards one logical request upstream and returns the upstream
//! data wrapped in an envelope with its provenance.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `validation.rs` - Field constraint checks shared by the tools
//! - `handlers.rs` - Tool context, failure-to-outcome mapping, call pipeline
//! - `router.rs` - Dynamic ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with params, `validate()`, `execute()` and `call()`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its route in `router.rs`
//! 4. Register it in `registry.rs`

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod router;
pub mod validation;

pub use error::ToolError;
pub use handlers::*;
pub use registry::ToolRegistry;
pub use router::build_tool_router;
pub use validation::ValidationError;
