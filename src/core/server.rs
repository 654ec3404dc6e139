//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating tool calls to the tools domain.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/` with one file per tool.
//! Each tool defines:
//! - Parameters struct and its `validate()` method
//! - `execute()` method (core logic)
//! - `call()` method (used by the ToolRegistry for HTTP transport)
//!
//! The ToolRouter is built dynamically in `domains/tools/router.rs`.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;

use super::config::Config;
use super::error::Result as ServerResult;
use crate::domains::tools::{ToolContext, ToolError, ToolRegistry, build_tool_router};

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. All tools
/// share one read-only [`ToolContext`].
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Collaborators shared by every tool call.
    context: Arc<ToolContext>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with a reqwest-backed upstream client.
    pub fn new(config: Config) -> ServerResult<Self> {
        let config = Arc::new(config);
        let context = Arc::new(ToolContext::from_config(config.clone())?);
        Ok(Self::with_context(config, context))
    }

    /// Create a server over an existing tool context.
    pub fn with_context(config: Arc<Config>, context: Arc<ToolContext>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(context.clone()),
            config,
            context,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Instructions reported to clients on initialization.
    pub fn instructions() -> &'static str {
        "Company data gateway. Use searchCompanies to find companies, getCompanyById for one \
         record, bulkEnrich for batches of domains, getDeltaUpdates for recent changes and \
         getUsageLimits to check the remaining quota. Every result carries a `source` block \
         naming the upstream endpoint, parameters and status."
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "title": t.title,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, ToolError> {
        let registry = ToolRegistry::new(self.context.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(Self::instructions().to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_exposes_all_tools() {
        let server = McpServer::new(Config::default()).unwrap();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 5);
        assert!(tools.iter().all(|t| t["inputSchema"].is_object()));
    }

    #[test]
    fn test_server_info_enables_tools_only() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }
}
