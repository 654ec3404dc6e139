//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - Dispatch of tool calls by name (used by the HTTP transport)
//! - Tool metadata for listing

use std::sync::Arc;

use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;
use tracing::warn;

use super::definitions::{
    BulkEnrichTool, GetCompanyByIdTool, GetDeltaUpdatesTool, GetUsageLimitsTool,
    SearchCompaniesTool,
};
use super::error::ToolError;
use super::handlers::ToolContext;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            GetUsageLimitsTool::NAME,
            SearchCompaniesTool::NAME,
            GetCompanyByIdTool::NAME,
            BulkEnrichTool::NAME,
            GetDeltaUpdatesTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            GetUsageLimitsTool::to_tool(),
            SearchCompaniesTool::to_tool(),
            GetCompanyByIdTool::to_tool(),
            BulkEnrichTool::to_tool(),
            GetDeltaUpdatesTool::to_tool(),
        ]
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// Only an unknown tool name is an `Err`; tool failures come back as
    /// `is_error` results.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ToolError> {
        let ctx = self.context.clone();
        let result = match name {
            GetUsageLimitsTool::NAME => GetUsageLimitsTool::call(arguments, ctx).await,
            SearchCompaniesTool::NAME => SearchCompaniesTool::call(arguments, ctx).await,
            GetCompanyByIdTool::NAME => GetCompanyByIdTool::call(arguments, ctx).await,
            BulkEnrichTool::NAME => BulkEnrichTool::call(arguments, ctx).await,
            GetDeltaUpdatesTool::NAME => GetDeltaUpdatesTool::call(arguments, ctx).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(ToolError::not_found(name));
            }
        };
        Ok(result)
    }
}
