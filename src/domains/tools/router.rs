//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route for STDIO/TCP transport.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{
    BulkEnrichTool, GetCompanyByIdTool, GetDeltaUpdatesTool, GetUsageLimitsTool,
    SearchCompaniesTool,
};
use super::handlers::ToolContext;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(context: Arc<ToolContext>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(GetUsageLimitsTool::create_route(context.clone()))
        .with_route(SearchCompaniesTool::create_route(context.clone()))
        .with_route(GetCompanyByIdTool::create_route(context.clone()))
        .with_route(BulkEnrichTool::create_route(context.clone()))
        .with_route(GetDeltaUpdatesTool::create_route(context))
}
