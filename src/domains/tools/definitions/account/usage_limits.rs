//! Usage limits tool definition.
//!
//! Reports the request quota of the configured upstream credential.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolContext, run_tool, until_cancelled};
use crate::domains::upstream::{Envelope, UpstreamRequest};

const ENDPOINT: &str = "/me/limits";

/// The tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetUsageLimitsParams {}

/// Usage limits tool.
pub struct GetUsageLimitsTool;

impl GetUsageLimitsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "getUsageLimits";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return the current upstream API quota and usage for the configured credential.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        _params: GetUsageLimitsParams,
        ctx: Arc<ToolContext>,
    ) -> Result<Envelope, ToolError> {
        let request = UpstreamRequest::get(ENDPOINT, ctx.config().upstream.request_timeout);
        ctx.forward(request, Map::new()).await
    }

    /// Handler shared by the HTTP registry and the rmcp route.
    pub async fn call(arguments: Value, ctx: Arc<ToolContext>) -> CallToolResult {
        run_tool(Self::NAME, arguments, ctx, Self::execute).await
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetUsageLimitsParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get usage limits".into()),
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(ctx: Arc<ToolContext>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |call: ToolCallContext<'_, S>| {
            let args = call.arguments.clone().unwrap_or_default();
            let ct = call.request_context().ct.clone();
            let ctx = ctx.clone();
            async move {
                let call = Self::call(Value::Object(args), ctx);
                Ok::<_, McpError>(until_cancelled(Self::NAME, call, ct.cancelled()).await)
            }
            .boxed()
        })
    }
}
