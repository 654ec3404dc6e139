//! Delta updates tool definition.
//!
//! Lists the changes recorded for one company since a timestamp or cursor.
//! The `since` token is opaque here and forwarded verbatim.

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
use crate::domains::tools::validation::{self, ValidationResult};
use crate::domains::upstream::{Envelope, UpstreamRequest};

/// Minimum length of the `since` token.
pub const SINCE_MIN_LEN: usize = 10;

/// Parameters for the delta updates tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDeltaUpdatesParams {
    /// Company id: at least 6 characters of letters, digits, '_' or '-'.
    pub company_id: String,

    /// Timestamp or cursor to list changes from (at least 10 characters).
    pub since: String,
}

/// A validated delta request.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRequest {
    pub company_id: String,
    pub since: String,
}

impl GetDeltaUpdatesParams {
    pub fn validate(self) -> ValidationResult<DeltaRequest> {
        validation::company_id("company_id", &self.company_id)?;
        validation::min_chars("since", &self.since, SINCE_MIN_LEN)?;
        Ok(DeltaRequest {
            company_id: self.company_id,
            since: self.since,
        })
    }
}

/// Delta updates tool.
pub struct GetDeltaUpdatesTool;

impl GetDeltaUpdatesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "getDeltaUpdates";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "List the changes recorded for a company since the given timestamp or cursor.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        params: GetDeltaUpdatesParams,
        ctx: Arc<ToolContext>,
    ) -> Result<Envelope, ToolError> {
        let request = params.validate()?;

        let mut query = Map::new();
        query.insert("since".to_string(), Value::from(request.since));

        let path = format!("/companies/{}/updates", request.company_id);
        let call = UpstreamRequest::get(path, ctx.config().upstream.request_timeout)
            .with_params(&query);
        ctx.forward(call, query).await
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
            input_schema: cached_schema_for_type::<GetDeltaUpdatesParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get delta updates".into()),
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
