//! Company lookup tool definition.

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

/// Parameters for the company lookup tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCompanyByIdParams {
    /// Company id: at least 6 characters of letters, digits, '_' or '-'.
    pub company_id: String,

    /// Output fields to return (at most 30). Unknown fields are ignored.
    pub fields: Option<Vec<String>>,
}

/// A validated lookup request.
#[derive(Debug, Clone, PartialEq)]
pub struct GetByIdRequest {
    pub company_id: String,
    pub fields: Option<Vec<String>>,
}

impl GetCompanyByIdParams {
    pub fn validate(self) -> ValidationResult<GetByIdRequest> {
        validation::company_id("company_id", &self.company_id)?;
        validation::field_list(self.fields.as_deref())?;
        Ok(GetByIdRequest {
            company_id: self.company_id,
            fields: self.fields,
        })
    }
}

/// Company lookup tool.
pub struct GetCompanyByIdTool;

impl GetCompanyByIdTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "getCompanyById";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch a single company by its id, optionally restricted to a list of output fields.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        params: GetCompanyByIdParams,
        ctx: Arc<ToolContext>,
    ) -> Result<Envelope, ToolError> {
        let request = params.validate()?;

        let mut query = Map::new();
        if let Some(fields) = ctx.projection().sanitize_csv(request.fields.as_deref()) {
            query.insert("fields".to_string(), Value::from(fields));
        }

        let path = format!("/companies/{}", request.company_id);
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
            input_schema: cached_schema_for_type::<GetCompanyByIdParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Get company by id".into()),
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
