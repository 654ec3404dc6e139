//! Bulk enrichment tool definition.
//!
//! Resolves up to 1000 domains to company records in one upstream call.
//! The call is a POST and is retried like any other request, so a retried
//! batch may be processed more than once upstream.

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
use tracing::{info, instrument};

use crate::core::security::FieldProjection;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolContext, run_tool, until_cancelled};
use crate::domains::tools::validation::{self, ValidationResult};
use crate::domains::upstream::{Envelope, UpstreamRequest};

const ENDPOINT: &str = "/companies/bulk";

/// Largest batch accepted in one call.
pub const MAX_DOMAINS: usize = 1000;

/// Parameters for the bulk enrichment tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BulkEnrichParams {
    /// Company domains to enrich (1-1000).
    pub domains: Vec<String>,

    /// Output fields to return (at most 30). Unknown fields are ignored.
    pub fields: Option<Vec<String>>,
}

/// A validated bulk enrichment request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEnrichRequest {
    pub domains: Vec<String>,
    pub fields: Option<Vec<String>>,
}

impl BulkEnrichParams {
    pub fn validate(self) -> ValidationResult<BulkEnrichRequest> {
        validation::item_count("domains", self.domains.len(), 1, MAX_DOMAINS)?;
        validation::field_list(self.fields.as_deref())?;
        Ok(BulkEnrichRequest {
            domains: self.domains,
            fields: self.fields,
        })
    }
}

impl BulkEnrichRequest {
    /// JSON body: `domains`, plus the sanitized `fields` when any survive.
    pub fn body(&self, projection: &FieldProjection) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("domains".to_string(), Value::from(self.domains.clone()));
        if let Some(fields) = projection.sanitize(self.fields.as_deref()) {
            body.insert("fields".to_string(), Value::from(fields));
        }
        body
    }
}

/// Bulk enrichment tool.
pub struct BulkEnrichTool;

impl BulkEnrichTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "bulkEnrich";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Enrich a batch of 1 to 1000 company domains in a single call, optionally restricted to a list of output fields.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        params: BulkEnrichParams,
        ctx: Arc<ToolContext>,
    ) -> Result<Envelope, ToolError> {
        let request = params.validate()?;
        info!("Enriching {} domain(s)", request.domains.len());

        let body = request.body(ctx.projection());
        let call = UpstreamRequest::post(
            ENDPOINT,
            Value::Object(body.clone()),
            ctx.config().upstream.bulk_timeout,
        );
        ctx.forward(call, body).await
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
            input_schema: cached_schema_for_type::<BulkEnrichParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Bulk enrich domains".into()),
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
