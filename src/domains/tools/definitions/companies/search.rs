//! Company search tool definition.
//!
//! Searches the upstream company index by domain, country, industry and
//! size, with paging and optional field projection.

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
use tracing::{debug, instrument};

use crate::core::security::FieldProjection;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolContext, run_tool, until_cancelled};
use crate::domains::tools::validation::{self, ValidationResult};
use crate::domains::upstream::{Envelope, UpstreamRequest};

const ENDPOINT: &str = "/companies";

/// Largest page a caller may ask for, before the server-side cap.
pub const MAX_PER_PAGE: i64 = 100;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the company search tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCompaniesParams {
    /// Company web domain, e.g. "acme.com".
    pub domain: Option<String>,

    /// Two-letter country code, e.g. "DE".
    pub country: Option<String>,

    /// Industry name.
    pub industry: Option<String>,

    /// Only companies with at least this many employees (>= 1).
    #[serde(default, deserialize_with = "validation::optional_whole_number")]
    pub employees_min: Option<i64>,

    /// Sort order: "updated_at" or "-updated_at".
    pub sort: Option<String>,

    /// Page number, starting at 1.
    #[serde(default = "default_page", deserialize_with = "validation::whole_number")]
    pub page: i64,

    /// Results per page (1-100, further capped by the server).
    #[serde(default = "default_per_page", deserialize_with = "validation::whole_number")]
    pub per_page: i64,

    /// Output fields to return (at most 30). Unknown fields are ignored.
    pub fields: Option<Vec<String>>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    25
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub domain: Option<String>,
    pub country: Option<String>,
    pub industry: Option<String>,
    pub employees_min: Option<u64>,
    pub sort: Option<String>,
    pub page: u64,
    pub per_page: u64,
    pub fields: Option<Vec<String>>,
}

impl SearchCompaniesParams {
    /// Check every field constraint.
    pub fn validate(self) -> ValidationResult<SearchRequest> {
        if let Some(country) = &self.country {
            validation::exact_chars("country", country, 2)?;
        }
        let employees_min = self
            .employees_min
            .map(|n| validation::at_least("employees_min", n, 1))
            .transpose()?;
        if let Some(sort) = &self.sort {
            validation::sort_key("sort", sort)?;
        }
        let page = validation::at_least("page", self.page, 1)?;
        let per_page = validation::in_range("per_page", self.per_page, 1, MAX_PER_PAGE)?;
        validation::field_list(self.fields.as_deref())?;

        Ok(SearchRequest {
            domain: self.domain,
            country: self.country,
            industry: self.industry,
            employees_min,
            sort: self.sort,
            page,
            per_page,
            fields: self.fields,
        })
    }
}

impl SearchRequest {
    /// Upstream query parameters: every present field, the sanitized
    /// projection joined by commas, and `per_page` capped at `max_per_page`.
    pub fn query_params(&self, projection: &FieldProjection, max_per_page: u32) -> Map<String, Value> {
        let mut params = Map::new();

        let strings = [
            ("domain", &self.domain),
            ("country", &self.country),
            ("industry", &self.industry),
            ("sort", &self.sort),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                params.insert(key.to_string(), Value::from(value.as_str()));
            }
        }

        if let Some(min) = self.employees_min {
            params.insert("employees_min".to_string(), Value::from(min));
        }
        params.insert("page".to_string(), Value::from(self.page));
        params.insert(
            "per_page".to_string(),
            Value::from(self.per_page.min(u64::from(max_per_page))),
        );

        if let Some(fields) = projection.sanitize_csv(self.fields.as_deref()) {
            params.insert("fields".to_string(), Value::from(fields));
        }

        params
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Company search tool.
pub struct SearchCompaniesTool;

impl SearchCompaniesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "searchCompanies";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search companies by domain, country, industry and minimum employee count. Supports paging (per_page up to 100, capped by the server), sorting by update time and an optional list of output fields. Returns the upstream data with the endpoint and parameters that produced it.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub async fn execute(
        params: SearchCompaniesParams,
        ctx: Arc<ToolContext>,
    ) -> Result<Envelope, ToolError> {
        let request = params.validate()?;
        let upstream = &ctx.config().upstream;
        let query = request.query_params(ctx.projection(), upstream.max_per_page);
        debug!("Searching companies with {} parameter(s)", query.len());

        let call = UpstreamRequest::get(ENDPOINT, upstream.request_timeout).with_params(&query);
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
            input_schema: cached_schema_for_type::<SearchCompaniesParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("Search companies".into()),
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
