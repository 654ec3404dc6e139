//! Tool handlers module.
//!
//! Shared plumbing for every company tool: the injected [`ToolContext`], the
//! mapping from [`ToolError`] to a caller-visible [`ToolOutcome`], and
//! [`run_tool`], which decodes arguments, runs a tool, logs the call under a
//! correlation id and turns the result into a `CallToolResult`.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::ToolError;
use crate::core::config::Config;
use crate::core::security::FieldProjection;
use crate::domains::upstream::{BackoffClient, Envelope, UpstreamError, UpstreamRequest};

// ============================================================================
// Tool Context
// ============================================================================

/// Read-only collaborators shared by all tool invocations.
pub struct ToolContext {
    config: Arc<Config>,
    client: BackoffClient,
    projection: FieldProjection,
}

impl ToolContext {
    /// Create a context over an explicit upstream client.
    pub fn new(config: Arc<Config>, client: BackoffClient) -> Self {
        let projection = FieldProjection::from_config(&config);
        Self {
            config,
            client,
            projection,
        }
    }

    /// Create a context with a reqwest-backed upstream client.
    pub fn from_config(config: Arc<Config>) -> Result<Self, UpstreamError> {
        let client = BackoffClient::from_config(&config)?;
        Ok(Self::new(config, client))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn projection(&self) -> &FieldProjection {
        &self.projection
    }

    /// Send `request` upstream and wrap the answer with its provenance.
    pub async fn forward(
        &self,
        request: UpstreamRequest,
        params: Map<String, Value>,
    ) -> Result<Envelope, ToolError> {
        let response = self.client.send(&request).await?;
        Ok(Envelope::build(
            response.body,
            request.path,
            params,
            response.status,
        ))
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Caller-visible failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    BadRequest,
    NotFound,
    BadGateway,
    UpstreamUnavailable,
    GatewayTimeout,
    InternalError,
    Cancelled,
}

impl OutcomeKind {
    /// HTTP-equivalent status code.
    pub fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
            Self::BadGateway => 502,
            Self::UpstreamUnavailable => 503,
            Self::GatewayTimeout => 504,
            // Client Closed Request, as nginx reports it
            Self::Cancelled => 499,
        }
    }
}

/// What the caller is told about a failed tool call.
///
/// Only caller errors carry their detail; everything else gets a fixed
/// message so upstream URLs, credentials and parser output stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl From<&ToolError> for ToolOutcome {
    fn from(err: &ToolError) -> Self {
        let (kind, message) = match err {
            ToolError::Validation(e) => (OutcomeKind::BadRequest, e.to_string()),
            ToolError::InvalidArguments(msg) => (OutcomeKind::BadRequest, msg.clone()),
            ToolError::NotFound(name) => (OutcomeKind::NotFound, format!("Unknown tool: {name}")),
            ToolError::Cancelled => (OutcomeKind::Cancelled, err.to_string()),
            ToolError::Upstream(UpstreamError::Format { .. }) => (
                OutcomeKind::BadGateway,
                "Invalid upstream response".to_string(),
            ),
            ToolError::Upstream(UpstreamError::Unreachable(_)) => (
                OutcomeKind::UpstreamUnavailable,
                "Upstream service unreachable".to_string(),
            ),
            ToolError::Upstream(UpstreamError::Timeout(_)) => (
                OutcomeKind::GatewayTimeout,
                "Upstream request timed out".to_string(),
            ),
            ToolError::Upstream(UpstreamError::Client(_)) | ToolError::Internal(_) => (
                OutcomeKind::InternalError,
                "An unexpected error occurred".to_string(),
            ),
        };
        Self { kind, message }
    }
}

impl ToolOutcome {
    /// Render as an MCP error result tagged with the call id.
    pub fn into_result(self, call_id: Uuid) -> CallToolResult {
        let structured = serde_json::json!({
            "error": {
                "kind": self.kind,
                "status": self.kind.status(),
                "message": self.message,
                "call_id": call_id,
            }
        });

        CallToolResult {
            content: vec![Content::text(self.message)],
            structured_content: Some(structured),
            is_error: Some(true),
            meta: None,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Decode `arguments`, run `op` and render the result.
///
/// Never fails: every error becomes an `is_error` result carrying a
/// [`ToolOutcome`].
pub async fn run_tool<P, F, Fut>(
    name: &'static str,
    arguments: Value,
    ctx: Arc<ToolContext>,
    op: F,
) -> CallToolResult
where
    P: DeserializeOwned,
    F: FnOnce(P, Arc<ToolContext>) -> Fut,
    Fut: Future<Output = Result<Envelope, ToolError>>,
{
    let call_id = Uuid::new_v4();
    let started = Instant::now();
    debug!(%call_id, tool = name, "Tool invoked with {}", arguments);

    let result = match serde_json::from_value::<P>(arguments) {
        Ok(params) => op(params, ctx).await,
        Err(e) => Err(ToolError::invalid_arguments(e.to_string())),
    };
    let elapsed = started.elapsed();

    let outcome = match result {
        Ok(envelope) => match envelope_result(&envelope) {
            Ok(rendered) => {
                if envelope.is_upstream_error() {
                    warn!(
                        %call_id,
                        tool = name,
                        upstream_status = envelope.source.status,
                        "Upstream answered with an error status after {:.3}s",
                        elapsed.as_secs_f64()
                    );
                } else {
                    info!(
                        %call_id,
                        tool = name,
                        upstream_status = envelope.source.status,
                        "Tool succeeded in {:.3}s",
                        elapsed.as_secs_f64()
                    );
                }
                return rendered;
            }
            Err(e) => ToolError::internal(format!("Failed to serialize envelope: {e}")),
        },
        Err(e) => e,
    };

    if outcome.is_caller_error() {
        warn!(%call_id, tool = name, "Rejected after {:.3}s: {}", elapsed.as_secs_f64(), outcome);
    } else {
        error!(%call_id, tool = name, "Failed after {:.3}s: {:?}", elapsed.as_secs_f64(), outcome);
    }

    ToolOutcome::from(&outcome).into_result(call_id)
}

/// Run `call` until it completes or `cancelled` resolves.
///
/// rmcp signals `notifications/cancelled` through the request's cancellation
/// token but keeps polling the handler, so the race has to happen here.
/// Losing it drops `call` together with any in-flight upstream request and
/// pending backoff wait.
pub async fn until_cancelled<C, K>(name: &'static str, call: C, cancelled: K) -> CallToolResult
where
    C: Future<Output = CallToolResult>,
    K: Future<Output = ()>,
{
    tokio::select! {
        biased;
        () = cancelled => {
            let call_id = Uuid::new_v4();
            info!(%call_id, tool = name, "Tool call cancelled by the client");
            ToolOutcome::from(&ToolError::Cancelled).into_result(call_id)
        }
        result = call => result,
    }
}

/// Successful result: the envelope as JSON text plus structured content.
fn envelope_result(envelope: &Envelope) -> Result<CallToolResult, serde_json::Error> {
    let structured = serde_json::to_value(envelope)?;
    Ok(CallToolResult {
        content: vec![Content::text(structured.to_string())],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::validation::ValidationError;
    use crate::domains::upstream::{RawResponse, UpstreamTransport};
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::time::Duration;

    struct FixedTransport(RawResponse);

    #[async_trait]
    impl UpstreamTransport for FixedTransport {
        async fn execute(&self, _request: &UpstreamRequest) -> Result<RawResponse, UpstreamError> {
            Ok(self.0.clone())
        }
    }

    fn context(response: RawResponse) -> Arc<ToolContext> {
        let config = Arc::new(Config::default());
        let client = BackoffClient::new(Arc::new(FixedTransport(response)), &config.upstream);
        Arc::new(ToolContext::new(config, client))
    }

    #[derive(Deserialize)]
    struct PingParams {
        n: i64,
    }

    async fn ping(params: PingParams, ctx: Arc<ToolContext>) -> Result<Envelope, ToolError> {
        if params.n < 0 {
            return Err(ValidationError::new("n", "must be >= 0").into());
        }
        let mut query = Map::new();
        query.insert("n".to_string(), params.n.into());
        let request = UpstreamRequest::get("/ping", Duration::from_secs(1)).with_params(&query);
        ctx.forward(request, query).await
    }

    fn error_kind(result: &CallToolResult) -> Value {
        result.structured_content.as_ref().unwrap()["error"]["kind"].clone()
    }

    #[tokio::test]
    async fn test_success_renders_envelope() {
        let ctx = context(RawResponse::new(200, r#"{"pong":true}"#));
        let result = run_tool("ping", serde_json::json!({ "n": 1 }), ctx, ping).await;

        assert_eq!(result.is_error, Some(false));
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["data"]["pong"], true);
        assert_eq!(structured["source"]["endpoint"], "/ping");
        assert_eq!(structured["source"]["params"]["n"], 1);
        assert_eq!(structured["source"]["status"], 200);
    }

    #[tokio::test]
    async fn test_validation_failure_is_bad_request() {
        let ctx = context(RawResponse::new(200, "{}"));
        let result = run_tool("ping", serde_json::json!({ "n": -1 }), ctx, ping).await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(error_kind(&result), "bad_request");
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["error"]["message"], "n must be >= 0");
        assert_eq!(structured["error"]["status"], 400);
    }

    #[tokio::test]
    async fn test_undecodable_arguments_are_bad_request() {
        let ctx = context(RawResponse::new(200, "{}"));
        let result = run_tool("ping", serde_json::json!({ "n": "one" }), ctx, ping).await;
        assert_eq!(error_kind(&result), "bad_request");
    }

    #[tokio::test]
    async fn test_non_json_upstream_is_bad_gateway() {
        let ctx = context(RawResponse::new(200, "not json"));
        let result = run_tool("ping", serde_json::json!({ "n": 1 }), ctx, ping).await;
        assert_eq!(error_kind(&result), "bad_gateway");
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let err = ToolError::internal("db password=hunter2 at https://internal.host");
        let outcome = ToolOutcome::from(&err);
        assert_eq!(outcome.kind, OutcomeKind::InternalError);
        assert!(!outcome.message.contains("hunter2"));
        assert!(!outcome.message.contains("internal.host"));
    }

    #[test]
    fn test_network_errors_do_not_leak_detail() {
        let err = ToolError::from(UpstreamError::unreachable(
            "error sending request for url (https://api.example.com/companies)",
        ));
        let outcome = ToolOutcome::from(&err);
        assert_eq!(outcome.kind, OutcomeKind::UpstreamUnavailable);
        assert!(!outcome.message.contains("api.example.com"));

        let timeout = ToolOutcome::from(&ToolError::from(UpstreamError::Timeout(
            Duration::from_secs(20),
        )));
        assert_eq!(timeout.kind.status(), 504);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_drops_the_call() {
        let finished = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = finished.clone();
        let call = async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            CallToolResult::success(vec![])
        };

        let result = until_cancelled(
            "ping",
            call,
            tokio::time::sleep(Duration::from_millis(300)),
        )
        .await;

        assert_eq!(error_kind(&result), "cancelled");
        assert_eq!(result.structured_content.unwrap()["error"]["status"], 499);
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!finished.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_completed_call_wins_over_pending_cancellation() {
        let ctx = context(RawResponse::new(200, r#"{"pong":true}"#));
        let call = run_tool("ping", serde_json::json!({ "n": 1 }), ctx, ping);
        let result = until_cancelled("ping", call, std::future::pending()).await;
        assert_eq!(result.is_error, Some(false));
    }
}
