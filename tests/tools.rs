//! End-to-end tool calls through the registry against a scripted upstream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

use company_data_mcp_server::core::Config;
use company_data_mcp_server::domains::tools::{ToolContext, ToolRegistry};
use company_data_mcp_server::domains::upstream::{
    BackoffClient, RawResponse, UpstreamError, UpstreamRequest, UpstreamTransport,
};

/// Replays canned responses and records every request it receives.
struct ScriptedUpstream {
    responses: Mutex<VecDeque<Result<RawResponse, UpstreamError>>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedUpstream {
    fn replying(responses: Vec<Result<RawResponse, UpstreamError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        })
    }

    fn ok(body: Value) -> Arc<Self> {
        Self::replying(vec![Ok(RawResponse::new(200, body.to_string()))])
    }

    fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamTransport for ScriptedUpstream {
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(500, "script exhausted")))
    }
}

fn registry_with(config: Config, upstream: Arc<ScriptedUpstream>) -> ToolRegistry {
    let config = Arc::new(config);
    let client = BackoffClient::new(upstream, &config.upstream);
    ToolRegistry::new(Arc::new(ToolContext::new(config, client)))
}

fn registry(upstream: Arc<ScriptedUpstream>) -> ToolRegistry {
    registry_with(Config::default(), upstream)
}

fn structured(result: &CallToolResult) -> &Value {
    result
        .structured_content
        .as_ref()
        .expect("tool results always carry structured content")
}

fn query_value<'a>(request: &'a UpstreamRequest, key: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn error_kind(result: &CallToolResult) -> &str {
    assert_eq!(result.is_error, Some(true), "expected an error result");
    structured(result)["error"]["kind"].as_str().unwrap()
}

#[tokio::test]
async fn usage_limits_reads_me_limits() {
    let upstream = ScriptedUpstream::ok(json!({ "remaining": 980, "limit": 1000 }));
    let result = assert_ok!(
        registry(upstream.clone())
            .call_tool("getUsageLimits", json!({}))
            .await
    );

    assert_eq!(result.is_error, Some(false));
    let envelope = structured(&result);
    assert_eq!(envelope["data"]["remaining"], 980);
    assert_eq!(envelope["source"]["endpoint"], "/me/limits");
    assert_eq!(envelope["source"]["params"], json!({}));
    assert_eq!(envelope["source"]["status"], 200);

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method.as_str(), "GET");
    assert!(requests[0].query.is_empty());
}

#[tokio::test]
async fn get_by_id_forwards_only_allowed_fields() {
    let upstream = ScriptedUpstream::ok(json!({ "id": "acme_001" }));
    let result = registry(upstream.clone())
        .call_tool(
            "getCompanyById",
            json!({ "company_id": "acme_001", "fields": ["id", "secret_internal_field"] }),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let envelope = structured(&result);
    assert_eq!(envelope["source"]["endpoint"], "/companies/acme_001");
    assert_eq!(envelope["source"]["params"], json!({ "fields": "id" }));

    let requests = upstream.requests();
    assert_eq!(requests[0].path, "/companies/acme_001");
    assert_eq!(query_value(&requests[0], "fields"), Some("id"));
}

#[tokio::test]
async fn get_by_id_omits_fields_when_none_survive() {
    let upstream = ScriptedUpstream::ok(json!({ "id": "acme_001" }));
    registry(upstream.clone())
        .call_tool(
            "getCompanyById",
            json!({ "company_id": "acme_001", "fields": ["password"] }),
        )
        .await
        .unwrap();

    assert_eq!(query_value(&upstream.requests()[0], "fields"), None);
}

#[tokio::test]
async fn search_caps_per_page_at_configured_maximum() {
    let mut config = Config::default();
    config.upstream.max_per_page = 20;

    let upstream = ScriptedUpstream::ok(json!({ "items": [] }));
    let result = registry_with(config, upstream.clone())
        .call_tool("searchCompanies", json!({ "country": "DE", "per_page": 50 }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let request = &upstream.requests()[0];
    assert_eq!(request.path, "/companies");
    assert_eq!(query_value(request, "per_page"), Some("20"));
    assert_eq!(query_value(request, "page"), Some("1"));
    assert_eq!(query_value(request, "country"), Some("DE"));
    assert_eq!(structured(&result)["source"]["params"]["per_page"], 20);
}

#[tokio::test]
async fn search_accepts_whole_number_floats() {
    let upstream = ScriptedUpstream::ok(json!({ "items": [] }));
    let result = registry(upstream.clone())
        .call_tool("searchCompanies", json!({ "per_page": 10.0, "page": 3.0 }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let request = &upstream.requests()[0];
    assert_eq!(query_value(request, "per_page"), Some("10"));
    assert_eq!(query_value(request, "page"), Some("3"));
}

#[tokio::test]
async fn bulk_enrich_posts_body_with_bulk_timeout() {
    let mut config = Config::default();
    config.upstream.bulk_timeout = Duration::from_secs(90);

    let upstream = ScriptedUpstream::ok(json!({ "results": [] }));
    let result = registry_with(config, upstream.clone())
        .call_tool(
            "bulkEnrich",
            json!({ "domains": ["acme.com", "globex.com"], "fields": ["name", "nope"] }),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let request = &upstream.requests()[0];
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.path, "/companies/bulk");
    assert_eq!(request.timeout, Duration::from_secs(90));

    let expected = json!({ "domains": ["acme.com", "globex.com"], "fields": ["name"] });
    assert_eq!(request.body.as_ref(), Some(&expected));
    assert_eq!(structured(&result)["source"]["params"], expected);
}

#[tokio::test]
async fn delta_updates_send_since() {
    let upstream = ScriptedUpstream::ok(json!({ "changes": [] }));
    let result = registry(upstream.clone())
        .call_tool(
            "getDeltaUpdates",
            json!({ "company_id": "acme_001", "since": "2024-05-01T00:00:00Z" }),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    let request = &upstream.requests()[0];
    assert_eq!(request.path, "/companies/acme_001/updates");
    assert_eq!(query_value(request, "since"), Some("2024-05-01T00:00:00Z"));
}

#[tokio::test]
async fn invalid_arguments_never_reach_upstream() {
    let cases = [
        ("getCompanyById", json!({ "company_id": "ab1" })),
        ("getCompanyById", json!({})),
        ("searchCompanies", json!({ "per_page": 101 })),
        ("searchCompanies", json!({ "country": "DEU" })),
        ("bulkEnrich", json!({ "domains": [] })),
        ("getDeltaUpdates", json!({ "company_id": "acme_001", "since": "short" })),
    ];

    for (tool, args) in cases {
        let upstream = ScriptedUpstream::ok(json!({}));
        let result = registry(upstream.clone())
            .call_tool(tool, args.clone())
            .await
            .unwrap();

        assert_eq!(error_kind(&result), "bad_request", "{tool} {args}");
        assert_eq!(structured(&result)["error"]["status"], 400);
        assert!(upstream.requests().is_empty(), "{tool} {args} hit upstream");
    }
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let upstream = ScriptedUpstream::ok(json!({}));
    let err = assert_err!(
        registry(upstream.clone())
            .call_tool("add", json!({ "a": 1, "b": 2 }))
            .await
    );

    assert!(err.to_string().contains("add"));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn non_json_upstream_is_bad_gateway_for_every_tool() {
    let calls = [
        ("getUsageLimits", json!({})),
        ("searchCompanies", json!({})),
        ("getCompanyById", json!({ "company_id": "acme_001" })),
        ("bulkEnrich", json!({ "domains": ["acme.com"] })),
        ("getDeltaUpdates", json!({ "company_id": "acme_001", "since": "2024-05-01" })),
    ];

    for (tool, args) in calls {
        let upstream =
            ScriptedUpstream::replying(vec![Ok(RawResponse::new(200, "<html>oops</html>"))]);
        let result = registry(upstream).call_tool(tool, args).await.unwrap();

        assert_eq!(error_kind(&result), "bad_gateway", "{tool}");
        let message = structured(&result)["error"]["message"].as_str().unwrap();
        assert!(!message.contains("html"), "{tool} leaked upstream body");
    }
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limit_returns_final_upstream_answer() {
    let limited = || Ok(RawResponse::new(429, json!({ "error": "slow down" }).to_string()));
    let upstream = ScriptedUpstream::replying(vec![limited(), limited(), limited(), limited()]);

    let result = registry(upstream.clone())
        .call_tool("getUsageLimits", json!({}))
        .await
        .unwrap();

    assert_eq!(upstream.requests().len(), 4);
    assert_eq!(result.is_error, Some(false));
    let envelope = structured(&result);
    assert_eq!(envelope["source"]["status"], 429);
    assert_eq!(envelope["data"]["error"], "slow down");
}

#[tokio::test(start_paused = true)]
async fn transient_server_error_is_retried() {
    let upstream = ScriptedUpstream::replying(vec![
        Ok(RawResponse::new(503, "{}")),
        Ok(RawResponse::new(200, json!({ "id": "acme_001" }).to_string())),
    ]);

    let result = registry(upstream.clone())
        .call_tool("getCompanyById", json!({ "company_id": "acme_001" }))
        .await
        .unwrap();

    assert_eq!(upstream.requests().len(), 2);
    assert_eq!(structured(&result)["source"]["status"], 200);
}

#[tokio::test]
async fn upstream_not_found_is_data_not_failure() {
    let upstream = ScriptedUpstream::replying(vec![Ok(RawResponse::new(
        404,
        json!({ "error": "no such company" }).to_string(),
    ))]);

    let result = registry(upstream.clone())
        .call_tool("getCompanyById", json!({ "company_id": "acme_404" }))
        .await
        .unwrap();

    assert_eq!(upstream.requests().len(), 1);
    assert_eq!(result.is_error, Some(false));
    assert_eq!(structured(&result)["source"]["status"], 404);
}

#[tokio::test]
async fn network_failures_map_to_opaque_outcomes() {
    let upstream = ScriptedUpstream::replying(vec![Err(UpstreamError::unreachable(
        "connection refused (os error 111) at 10.0.0.7",
    ))]);
    let result = registry(upstream.clone())
        .call_tool("getUsageLimits", json!({}))
        .await
        .unwrap();

    assert_eq!(upstream.requests().len(), 1);
    assert_eq!(error_kind(&result), "upstream_unavailable");
    let message = structured(&result)["error"]["message"].as_str().unwrap();
    assert!(!message.contains("10.0.0.7"));

    let upstream = ScriptedUpstream::replying(vec![Err(UpstreamError::Timeout(
        Duration::from_secs(20),
    ))]);
    let result = registry(upstream)
        .call_tool("getUsageLimits", json!({}))
        .await
        .unwrap();
    assert_eq!(error_kind(&result), "gateway_timeout");
    assert_eq!(structured(&result)["error"]["status"], 504);
}
