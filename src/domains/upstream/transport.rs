//! Single HTTP round trip against the upstream API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::RETRY_AFTER;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::UpstreamError;
use crate::core::config::Config;

/// A request to send to the upstream, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl UpstreamRequest {
    /// Create a GET request with no query parameters.
    pub fn get(path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout,
        }
    }

    /// Create a POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value, timeout: Duration) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            timeout,
        }
    }

    /// Use `params` as the query string. Strings are sent verbatim, other
    /// JSON values in their JSON text form.
    pub fn with_params(mut self, params: &Map<String, Value>) -> Self {
        self.query = params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        self
    }
}

/// Status, retry hint and raw body of one upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response without a `Retry-After` header.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Attach a `Retry-After` header value.
    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Performs exactly one HTTP exchange, without retrying.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError>;
}

/// reqwest-backed transport. The connection pool is shared by all calls.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport from the server configuration.
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            api_key: config.credentials.api_key.clone(),
        })
    }

    fn classify(error: reqwest::Error, timeout: Duration) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout(timeout)
        } else {
            UpstreamError::unreachable(error.without_url().to_string())
        }
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, UpstreamError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::classify(e, request.timeout))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::classify(e, request.timeout))?;

        debug!("Upstream answered {} with {} bytes", status, body.len());

        Ok(RawResponse {
            status,
            retry_after,
            body: body.to_vec(),
        })
    }
}
