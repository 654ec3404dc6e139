//! Rate-limit aware upstream client.
//!
//! One logical request maps to at most `MAX_RETRIES + 1` HTTP calls: up to
//! three attempts that are retried on 429/5xx, then one final attempt whose
//! response is returned whatever its status. Callers always get the last
//! upstream response instead of a "retries exhausted" error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::UpstreamError;
use super::transport::{RawResponse, ReqwestTransport, UpstreamRequest, UpstreamTransport};
use crate::core::config::{Config, UpstreamConfig};

/// Attempts that may be followed by a retry.
pub const MAX_RETRIES: u32 = 3;

/// Decoded upstream response.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

/// Upstream client with exponential backoff honoring `Retry-After`.
#[derive(Clone)]
pub struct BackoffClient {
    transport: Arc<dyn UpstreamTransport>,
    initial_backoff: Duration,
    max_retry_wait: Duration,
}

impl BackoffClient {
    /// Create a client over an arbitrary transport.
    pub fn new(transport: Arc<dyn UpstreamTransport>, config: &UpstreamConfig) -> Self {
        Self {
            transport,
            initial_backoff: config.initial_backoff,
            max_retry_wait: config.max_retry_wait,
        }
    }

    /// Create a reqwest-backed client from the server configuration.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), &config.upstream))
    }

    /// Send `request`, retrying on rate limiting and server errors.
    ///
    /// Network failures are returned immediately. Dropping the returned
    /// future aborts both the in-flight call and any pending backoff wait.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut delay = self.initial_backoff;

        for attempt in 1..=MAX_RETRIES {
            let raw = self.transport.execute(request).await?;
            if !is_retryable(raw.status) {
                return decode(raw);
            }

            let wait = self.retry_wait(&raw, delay);
            warn!(
                "Upstream returned {} (attempt {}/{}), retrying in {:?}",
                raw.status, attempt, MAX_RETRIES, wait
            );
            tokio::time::sleep(wait).await;
            delay = delay.saturating_mul(2);
        }

        debug!("Retries exhausted, issuing final attempt");
        let raw = self.transport.execute(request).await?;
        decode(raw)
    }

    /// Wait before the next attempt: the server hint when usable, else `delay`.
    fn retry_wait(&self, raw: &RawResponse, delay: Duration) -> Duration {
        raw.retry_after
            .as_deref()
            .and_then(parse_retry_after)
            .map(|hint| hint.min(self.max_retry_wait))
            .unwrap_or(delay)
    }
}

/// 429 and every 5xx are retried; everything else is final.
fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// `Retry-After` in (possibly fractional) seconds. Negative, non-finite and
/// out-of-range values are unusable.
fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs = value.trim().parse::<f64>().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

fn decode(raw: RawResponse) -> Result<UpstreamResponse, UpstreamError> {
    let body = serde_json::from_slice(&raw.body).map_err(|source| UpstreamError::Format {
        status: raw.status,
        source,
    })?;
    Ok(UpstreamResponse {
        status: raw.status,
        body,
    })
}
