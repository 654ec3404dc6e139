//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (optionally via a `.env` file) or defaults. The
//! configuration is read once at startup and shared read-only afterwards.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{info, warn};

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

/// Default projection allowlist.
pub const DEFAULT_ALLOWED_FIELDS: &str = "id,name,domain,industry,employees,country,updated_at";

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream REST API settings.
    pub upstream: UpstreamConfig,

    /// Upstream API credentials.
    pub credentials: CredentialsConfig,

    /// Output field projection policy.
    pub projection: ProjectionConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Upstream REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,

    /// Upper bound applied to the caller's `per_page`.
    pub max_per_page: u32,

    /// Timeout for a single upstream attempt on read operations.
    pub request_timeout: Duration,

    /// Timeout for a single upstream attempt on bulk enrichment.
    pub bulk_timeout: Duration,

    /// Wait before the first retry when no `Retry-After` is given.
    pub initial_backoff: Duration,

    /// Longest wait honored from a `Retry-After` header.
    pub max_retry_wait: Duration,
}

/// Configuration for upstream API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Bearer token sent as `Authorization` when present.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Output field projection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Field names callers may request. Anything else is dropped.
    pub allowed_fields: BTreeSet<String>,
}

impl ProjectionConfig {
    /// Build a projection config from a comma separated list.
    pub fn from_csv(csv: &str) -> Self {
        Self {
            allowed_fields: parse_field_list(csv),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::from_csv(DEFAULT_ALLOWED_FIELDS)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_per_page: 100,
            request_timeout: Duration::from_secs(20),
            bulk_timeout: Duration::from_secs(60),
            initial_backoff: Duration::from_millis(500),
            max_retry_wait: Duration::from_secs(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "company-data-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            upstream: UpstreamConfig::default(),
            credentials: CredentialsConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS` (after loading `.env`).
    ///
    /// Separate from [`Config::from_env`] so the subscriber can be installed
    /// before the rest of the configuration is parsed and warned about.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut logging = Self::default();

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }

        if let Ok(raw) = std::env::var("MCP_LOG_TIMESTAMPS") {
            logging.with_timestamps = !matches!(raw.trim().to_lowercase().as_str(), "false" | "0");
        }

        logging
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_TRANSPORT`...). Upstream settings keep the
    /// names the deployment already uses: `BASE_URL`, `STATISTA_API_KEY`,
    /// `MAX_PER_PAGE`, `PROJECTION_ALLOWLIST`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();
        config.transport = TransportConfig::from_env();

        if let Ok(base_url) = std::env::var("BASE_URL") {
            config.upstream.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Ok(key) = std::env::var("STATISTA_API_KEY")
            && !key.trim().is_empty()
        {
            config.credentials.api_key = Some(key);
        }

        if let Ok(raw) = std::env::var("MAX_PER_PAGE") {
            match raw.trim().parse::<u32>() {
                Ok(value) if value >= 1 => config.upstream.max_per_page = value,
                _ => warn!(
                    "Ignoring invalid MAX_PER_PAGE={:?}, keeping {}",
                    raw, config.upstream.max_per_page
                ),
            }
        }

        if let Ok(csv) = std::env::var("PROJECTION_ALLOWLIST") {
            config.projection = ProjectionConfig::from_csv(&csv);
            info!(
                "Projection allowlist: {} field(s)",
                config.projection.allowed_fields.len()
            );
        }

        if let Some(secs) = env_secs("UPSTREAM_TIMEOUT_SECS") {
            config.upstream.request_timeout = secs;
        }

        if let Some(secs) = env_secs("UPSTREAM_BULK_TIMEOUT_SECS") {
            config.upstream.bulk_timeout = secs;
        }

        config
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones.
fn parse_field_list(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

// Env var tests across modules run serially
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Log sink for asserting on emitted warnings.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_upstream_settings_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("BASE_URL", "https://upstream.test/v1/");
            std::env::set_var("MAX_PER_PAGE", "40");
            std::env::set_var("PROJECTION_ALLOWLIST", " id, name ,,country");
        }
        let config = Config::from_env();
        assert_eq!(config.upstream.base_url, "https://upstream.test/v1");
        assert_eq!(config.upstream.max_per_page, 40);
        let fields: Vec<_> = config.projection.allowed_fields.iter().cloned().collect();
        assert_eq!(fields, vec!["country", "id", "name"]);
        unsafe {
            std::env::remove_var("BASE_URL");
            std::env::remove_var("MAX_PER_PAGE");
            std::env::remove_var("PROJECTION_ALLOWLIST");
        }
    }

    #[test]
    fn test_invalid_max_per_page_is_ignored() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("MAX_PER_PAGE", "0");
        }
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let config = tracing::subscriber::with_default(subscriber, Config::from_env);
        assert_eq!(config.upstream.max_per_page, 100);
        assert!(logs.contents().contains("Ignoring invalid MAX_PER_PAGE"));
        unsafe {
            std::env::remove_var("MAX_PER_PAGE");
        }
    }

    #[test]
    fn test_empty_api_key_means_no_credential() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("STATISTA_API_KEY", "  ");
        }
        let config = Config::from_env();
        assert!(config.credentials.api_key.is_none());
        unsafe {
            std::env::remove_var("STATISTA_API_KEY");
        }
    }

    #[test]
    fn test_credentials_redacted_in_debug() {
        let creds = CredentialsConfig {
            api_key: Some("super_secret_key".to_string()),
        };
        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_default_allowlist() {
        let config = Config::default();
        assert_eq!(config.projection.allowed_fields.len(), 7);
        assert!(config.projection.allowed_fields.contains("updated_at"));
        assert!(config.credentials.api_key.is_none());
    }

    #[test]
    fn test_logging_config_reads_only_logging_vars() {
        let _lock = ENV_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("MCP_LOG_LEVEL", "debug");
            std::env::set_var("MCP_LOG_TIMESTAMPS", "0");
        }
        let logging = LoggingConfig::from_env();
        let config = Config::from_env();
        unsafe {
            std::env::remove_var("MCP_LOG_LEVEL");
            std::env::remove_var("MCP_LOG_TIMESTAMPS");
        }

        assert_eq!(logging.level, "debug");
        assert!(!logging.with_timestamps);
        assert_eq!(config.logging.level, logging.level);
        assert_eq!(config.logging.with_timestamps, logging.with_timestamps);
    }
}
