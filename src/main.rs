//! Company data MCP server entry point.
//!
//! Loads configuration, initializes logging on stderr and serves the
//! configured transport until it ends or a shutdown signal arrives.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use company_data_mcp_server::core::{
    Config, McpServer, TransportService, config::LoggingConfig, transport::shutdown_signal,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first, so warnings about invalid settings below are visible.
    init_logging(&LoggingConfig::from_env());
    let config = Config::from_env();

    info!("Starting {} v{}", config.server.name, config.server.version);
    if config.credentials.api_key.is_none() {
        info!("No STATISTA_API_KEY set - upstream calls are sent without credentials");
    }

    let server = McpServer::new(config.clone())?;
    info!(
        "Server initialized (upstream: {})",
        config.upstream.base_url
    );

    TransportService::new(config.transport)
        .run_until(server, shutdown_signal())
        .await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the stdio transport keeps stdout for protocol
/// messages. `RUST_LOG` directives refine the configured level.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.with_timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
