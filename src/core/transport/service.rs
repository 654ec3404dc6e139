//! Transport service - runs the configured transport until shutdown.

use std::future::Future;
use tracing::info;

use super::{TransportConfig, TransportError, TransportResult};
use crate::core::McpServer;

#[cfg(feature = "stdio")]
use super::stdio::StdioTransport;

#[cfg(feature = "tcp")]
use super::tcp::TcpTransport;

#[cfg(feature = "http")]
use super::http::HttpTransport;

/// Transport service - manages the transport layer for the MCP server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Run the transport until it finishes on its own.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        info!("Starting transport: {}", self.config.description());

        match self.config {
            #[cfg(feature = "stdio")]
            TransportConfig::Stdio => StdioTransport::run(server).await,
            #[cfg(feature = "tcp")]
            TransportConfig::Tcp(cfg) => TcpTransport::new(cfg).run(server).await,
            #[cfg(feature = "http")]
            TransportConfig::Http(cfg) => HttpTransport::new(cfg).run(server).await,
        }
    }

    /// Run the transport until it finishes or `shutdown` resolves, whichever
    /// comes first. In-flight calls are dropped on shutdown.
    pub async fn run_until<F>(self, server: McpServer, shutdown: F) -> TransportResult<()>
    where
        F: Future<Output = TransportResult<()>>,
    {
        tokio::select! {
            biased;
            signal = shutdown => {
                signal?;
                info!("Shutdown signal received");
                Ok(())
            }
            result = self.run(server) => result,
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() -> TransportResult<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| TransportError::service(format!("failed to listen for Ctrl-C: {e}")))
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())
            .map_err(|e| TransportError::service(format!("failed to listen for SIGTERM: {e}")))?;

        tokio::select! {
            result = ctrl_c => result,
            _ = term.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await
    }
}
