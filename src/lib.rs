/// Public library interface for the n8n documentation MCP server
///
/// This module exports the server assembly and the public types used by the
/// binary and the tests.

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

// Internal modules
pub mod config;
pub mod domain;
pub mod http;
pub mod mcp;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use config::{Cli, ConfigError, DeploymentMode, ServerConfig};
pub use domain::*;
pub use http::{AppState, LifecycleError, ServerLifecycle};
pub use storage::{NodeStore, SqliteNodeStore, StorageError};
pub use tools::{DocsBackend, EnvManagementProbe, ManagementProbe, ToolError, ToolExecutor};

/// Errors that can stop the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The n8n documentation MCP server
///
/// One instance holds the long-lived documentation backend shared by every
/// request for the lifetime of the process.
pub struct DocsMcpServer {
    state: AppState,
}

impl DocsMcpServer {
    /// Open the node database and assemble the backend
    ///
    /// This will initialize the SQLite database with the required schema and
    /// the built-in node catalog if it doesn't already exist.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let db_path = config.database_path()?;
        tracing::info!("Initializing documentation server with database: {:?}", db_path);

        let store = tokio::task::spawn_blocking(move || SqliteNodeStore::new(db_path))
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        let probe: Arc<dyn ManagementProbe> = Arc::new(EnvManagementProbe);
        let backend = DocsBackend::new(Arc::new(store), Arc::clone(&probe));
        tracing::info!("Created persistent MCP server instance");

        Self::with_executor(config, Arc::new(backend), probe)
    }

    /// Assemble the server around any tool backend
    pub fn with_executor(
        config: ServerConfig,
        executor: Arc<dyn ToolExecutor>,
        probe: Arc<dyn ManagementProbe>,
    ) -> Result<Self, ServerError> {
        let state = AppState::new(config, executor, probe)?;
        Ok(Self { state })
    }

    /// The complete HTTP application
    pub fn router(&self) -> Router {
        http::build_router(self.state.clone())
    }

    /// Bind the listener without serving yet
    pub async fn bind(&self) -> Result<ServerLifecycle, ServerError> {
        let config = &self.state.config;
        let lifecycle = ServerLifecycle::bind(
            &config.host,
            config.port,
            self.router(),
            Arc::clone(&self.state.sessions),
            config.shutdown_grace,
        )
        .await?;
        Ok(lifecycle)
    }

    /// Serve HTTP until SIGINT/SIGTERM
    ///
    /// This method will block until the server is shut down or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let lifecycle = self.bind().await?;
        let addr = lifecycle.local_addr()?;
        let config = &self.state.config;

        tracing::info!("n8n MCP Fixed HTTP Server running on {}", addr);
        tracing::info!("Health check: http://localhost:{}/health", addr.port());
        tracing::info!("MCP endpoint: http://localhost:{}/mcp", addr.port());
        if config.sse_enabled {
            tracing::info!("SSE endpoint: http://localhost:{}/mcp/sse", addr.port());
        }
        tracing::info!(mode = config.mode.as_str(), "Press Ctrl+C to stop the server");

        lifecycle.run().await?;
        Ok(())
    }
}
