/// Server lifecycle: bind, serve, and graceful shutdown
///
/// The lifecycle owns the listener and the router. `run` serves until
/// SIGINT/SIGTERM, then stops accepting, closes SSE sessions and gives
/// in-flight requests a bounded grace period.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::http::SessionManager;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Port {port} is already in use")]
    AddrInUse { port: u16 },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),

    #[error("Server task failed: {0}")]
    Task(String),

    #[error("Shutdown did not complete within {0:?}")]
    ShutdownTimeout(Duration),
}

pub struct ServerLifecycle {
    listener: TcpListener,
    app: Router,
    sessions: Arc<SessionManager>,
    grace: Duration,
}

impl ServerLifecycle {
    pub async fn bind(
        host: &str,
        port: u16,
        app: Router,
        sessions: Arc<SessionManager>,
        grace: Duration,
    ) -> Result<Self, LifecycleError> {
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            if e.kind() == io::ErrorKind::AddrInUse {
                LifecycleError::AddrInUse { port }
            } else {
                LifecycleError::Bind {
                    addr: format!("{}:{}", host, port),
                    source: e,
                }
            }
        })?;

        Ok(Self {
            listener,
            app,
            sessions,
            grace,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, LifecycleError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until SIGINT or SIGTERM
    pub async fn run(self) -> Result<(), LifecycleError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `signal` completes, then shut down gracefully
    pub async fn run_until<F>(self, signal: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            app,
            sessions,
            grace,
        } = self;

        let (trigger, stopped) = oneshot::channel::<()>();
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, service)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await
        });

        tokio::pin!(signal);
        tokio::select! {
            joined = &mut server => {
                error!("Server stopped before a shutdown signal");
                return finished(joined);
            }
            _ = &mut signal => {
                info!("Shutdown signal received, stopping new connections");
            }
        }

        let closed = sessions.close_all();
        if closed > 0 {
            info!(sessions = closed, "Closed SSE sessions");
        }
        let _ = trigger.send(());

        match tokio::time::timeout(grace, &mut server).await {
            Ok(joined) => {
                finished(joined)?;
                info!("HTTP server shut down cleanly");
                Ok(())
            }
            Err(_) => {
                warn!(grace_secs = grace.as_secs_f64(), "Forcing shutdown after grace period");
                server.abort();
                Err(LifecycleError::ShutdownTimeout(grace))
            }
        }
    }
}

fn finished(joined: Result<io::Result<()>, JoinError>) -> Result<(), LifecycleError> {
    joined.map_err(|e| LifecycleError::Task(e.to_string()))??;
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
