/// HTTP transport for the MCP server
///
/// Builds the axum router (MCP endpoint, informational endpoints, optional
/// SSE transport) and wraps it in the security, CORS, logging and panic
/// layers.

pub mod auth;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod sse;

pub use auth::AuthGate;
pub use lifecycle::{LifecycleError, ServerLifecycle};
pub use sse::SessionManager;

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::{ConfigError, DeploymentMode, ServerConfig};
use crate::mcp::{JsonRpcResponse, McpRouter};
use crate::tools::{ManagementProbe, ToolExecutor};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub router: McpRouter,
    pub executor: Arc<dyn ToolExecutor>,
    pub auth: AuthGate,
    pub sessions: Arc<SessionManager>,
    pub started_at: Instant,
    pub started_at_utc: DateTime<Utc>,
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        executor: Arc<dyn ToolExecutor>,
        probe: Arc<dyn ManagementProbe>,
    ) -> Result<Self, ConfigError> {
        let cors_origin = HeaderValue::from_str(&config.cors_origin)
            .map_err(|_| ConfigError::InvalidCorsOrigin(config.cors_origin.clone()))?;

        Ok(Self {
            auth: AuthGate::new(&config.auth_token),
            router: McpRouter::new(Arc::clone(&executor), probe),
            executor,
            sessions: Arc::new(SessionManager::new()),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
            cors_origin,
            config: Arc::new(config),
        })
    }
}

/// Assemble the full application router
pub fn build_router(state: AppState) -> Router {
    let mode = state.config.mode;

    let mut router: Router<AppState> = Router::new()
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/test-tools", get(handlers::test_tools))
        .route("/mcp", post(handlers::mcp).fallback(handlers::not_found));

    if state.config.sse_enabled {
        router = router
            .route("/mcp/sse", get(sse::sse_connect).fallback(handlers::not_found))
            .route(
                "/mcp/sse/message",
                post(sse::sse_message).fallback(handlers::not_found),
            );
    }

    // Last layer added runs first
    router
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(move |payload: Box<dyn Any + Send + 'static>| {
            panic_response(mode, payload)
        }))
        .layer(axum::middleware::from_fn(middleware::access_log))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::cors))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .with_state(state)
}

/// Response for a handler that panicked
pub fn panic_response(mode: DeploymentMode, payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    let data = mode.is_development().then_some(Value::String(detail));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(JsonRpcResponse::internal_error(
            Value::Null,
            "Internal server error".to_string(),
            data,
        )),
    )
        .into_response()
}
