/// HTTP route handlers
///
/// `POST /mcp` is the MCP endpoint; the others are informational and need
/// no credential.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, error, info};

use crate::http::auth::log_rejection;
use crate::http::AppState;
use crate::mcp::protocol::{decode_request, JsonRpcResponse};
use crate::tools::catalog::documentation_tools;

/// Largest request body `/mcp` will buffer
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
    pub version: &'static str,
    pub uptime: u64,
    pub memory: MemoryUsage,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
    pub unit: &'static str,
}

impl MemoryUsage {
    /// Resident memory of this process against total host memory
    fn sample() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let used = match sysinfo::get_current_pid() {
            Ok(pid) => {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            Err(_) => 0,
        };

        Self {
            used: (used + BYTES_PER_MB / 2) / BYTES_PER_MB,
            total: (system.total_memory() + BYTES_PER_MB / 2) / BYTES_PER_MB,
            unit: "MB",
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: "http-fixed",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        memory: MemoryUsage::sample(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn version(State(state): State<AppState>) -> Json<Value> {
    let tools: Vec<&str> = documentation_tools().iter().map(|t| t.name.as_str()).collect();
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "buildTime": state.started_at_utc.to_rfc3339(),
        "tools": tools,
        "commit": state.config.git_commit,
    }))
}

/// Smoke test of the backend; always answers 200
pub async fn test_tools(State(state): State<AppState>) -> Json<Value> {
    let outcome = state
        .executor
        .execute_tool(
            "get_node_essentials",
            json!({ "nodeType": "nodes-base.httpRequest" }),
        )
        .await;

    match outcome {
        Ok(result) => Json(json!({
            "status": "ok",
            "hasData": !result.is_null(),
            "toolCount": documentation_tools().len(),
        })),
        Err(e) => Json(json!({
            "status": "error",
            "message": e.to_string(),
        })),
    }
}

/// `POST /mcp`: one JSON-RPC message per request body
pub async fn mcp(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let started = Instant::now();

    if !state.auth.check(&headers) {
        log_rejection("mcp", peer.map(|ConnectInfo(addr)| addr), &headers);
        return (StatusCode::UNAUTHORIZED, Json(JsonRpcResponse::unauthorized())).into_response();
    }

    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            let detail = state
                .config
                .mode
                .is_development()
                .then(|| Value::String(e.to_string()));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::internal_error(
                    Value::Null,
                    "Internal server error".to_string(),
                    detail,
                )),
            )
                .into_response();
        }
    };

    let request = match decode_request(&bytes) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Rejected malformed JSON-RPC body");
            return (StatusCode::BAD_REQUEST, Json(JsonRpcResponse::parse_error(e.to_string())))
                .into_response();
        }
    };

    let method = request.method.clone();
    let response = state.router.dispatch(request).await;
    debug!(
        method = %method,
        total_ms = started.elapsed().as_millis() as u64,
        "Sent JSON-RPC response"
    );

    Json(response).into_response()
}

pub async fn not_found(method: Method, uri: Uri) -> Response {
    info!(method = %method, path = uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": format!("Cannot {} {}", method, uri.path()),
        })),
    )
        .into_response()
}
