/// JSON-RPC method routing
///
/// Maps `initialize`, `tools/list` and `tools/call` onto their handlers. The
/// router holds no per-client state, so the same instance serves every
/// transport.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info};

use crate::mcp::bridge::ToolBridge;
use crate::mcp::protocol::{InitializeResult, JsonRpcRequest, JsonRpcResponse, ToolCallParams};
use crate::tools::{ManagementProbe, ToolCatalog, ToolExecutor};

#[derive(Clone)]
pub struct McpRouter {
    catalog: ToolCatalog,
    bridge: ToolBridge,
}

impl McpRouter {
    pub fn new(executor: Arc<dyn ToolExecutor>, probe: Arc<dyn ManagementProbe>) -> Self {
        Self {
            catalog: ToolCatalog::new(probe),
            bridge: ToolBridge::new(executor),
        }
    }

    /// Handle one request. A response is produced for every request,
    /// including those without an id.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let started = Instant::now();
        let JsonRpcRequest {
            method, params, id, ..
        } = request;
        debug!(method = %method, "MCP request received");

        let response = match method.as_str() {
            "initialize" => JsonRpcResponse::success_from(id, &InitializeResult::current()),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": self.catalog.list() })),
            "tools/call" => {
                let call = ToolCallParams::from_params(params.as_ref());
                self.bridge.call(id, call).await
            }
            _ => JsonRpcResponse::method_not_found(id, &method),
        };

        info!(
            method = %method,
            duration_ms = started.elapsed().as_millis() as u64,
            "MCP request completed"
        );
        response
    }
}
