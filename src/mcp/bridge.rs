/// Tool execution bridge
///
/// Turns a `tools/call` into a backend invocation and wraps whatever comes
/// back into an MCP content block or a JSON-RPC internal error.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::mcp::protocol::{JsonRpcResponse, ToolCallParams, ToolCallResult};
use crate::tools::ToolExecutor;

#[derive(Clone)]
pub struct ToolBridge {
    executor: Arc<dyn ToolExecutor>,
}

impl ToolBridge {
    pub fn new(executor: Arc<dyn ToolExecutor>) -> Self {
        Self { executor }
    }

    /// Execute one tool call; never fails and never unwinds
    pub async fn call(&self, id: Value, params: ToolCallParams) -> JsonRpcResponse {
        let ToolCallParams { name, arguments } = params;
        debug!(tool = %name, "Calling tool");

        let outcome = AssertUnwindSafe(self.executor.execute_tool(&name, arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => match serde_json::to_string_pretty(&result) {
                Ok(text) => JsonRpcResponse::success_from(id, &ToolCallResult::text(text)),
                Err(e) => tool_failure(id, &name, &e),
            },
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                tool_failure(id, &name, &e)
            }
            Err(_) => {
                error!(tool = %name, "Tool panicked");
                tool_failure(id, &name, &"tool panicked")
            }
        }
    }
}

fn tool_failure(id: Value, name: &str, error: &dyn std::fmt::Display) -> JsonRpcResponse {
    JsonRpcResponse::internal_error(id, format!("Error executing tool {}: {}", name, error), None)
}
