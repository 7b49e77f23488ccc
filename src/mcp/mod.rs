/// MCP protocol implementation
///
/// This module handles the Model Context Protocol messages: JSON-RPC
/// decoding, method routing and the bridge into the tool backend.

pub mod bridge;
pub mod protocol;
pub mod router;

// Re-export main types
pub use bridge::ToolBridge;
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use router::McpRouter;
