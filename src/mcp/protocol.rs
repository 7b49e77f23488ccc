/// MCP (Model Context Protocol) message structures and JSON-RPC handling
///
/// This module defines the JSON-RPC envelope MCP clients send over HTTP and
/// the response shapes we send back.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// MCP protocol version we support
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC version tag carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "n8n-documentation-mcp";

/// JSON-RPC 2.0 request message
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// JSON-RPC version tag as sent; not enforced
    pub jsonrpc: Option<Value>,
    /// The method to call (e.g., "tools/call"); `undefined` when absent
    pub method: String,
    /// Parameters for the method call
    pub params: Option<Value>,
    /// Correlation id; absent and `null` both echo back as `null`
    pub id: Value,
}

/// Method name used when a request carries none
pub const MISSING_METHOD: &str = "undefined";

/// Why a request body could not be turned into a `JsonRpcRequest`
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Request body is null")]
    Null,
}

/// Decode a fully buffered request body
pub fn decode_request(body: &[u8]) -> Result<JsonRpcRequest, DecodeError> {
    let value: Value = serde_json::from_slice(body)?;
    decode_value(value)
}

/// Decode an already parsed JSON document
///
/// Only `null` is refused. Any other document becomes a request: a missing
/// method reads as `undefined` and a non-string method as its JSON text, so
/// both end in "method not found" with the id preserved.
pub fn decode_value(value: Value) -> Result<JsonRpcRequest, DecodeError> {
    let mut object = match value {
        Value::Null => return Err(DecodeError::Null),
        Value::Object(object) => object,
        _ => Default::default(),
    };

    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        Some(other) => other.to_string(),
        None => MISSING_METHOD.to_string(),
    };

    Ok(JsonRpcRequest {
        jsonrpc: object.remove("jsonrpc"),
        method,
        params: object.remove("params"),
        id: object.remove("id").unwrap_or(Value::Null),
    })
}

/// JSON-RPC 2.0 response message
///
/// `payload` flattens to either a `result` or an `error` member, never both.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub payload: ResponsePayload,
    pub id: Value,
}

/// The mutually exclusive body of a response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

/// JSON-RPC error information
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC error codes used on the wire
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Method not found - The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Internal error - tool failure or unclassified handler failure
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Unauthorized - bearer credential missing or wrong (application-defined)
    pub const UNAUTHORIZED: i32 = -32001;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            payload: ResponsePayload::Result(result),
            id,
        }
    }

    /// Create a successful response from any serializable result
    pub fn success_from<T: Serialize>(id: Value, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::internal_error(id, format!("Failed to serialize result: {}", e), None),
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            payload: ResponsePayload::Error(JsonRpcError {
                code,
                message,
                data,
            }),
            id,
        }
    }

    /// Parse error; the id is never recoverable from an unparseable body
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::error(
            Value::Null,
            error_codes::PARSE_ERROR,
            "Parse error".to_string(),
            Some(Value::String(detail.into())),
        )
    }

    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(
            id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
            None,
        )
    }

    pub fn internal_error(id: Value, message: String, data: Option<Value>) -> Self {
        Self::error(id, error_codes::INTERNAL_ERROR, message, data)
    }

    pub fn unauthorized() -> Self {
        Self::error(
            Value::Null,
            error_codes::UNAUTHORIZED,
            "Unauthorized".to_string(),
            None,
        )
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            ResponsePayload::Result(value) => Some(value),
            ResponsePayload::Error(_) => None,
        }
    }

    pub fn error_info(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            ResponsePayload::Result(_) => None,
            ResponsePayload::Error(error) => Some(error),
        }
    }
}

/// Arguments of a `tools/call` request
///
/// Extracted leniently: a missing name becomes an empty name and fails in
/// the backend, missing arguments become `{}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: Value,
}

impl ToolCallParams {
    pub fn from_params(params: Option<&Value>) -> Self {
        let name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .filter(|a| !a.is_null())
            .cloned()
            .unwrap_or_else(|| json!({}));

        Self { name, arguments }
    }
}

/// MCP tool call result
#[derive(Debug, Serialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
}

/// Content returned by a tool
#[derive(Debug, Serialize)]
pub struct ToolContent {
    /// Type of content (always "text" here)
    #[serde(rename = "type")]
    pub content_type: &'static str,
    pub text: String,
}

impl ToolCallResult {
    /// A result holding a single text block
    pub fn text(text: String) -> Self {
        Self {
            content: vec![ToolContent {
                content_type: "text",
                text,
            }],
        }
    }
}

/// MCP initialization response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: &'static str,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Capabilities we advertise; each is an empty object on the wire
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    pub tools: EmptyCapability,
    pub resources: EmptyCapability,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyCapability {}

/// Information about this server
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl InitializeResult {
    pub fn current() -> Self {
        Self {
            protocol_version: MCP_VERSION,
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}
