/// MCP tools exposed to clients
///
/// This module holds the tool catalog, the documentation and management tool
/// implementations, and the `ToolExecutor` capability the protocol layer
/// calls into.

pub mod backend;
pub mod catalog;
pub mod docs;
pub mod management;

pub use backend::DocsBackend;
pub use catalog::{ToolCatalog, ToolDefinition};
pub use management::{EnvManagementProbe, N8nApiConfig};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors a tool call can end in
///
/// The protocol layer reports all of them as JSON-RPC internal errors, with
/// the display text as the message.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("n8n API is not configured (set N8N_API_URL and N8N_API_KEY)")]
    ManagementNotConfigured,

    #[error("n8n API request failed: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Tool task failed: {0}")]
    Task(String),
}

impl From<StorageError> for ToolError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NodeNotFound { node_type } => ToolError::NodeNotFound(node_type),
            other => ToolError::Storage(other),
        }
    }
}

/// The capability the MCP layer needs from a tool backend
///
/// One instance is created at startup and shared by every request, so
/// implementations must tolerate concurrent calls.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute the named tool with the given arguments object
    async fn execute_tool(&self, name: &str, args: Value) -> Result<Value, ToolError>;
}

/// Reports whether the n8n management API is reachable with credentials
///
/// Consulted on every `tools/list` and management tool call, so a change in
/// configuration is visible without restarting.
pub trait ManagementProbe: Send + Sync {
    /// Current API settings, if both URL and key are present
    fn api_config(&self) -> Option<N8nApiConfig>;

    fn is_configured(&self) -> bool {
        self.api_config().is_some()
    }
}

/// Deserialize a tool's arguments object, treating `null` as `{}`
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
