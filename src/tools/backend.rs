/// Default tool backend
///
/// Routes documentation tools to the node store (on the blocking pool) and
/// management tools to the n8n API, when configured.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::storage::{NodeStore, SqliteNodeStore};
use crate::tools::catalog::is_management_tool;
use crate::tools::management::{self, N8nClient};
use crate::tools::{docs, ManagementProbe, ToolError, ToolExecutor};

/// The long-lived backend shared by every request
pub struct DocsBackend<S = SqliteNodeStore> {
    store: Arc<S>,
    probe: Arc<dyn ManagementProbe>,
    http: reqwest::Client,
}

impl<S: NodeStore + 'static> DocsBackend<S> {
    pub fn new(store: Arc<S>, probe: Arc<dyn ManagementProbe>) -> Self {
        Self {
            store,
            probe,
            http: reqwest::Client::new(),
        }
    }

    async fn run_docs_tool(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let store = Arc::clone(&self.store);
        let name = name.to_string();

        tokio::task::spawn_blocking(move || docs::dispatch(store.as_ref(), &name, args))
            .await
            .map_err(|e| ToolError::Task(e.to_string()))?
    }

    async fn run_management_tool(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let config = self
            .probe
            .api_config()
            .ok_or(ToolError::ManagementNotConfigured)?;
        let client = N8nClient::new(self.http.clone(), config);
        management::dispatch(&client, name, args).await
    }
}

#[async_trait]
impl<S: NodeStore + 'static> ToolExecutor for DocsBackend<S> {
    async fn execute_tool(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        tracing::debug!(tool = name, "Executing tool");

        if is_management_tool(name) {
            self.run_management_tool(name, args).await
        } else {
            self.run_docs_tool(name, args).await
        }
    }
}
