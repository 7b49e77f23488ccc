/// n8n management tools
///
/// Thin wrappers over the n8n public REST API. They are only advertised
/// when `N8N_API_URL` and `N8N_API_KEY` are set.

use std::time::Duration;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::{parse_args, ManagementProbe, ToolError};

/// Upper bound for a single n8n API request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "X-N8N-API-KEY";

/// Connection settings for the n8n API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct N8nApiConfig {
    pub base_url: String,
    pub api_key: String,
}

impl N8nApiConfig {
    /// Read the settings from the environment; `None` unless both are non-empty
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("N8N_API_URL").ok()?;
        let api_key = std::env::var("N8N_API_KEY").ok()?;
        Self::new(&base_url, &api_key)
    }

    pub fn new(base_url: &str, api_key: &str) -> Option<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        let api_key = api_key.trim();
        if base_url.is_empty() || api_key.is_empty() {
            return None;
        }
        Some(Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Probe that re-reads the environment on every call
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvManagementProbe;

impl ManagementProbe for EnvManagementProbe {
    fn api_config(&self) -> Option<N8nApiConfig> {
        N8nApiConfig::from_env()
    }
}

/// Parameters for `n8n_list_workflows`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListWorkflowsParams {
    /// Maximum number of workflows to return
    #[serde(default)]
    pub limit: Option<u32>,
    /// Only active (true) or inactive (false) workflows
    #[serde(default)]
    pub active: Option<bool>,
}

/// Parameters for `n8n_get_workflow`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWorkflowParams {
    /// Workflow ID
    pub id: String,
}

/// Parameters for `n8n_list_executions`
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListExecutionsParams {
    /// Restrict to one workflow
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Maximum number of executions to return
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Client for one configured n8n instance
pub struct N8nClient {
    http: reqwest::Client,
    config: N8nApiConfig,
}

impl N8nClient {
    pub fn new(http: reqwest::Client, config: N8nApiConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ToolError> {
        tracing::debug!(path, "Calling n8n API");

        let response = self
            .http
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.config.api_key)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| ToolError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Upstream(format!("{} returned {}", path, status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::Upstream(format!("invalid JSON from {}: {}", path, e)))
    }

    pub async fn health_check(&self) -> Result<Value, ToolError> {
        let body = self.get("/healthz", &[]).await?;
        Ok(serde_json::json!({
            "status": "ok",
            "apiUrl": self.config.base_url,
            "response": body,
        }))
    }

    pub async fn list_workflows(&self, params: ListWorkflowsParams) -> Result<Value, ToolError> {
        let mut query = Vec::new();
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(active) = params.active {
            query.push(("active", active.to_string()));
        }
        self.get("/api/v1/workflows", &query).await
    }

    pub async fn get_workflow(&self, params: GetWorkflowParams) -> Result<Value, ToolError> {
        let id = params.id.trim();
        if id.is_empty() || id.contains('/') {
            return Err(ToolError::InvalidArguments(format!("invalid workflow id '{}'", params.id)));
        }
        self.get(&format!("/api/v1/workflows/{}", id), &[]).await
    }

    pub async fn list_executions(&self, params: ListExecutionsParams) -> Result<Value, ToolError> {
        let mut query = Vec::new();
        if let Some(workflow_id) = params.workflow_id {
            query.push(("workflowId", workflow_id));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        self.get("/api/v1/executions", &query).await
    }
}

/// Run a management tool by name
pub async fn dispatch(client: &N8nClient, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        "n8n_health_check" => client.health_check().await,
        "n8n_list_workflows" => client.list_workflows(parse_args(args)?).await,
        "n8n_get_workflow" => client.get_workflow(parse_args(args)?).await,
        "n8n_list_executions" => client.list_executions(parse_args(args)?).await,
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}
