/// Documentation tools over the node store
///
/// These run synchronously against a `NodeStore`; the backend moves them
/// onto the blocking pool.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{normalize_node_type, normalize_package, NodeSummary};
use crate::storage::{NodeFilter, NodeStore};
use crate::tools::catalog::{documentation_tools, management_tools};
use crate::tools::{parse_args, ToolError};

const DEFAULT_LIST_LIMIT: u32 = 50;
const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Tools that take no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Parameters for `tools_documentation`
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ToolsDocumentationParams {
    /// Tool name to describe; omit for an overview of every tool
    #[serde(default)]
    pub topic: Option<String>,
}

/// Parameters for `list_nodes`
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNodesParams {
    /// Node group, e.g. trigger, transform, output, input, AI
    #[serde(default)]
    pub category: Option<String>,
    /// Package name, e.g. n8n-nodes-base or nodes-base
    #[serde(default)]
    pub package: Option<String>,
    /// Only trigger nodes (true) or only non-trigger nodes (false)
    #[serde(default)]
    pub is_trigger: Option<bool>,
    /// Maximum number of nodes to return (default 50)
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Parameters for `search_nodes`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchNodesParams {
    /// Search keyword
    pub query: String,
    /// Maximum number of results (default 20)
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Parameters for `get_node_info` and `get_node_essentials`
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetNodeParams {
    /// Node type, e.g. nodes-base.httpRequest or n8n-nodes-base.httpRequest
    pub node_type: String,
}

/// Run a documentation tool by name
pub fn dispatch<S: NodeStore + ?Sized>(
    store: &S,
    name: &str,
    args: Value,
) -> Result<Value, ToolError> {
    match name {
        "tools_documentation" => Ok(tools_documentation(parse_args(args)?)),
        "list_nodes" => list_nodes(store, parse_args(args)?),
        "search_nodes" => search_nodes(store, parse_args(args)?),
        "get_node_info" => get_node_info(store, parse_args(args)?),
        "get_node_essentials" => get_node_essentials(store, parse_args(args)?),
        "get_database_statistics" => get_database_statistics(store),
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

/// Describe one tool, or all of them
pub fn tools_documentation(params: ToolsDocumentationParams) -> Value {
    let all = documentation_tools().iter().chain(management_tools());

    match params.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => match all.clone().find(|tool| tool.name == topic) {
            Some(tool) => json!({
                "tool": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            }),
            None => json!({
                "error": format!("No documentation for '{}'", topic),
                "availableTools": all.map(|t| t.name.as_str()).collect::<Vec<_>>(),
            }),
        },
        None => json!({
            "overview": "Start with search_nodes or list_nodes to find a node, then get_node_essentials to configure it. Management tools appear once N8N_API_URL and N8N_API_KEY are set.",
            "tools": all
                .map(|tool| json!({ "name": tool.name, "description": tool.description }))
                .collect::<Vec<_>>(),
        }),
    }
}

pub fn list_nodes<S: NodeStore + ?Sized>(
    store: &S,
    params: ListNodesParams,
) -> Result<Value, ToolError> {
    let filter = NodeFilter {
        category: params.category,
        package: params.package.as_deref().map(normalize_package),
        is_trigger: params.is_trigger,
        limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT) as usize,
    };

    let nodes: Vec<NodeSummary> = store
        .list_nodes(&filter)?
        .iter()
        .map(NodeSummary::from)
        .collect();
    Ok(json!({
        "totalCount": nodes.len(),
        "nodes": nodes,
    }))
}

pub fn search_nodes<S: NodeStore + ?Sized>(
    store: &S,
    params: SearchNodesParams,
) -> Result<Value, ToolError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ToolError::InvalidArguments("query cannot be empty".to_string()));
    }

    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT) as usize;
    let results: Vec<NodeSummary> = store
        .search_nodes(query, limit)?
        .iter()
        .map(NodeSummary::from)
        .collect();

    Ok(json!({
        "query": query,
        "totalCount": results.len(),
        "results": results,
    }))
}

pub fn get_node_info<S: NodeStore + ?Sized>(
    store: &S,
    params: GetNodeParams,
) -> Result<Value, ToolError> {
    let node = store.get_node(&normalize_node_type(&params.node_type))?;
    Ok(serde_json::to_value(node)?)
}

pub fn get_node_essentials<S: NodeStore + ?Sized>(
    store: &S,
    params: GetNodeParams,
) -> Result<Value, ToolError> {
    let node = store.get_node(&normalize_node_type(&params.node_type))?;
    Ok(serde_json::to_value(node.essentials())?)
}

pub fn get_database_statistics<S: NodeStore + ?Sized>(store: &S) -> Result<Value, ToolError> {
    let stats = store.statistics()?;
    Ok(serde_json::to_value(stats)?)
}
