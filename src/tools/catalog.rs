/// Tool descriptors advertised through `tools/list`
///
/// Input schemas are generated from the argument structs with schemars, so
/// the advertised schema and the deserializer cannot drift apart.

use std::sync::{Arc, OnceLock};

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{json, Value};

use crate::tools::docs::{
    GetNodeParams, ListNodesParams, NoParams, SearchNodesParams, ToolsDocumentationParams,
};
use crate::tools::management::{GetWorkflowParams, ListExecutionsParams, ListWorkflowsParams};
use crate::tools::ManagementProbe;

/// MCP tool definition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new<T: JsonSchema>(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: schema_of::<T>(),
        }
    }
}

/// Generate an inline draft-07 schema without the `$schema`/`title` noise
fn schema_of<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();

    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(object) = value.as_object_mut() {
        object.remove("title");
    }
    value
}

/// Documentation tools, always listed
pub fn documentation_tools() -> &'static [ToolDefinition] {
    static TOOLS: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    TOOLS.get_or_init(|| {
        vec![
            ToolDefinition::new::<ToolsDocumentationParams>(
                "tools_documentation",
                "Get documentation for the available tools. Call without a topic for an overview.",
            ),
            ToolDefinition::new::<ListNodesParams>(
                "list_nodes",
                "List n8n nodes with optional filters by category, package or trigger flag.",
            ),
            ToolDefinition::new::<SearchNodesParams>(
                "search_nodes",
                "Search nodes by keyword across type, display name and description.",
            ),
            ToolDefinition::new::<GetNodeParams>(
                "get_node_info",
                "Get the full documentation of a node including every property.",
            ),
            ToolDefinition::new::<GetNodeParams>(
                "get_node_essentials",
                "Get the required and most common properties of a node. Prefer this over get_node_info.",
            ),
            ToolDefinition::new::<NoParams>(
                "get_database_statistics",
                "Get node counts by category and package.",
            ),
        ]
    })
}

/// n8n management API tools, listed only when the API is configured
pub fn management_tools() -> &'static [ToolDefinition] {
    static TOOLS: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    TOOLS.get_or_init(|| {
        vec![
            ToolDefinition::new::<NoParams>(
                "n8n_health_check",
                "Check connectivity to the configured n8n instance.",
            ),
            ToolDefinition::new::<ListWorkflowsParams>(
                "n8n_list_workflows",
                "List workflows on the configured n8n instance.",
            ),
            ToolDefinition::new::<GetWorkflowParams>(
                "n8n_get_workflow",
                "Get a workflow by ID from the configured n8n instance.",
            ),
            ToolDefinition::new::<ListExecutionsParams>(
                "n8n_list_executions",
                "List recent workflow executions on the configured n8n instance.",
            ),
        ]
    })
}

/// Whether `name` is one of the management tools
pub fn is_management_tool(name: &str) -> bool {
    management_tools().iter().any(|tool| tool.name == name)
}

/// The catalog served by `tools/list`
#[derive(Clone)]
pub struct ToolCatalog {
    probe: Arc<dyn ManagementProbe>,
}

impl ToolCatalog {
    pub fn new(probe: Arc<dyn ManagementProbe>) -> Self {
        Self { probe }
    }

    /// Base catalog first, management tools appended when configured
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut tools = documentation_tools().to_vec();
        if self.probe.is_configured() {
            tools.extend_from_slice(management_tools());
        }
        tools
    }
}
