//! n8n node documentation records
//!
//! A `NodeDoc` is the unit the documentation tools serve: one n8n node type
//! with its parameters and operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Package prefix used by the core n8n nodes
pub const CORE_PACKAGE: &str = "n8n-nodes-base";

/// Package prefix used by the LangChain-based AI nodes
pub const LANGCHAIN_PACKAGE: &str = "@n8n/n8n-nodes-langchain";

/// Full documentation for a single n8n node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDoc {
    /// Short node type, e.g. `nodes-base.httpRequest`
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    /// Node group as shown in the n8n editor (trigger, transform, output, ...)
    pub category: String,
    /// npm package the node ships in
    pub package: String,
    pub version: u32,
    pub is_trigger: bool,
    pub properties: Vec<NodeProperty>,
    pub operations: Vec<String>,
}

/// One configurable parameter of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub name: String,
    pub display_name: String,
    /// n8n parameter type (string, number, options, json, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: String,
}

/// Compact view of a node used in list and search results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub package: String,
    pub is_trigger: bool,
}

/// The handful of properties an agent needs to configure a node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEssentials {
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    pub required_properties: Vec<NodeProperty>,
    pub common_properties: Vec<NodeProperty>,
    pub operations: Vec<String>,
}

/// Optional properties kept in the essentials view
const COMMON_PROPERTY_LIMIT: usize = 5;

impl NodeDoc {
    /// Reduce the full documentation to required and most common properties
    pub fn essentials(&self) -> NodeEssentials {
        let (required, optional): (Vec<_>, Vec<_>) =
            self.properties.iter().cloned().partition(|p| p.required);

        NodeEssentials {
            node_type: self.node_type.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            required_properties: required,
            common_properties: optional.into_iter().take(COMMON_PROPERTY_LIMIT).collect(),
            operations: self.operations.clone(),
        }
    }
}

impl From<&NodeDoc> for NodeSummary {
    fn from(node: &NodeDoc) -> Self {
        Self {
            node_type: node.node_type.clone(),
            display_name: node.display_name.clone(),
            description: node.description.clone(),
            category: node.category.clone(),
            package: node.package.clone(),
            is_trigger: node.is_trigger,
        }
    }
}

/// Normalize a node type to the short form stored in the database
///
/// Accepts `n8n-nodes-base.httpRequest`, `nodes-base.httpRequest` and the
/// LangChain equivalents.
pub fn normalize_node_type(node_type: &str) -> String {
    let node_type = node_type.trim();

    if let Some(name) = node_type.strip_prefix("n8n-nodes-base.") {
        format!("nodes-base.{}", name)
    } else if let Some(name) = node_type.strip_prefix("@n8n/n8n-nodes-langchain.") {
        format!("nodes-langchain.{}", name)
    } else {
        node_type.to_string()
    }
}

/// Normalize a package filter to the full npm package name
pub fn normalize_package(package: &str) -> String {
    match package.trim() {
        "nodes-base" => CORE_PACKAGE.to_string(),
        "nodes-langchain" | "n8n-nodes-langchain" => LANGCHAIN_PACKAGE.to_string(),
        other => other.to_string(),
    }
}
