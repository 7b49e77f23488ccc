/// Built-in node catalog
///
/// A fresh database is seeded with the most commonly used n8n nodes so the
/// documentation tools answer out of the box.

use serde_json::{json, Value};

use crate::domain::{NodeDoc, NodeProperty, CORE_PACKAGE, LANGCHAIN_PACKAGE};
use crate::storage::{NodeStore, StorageError};

/// Seed the store with the built-in catalog if it holds no nodes yet
///
/// Returns the number of nodes inserted.
pub fn seed_if_empty<S: NodeStore + ?Sized>(store: &S) -> Result<usize, StorageError> {
    if store.count_nodes()? > 0 {
        return Ok(0);
    }

    let nodes = builtin_nodes();
    for node in &nodes {
        store.upsert_node(node)?;
    }

    tracing::info!(count = nodes.len(), "Seeded node catalog");
    Ok(nodes.len())
}

fn prop(
    name: &str,
    display_name: &str,
    kind: &str,
    required: bool,
    default: Option<Value>,
    description: &str,
) -> NodeProperty {
    NodeProperty {
        name: name.to_string(),
        display_name: display_name.to_string(),
        kind: kind.to_string(),
        required,
        default,
        description: description.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn node(
    node_type: &str,
    display_name: &str,
    description: &str,
    category: &str,
    package: &str,
    version: u32,
    is_trigger: bool,
    properties: Vec<NodeProperty>,
    operations: &[&str],
) -> NodeDoc {
    NodeDoc {
        node_type: node_type.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        package: package.to_string(),
        version,
        is_trigger,
        properties,
        operations: operations.iter().map(|op| op.to_string()).collect(),
    }
}

/// The nodes shipped with the server
pub fn builtin_nodes() -> Vec<NodeDoc> {
    vec![
        node(
            "nodes-base.httpRequest",
            "HTTP Request",
            "Makes an HTTP request and returns the response data",
            "output",
            CORE_PACKAGE,
            4,
            false,
            vec![
                prop("method", "Method", "options", true, Some(json!("GET")), "The request method to use"),
                prop("url", "URL", "string", true, Some(json!("")), "The URL to make the request to"),
                prop("authentication", "Authentication", "options", false, Some(json!("none")), "Credential type used to authenticate the request"),
                prop("sendQuery", "Send Query Parameters", "boolean", false, Some(json!(false)), "Whether the request has query parameters"),
                prop("sendHeaders", "Send Headers", "boolean", false, Some(json!(false)), "Whether the request has headers"),
                prop("sendBody", "Send Body", "boolean", false, Some(json!(false)), "Whether the request has a body"),
                prop("options", "Options", "collection", false, Some(json!({})), "Timeout, proxy, redirect and response settings"),
            ],
            &[],
        ),
        node(
            "nodes-base.webhook",
            "Webhook",
            "Starts the workflow when a webhook is called",
            "trigger",
            CORE_PACKAGE,
            2,
            true,
            vec![
                prop("httpMethod", "HTTP Method", "options", true, Some(json!("GET")), "The HTTP method to listen to"),
                prop("path", "Path", "string", true, Some(json!("")), "The path the webhook listens on"),
                prop("responseMode", "Respond", "options", false, Some(json!("onReceived")), "When and how to respond to the webhook"),
                prop("authentication", "Authentication", "options", false, Some(json!("none")), "The way to authenticate callers"),
            ],
            &[],
        ),
        node(
            "nodes-base.scheduleTrigger",
            "Schedule Trigger",
            "Triggers the workflow on a given schedule",
            "trigger",
            CORE_PACKAGE,
            1,
            true,
            vec![prop("rule", "Trigger Rules", "fixedCollection", true, Some(json!({"interval": [{}]})), "Intervals or cron expressions that fire the workflow")],
            &[],
        ),
        node(
            "nodes-base.manualTrigger",
            "Manual Trigger",
            "Runs the flow on clicking a button in n8n",
            "trigger",
            CORE_PACKAGE,
            1,
            true,
            vec![],
            &[],
        ),
        node(
            "nodes-base.set",
            "Edit Fields (Set)",
            "Modify, add, or remove item fields",
            "transform",
            CORE_PACKAGE,
            3,
            false,
            vec![
                prop("mode", "Mode", "options", true, Some(json!("manual")), "Map fields manually or with JSON"),
                prop("assignments", "Fields to Set", "assignmentCollection", false, Some(json!({})), "The fields to add or change"),
                prop("includeOtherFields", "Include Other Input Fields", "boolean", false, Some(json!(false)), "Whether to pass through unchanged fields"),
            ],
            &[],
        ),
        node(
            "nodes-base.code",
            "Code",
            "Run custom JavaScript or Python code",
            "transform",
            CORE_PACKAGE,
            2,
            false,
            vec![
                prop("mode", "Mode", "options", true, Some(json!("runOnceForAllItems")), "Run once for all items or once per item"),
                prop("language", "Language", "options", false, Some(json!("javaScript")), "The language of the code"),
                prop("jsCode", "JavaScript", "string", false, None, "The JavaScript code to execute"),
                prop("pythonCode", "Python", "string", false, None, "The Python code to execute"),
            ],
            &[],
        ),
        node(
            "nodes-base.if",
            "If",
            "Route items to different branches (true/false)",
            "transform",
            CORE_PACKAGE,
            2,
            false,
            vec![
                prop("conditions", "Conditions", "filter", true, Some(json!({})), "The conditions that decide the branch"),
                prop("looseTypeValidation", "Convert Types Where Required", "boolean", false, Some(json!(false)), "Whether to coerce values before comparing"),
            ],
            &[],
        ),
        node(
            "nodes-base.switch",
            "Switch",
            "Route items depending on defined expression or rules",
            "transform",
            CORE_PACKAGE,
            3,
            false,
            vec![
                prop("mode", "Mode", "options", true, Some(json!("rules")), "Route with rules or an expression"),
                prop("rules", "Routing Rules", "fixedCollection", false, Some(json!({})), "Rules evaluated in order"),
            ],
            &[],
        ),
        node(
            "nodes-base.merge",
            "Merge",
            "Merges data of multiple streams once data from both is available",
            "transform",
            CORE_PACKAGE,
            3,
            false,
            vec![
                prop("mode", "Mode", "options", true, Some(json!("append")), "How input data should be merged"),
                prop("joinMode", "Output Type", "options", false, None, "Which matches to keep when combining by fields"),
            ],
            &[],
        ),
        node(
            "nodes-base.slack",
            "Slack",
            "Consume the Slack API",
            "output",
            CORE_PACKAGE,
            2,
            false,
            vec![
                prop("resource", "Resource", "options", true, Some(json!("message")), "The Slack resource to operate on"),
                prop("operation", "Operation", "options", true, Some(json!("post")), "The operation to perform"),
                prop("channelId", "Channel", "resourceLocator", false, None, "The channel to send to"),
                prop("text", "Message Text", "string", false, None, "The message body"),
            ],
            &["message:post", "message:update", "message:delete", "channel:create", "channel:get", "user:info"],
        ),
        node(
            "nodes-base.googleSheets",
            "Google Sheets",
            "Read, update and write data to Google Sheets",
            "input",
            CORE_PACKAGE,
            4,
            false,
            vec![
                prop("resource", "Resource", "options", true, Some(json!("sheet")), "The Google Sheets resource"),
                prop("operation", "Operation", "options", true, Some(json!("read")), "The operation to perform"),
                prop("documentId", "Document", "resourceLocator", true, None, "The spreadsheet to use"),
                prop("sheetName", "Sheet", "resourceLocator", false, None, "The sheet within the document"),
            ],
            &["sheet:append", "sheet:appendOrUpdate", "sheet:clear", "sheet:delete", "sheet:read", "sheet:update"],
        ),
        node(
            "nodes-base.emailSend",
            "Send Email",
            "Sends an email using SMTP protocol",
            "output",
            CORE_PACKAGE,
            2,
            false,
            vec![
                prop("fromEmail", "From Email", "string", true, Some(json!("")), "Email address of the sender"),
                prop("toEmail", "To Email", "string", true, Some(json!("")), "Email address of the recipient"),
                prop("subject", "Subject", "string", false, Some(json!("")), "Subject line of the email"),
                prop("emailFormat", "Email Format", "options", false, Some(json!("text")), "Text, HTML or both"),
            ],
            &["send"],
        ),
        node(
            "nodes-langchain.agent",
            "AI Agent",
            "Generates an action plan and executes it using connected tools",
            "AI",
            LANGCHAIN_PACKAGE,
            1,
            false,
            vec![
                prop("promptType", "Source for Prompt", "options", true, Some(json!("auto")), "Take the prompt from the previous node or define it"),
                prop("text", "Prompt", "string", false, None, "The prompt for the agent"),
                prop("options", "Options", "collection", false, Some(json!({})), "System message and iteration limits"),
            ],
            &[],
        ),
        node(
            "nodes-langchain.chatTrigger",
            "Chat Trigger",
            "Runs the workflow when a chat message is received",
            "trigger",
            LANGCHAIN_PACKAGE,
            1,
            true,
            vec![prop("public", "Make Chat Publicly Available", "boolean", false, Some(json!(false)), "Whether the chat is reachable without n8n login")],
            &[],
        ),
    ]
}
