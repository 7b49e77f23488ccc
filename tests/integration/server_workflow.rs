/// End-to-end tests against the real SQLite-backed documentation backend
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use n8n_docs_mcp::*;

use crate::common::{post_mcp, rpc, send, TOKEN};

async fn server_at(path: PathBuf) -> DocsMcpServer {
    let mut config = ServerConfig::new(TOKEN);
    config.database = Some(path);
    DocsMcpServer::new(config).await.expect("Failed to create server")
}

fn tool_text(body: &Value) -> Value {
    let text = body["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text content in {}", body));
    serde_json::from_str(text).unwrap()
}

#[cfg(test)]
mod server_workflow_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_then_essentials_workflow() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let app = server_at(dir.path().join("nodes.db")).await.router();

        let search = post_mcp(
            &app,
            rpc(
                "tools/call",
                json!({ "name": "search_nodes", "arguments": { "query": "slack" } }),
                json!(1),
            ),
        )
        .await
        .json();
        let found = tool_text(&search);
        assert_eq!(found["results"][0]["nodeType"], "nodes-base.slack");

        let essentials = post_mcp(
            &app,
            rpc(
                "tools/call",
                json!({
                    "name": "get_node_essentials",
                    "arguments": { "nodeType": "n8n-nodes-base.httpRequest" }
                }),
                json!(2),
            ),
        )
        .await
        .json();
        let node = tool_text(&essentials);
        assert_eq!(node["displayName"], "HTTP Request");
        assert!(node["commonProperties"].as_array().unwrap().len() <= 5);
    }

    #[tokio::test]
    async fn test_unknown_node_reports_tool_error() {
        let dir = TempDir::new().unwrap();
        let app = server_at(dir.path().join("nodes.db")).await.router();

        let body = post_mcp(
            &app,
            rpc(
                "tools/call",
                json!({ "name": "get_node_info", "arguments": { "nodeType": "nodes-base.nope" } }),
                json!("n"),
            ),
        )
        .await
        .json();

        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(
            body["error"]["message"],
            "Error executing tool get_node_info: Node not found: nodes-base.nope"
        );
    }

    #[tokio::test]
    async fn test_test_tools_against_real_backend() {
        let dir = TempDir::new().unwrap();
        let app = server_at(dir.path().join("nodes.db")).await.router();

        let request = axum::http::Request::builder()
            .uri("/test-tools")
            .body(axum::body::Body::empty())
            .unwrap();
        let body = send(&app, request).await.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["hasData"], true);
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("nodes.db");

        let first = server_at(db_path.clone()).await;
        let stats = |app: axum::Router| async move {
            let body = post_mcp(
                &app,
                rpc("tools/call", json!({ "name": "get_database_statistics" }), json!(1)),
            )
            .await
            .json();
            tool_text(&body)["totalNodes"].as_u64().unwrap()
        };
        let before = stats(first.router()).await;
        drop(first);

        // Reopening must not seed a second copy
        let second = server_at(db_path).await;
        assert_eq!(stats(second.router()).await, before);
    }

    #[tokio::test]
    async fn test_server_binds_ephemeral_port() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::new(TOKEN);
        config.host = "127.0.0.1".to_string();
        config.port = 0;
        config.database = Some(dir.path().join("nodes.db"));

        let server = DocsMcpServer::new(config).await.unwrap();
        let lifecycle = server.bind().await.unwrap();
        let addr = lifecycle.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(lifecycle.run_until(async {
            let _ = stopped.await;
        }));

        let health: Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        stop.send(()).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }
}
