/// HTTP surface tests: auth, codec errors, routing, CORS and the
/// informational endpoints
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};

use n8n_docs_mcp::tools::catalog::{documentation_tools, management_tools};

use crate::common::*;

#[cfg(test)]
mod http_endpoint_tests {
    use super::*;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_auth() {
        let response = send(&app(), get("/health")).await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "http-fixed");
        assert_eq!(body["memory"]["unit"], "MB");
        assert!(body["uptime"].is_u64());
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let app = app();
        for uri in ["/health", "/nowhere"] {
            let response = send(&app, get(uri)).await;
            assert_eq!(response.headers["x-content-type-options"], "nosniff");
            assert_eq!(response.headers["x-frame-options"], "DENY");
            assert_eq!(response.headers["x-xss-protection"], "1; mode=block");
            assert_eq!(
                response.headers["strict-transport-security"],
                "max-age=31536000; includeSubDomains"
            );
            assert_eq!(response.headers["access-control-allow-origin"], "*");
        }
    }

    #[tokio::test]
    async fn test_options_preflight_on_any_path() {
        let app = app();
        for uri in ["/mcp", "/health", "/definitely/not/a/route"] {
            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = send(&app, request).await;

            assert_eq!(response.status, StatusCode::NO_CONTENT, "{}", uri);
            assert!(response.bytes.is_empty());
            assert_eq!(response.headers["access-control-allow-methods"], "POST, GET, OPTIONS");
            assert_eq!(
                response.headers["access-control-allow-headers"],
                "Content-Type, Authorization, Accept"
            );
            assert_eq!(response.headers["access-control-max-age"], "86400");
        }
    }

    #[tokio::test]
    async fn test_configured_cors_origin() {
        let mut config = config();
        config.cors_origin = "https://claude.ai".to_string();
        let app = app_with(config, Arc::new(SwitchProbe::default()));

        let response = send(&app, get("/health")).await;
        assert_eq!(response.headers["access-control-allow-origin"], "https://claude.ai");
    }

    #[tokio::test]
    async fn test_mcp_rejects_missing_or_wrong_token() {
        let app = app();
        let body = rpc("initialize", json!({}), json!(1));

        for token in [None, Some("wrong"), Some("")] {
            let response = send(&app, mcp_request(body.clone(), token)).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.json(),
                json!({
                    "jsonrpc": "2.0",
                    "error": { "code": -32001, "message": "Unauthorized" },
                    "id": null
                })
            );
        }

        // rejected before the body is looked at
        let response = send(&app, mcp_request("{not json", Some("wrong"))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_raw_token_without_bearer_prefix() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp")
            .header("authorization", TOKEN)
            .body(Body::from(rpc("initialize", json!({}), json!(1))))
            .unwrap();

        let response = send(&app(), request).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let response = post_mcp(&app(), "{not json".to_string()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.json();
        assert_eq!(body["error"]["code"], -32700);
        assert_eq!(body["error"]["message"], "Parse error");
        assert!(body["error"]["data"].is_string());
        assert!(body["id"].is_null());
    }

    #[tokio::test]
    async fn test_null_body_is_parse_error() {
        let response = post_mcp(&app(), "null".to_string()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.json();
        assert_eq!(body["error"]["code"], -32700);
        assert!(body["id"].is_null());
    }

    #[tokio::test]
    async fn test_requests_without_string_method_keep_their_id() {
        let app = app();
        let cases = [
            (r#"{"jsonrpc":"2.0","id":5}"#, "Method not found: undefined"),
            (r#"{"method":7,"id":5}"#, "Method not found: 7"),
        ];
        for (body, message) in cases {
            let response = post_mcp(&app, body.to_string()).await;
            assert_eq!(response.status, StatusCode::OK, "{}", body);
            let json = response.json();
            assert_eq!(json["error"]["code"], -32601);
            assert_eq!(json["error"]["message"], message);
            assert_eq!(json["id"], 5);
        }

        let response = post_mcp(&app, "[]".to_string()).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_jsonrpc_tag_is_not_enforced() {
        let response = post_mcp(
            &app(),
            r#"{"jsonrpc":2,"method":"initialize","id":5}"#.to_string(),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["id"], 5);
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = post_mcp(&app(), rpc("foo/bar", json!({}), json!(11))).await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["error"]["code"], -32601);
        assert!(body["error"]["message"].as_str().unwrap().contains("foo/bar"));
        assert_eq!(body["id"], 11);
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_response_id_echoes_request_id() {
        let app = app();
        for id in [json!(1), json!("req-abc"), json!(-3.5), json!(null)] {
            let response = post_mcp(&app, rpc("initialize", json!({}), id.clone())).await;
            assert_eq!(response.json()["id"], id);
        }

        // absent id behaves like null
        let response = post_mcp(&app, r#"{"jsonrpc":"2.0","method":"initialize"}"#.to_string()).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.json()["id"].is_null());
    }

    #[tokio::test]
    async fn test_initialize_is_stateless() {
        let app = app();
        let first = post_mcp(&app, rpc("initialize", json!({}), json!(1))).await.json();
        let second = post_mcp(&app, rpc("initialize", json!({}), json!(1))).await.json();

        assert_eq!(first, second);
        assert_eq!(first["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(first["result"]["serverInfo"]["name"], "n8n-documentation-mcp");
        assert_eq!(
            first["result"]["capabilities"],
            json!({ "tools": {}, "resources": {} })
        );
    }

    #[tokio::test]
    async fn test_tools_list_tracks_management_configuration() {
        let probe = Arc::new(SwitchProbe::default());
        let app = app_with(config(), Arc::clone(&probe));
        let names = |body: Value| -> Vec<String> {
            body["result"]["tools"]
                .as_array()
                .unwrap()
                .iter()
                .map(|t| t["name"].as_str().unwrap().to_string())
                .collect()
        };

        let listed = names(post_mcp(&app, rpc("tools/list", json!({}), json!(1))).await.json());
        assert_eq!(listed.len(), documentation_tools().len());
        assert!(!listed.iter().any(|n| n.starts_with("n8n_")));

        probe.set(true);
        let listed = names(post_mcp(&app, rpc("tools/list", json!({}), json!(2))).await.json());
        assert_eq!(listed.len(), documentation_tools().len() + management_tools().len());
        assert!(listed.contains(&"n8n_list_workflows".to_string()));

        probe.set(false);
        let listed = names(post_mcp(&app, rpc("tools/list", json!({}), json!(3))).await.json());
        assert_eq!(listed.len(), documentation_tools().len());
    }

    #[tokio::test]
    async fn test_tool_descriptors_carry_input_schema() {
        let body = post_mcp(&app(), rpc("tools/list", json!({}), json!(1))).await.json();
        for tool in body["result"]["tools"].as_array().unwrap() {
            assert!(tool["description"].is_string());
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_tools_call_wraps_result_as_text() {
        let response = post_mcp(
            &app(),
            rpc("tools/call", json!({ "name": "fast", "arguments": { "x": 1 } }), json!("c1")),
        )
        .await;

        let body = response.json();
        assert_eq!(body["id"], "c1");
        let content = &body["result"]["content"][0];
        assert_eq!(content["type"], "text");
        let inner: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner, json!({ "tool": "fast", "args": { "x": 1 } }));
    }

    #[tokio::test]
    async fn test_tools_call_without_arguments_sends_empty_object() {
        let body = post_mcp(&app(), rpc("tools/call", json!({ "name": "fast" }), json!(1)))
            .await
            .json();
        let inner: Value =
            serde_json::from_str(body["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner["args"], json!({}));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_internal_error() {
        let response = post_mcp(
            &app(),
            rpc("tools/call", json!({ "name": "no_such_tool" }), json!(8)),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["error"]["code"], -32603);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Error executing tool no_such_tool:"));
        assert_eq!(body["id"], 8);
    }

    #[tokio::test]
    async fn test_missing_tool_name_fails_in_backend() {
        let body = post_mcp(&app(), rpc("tools/call", json!({}), json!(4))).await.json();
        assert_eq!(body["error"]["code"], -32603);
        assert!(body["error"]["message"].as_str().unwrap().starts_with("Error executing tool :"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_get_their_own_results() {
        let app = app();
        let slow = post_mcp(&app, rpc("tools/call", json!({ "name": "slow" }), json!("s")));
        let fast = post_mcp(&app, rpc("tools/call", json!({ "name": "fast" }), json!("f")));
        let (slow, fast) = tokio::join!(slow, fast);

        let text = |body: &Value| -> Value {
            serde_json::from_str(body["result"]["content"][0]["text"].as_str().unwrap()).unwrap()
        };
        let (slow, fast) = (slow.json(), fast.json());
        assert_eq!(slow["id"], "s");
        assert_eq!(text(&slow)["tool"], "slow");
        assert_eq!(fast["id"], "f");
        assert_eq!(text(&fast)["tool"], "fast");
    }

    #[tokio::test]
    async fn test_get_on_mcp_is_not_found() {
        let response = send(&app(), get("/mcp")).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.json()["message"], "Cannot GET /mcp");
    }

    #[tokio::test]
    async fn test_unknown_route_fallback() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/things")
            .body(Body::empty())
            .unwrap();
        let response = send(&app(), request).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.json(),
            json!({ "error": "Not found", "message": "Cannot DELETE /api/things" })
        );
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let mut config = config();
        config.git_commit = "abc1234".to_string();
        let app = app_with(config, Arc::new(SwitchProbe::default()));

        let body = send(&app, get("/version")).await.json();
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["commit"], "abc1234");
        assert_eq!(
            body["tools"].as_array().unwrap().len(),
            documentation_tools().len()
        );
        assert!(body["buildTime"].is_string());
    }

    #[tokio::test]
    async fn test_test_tools_endpoint() {
        let body = send(&app(), get("/test-tools")).await.json();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["hasData"], true);
        assert_eq!(body["toolCount"], documentation_tools().len());
    }

    #[tokio::test]
    async fn test_sse_routes_absent_when_disabled() {
        let app = app();
        let response = send(&app, get("/mcp/sse")).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.json()["error"], "Not found");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp/sse/message?sessionId=x")
            .header("authorization", format!("Bearer {}", TOKEN))
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(send(&app, request).await.status, StatusCode::NOT_FOUND);
    }
}
