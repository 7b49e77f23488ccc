/// SSE transport tests: connect, endpoint discovery, message round trip
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::*;

fn sse_app() -> Router {
    let mut config = config();
    config.sse_enabled = true;
    app_with(config, Arc::new(SwitchProbe::default()))
}

fn message_request(uri: &str, body: impl Into<Body>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(body.into()).unwrap()
}

/// Read the next data frame of an SSE body as text
async fn next_event(body: &mut Body) -> String {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("event arrives in time")
            .expect("stream still open")
            .expect("frame is readable");
        if let Ok(data) = frame.into_data() {
            return String::from_utf8(data.to_vec()).unwrap();
        }
    }
}

fn data_line(event: &str) -> &str {
    event
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .expect("event has data")
}

#[cfg(test)]
mod sse_transport_tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_requires_auth() {
        let request = Request::builder().uri("/mcp/sse").body(Body::empty()).unwrap();
        let response = send(&sse_app(), request).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_unparseable_query_is_still_unauthorized() {
        let app = sse_app();
        let connect = Request::builder()
            .uri("/mcp/sse?token=a&token=b")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, connect).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({ "error": "Unauthorized" }));

        let message = message_request("/mcp/sse/message?sessionId=a&sessionId=b", "{}", None);
        let response = send(&app, message).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({ "error": "Unauthorized" }));

        // authorized, but the duplicated sessionId cannot be read
        let message = message_request(
            "/mcp/sse/message?sessionId=a&sessionId=b",
            rpc("initialize", json!({}), json!(1)),
            Some(TOKEN),
        );
        let response = send(&app, message).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json(), json!({ "error": "Missing sessionId" }));
    }

    #[tokio::test]
    async fn test_message_round_trip() {
        let app = sse_app();
        let connect = Request::builder()
            .uri(format!("/mcp/sse?token={}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(connect).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");

        let mut stream = response.into_body();
        let endpoint = next_event(&mut stream).await;
        assert!(endpoint.contains("event: endpoint"));
        let path = data_line(&endpoint).to_string();
        assert!(path.starts_with("/mcp/sse/message?sessionId="));
        let session_id = path.trim_start_matches("/mcp/sse/message?sessionId=").to_string();

        let accepted = send(
            &app,
            message_request(&path, rpc("initialize", json!({}), json!(77)), Some(TOKEN)),
        )
        .await;
        assert_eq!(accepted.status, StatusCode::ACCEPTED);
        assert_eq!(
            accepted.json(),
            json!({ "status": "accepted", "sessionId": session_id })
        );

        let message = next_event(&mut stream).await;
        assert!(message.contains("event: message"));
        let payload: Value = serde_json::from_str(data_line(&message)).unwrap();
        assert_eq!(payload["id"], 77);
        assert_eq!(payload["result"]["protocolVersion"], "2024-11-05");
    }

    #[tokio::test]
    async fn test_session_header_is_accepted() {
        let app = sse_app();
        let connect = Request::builder()
            .uri("/mcp/sse")
            .header("authorization", format!("Bearer {}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let mut stream = app.clone().oneshot(connect).await.unwrap().into_body();
        let endpoint = next_event(&mut stream).await;
        let session_id = data_line(&endpoint)
            .trim_start_matches("/mcp/sse/message?sessionId=")
            .to_string();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/mcp/sse/message")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", TOKEN))
            .header("mcp-session-id", session_id.as_str())
            .body(Body::from(rpc("foo/bar", json!({}), json!(1))))
            .unwrap();
        assert_eq!(send(&app, request).await.status, StatusCode::ACCEPTED);

        let message = next_event(&mut stream).await;
        let payload: Value = serde_json::from_str(data_line(&message)).unwrap();
        assert_eq!(payload["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_message_errors() {
        let app = sse_app();
        let body = rpc("initialize", json!({}), json!(1));

        let unauthorized = send(
            &app,
            message_request("/mcp/sse/message?sessionId=abc", body.clone(), Some("nope")),
        )
        .await;
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);

        // the query token only applies to the stream connection
        let query_only = send(
            &app,
            message_request(
                &format!("/mcp/sse/message?sessionId=abc&token={}", TOKEN),
                body.clone(),
                None,
            ),
        )
        .await;
        assert_eq!(query_only.status, StatusCode::UNAUTHORIZED);

        let missing = send(&app, message_request("/mcp/sse/message", body.clone(), Some(TOKEN))).await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);

        let unknown = send(
            &app,
            message_request("/mcp/sse/message?sessionId=abc", body, Some(TOKEN)),
        )
        .await;
        assert_eq!(unknown.status, StatusCode::NOT_FOUND);
        assert_eq!(unknown.json(), json!({ "error": "Session not found" }));
    }

    #[tokio::test]
    async fn test_malformed_message_body() {
        let app = sse_app();
        let connect = Request::builder()
            .uri(format!("/mcp/sse?token={}", TOKEN))
            .body(Body::empty())
            .unwrap();
        let mut stream = app.clone().oneshot(connect).await.unwrap().into_body();
        let path = data_line(&next_event(&mut stream).await).to_string();

        let response = send(&app, message_request(&path, "{not json", Some(TOKEN))).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.json();
        assert_eq!(body["error"]["code"], -32700);
        assert!(body["id"].is_null());
    }
}
