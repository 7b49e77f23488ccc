/// Legacy SSE transport
///
/// A client opens `GET /mcp/sse`, learns its message endpoint from the first
/// event, then POSTs JSON-RPC messages to `/mcp/sse/message`. Responses are
/// pushed back as `message` events on the open stream.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::http::auth::log_rejection;
use crate::http::AppState;
use crate::mcp::protocol::{decode_value, JsonRpcResponse};

/// Events buffered per session before a slow client applies backpressure
const SESSION_BUFFER: usize = 32;

const SESSION_HEADER: &str = "mcp-session-id";

/// Open streaming sessions keyed by session id
#[derive(Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, mpsc::Sender<Event>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, mpsc::Sender<Event>>> {
        // The map holds no invariants a panicking holder could break
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new session and return its id with the event stream
    pub fn open(self: &Arc<Self>) -> (String, SessionStream) {
        let id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);

        let endpoint = Event::default()
            .event("endpoint")
            .data(format!("/mcp/sse/message?sessionId={}", id));
        // Fresh channel with spare capacity
        let _ = tx.try_send(endpoint);

        self.lock().insert(id.clone(), tx);
        info!(session_id = %id, "SSE session opened");

        let stream = SessionStream {
            id: id.clone(),
            inner: ReceiverStream::new(rx),
            manager: Arc::downgrade(self),
        };
        (id, stream)
    }

    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<Event>> {
        self.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Drop every session sender so open streams end
    pub fn close_all(&self) -> usize {
        let mut sessions = self.lock();
        let closed = sessions.len();
        sessions.clear();
        closed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Event stream of one session; dropping it unregisters the session
pub struct SessionStream {
    id: String,
    inner: ReceiverStream<Event>,
    manager: Weak<SessionManager>,
}

impl Stream for SessionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx).map(|event| event.map(Ok))
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            if manager.remove(&self.id) {
                info!(session_id = %self.id, "SSE session closed");
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub token: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// `GET /mcp/sse`
pub async fn sse_connect(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    // An unparseable query string simply carries no token
    let query = query.map(|Query(q)| q).unwrap_or_default();
    if !state.auth.check_stream(&headers, query.token.as_deref()) {
        log_rejection("sse_connect", peer.map(|ConnectInfo(addr)| addr), &headers);
        return error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let (_, stream) = state.sessions.open();
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// `POST /mcp/sse/message`
pub async fn sse_message(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    query: Result<Query<StreamQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    if !state.auth.check(&headers) {
        log_rejection("sse_message", peer.map(|ConnectInfo(addr)| addr), &headers);
        return error_body(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let query = query.map(|Query(q)| q).unwrap_or_default();
    let session_id = query.session_id.filter(|id| !id.is_empty()).or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    });
    let Some(session_id) = session_id else {
        return error_body(StatusCode::BAD_REQUEST, "Missing sessionId");
    };

    let Some(sender) = state.sessions.sender(&session_id) else {
        debug!(session_id = %session_id, "Message for unknown session");
        return error_body(StatusCode::NOT_FOUND, "Session not found");
    };

    let request = match body.map_err(|e| e.body_text()).and_then(|Json(value)| {
        decode_value(value).map_err(|e| e.to_string())
    }) {
        Ok(request) => request,
        Err(detail) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonRpcResponse::parse_error(detail)),
            )
                .into_response();
        }
    };

    let response = state.router.dispatch(request).await;
    let event = match Event::default().event("message").json_data(&response) {
        Ok(event) => event,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "Failed to encode SSE event");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::internal_error(
                    Value::Null,
                    "Internal server error".to_string(),
                    None,
                )),
            )
                .into_response();
        }
    };

    if sender.send(event).await.is_err() {
        state.sessions.remove(&session_id);
        return error_body(StatusCode::NOT_FOUND, "Session not found");
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "sessionId": session_id })),
    )
        .into_response()
}
