/// Bearer token gate shared by the MCP endpoints
///
/// The gate is stateless: every request is checked against the configured
/// secret and nothing is remembered between attempts.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;
use tracing::warn;

#[derive(Clone)]
pub struct AuthGate {
    secret: Arc<str>,
}

impl AuthGate {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }

    /// Check the `Authorization` header
    pub fn check(&self, headers: &HeaderMap) -> bool {
        self.matches(header_token(headers))
    }

    /// Check a stream connection: the header wins, the `token` query
    /// parameter is used only when no header credential is present
    pub fn check_stream(&self, headers: &HeaderMap, query_token: Option<&str>) -> bool {
        let token = header_token(headers)
            .filter(|t| !t.is_empty())
            .or(query_token);
        self.matches(token)
    }

    fn matches(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(token) => token.as_bytes().ct_eq(self.secret.as_bytes()).into(),
            None => false,
        }
    }
}

/// Token carried by an `Authorization` header value, with any `Bearer `
/// prefix removed
pub fn extract_token(value: &str) -> &str {
    value.strip_prefix("Bearer ").unwrap_or(value)
}

fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(extract_token)
}

/// Record a rejected request without the presented credential
pub fn log_rejection(context: &str, peer: Option<SocketAddr>, headers: &HeaderMap) {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown");
    let ip = peer
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    warn!(context, ip = %ip, user_agent, "Authentication failed");
}
