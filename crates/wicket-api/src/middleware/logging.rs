//! Request/response logging
//!
//! Emits one `[REQUEST]` line before the request is handled and one
//! `[RESPONSE]` line after it, both naming the caller as `username (ROLE)`
//! or `Anonymous`. The caller is read from the bearer token's claims; the
//! token is not checked against the database here.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::info;
use wicket_auth::{JwtValidator, TokenKind};

use crate::AppState;

/// Bodies larger than this are logged as unreadable and rejected
pub const MAX_LOGGED_BODY: usize = 2 * 1024 * 1024;

const MASKED_KEYS: &[&str] = &["password", "password2", "refresh", "access"];

pub fn error_type(status: StatusCode) -> &'static str {
    if status.is_client_error() {
        "Client Error"
    } else if status.is_server_error() {
        "Server Error"
    } else {
        "Success"
    }
}

/// "username (ROLE)" from a valid access token, otherwise "Anonymous"
pub fn user_label(validator: &JwtValidator, authorization: Option<&str>) -> String {
    authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| validator.validate_kind(token, TokenKind::Access).ok())
        .map(|claims| format!("{} ({})", claims.username, claims.role))
        .unwrap_or_else(|| "Anonymous".to_string())
}

/// Render a request body for the log, masking credentials
pub fn describe_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "{}".to_string();
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut value) => {
            if let Value::Object(map) = &mut value {
                for key in MASKED_KEYS {
                    if let Some(v) = map.get_mut(*key) {
                        *v = Value::String("********".to_string());
                    }
                }
            }
            value.to_string()
        }
        Err(_) => "[unreadable]".to_string(),
    }
}

pub async fn log_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user = user_label(
        &state.validator,
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    );

    let request = if matches!(method, Method::POST | Method::PUT | Method::PATCH) {
        let (parts, body) = request.into_parts();
        match to_bytes(body, MAX_LOGGED_BODY).await {
            Ok(bytes) => {
                info!(
                    "[REQUEST] {} {} | User: {} | Body: {}",
                    method,
                    path,
                    user,
                    describe_body(&bytes)
                );
                Request::from_parts(parts, Body::from(bytes))
            }
            Err(_) => {
                info!(
                    "[REQUEST] {} {} | User: {} | Body: [unreadable]",
                    method, path, user
                );
                let response = StatusCode::PAYLOAD_TOO_LARGE.into_response();
                log_response(&method, &path, &user, response.status());
                return response;
            }
        }
    } else {
        info!("[REQUEST] {} {} | User: {} | Body: ", method, path, user);
        request
    };

    let response = next.run(request).await;
    log_response(&method, &path, &user, response.status());
    response
}

fn log_response(method: &Method, path: &str, user: &str, status: StatusCode) {
    info!(
        "[RESPONSE] {} {} | User: {} | Status: {} | Error Type: {}",
        method,
        path,
        user,
        status.as_u16(),
        error_type(status)
    );
}
