use crate::server::error::{InternalErrorDetail, ServerError, internal_error_response};
use crate::server::state::ServerState;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bearer token authentication middleware
///
/// Every route sits behind this, including the fallback.
pub async fn bearer_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .is_some_and(|token| state.is_valid_token(token));

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "Unauthorized request");
        return Err(ServerError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Extract the credentials of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively and must be followed by exactly
/// one space. The token itself may not contain whitespace, so padded or
/// multi-part values are refused rather than trimmed.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let well_formed = scheme.eq_ignore_ascii_case("bearer")
        && !token.is_empty()
        && !token.contains(char::is_whitespace);
    well_formed.then_some(token)
}

/// Catch-all for failed requests.
///
/// Logs every 500 with its detail, then strips the detail from the body in
/// production, where the client only gets `{}`.
pub async fn handle_errors(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    if response.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return response;
    }

    let detail = response
        .extensions()
        .get::<InternalErrorDetail>()
        .map(|d| d.0.as_str())
        .unwrap_or("unspecified internal error");
    tracing::error!(method = %method, path = %path, error = %detail, "Request failed");

    if state.config.environment.is_production() {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
    } else {
        response
    }
}

/// Turns a handler panic into a 500 that [`handle_errors`] can process.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    internal_error_response(format!("handler panicked: {message}"))
}

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Request ID stored in request extensions by [`request_id`].
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Access log middleware.
///
/// Production logs one terse line per request. Other modes also log the
/// request start, user agent and request id.
pub async fn log_requests(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    if state.config.environment.is_production() {
        let response = next.run(request).await;
        tracing::info!(
            method = %method,
            path = %uri.path(),
            status = %response.status().as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "Request completed"
        );
        return response;
    }

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        method = %method,
        uri = %uri,
        request_id = %request_id,
        "Request started"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        user_agent = %user_agent,
        request_id = %request_id,
        "Request completed"
    );

    response
}
