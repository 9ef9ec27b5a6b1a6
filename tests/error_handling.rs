//! Validation messages, internal error shaping and response hardening.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, AUTHORIZATION, CONTENT_TYPE, ORIGIN,
};
use axum::http::{Method, Request, StatusCode};
use axum::routing::get;
use bookmarks::server::{
    Environment, ServerConfig, ServerState, api_routes, build_router, with_middleware,
};
use bookmarks::{Bookmark, BookmarkStore, StoreError};
use common::{TOKEN, authed, authed_json, send, test_app, test_config, valid_payload};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn payload_with(field: &str, value: Value) -> Value {
    let mut payload = valid_payload();
    payload[field] = value;
    payload
}

/// Authorized POST with a body sent exactly as given.
fn authed_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

fn app_with(config: ServerConfig) -> Router {
    build_router(Arc::new(ServerState::new(config)))
}

async fn assert_store_empty(app: &Router) {
    let listed = send(app, authed(Method::GET, "/bookmarks")).await;
    assert_eq!(listed.text(), "[]");
}

async fn create_status_and_text(app: &Router, payload: &Value) -> (StatusCode, String) {
    let response = send(app, authed_json(Method::POST, "/bookmarks/x", payload)).await;
    (response.status, response.text().to_string())
}

#[tokio::test]
async fn out_of_range_ratings_get_their_own_message() {
    let app = test_app();
    for rating in [json!(6), json!(-1), json!("7"), json!("five")] {
        let (status, text) = create_status_and_text(&app, &payload_with("rating", rating)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "Rating must be between 0 and 5.");
    }
}

#[tokio::test]
async fn overflowing_rating_literal_gets_the_rating_message() {
    let app = test_app();
    let body = r#"{"title":"t","url":"https://example.com","description":"d","rating":1e400}"#;
    let response = send(&app, authed_raw("/bookmarks", body)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Rating must be between 0 and 5.");
    assert_store_empty(&app).await;

    // Earlier rules still win over a non-finite rating.
    let body = r#"{"title":"","url":"https://example.com","description":"d","rating":1e400}"#;
    let response = send(&app, authed_raw("/bookmarks", body)).await;
    assert_eq!(response.text(), "Invalid data");
}

#[tokio::test]
async fn invalid_url_is_invalid_data() {
    let app = test_app();
    let (status, text) =
        create_status_and_text(&app, &payload_with("url", json!("not a url"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Invalid data");
}

#[tokio::test]
async fn empty_title_is_invalid_data() {
    let app = test_app();
    let (status, text) = create_status_and_text(&app, &payload_with("title", json!(""))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Invalid data");
}

#[tokio::test]
async fn missing_description_is_invalid_data() {
    let app = test_app();
    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("description");
    let (status, text) = create_status_and_text(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Invalid data");
}

#[tokio::test]
async fn earlier_rule_wins_over_rating() {
    let app = test_app();
    let payload = json!({ "title": "", "url": "nope", "description": "", "rating": 42 });
    let (status, text) = create_status_and_text(&app, &payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "Invalid data");
}

#[tokio::test]
async fn rejected_create_stores_nothing() {
    let app = test_app();
    create_status_and_text(&app, &payload_with("rating", json!(6))).await;
    let listed = send(&app, authed(Method::GET, "/bookmarks")).await;
    assert_eq!(listed.text(), "[]");
}

#[tokio::test]
async fn malformed_json_is_invalid_data() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/bookmarks")
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid data");
}

#[tokio::test]
async fn non_object_json_is_invalid_data() {
    let app = test_app();
    let response = send(&app, authed_json(Method::POST, "/bookmarks", &json!([1, 2]))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid data");
}

#[tokio::test]
async fn array_body_with_valid_values_is_invalid_data() {
    let app = test_app();
    for uri in ["/bookmarks", "/bookmarks/new"] {
        let response = send(
            &app,
            authed_json(
                Method::POST,
                uri,
                &json!(["t", "https://example.com", "d", 3]),
            ),
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.text(), "Invalid data");
    }
    assert_store_empty(&app).await;
}

#[tokio::test]
async fn scalar_and_null_bodies_are_invalid_data() {
    let app = test_app();
    for body in ["null", "3", r#""title""#, "true"] {
        let response = send(&app, authed_raw("/bookmarks", body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.text(), "Invalid data");
    }
    assert_store_empty(&app).await;
}

#[tokio::test]
async fn oversize_body_is_invalid_data() {
    let app = app_with(ServerConfig {
        max_body_size_kb: 1,
        ..test_config()
    });
    let payload = json!({
        "title": "t",
        "url": "https://example.com",
        "description": "x".repeat(4 * 1024),
        "rating": 3,
    });
    let response = send(&app, authed_json(Method::POST, "/bookmarks", &payload)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Invalid data");
    assert_store_empty(&app).await;

    // Bodies under the limit still go through.
    let response = send(&app, authed_json(Method::POST, "/bookmarks", &valid_payload())).await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn slow_requests_time_out_with_408() {
    let config = ServerConfig {
        timeout_secs: 1,
        ..test_config()
    };
    let routes = Router::new().route("/slow", get(slow));
    let app = with_middleware(routes, Arc::new(ServerState::new(config)));
    let response = send(&app, authed(Method::GET, "/slow")).await;
    assert_eq!(response.status, StatusCode::REQUEST_TIMEOUT);
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "done"
}

/// A store whose every operation fails.
struct BrokenStore;

impl BookmarkStore for BrokenStore {
    fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Err(StoreError::Poisoned)
    }
    fn find_by_id(&self, _id: &str) -> Result<Option<Bookmark>, StoreError> {
        Err(StoreError::Poisoned)
    }
    fn append(&self, _bookmark: Bookmark) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
    fn remove_by_id(&self, _id: &str) -> Result<bool, StoreError> {
        Err(StoreError::Poisoned)
    }
    fn len(&self) -> Result<usize, StoreError> {
        Err(StoreError::Poisoned)
    }
}

fn broken_app(environment: Environment) -> Router {
    let config = ServerConfig {
        environment,
        ..test_config()
    };
    let state = Arc::new(ServerState::with_store(config, Arc::new(BrokenStore)));
    with_middleware(api_routes(), state)
}

fn panicking_app(environment: Environment) -> Router {
    let config = ServerConfig {
        environment,
        ..test_config()
    };
    let state = Arc::new(ServerState::new(config));
    let routes = Router::new().route("/boom", get(boom));
    with_middleware(routes, state)
}

async fn boom() -> &'static str {
    panic!("kaboom")
}

#[tokio::test]
async fn store_failure_exposes_detail_outside_production() {
    let app = broken_app(Environment::Development);
    let response = send(&app, authed(Method::GET, "/bookmarks")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "store error: store lock poisoned" })
    );
}

#[tokio::test]
async fn store_failure_is_sanitized_in_production() {
    let app = broken_app(Environment::Production);
    for request in [
        authed(Method::GET, "/bookmarks"),
        authed(Method::GET, "/bookmarks/abc"),
        authed(Method::DELETE, "/bookmarks/abc"),
        authed_json(Method::POST, "/bookmarks", &valid_payload()),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json(), json!({}));
    }
}

#[tokio::test]
async fn panics_become_500_with_detail_outside_production() {
    let app = panicking_app(Environment::Test);
    let response = send(&app, authed(Method::GET, "/boom")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json(),
        json!({ "error": "handler panicked: kaboom" })
    );
}

#[tokio::test]
async fn panics_are_sanitized_in_production() {
    let app = panicking_app(Environment::Production);
    let response = send(&app, authed(Method::GET, "/boom")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({}));
}

#[tokio::test]
async fn client_errors_are_not_rewritten_in_production() {
    let config = ServerConfig {
        environment: Environment::Production,
        ..test_config()
    };
    let app = build_router(Arc::new(ServerState::new(config)));
    let response = send(&app, authed(Method::GET, "/bookmarks/missing")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Bookmark Not Found.");
}

#[tokio::test]
async fn security_headers_and_request_id_are_set() {
    let app = test_app();
    let response = send(&app, authed(Method::GET, "/bookmarks")).await;
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
    assert_eq!(response.header("x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(response.header("referrer-policy"), Some("no-referrer"));
    assert_eq!(response.header("x-dns-prefetch-control"), Some("off"));
    assert!(response.header("x-request-id").is_some());

    // Applied to rejected requests too.
    let denied = send(
        &app,
        Request::builder()
            .uri("/bookmarks")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(denied.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let app = test_app();
    let mut request = authed(Method::GET, "/bookmarks");
    request
        .headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());
    let response = send(&app, request).await;
    assert_eq!(response.header("x-request-id"), Some("req-123"));
}

fn cross_origin(method: Method) -> Request<Body> {
    let mut request = authed(method, "/bookmarks");
    request
        .headers_mut()
        .insert(ORIGIN, "https://app.example.com".parse().unwrap());
    request
}

#[tokio::test]
async fn cors_allows_any_origin_when_enabled() {
    let app = test_app();
    let response = send(&app, cross_origin(Method::GET)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn cors_preflight_is_answered_without_a_token() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/bookmarks")
        .header(ORIGIN, "https://app.example.com")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert!(response.status.is_success(), "{}", response.status);
    assert_eq!(
        response.headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).map(|v| v.as_bytes()),
        Some(&b"*"[..])
    );
}

#[tokio::test]
async fn cors_headers_are_absent_when_disabled() {
    let app = app_with(ServerConfig {
        enable_cors: false,
        ..test_config()
    });
    let response = send(&app, cross_origin(Method::GET)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), None);
}
