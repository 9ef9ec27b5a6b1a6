//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use bookmarks::server::{Environment, ServerConfig, ServerState, build_router};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const TOKEN: &str = "test-token";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        environment: Environment::Test,
        ..ServerConfig::with_token(TOKEN)
    }
}

pub fn test_app() -> Router {
    build_router(Arc::new(ServerState::new(test_config())))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body is not UTF-8")
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Request carrying the valid bearer token.
pub fn authed(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

/// Authorized JSON request.
pub fn authed_json(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header(CONTENT_TYPE, "application/json")
        .header(HOST, "localhost:8000")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn valid_payload() -> Value {
    serde_json::json!({
        "title": "Rust Book",
        "url": "https://doc.rust-lang.org/book/",
        "description": "The Rust Programming Language",
        "rating": 5,
    })
}

/// Create a bookmark and return its JSON representation.
pub async fn create(app: &Router, payload: &Value) -> Value {
    let response = send(app, authed_json(Method::POST, "/bookmarks/new", payload)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()
}
