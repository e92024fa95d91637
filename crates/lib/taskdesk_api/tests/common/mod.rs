//! Shared helpers for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode, header};
use serde_json::Value;
use taskdesk_api::config::ApiConfig;
use taskdesk_api::{AppState, router};
use taskdesk_core::store::MemoryStore;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret";

pub fn config() -> ApiConfig {
    ApiConfig {
        jwt_secret: SECRET.into(),
        refresh_token_ttl: chrono::Duration::hours(168),
        cors_origin: HeaderValue::from_static("http://localhost:5173"),
        request_timeout: Duration::from_secs(10),
        bcrypt_cost: 4,
    }
}

/// Router over a fresh in-memory store.
pub fn app() -> Router {
    let state = AppState::new(config(), Arc::new(MemoryStore::new())).expect("app state");
    router(state)
}

/// Send a request, returning status and JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    send_request(app, req.body(body).expect("request")).await
}

pub async fn send_request(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

/// Register and log in, returning (user id, access token, refresh token).
pub async fn signup(app: &Router, username: &str, email: &str, password: &str) -> (String, String, String) {
    let (status, user) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(serde_json::json!({ "username": username, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");

    let (status, tokens) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{tokens}");

    (
        user["id"].as_str().expect("id").to_string(),
        tokens["token"].as_str().expect("token").to_string(),
        tokens["refresh_token"].as_str().expect("refresh").to_string(),
    )
}
