//! Authentication flows driven through the router.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::json;
use taskdesk_core::auth::AccessTokenCodec;
use uuid::Uuid;

use common::{SECRET, app, send, send_request, signup};

#[tokio::test]
async fn alice_end_to_end() {
    let app = app();

    let (status, user) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["username"], "alice");
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());
    let id = user["id"].as_str().unwrap().to_string();

    let (status, tokens) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = tokens["token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, &format!("/users/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        "/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["token"].as_str().unwrap().to_string();
    let (status, _) = send(&app, Method::GET, "/tasks", Some(&renewed), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/users/revoke", Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = send(
        &app,
        Method::POST,
        "/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    // Stateless access tokens outlive revocation.
    let (status, _) = send(&app, Method::GET, "/tasks", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() {
    let app = app();
    signup(&app, "alice", "alice@example.com", "pw123").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice2", "email": "alice@example.com", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    for payload in [
        json!({ "username": "bob", "email": "bob@example.com" }),
        json!({ "username": "bob", "email": "not-an-email", "password": "pw" }),
        json!({}),
    ] {
        let (status, _) = send(&app, Method::POST, "/register", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_request(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let app = app();
    signup(&app, "alice", "alice@example.com", "pw123").await;

    let (s1, wrong) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "nope" })),
    )
    .await;
    let (s2, unknown) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "pw123" })),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn refresh_with_unknown_token_is_unauthorized() {
    let (status, _) = send(
        &app(),
        Method::POST,
        "/refresh",
        None,
        Some(json!({ "refresh_token": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_rejects_missing_malformed_and_bad_tokens() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization header");

    for value in ["Basic abc", "Bearer", "Bearer ", "token", "Bearer a b", "Bearer  tok"] {
        let req = Request::builder()
            .uri("/tasks")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_request(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(body["message"], "Malformed authorization header");
    }

    let foreign = AccessTokenCodec::new(b"other-secret")
        .issue(Uuid::now_v7())
        .unwrap();
    let expired = AccessTokenCodec::new(SECRET.as_bytes())
        .issue_at(Uuid::now_v7(), Utc::now() - Duration::hours(25))
        .unwrap();
    for token in [foreign.as_str(), expired.as_str(), "garbage"] {
        let (status, body) = send(&app, Method::GET, "/tasks", Some(token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
    }
}

#[tokio::test]
async fn gate_accepts_lowercase_scheme() {
    let app = app();
    let (_, access, _) = signup(&app, "alice", "alice@example.com", "pw123").await;
    let req = Request::builder()
        .uri("/tasks")
        .header(header::AUTHORIZATION, format!("bearer {access}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_request(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn users_may_only_touch_their_own_account() {
    let app = app();
    let (alice_id, alice, _) = signup(&app, "alice", "alice@example.com", "pw123").await;
    let (bob_id, _, _) = signup(&app, "bob", "bob@example.com", "pw456").await;

    let uri = format!("/users/{bob_id}");
    let (status, _) = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "username": "x", "email": "x@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let own = format!("/users/{alice_id}");
    let (status, _) = send(
        &app,
        Method::PUT,
        &own,
        Some(&alice),
        Some(json!({ "username": "alice", "email": "bob@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, user) = send(
        &app,
        Method::PUT,
        &own,
        Some(&alice),
        Some(json!({ "username": "alicia", "email": "alicia@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "alicia");
}

#[tokio::test]
async fn deleted_account_loses_refresh_and_data() {
    let app = app();
    let (id, access, refresh) = signup(&app, "alice", "alice@example.com", "pw123").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/tasks",
        Some(&access),
        Some(json!({ "title": "t" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The gate is stateless: the token still passes, but nothing is left.
    let (status, tasks) = send(&app, Method::GET, "/tasks", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tasks, json!([]));
    let (status, _) = send(&app, Method::GET, &format!("/users/{id}"), Some(&access), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_store() {
    let (status, body) = send(&app(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "db_connected": true }));
}
