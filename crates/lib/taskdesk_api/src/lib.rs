//! # taskdesk_api
//!
//! HTTP API library for Taskdesk.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use taskdesk_core::auth::{AccessTokenCodec, AuthError, AuthService, PasswordHasher};
use taskdesk_core::store::{LabelStore, RefreshTokenStore, TaskStore, UserStore};
use taskdesk_core::tasks::{LabelService, TaskService};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, health, labels, tasks, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub labels: LabelService,
}

impl AppState {
    /// Wire the services over a single store implementing every capability.
    pub fn new<S>(config: ApiConfig, store: Arc<S>) -> Result<Self, AuthError>
    where
        S: UserStore + RefreshTokenStore + TaskStore + LabelStore + 'static,
    {
        let auth = AuthService::new(
            store.clone(),
            store.clone(),
            AccessTokenCodec::new(config.jwt_secret.as_bytes()),
            PasswordHasher::new(config.bcrypt_cost),
            config.refresh_token_ttl,
        )?;
        Ok(Self {
            tasks: TaskService::new(store.clone(), store.clone()),
            labels: LabelService::new(store),
            auth,
            config,
        })
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/refresh", post(auth::refresh_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/users/revoke", post(auth::revoke_handler))
        .route(
            "/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route(
            "/tasks",
            get(tasks::list_tasks_handler).post(tasks::create_task_handler),
        )
        .route(
            "/tasks/{id}",
            get(tasks::get_task_handler)
                .put(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route(
            "/labels",
            get(labels::list_labels_handler).post(labels::create_label_handler),
        )
        .route(
            "/labels/{id}",
            get(labels::get_label_handler)
                .put(labels::update_label_handler)
                .delete(labels::delete_label_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
