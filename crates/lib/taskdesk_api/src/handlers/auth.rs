//! Registration, login and token request handlers.

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use taskdesk_core::models::auth::User;

use crate::AppState;
use crate::error::{AppJson, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest};

/// `POST /register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, AppJson<User>)> {
    let created = state
        .auth
        .register(&body.username, &body.email, &body.password)
        .await?;
    Ok((StatusCode::CREATED, AppJson(created.user)))
}

/// `POST /login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<AppJson<LoginResponse>> {
    let tokens = state.auth.login(&body.email, &body.password).await?;
    Ok(AppJson(LoginResponse {
        token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// `POST /refresh`: exchange a refresh token for a new access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> AppResult<AppJson<RefreshResponse>> {
    let token = state.auth.refresh_access_token(&body.refresh_token).await?;
    Ok(AppJson(RefreshResponse { token }))
}

/// `POST /users/revoke`: revoke every refresh token of the caller.
pub async fn revoke_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<StatusCode> {
    state.auth.revoke_all_sessions(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
