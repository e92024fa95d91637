//! Account handlers. Callers may only act on their own account.

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use taskdesk_core::models::auth::User;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppError, AppJson, AppPath, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UpdateUserRequest;

fn ensure_self(user: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
    if user.user_id != id {
        return Err(AppError::Forbidden(
            "Cannot access another user's account".into(),
        ));
    }
    Ok(())
}

/// `GET /users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<AppJson<User>> {
    ensure_self(&user, id)?;
    Ok(AppJson(state.auth.get_user(id).await?))
}

/// `PUT /users/{id}`: replace username and email.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> AppResult<AppJson<User>> {
    ensure_self(&user, id)?;
    let updated = state
        .auth
        .update_profile(id, &body.username, &body.email)
        .await?;
    Ok(AppJson(updated))
}

/// `DELETE /users/{id}`: delete the account and everything it owns.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    ensure_self(&user, id)?;
    state.auth.delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
