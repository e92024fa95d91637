//! Label request handlers.

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use taskdesk_core::models::tasks::Label;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppJson, AppPath, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::LabelRequest;

/// `POST /labels`
pub async fn create_label_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<LabelRequest>,
) -> AppResult<(StatusCode, AppJson<Label>)> {
    let label = state
        .labels
        .create(user.user_id, &body.name, &body.color)
        .await?;
    Ok((StatusCode::CREATED, AppJson(label)))
}

/// `GET /labels`
pub async fn list_labels_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<AppJson<Vec<Label>>> {
    Ok(AppJson(state.labels.list(user.user_id).await?))
}

/// `GET /labels/{id}`
pub async fn get_label_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<AppJson<Label>> {
    Ok(AppJson(state.labels.get(user.user_id, id).await?))
}

/// `PUT /labels/{id}`
pub async fn update_label_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<LabelRequest>,
) -> AppResult<AppJson<Label>> {
    let label = state
        .labels
        .update(user.user_id, id, &body.name, &body.color)
        .await?;
    Ok(AppJson(label))
}

/// `DELETE /labels/{id}`: also detaches the label from tasks.
pub async fn delete_label_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    state.labels.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
