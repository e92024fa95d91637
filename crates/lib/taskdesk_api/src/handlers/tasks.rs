//! Task request handlers.

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use taskdesk_core::models::tasks::Task;
use uuid::Uuid;

use crate::AppState;
use crate::error::{AppJson, AppPath, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::TaskRequest;

/// `POST /tasks`
pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<TaskRequest>,
) -> AppResult<(StatusCode, AppJson<Task>)> {
    let task = state.tasks.create(user.user_id, body.into()).await?;
    Ok((StatusCode::CREATED, AppJson(task)))
}

/// `GET /tasks`
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<AppJson<Vec<Task>>> {
    Ok(AppJson(state.tasks.list(user.user_id).await?))
}

/// `GET /tasks/{id}`
pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<AppJson<Task>> {
    Ok(AppJson(state.tasks.get(user.user_id, id).await?))
}

/// `PUT /tasks/{id}`: full replacement, label set included.
pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<TaskRequest>,
) -> AppResult<AppJson<Task>> {
    Ok(AppJson(
        state.tasks.update(user.user_id, id, body.into()).await?,
    ))
}

/// `DELETE /tasks/{id}`
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    state.tasks.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
