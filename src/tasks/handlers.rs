use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::repo_types::Task;
use super::services;
use crate::{
    auth::AuthUser,
    error::{AppJson, AppResult},
    state::AppState,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:id", patch(update_task).delete(delete_task))
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(services::list(&state, user_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = services::create(&state, user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateTaskRequest>,
) -> AppResult<Json<Task>> {
    let id = services::parse_task_id(&id)?;
    Ok(Json(services::update(&state, user_id, id, payload).await?))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = services::parse_task_id(&id)?;
    services::delete(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
