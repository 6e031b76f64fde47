//! Task API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::error::{Result, TickError};
use crate::identity::Identity;
use crate::model::{Priority, TaskPatch, WebTask};
use crate::operations::tasks;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<WebTask>,
}

/// Create task request. `description` is accepted for older clients.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(alias = "description")]
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
}

/// Unwrap a JSON body, folding axum's rejection into our 400.
fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(v)| v)
        .map_err(|e| TickError::invalid_input(e.body_text()))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<TaskListResponse>> {
    let tasks = tasks::list(state.store.as_ref(), &identity.uid).await?;
    Ok(Json(TaskListResponse { tasks }))
}

/// POST /api/v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: std::result::Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WebTask>)> {
    let req = json_body(body)?;
    let task = tasks::create(state.store.as_ref(), &identity.uid, &req.title, req.priority).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<WebTask>> {
    let task = tasks::get(state.store.as_ref(), &identity.uid, &id).await?;
    Ok(Json(task))
}

/// PATCH /api/v1/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    body: std::result::Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<WebTask>> {
    let patch = json_body(body)?;
    let task = tasks::update(state.store.as_ref(), &identity.uid, &id, patch).await?;
    Ok(Json(task))
}

/// POST /api/v1/tasks/{id}/done
pub async fn mark_done(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<WebTask>> {
    let task = tasks::mark_done(state.store.as_ref(), &identity.uid, &id).await?;
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    tasks::delete(state.store.as_ref(), &identity.uid, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
