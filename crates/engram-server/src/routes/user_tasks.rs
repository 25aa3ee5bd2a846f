//! User task CRUD and soft-delete endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::delete, routing::get, routing::post};
use engram_domain::entities::UserTask;
use engram_domain::error::Error;
use serde::Deserialize;

use crate::state::ServerState;

/// Routes under `/api/v1/tasks`.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/tasks", post(create_task).get(list_tasks))
        .route("/api/v1/tasks/{task_id}", get(get_task))
        .route("/api/v1/tasks/{task_id}/soft_delete", post(soft_delete))
        .route("/api/v1/tasks/{task_id}/restore", post(restore))
        .route("/api/v1/tasks/{task_id}/permanent", delete(permanent_delete))
}

#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    user_id: String,
    task_id: String,
    title: String,
    #[serde(default)]
    label_color: Option<String>,
    #[serde(default)]
    is_agent_task: bool,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct UserScope {
    user_id: String,
    #[serde(default)]
    include_archived: bool,
}

fn error_response(e: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let (status, code) = match e {
        Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NO_DATA_FOUND"),
        Error::InvalidArgument { .. } => (StatusCode::BAD_REQUEST, "INVALID_PARAM_FORMAT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error_code": code,
            "message": e.to_string(),
        })),
    )
}

fn task_response(task: &UserTask) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "task": task }))
}

async fn create_task(
    State(state): State<ServerState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let mut task = UserTask::new(request.task_id, request.user_id, request.title);
    task.label_color = request.label_color;
    task.is_agent_task = request.is_agent_task;
    task.payload = request.payload;
    let task = state
        .ctx
        .user_tasks()
        .create(task)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(task_response(&task))
}

async fn list_tasks(
    State(state): State<ServerState>,
    Query(scope): Query<UserScope>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let tasks = state
        .ctx
        .user_tasks()
        .list(&scope.user_id, scope.include_archived)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(serde_json::json!({ "success": true, "tasks": tasks })))
}

async fn get_task(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
    Query(scope): Query<UserScope>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let task = state
        .ctx
        .user_tasks()
        .get(&scope.user_id, &task_id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&Error::not_found(format!("task {task_id}"))))?;
    Ok(task_response(&task))
}

async fn soft_delete(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
    Query(scope): Query<UserScope>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let task = state
        .ctx
        .user_tasks()
        .soft_delete(&scope.user_id, &task_id)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(task_response(&task))
}

async fn restore(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
    Query(scope): Query<UserScope>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let task = state
        .ctx
        .user_tasks()
        .restore(&scope.user_id, &task_id)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(task_response(&task))
}

async fn permanent_delete(
    State(state): State<ServerState>,
    Path(task_id): Path<String>,
    Query(scope): Query<UserScope>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let removed = state
        .ctx
        .user_tasks()
        .permanent_delete(&scope.user_id, &task_id)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(serde_json::json!({ "success": removed, "task_id": task_id })))
}
