use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::database::entities::Task;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::deleted;
use crate::services::{EntityStore, NewTask, Page, TaskFilter, TaskPatch, TaskService};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TaskListParams {
    pub task_bucket_id: Option<i32>,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl TaskListParams {
    fn filter(&self) -> TaskFilter {
        TaskFilter {
            task_bucket_id: self.task_bucket_id,
            subsystem_id: self.subsystem_id,
            team_id: self.team_id,
        }
    }
}

#[utoipa::path(
    post,
    path = "/tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid reference or malformed field")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), TrackerError> {
    let task = TaskService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/tasks",
    params(TaskListParams),
    responses((status = 200, description = "Tasks by order", body = [Task]))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Result<Json<Vec<Task>>, TrackerError> {
    let tasks = TaskService::new(state.db.clone())
        .list(params.filter(), Page::new(params.skip, params.limit))
        .await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/tasks/by-bucket/{id}/renumber",
    params(("id" = i32, Path, description = "Bucket ID")),
    responses(
        (status = 200, description = "Tasks renumbered 1..N", body = [Task]),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn renumber_tasks(
    State(state): State<AppState>,
    Path(bucket_id): Path<i32>,
) -> Result<Json<Vec<Task>>, TrackerError> {
    let tasks = TaskService::new(state.db.clone()).renumber(bucket_id).await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Task>, TrackerError> {
    let task = TaskService::new(state.db.clone()).get(id).await?;
    Ok(Json(task))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = NewTask,
    responses(
        (status = 200, description = "Task replaced", body = Task),
        (status = 400, description = "Invalid reference or malformed field"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TaskPatch>,
) -> Result<Json<Task>, TrackerError> {
    let task = TaskService::new(state.db.clone()).update(id, payload).await?;
    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task and its snapshots deleted"),
        (status = 404, description = "Task not found")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    TaskService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(TaskService::KIND))
}
