use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::database::entities::TaskBucket;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::deleted;
use crate::services::{
    EntityStore, NewTaskBucket, Page, TaskBucketFilter, TaskBucketPatch, TaskBucketService,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TaskBucketListParams {
    pub phase_id: Option<i32>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/task-buckets",
    request_body = NewTaskBucket,
    responses(
        (status = 201, description = "Bucket created", body = TaskBucket),
        (status = 400, description = "Phase does not exist")
    )
)]
pub async fn create_task_bucket(
    State(state): State<AppState>,
    Json(payload): Json<NewTaskBucket>,
) -> Result<(StatusCode, Json<TaskBucket>), TrackerError> {
    let bucket = TaskBucketService::new(state.db.clone())
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(bucket)))
}

#[utoipa::path(
    get,
    path = "/task-buckets",
    params(TaskBucketListParams),
    responses((status = 200, description = "Buckets by order", body = [TaskBucket]))
)]
pub async fn list_task_buckets(
    State(state): State<AppState>,
    Query(params): Query<TaskBucketListParams>,
) -> Result<Json<Vec<TaskBucket>>, TrackerError> {
    let filter = TaskBucketFilter {
        phase_id: params.phase_id,
    };
    let buckets = TaskBucketService::new(state.db.clone())
        .list(filter, Page::new(params.skip, params.limit))
        .await?;
    Ok(Json(buckets))
}

#[utoipa::path(
    post,
    path = "/task-buckets/by-phase/{id}/renumber",
    params(("id" = i32, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Buckets renumbered 1..N", body = [TaskBucket]),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn renumber_task_buckets(
    State(state): State<AppState>,
    Path(phase_id): Path<i32>,
) -> Result<Json<Vec<TaskBucket>>, TrackerError> {
    let buckets = TaskBucketService::new(state.db.clone())
        .renumber(phase_id)
        .await?;
    Ok(Json(buckets))
}

#[utoipa::path(
    get,
    path = "/task-buckets/{id}",
    params(("id" = i32, Path, description = "Bucket ID")),
    responses(
        (status = 200, description = "Bucket found", body = TaskBucket),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn get_task_bucket(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TaskBucket>, TrackerError> {
    let bucket = TaskBucketService::new(state.db.clone()).get(id).await?;
    Ok(Json(bucket))
}

#[utoipa::path(
    put,
    path = "/task-buckets/{id}",
    params(("id" = i32, Path, description = "Bucket ID")),
    request_body = TaskBucketPatch,
    responses(
        (status = 200, description = "Bucket updated", body = TaskBucket),
        (status = 400, description = "Target phase does not exist"),
        (status = 404, description = "Bucket not found")
    )
)]
pub async fn update_task_bucket(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TaskBucketPatch>,
) -> Result<Json<TaskBucket>, TrackerError> {
    let bucket = TaskBucketService::new(state.db.clone())
        .update(id, payload)
        .await?;
    Ok(Json(bucket))
}

#[utoipa::path(
    delete,
    path = "/task-buckets/{id}",
    params(("id" = i32, Path, description = "Bucket ID")),
    responses(
        (status = 200, description = "Bucket deleted"),
        (status = 404, description = "Bucket not found"),
        (status = 400, description = "Bucket still has tasks")
    )
)]
pub async fn delete_task_bucket(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    TaskBucketService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(TaskBucketService::KIND))
}
