use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::database::entities::TaskStatusSnapshot;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::daily_summary::required_date;
use crate::server::handlers::deleted;
use crate::services::{EntityStore, NewSnapshot, Page, SnapshotFilter, SnapshotService};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SnapshotListParams {
    pub task_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CaptureParams {
    /// Day to capture, `YYYY-MM-DD`
    pub date_query: Option<String>,
}

#[utoipa::path(
    post,
    path = "/task-snapshots",
    request_body = NewSnapshot,
    responses(
        (status = 201, description = "Snapshot recorded", body = TaskStatusSnapshot),
        (status = 400, description = "Task does not exist")
    )
)]
pub async fn create_snapshot(
    State(state): State<AppState>,
    Json(payload): Json<NewSnapshot>,
) -> Result<(StatusCode, Json<TaskStatusSnapshot>), TrackerError> {
    let snapshot = SnapshotService::new(state.db.clone())
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[utoipa::path(
    get,
    path = "/task-snapshots",
    params(SnapshotListParams),
    responses((status = 200, description = "Snapshots by id", body = [TaskStatusSnapshot]))
)]
pub async fn list_snapshots(
    State(state): State<AppState>,
    Query(params): Query<SnapshotListParams>,
) -> Result<Json<Vec<TaskStatusSnapshot>>, TrackerError> {
    let filter = SnapshotFilter {
        task_id: params.task_id,
        date: params.date,
    };
    let snapshots = SnapshotService::new(state.db.clone())
        .list(filter, Page::new(params.skip, params.limit))
        .await?;
    Ok(Json(snapshots))
}

#[utoipa::path(
    post,
    path = "/task-snapshots/capture",
    params(CaptureParams),
    responses(
        (status = 201, description = "One snapshot per task active on the day", body = [TaskStatusSnapshot]),
        (status = 400, description = "Missing or malformed date_query")
    )
)]
pub async fn capture_snapshots(
    State(state): State<AppState>,
    Query(params): Query<CaptureParams>,
) -> Result<(StatusCode, Json<Vec<TaskStatusSnapshot>>), TrackerError> {
    let date = required_date(params.date_query.as_deref())?;
    let snapshots = SnapshotService::new(state.db.clone()).capture(date).await?;
    Ok((StatusCode::CREATED, Json(snapshots)))
}

#[utoipa::path(
    get,
    path = "/task-snapshots/{id}",
    params(("id" = i32, Path, description = "Snapshot ID")),
    responses(
        (status = 200, description = "Snapshot found", body = TaskStatusSnapshot),
        (status = 404, description = "Snapshot not found")
    )
)]
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TaskStatusSnapshot>, TrackerError> {
    let snapshot = SnapshotService::new(state.db.clone()).get(id).await?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    delete,
    path = "/task-snapshots/{id}",
    params(("id" = i32, Path, description = "Snapshot ID")),
    responses(
        (status = 200, description = "Snapshot deleted"),
        (status = 404, description = "Snapshot not found")
    )
)]
pub async fn delete_snapshot(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    SnapshotService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(SnapshotService::KIND))
}
