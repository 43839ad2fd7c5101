use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use crate::database::entities::Subsystem;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::{deleted, ListParams};
use crate::services::{EntityStore, NewSubsystem, SubsystemPatch, SubsystemService};

#[utoipa::path(
    post,
    path = "/subsystems",
    request_body = NewSubsystem,
    responses(
        (status = 201, description = "Subsystem created", body = Subsystem),
        (status = 400, description = "Invalid name or subsystem name already taken")
    )
)]
pub async fn create_subsystem(
    State(state): State<AppState>,
    Json(payload): Json<NewSubsystem>,
) -> Result<(StatusCode, Json<Subsystem>), TrackerError> {
    let subsystem = SubsystemService::new(state.db.clone())
        .create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(subsystem)))
}

#[utoipa::path(
    get,
    path = "/subsystems",
    params(ListParams),
    responses((status = 200, description = "List subsystems", body = [Subsystem]))
)]
pub async fn list_subsystems(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Subsystem>>, TrackerError> {
    let subsystems = SubsystemService::new(state.db.clone())
        .list((), params.page())
        .await?;
    Ok(Json(subsystems))
}

#[utoipa::path(
    get,
    path = "/subsystems/{id}",
    params(("id" = i32, Path, description = "Subsystem ID")),
    responses(
        (status = 200, description = "Subsystem found", body = Subsystem),
        (status = 404, description = "Subsystem not found")
    )
)]
pub async fn get_subsystem(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Subsystem>, TrackerError> {
    let subsystem = SubsystemService::new(state.db.clone()).get(id).await?;
    Ok(Json(subsystem))
}

#[utoipa::path(
    put,
    path = "/subsystems/{id}",
    params(("id" = i32, Path, description = "Subsystem ID")),
    request_body = NewSubsystem,
    responses(
        (status = 200, description = "Subsystem updated", body = Subsystem),
        (status = 404, description = "Subsystem not found"),
        (status = 400, description = "Invalid name or subsystem name already taken")
    )
)]
pub async fn update_subsystem(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SubsystemPatch>,
) -> Result<Json<Subsystem>, TrackerError> {
    let subsystem = SubsystemService::new(state.db.clone())
        .update(id, payload)
        .await?;
    Ok(Json(subsystem))
}

#[utoipa::path(
    delete,
    path = "/subsystems/{id}",
    params(("id" = i32, Path, description = "Subsystem ID")),
    responses(
        (status = 200, description = "Subsystem deleted, task references cleared"),
        (status = 404, description = "Subsystem not found")
    )
)]
pub async fn delete_subsystem(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    SubsystemService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(SubsystemService::KIND))
}
