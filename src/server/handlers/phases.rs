use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::database::entities::ProjectPhase;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::{deleted, ListParams};
use crate::services::{EntityStore, NewPhase, Page, PhaseFilter, PhasePatch, PhaseService};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PhaseListParams {
    pub project_id: Option<i32>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/phases",
    request_body = NewPhase,
    responses(
        (status = 201, description = "Phase created", body = ProjectPhase),
        (status = 400, description = "Project does not exist")
    )
)]
pub async fn create_phase(
    State(state): State<AppState>,
    Json(payload): Json<NewPhase>,
) -> Result<(StatusCode, Json<ProjectPhase>), TrackerError> {
    let phase = PhaseService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(phase)))
}

#[utoipa::path(
    get,
    path = "/phases",
    params(PhaseListParams),
    responses((status = 200, description = "Phases by order", body = [ProjectPhase]))
)]
pub async fn list_phases(
    State(state): State<AppState>,
    Query(params): Query<PhaseListParams>,
) -> Result<Json<Vec<ProjectPhase>>, TrackerError> {
    let filter = PhaseFilter {
        project_id: params.project_id,
    };
    let phases = PhaseService::new(state.db.clone())
        .list(filter, Page::new(params.skip, params.limit))
        .await?;
    Ok(Json(phases))
}

#[utoipa::path(
    get,
    path = "/phases/by-project/{id}",
    params(("id" = i32, Path, description = "Project ID"), ListParams),
    responses(
        (status = 200, description = "Phases of the project by order", body = [ProjectPhase]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn list_phases_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProjectPhase>>, TrackerError> {
    let phases = PhaseService::new(state.db.clone())
        .list_by_project(project_id, params.page())
        .await?;
    Ok(Json(phases))
}

#[utoipa::path(
    post,
    path = "/phases/by-project/{id}/renumber",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Phases renumbered 1..N", body = [ProjectPhase]),
        (status = 404, description = "Project not found")
    )
)]
pub async fn renumber_phases(
    State(state): State<AppState>,
    Path(project_id): Path<i32>,
) -> Result<Json<Vec<ProjectPhase>>, TrackerError> {
    let phases = PhaseService::new(state.db.clone())
        .renumber(project_id)
        .await?;
    Ok(Json(phases))
}

#[utoipa::path(
    get,
    path = "/phases/{id}",
    params(("id" = i32, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Phase found", body = ProjectPhase),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn get_phase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectPhase>, TrackerError> {
    let phase = PhaseService::new(state.db.clone()).get(id).await?;
    Ok(Json(phase))
}

#[utoipa::path(
    put,
    path = "/phases/{id}",
    params(("id" = i32, Path, description = "Phase ID")),
    request_body = PhasePatch,
    responses(
        (status = 200, description = "Phase updated", body = ProjectPhase),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn update_phase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<PhasePatch>,
) -> Result<Json<ProjectPhase>, TrackerError> {
    let phase = PhaseService::new(state.db.clone())
        .update(id, payload)
        .await?;
    Ok(Json(phase))
}

#[utoipa::path(
    delete,
    path = "/phases/{id}",
    params(("id" = i32, Path, description = "Phase ID")),
    responses(
        (status = 200, description = "Phase and its buckets deleted"),
        (status = 404, description = "Phase not found")
    )
)]
pub async fn delete_phase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    PhaseService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(PhaseService::KIND))
}
