use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use crate::database::entities::Project;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::{deleted, ListParams};
use crate::services::{EntityStore, NewProject, ProjectPatch, ProjectService};

#[utoipa::path(
    post,
    path = "/projects",
    request_body = NewProject,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid name or project name already taken")
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), TrackerError> {
    let project = ProjectService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/projects",
    params(ListParams),
    responses(
        (status = 200, description = "List all projects", body = [Project])
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Project>>, TrackerError> {
    let projects = ProjectService::new(state.db.clone())
        .list((), params.page())
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found")
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Project>, TrackerError> {
    let project = ProjectService::new(state.db.clone()).get(id).await?;
    Ok(Json(project))
}

#[utoipa::path(
    put,
    path = "/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    request_body = NewProject,
    responses(
        (status = 200, description = "Project updated successfully", body = Project),
        (status = 404, description = "Project not found"),
        (status = 400, description = "Invalid name or project name already taken")
    )
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProjectPatch>,
) -> Result<Json<Project>, TrackerError> {
    let project = ProjectService::new(state.db.clone())
        .update(id, payload)
        .await?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/projects/{id}",
    params(
        ("id" = i32, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project and all of its phases, buckets and tasks deleted"),
        (status = 404, description = "Project not found")
    )
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    ProjectService::new(state.db.clone()).delete(id).await?;
    Ok(deleted(ProjectService::KIND))
}
