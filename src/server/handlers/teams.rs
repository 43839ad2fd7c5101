use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use crate::database::entities::Team;
use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::server::handlers::{deleted, ListParams};
use crate::services::{EntityStore, NewTeam, TeamPatch, TeamService};

#[utoipa::path(
    post,
    path = "/teams",
    request_body = NewTeam,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Invalid name or team name already taken")
    )
)]
pub async fn create_team(
    State(state): State<AppState>,
    Json(payload): Json<NewTeam>,
) -> Result<(StatusCode, Json<Team>), TrackerError> {
    let team = TeamService::new(state.db.clone()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    get,
    path = "/teams",
    params(ListParams),
    responses(
        (status = 200, description = "List teams", body = [Team])
    )
)]
pub async fn list_teams(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Team>>, TrackerError> {
    let teams = TeamService::new(state.db.clone())
        .list((), params.page())
        .await?;
    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team found", body = Team),
        (status = 404, description = "Team not found")
    )
)]
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Team>, TrackerError> {
    let team = TeamService::new(state.db.clone()).get(id).await?;
    Ok(Json(team))
}

#[utoipa::path(
    put,
    path = "/teams/{id}",
    params(("id" = i32, Path, description = "Team ID")),
    request_body = NewTeam,
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 404, description = "Team not found"),
        (status = 400, description = "Invalid name or team name already taken")
    )
)]
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<TeamPatch>,
) -> Result<Json<Team>, TrackerError> {
    let team = TeamService::new(state.db.clone()).update(id, payload).await?;
    Ok(Json(team))
}

#[utoipa::path(
    delete,
    path = "/teams/{id}",
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team deleted, task references cleared"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, TrackerError> {
    let service = TeamService::new(state.db.clone());
    service.delete(id).await?;
    Ok(deleted(TeamService::KIND))
}
