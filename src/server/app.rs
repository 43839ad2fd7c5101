use anyhow::{anyhow, Result};
use axum::{
    http::HeaderValue,
    response::Json,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers::{
    daily_summary, health, import, phases, projects, snapshots, subsystems, task_buckets, tasks,
    teams,
};
use super::openapi::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { db };

    let cors = match cors_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow!("Invalid CORS origin '{}': {}", origin, e))?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(api_routes())
        // CORS sits directly over the routes, so error responses carry the headers too
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Teams
        .route("/teams", post(teams::create_team).get(teams::list_teams))
        .route(
            "/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        // Subsystems
        .route(
            "/subsystems",
            post(subsystems::create_subsystem).get(subsystems::list_subsystems),
        )
        .route(
            "/subsystems/:id",
            get(subsystems::get_subsystem)
                .put(subsystems::update_subsystem)
                .delete(subsystems::delete_subsystem),
        )
        // Projects
        .route(
            "/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Phases
        .route("/phases", post(phases::create_phase).get(phases::list_phases))
        .route(
            "/phases/by-project/:id",
            get(phases::list_phases_by_project),
        )
        .route(
            "/phases/by-project/:id/renumber",
            post(phases::renumber_phases),
        )
        .route(
            "/phases/:id",
            get(phases::get_phase)
                .put(phases::update_phase)
                .delete(phases::delete_phase),
        )
        // Task buckets
        .route(
            "/task-buckets",
            post(task_buckets::create_task_bucket).get(task_buckets::list_task_buckets),
        )
        .route(
            "/task-buckets/by-phase/:id/renumber",
            post(task_buckets::renumber_task_buckets),
        )
        .route(
            "/task-buckets/:id",
            get(task_buckets::get_task_bucket)
                .put(task_buckets::update_task_bucket)
                .delete(task_buckets::delete_task_bucket),
        )
        // Tasks
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/tasks/by-bucket/:id/renumber", post(tasks::renumber_tasks))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Snapshots
        .route(
            "/task-snapshots",
            post(snapshots::create_snapshot).get(snapshots::list_snapshots),
        )
        .route(
            "/task-snapshots/capture",
            post(snapshots::capture_snapshots),
        )
        .route(
            "/task-snapshots/:id",
            get(snapshots::get_snapshot).delete(snapshots::delete_snapshot),
        )
        // Reporting and bulk import
        .route("/daily-summary", get(daily_summary::daily_summary))
        .route("/import-excel", post(import::import_excel))
}
