use axum::{extract::State, response::Json};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service and database status"))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    Json(json!({
        "status": "healthy",
        "service": "taskboard",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
