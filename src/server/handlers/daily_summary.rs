use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::services::{DailySummary, DailySummaryQuery, DailySummaryService, ValidationService};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DailySummaryParams {
    /// Day to summarize, `YYYY-MM-DD`
    pub date_query: Option<String>,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
}

/// Parses the required `date_query` parameter shared with snapshot capture
pub(crate) fn required_date(date_query: Option<&str>) -> Result<chrono::NaiveDate, TrackerError> {
    let raw = date_query
        .ok_or_else(|| TrackerError::invalid_argument("date_query parameter is required"))?;
    ValidationService::parse_date(raw)
}

#[utoipa::path(
    get,
    path = "/daily-summary",
    params(DailySummaryParams),
    responses(
        (status = 200, description = "Active tasks split into completed and pending", body = DailySummary),
        (status = 400, description = "Missing or malformed date_query")
    )
)]
pub async fn daily_summary(
    State(state): State<AppState>,
    Query(params): Query<DailySummaryParams>,
) -> Result<Json<DailySummary>, TrackerError> {
    let query = DailySummaryQuery {
        date: required_date(params.date_query.as_deref())?,
        subsystem_id: params.subsystem_id,
        team_id: params.team_id,
    };
    let summary = DailySummaryService::new(state.db.clone())
        .summarize(query)
        .await?;
    Ok(Json(summary))
}
