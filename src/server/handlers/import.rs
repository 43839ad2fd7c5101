use axum::{
    extract::{Multipart, State},
    response::Json,
};
use tracing::info;

use crate::errors::TrackerError;
use crate::server::app::AppState;
use crate::services::{ImportService, ImportSummary};

const FILE_FIELD: &str = "file";

/// Imports an xlsx workbook sent as multipart form data in the `file` field
#[utoipa::path(
    post,
    path = "/import-excel",
    responses(
        (status = 200, description = "Rows imported", body = ImportSummary),
        (status = 400, description = "Missing file or unreadable workbook")
    )
)]
pub async fn import_excel(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, TrackerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TrackerError::invalid_argument(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.xlsx").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| TrackerError::invalid_argument(format!("Malformed upload: {}", e)))?;
        info!("Received spreadsheet '{}' ({} bytes)", filename, bytes.len());

        let summary = ImportService::new(state.db.clone())
            .import_xlsx(&bytes)
            .await?;
        return Ok(Json(summary));
    }

    Err(TrackerError::invalid_argument(
        "multipart field 'file' is required",
    ))
}
