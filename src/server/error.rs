use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::errors::TrackerError;

impl TrackerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
            // Conflicts keep their own error code but share 400 with other rejected requests
            TrackerError::InvalidReference { .. }
            | TrackerError::DanglingReference(_)
            | TrackerError::InvalidArgument(_)
            | TrackerError::Conflict(_) => StatusCode::BAD_REQUEST,
            TrackerError::Database(_) | TrackerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        };

        let body = json!({
            "error": message,
            "code": self.error_code(),
        });
        (status, Json(body)).into_response()
    }
}
