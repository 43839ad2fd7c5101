pub mod daily_summary;
pub mod health;
pub mod import;
pub mod phases;
pub mod projects;
pub mod snapshots;
pub mod subsystems;
pub mod task_buckets;
pub mod tasks;
pub mod teams;

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::services::{EntityKind, Page};

/// `skip`/`limit` query parameters shared by the list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListParams {
    /// Rows to skip (default 0)
    pub skip: Option<u64>,
    /// Maximum rows to return (default 100, at most 1000)
    pub limit: Option<u64>,
}

impl ListParams {
    pub fn page(&self) -> Page {
        Page::new(self.skip, self.limit)
    }
}

/// Body returned by every DELETE endpoint
pub fn deleted(kind: EntityKind) -> Json<Value> {
    Json(json!({ "message": format!("{} deleted successfully", kind) }))
}
