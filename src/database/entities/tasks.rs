use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

/// Status assumed for any day missing from `status_by_day`
pub const DEFAULT_STATUS: &str = "Pending";

/// Status label that counts as completed (compared case-insensitively)
pub const DONE_STATUS: &str = "done";

/// Format of the keys of `status_by_day`
pub const STATUS_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema), schema(as = Task))]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub task_bucket_id: i32,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
    pub vendor_system: Option<String>,
    pub subject: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Map of `YYYY-MM-DD` to a free-text status label
    #[sea_orm(column_type = "JsonBinary")]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    pub status_by_day: Json,
    /// Position among the tasks of the same bucket
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task_buckets::Entity",
        from = "Column::TaskBucketId",
        to = "super::task_buckets::Column::Id",
        on_delete = "Restrict"
    )]
    TaskBuckets,
    #[sea_orm(
        belongs_to = "super::subsystems::Entity",
        from = "Column::SubsystemId",
        to = "super::subsystems::Column::Id",
        on_delete = "SetNull"
    )]
    Subsystems,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_delete = "SetNull"
    )]
    Teams,
    #[sea_orm(has_many = "super::task_snapshots::Entity")]
    TaskSnapshots,
}

impl Related<super::task_buckets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskBuckets.def()
    }
}

impl Related<super::subsystems::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subsystems.def()
    }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl Related<super::task_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Status label recorded for `day`, or [`DEFAULT_STATUS`] when none is recorded
    pub fn status_on(&self, day: NaiveDate) -> &str {
        let key = day.format(STATUS_DATE_FORMAT).to_string();
        self.status_by_day
            .get(key.as_str())
            .and_then(Json::as_str)
            .unwrap_or(DEFAULT_STATUS)
    }

    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.status_on(day).to_lowercase() == DONE_STATUS
    }
}
