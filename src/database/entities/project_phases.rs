use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema), schema(as = ProjectPhase))]
#[sea_orm(table_name = "project_phases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub label: String,
    pub date: Option<chrono::NaiveDate>,
    /// Position among the phases of the same project
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_delete = "Cascade"
    )]
    Projects,
    #[sea_orm(has_many = "super::task_buckets::Entity")]
    TaskBuckets,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::task_buckets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskBuckets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
