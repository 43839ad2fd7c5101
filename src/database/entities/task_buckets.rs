use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema), schema(as = TaskBucket))]
#[sea_orm(table_name = "task_buckets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub phase_id: i32,
    pub name: String,
    /// Position among the buckets of the same phase
    pub order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project_phases::Entity",
        from = "Column::PhaseId",
        to = "super::project_phases::Column::Id",
        on_delete = "Cascade"
    )]
    ProjectPhases,
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::project_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPhases.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
