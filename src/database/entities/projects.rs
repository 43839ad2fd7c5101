use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "server")]
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema), schema(as = Project))]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::project_phases::Entity")]
    ProjectPhases,
}

impl Related<super::project_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectPhases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
