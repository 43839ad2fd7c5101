use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::projects;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

/// Full replacement of a project's fields
pub type ProjectPatch = NewProject;

pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore for ProjectService {
    type Model = projects::Model;
    type New = NewProject;
    type Patch = ProjectPatch;
    type Filter = ();

    const KIND: EntityKind = EntityKind::Project;

    async fn create(&self, input: NewProject) -> TrackerResult<projects::Model> {
        ValidationService::validate_name(Self::KIND, &input.name)?;

        let txn = self.db.begin().await?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &input.name, None).await?;
        let project = projects::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!("Created project {} ({})", project.id, project.name);
        Ok(project)
    }

    async fn get(&self, id: i32) -> TrackerResult<projects::Model> {
        projects::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(&self, _filter: (), page: Page) -> TrackerResult<Vec<projects::Model>> {
        let projects = projects::Entity::find()
            .order_by_asc(projects::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(projects)
    }

    async fn update(&self, id: i32, patch: ProjectPatch) -> TrackerResult<projects::Model> {
        ValidationService::validate_name(Self::KIND, &patch.name)?;

        let txn = self.db.begin().await?;
        let project = projects::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &patch.name, Some(id)).await?;

        let mut active: projects::ActiveModel = project.into();
        active.name = Set(patch.name);
        active.description = Set(patch.description);
        let project = active.update(&txn).await?;
        txn.commit().await?;

        Ok(project)
    }

    /// Removes the project with all of its phases, buckets, tasks and snapshots
    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        info!("Deleted project {} and its subtree", id);
        Ok(())
    }
}
