use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::subsystems;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewSubsystem {
    pub name: String,
}

pub type SubsystemPatch = NewSubsystem;

pub struct SubsystemService {
    db: DatabaseConnection,
}

impl SubsystemService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore for SubsystemService {
    type Model = subsystems::Model;
    type New = NewSubsystem;
    type Patch = SubsystemPatch;
    type Filter = ();

    const KIND: EntityKind = EntityKind::Subsystem;

    async fn create(&self, input: NewSubsystem) -> TrackerResult<subsystems::Model> {
        ValidationService::validate_name(Self::KIND, &input.name)?;

        let txn = self.db.begin().await?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &input.name, None).await?;
        let subsystem = subsystems::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!("Created subsystem {} ({})", subsystem.id, subsystem.name);
        Ok(subsystem)
    }

    async fn get(&self, id: i32) -> TrackerResult<subsystems::Model> {
        subsystems::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(&self, _filter: (), page: Page) -> TrackerResult<Vec<subsystems::Model>> {
        let subsystems = subsystems::Entity::find()
            .order_by_asc(subsystems::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(subsystems)
    }

    async fn update(&self, id: i32, patch: SubsystemPatch) -> TrackerResult<subsystems::Model> {
        ValidationService::validate_name(Self::KIND, &patch.name)?;

        let txn = self.db.begin().await?;
        let subsystem = subsystems::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &patch.name, Some(id)).await?;

        let mut active: subsystems::ActiveModel = subsystem.into();
        active.name = Set(patch.name);
        let subsystem = active.update(&txn).await?;
        txn.commit().await?;

        Ok(subsystem)
    }

    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        Ok(())
    }
}
