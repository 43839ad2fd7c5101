use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::teams;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewTeam {
    pub name: String,
    pub email_to: Option<String>,
    pub email_cc: Option<String>,
}

/// Full replacement of a team's fields
pub type TeamPatch = NewTeam;

pub struct TeamService {
    db: DatabaseConnection,
}

impl TeamService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore for TeamService {
    type Model = teams::Model;
    type New = NewTeam;
    type Patch = TeamPatch;
    type Filter = ();

    const KIND: EntityKind = EntityKind::Team;

    async fn create(&self, input: NewTeam) -> TrackerResult<teams::Model> {
        ValidationService::validate_name(Self::KIND, &input.name)?;

        let txn = self.db.begin().await?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &input.name, None).await?;

        let team = teams::ActiveModel {
            name: Set(input.name),
            email_to: Set(input.email_to),
            email_cc: Set(input.email_cc),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!("Created team {} ({})", team.id, team.name);
        Ok(team)
    }

    async fn get(&self, id: i32) -> TrackerResult<teams::Model> {
        teams::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(&self, _filter: (), page: Page) -> TrackerResult<Vec<teams::Model>> {
        let teams = teams::Entity::find()
            .order_by_asc(teams::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(teams)
    }

    async fn update(&self, id: i32, patch: TeamPatch) -> TrackerResult<teams::Model> {
        ValidationService::validate_name(Self::KIND, &patch.name)?;

        let txn = self.db.begin().await?;
        let team = teams::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;
        ValidationService::ensure_name_available(&txn, Self::KIND, &patch.name, Some(id)).await?;

        let mut active: teams::ActiveModel = team.into();
        active.name = Set(patch.name);
        active.email_to = Set(patch.email_to);
        active.email_cc = Set(patch.email_cc);
        let team = active.update(&txn).await?;
        txn.commit().await?;

        Ok(team)
    }

    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        Ok(())
    }
}
