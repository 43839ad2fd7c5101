use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::task_buckets;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::ordering::{self, OrderScope};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewTaskBucket {
    pub phase_id: i32,
    pub name: String,
    pub order: Option<i32>,
}

/// Sparse update; a new `phase_id` moves the bucket to that phase
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct TaskBucketPatch {
    pub name: Option<String>,
    pub order: Option<i32>,
    pub phase_id: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TaskBucketFilter {
    pub phase_id: Option<i32>,
}

pub struct TaskBucketService {
    db: DatabaseConnection,
}

impl TaskBucketService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn renumber(&self, phase_id: i32) -> TrackerResult<Vec<task_buckets::Model>> {
        let txn = self.db.begin().await?;
        ordering::renumber(&txn, OrderScope::Phase(phase_id)).await?;
        txn.commit().await?;

        self.list(
            TaskBucketFilter {
                phase_id: Some(phase_id),
            },
            Page::new(None, None),
        )
        .await
    }
}

#[async_trait]
impl EntityStore for TaskBucketService {
    type Model = task_buckets::Model;
    type New = NewTaskBucket;
    type Patch = TaskBucketPatch;
    type Filter = TaskBucketFilter;

    const KIND: EntityKind = EntityKind::TaskBucket;

    async fn create(&self, input: NewTaskBucket) -> TrackerResult<task_buckets::Model> {
        ValidationService::validate_name(Self::KIND, &input.name)?;

        let txn = self.db.begin().await?;
        hierarchy::validate_parent(&txn, EntityKind::ProjectPhase, input.phase_id).await?;
        let order =
            ordering::assign_order(&txn, OrderScope::Phase(input.phase_id), input.order).await?;

        let bucket = task_buckets::ActiveModel {
            phase_id: Set(input.phase_id),
            name: Set(input.name),
            order: Set(order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!(
            "Created bucket {} in phase {} at order {}",
            bucket.id, bucket.phase_id, bucket.order
        );
        Ok(bucket)
    }

    async fn get(&self, id: i32) -> TrackerResult<task_buckets::Model> {
        task_buckets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(
        &self,
        filter: TaskBucketFilter,
        page: Page,
    ) -> TrackerResult<Vec<task_buckets::Model>> {
        let mut query = task_buckets::Entity::find();
        if let Some(phase_id) = filter.phase_id {
            query = query.filter(task_buckets::Column::PhaseId.eq(phase_id));
        }

        let buckets = query
            .order_by_asc(task_buckets::Column::Order)
            .order_by_asc(task_buckets::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(buckets)
    }

    async fn update(&self, id: i32, patch: TaskBucketPatch) -> TrackerResult<task_buckets::Model> {
        if let Some(name) = &patch.name {
            ValidationService::validate_name(Self::KIND, name)?;
        }

        let txn = self.db.begin().await?;
        let bucket = task_buckets::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;

        let moved_to = patch.phase_id.filter(|phase_id| *phase_id != bucket.phase_id);
        let mut active: task_buckets::ActiveModel = bucket.into();

        if let Some(phase_id) = moved_to {
            hierarchy::validate_parent(&txn, EntityKind::ProjectPhase, phase_id).await?;
            let order =
                ordering::assign_order(&txn, OrderScope::Phase(phase_id), patch.order).await?;
            active.phase_id = Set(phase_id);
            active.order = Set(order);
            debug!("Moving bucket {} to phase {}", id, phase_id);
        } else if let Some(order) = patch.order {
            active.order = Set(order);
        }
        if let Some(name) = patch.name {
            active.name = Set(name);
        }

        let bucket = active.update(&txn).await?;
        txn.commit().await?;

        Ok(bucket)
    }

    /// Refused with `Conflict` while the bucket still holds tasks
    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        Ok(())
    }
}
