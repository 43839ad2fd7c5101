//! Point-in-time history of task statuses
//!
//! Snapshots are written explicitly or captured in bulk for a day. The daily
//! summary never reads them; it works from the live `status_by_day` map.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::task_snapshots;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::daily_summary_service::{active_tasks, DailySummaryQuery};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::store::{EntityStore, Page};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewSnapshot {
    pub task_id: i32,
    pub date: NaiveDate,
    pub status: String,
}

/// Only the recorded status can change
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct SnapshotPatch {
    pub status: String,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotFilter {
    pub task_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

pub struct SnapshotService {
    db: DatabaseConnection,
}

impl SnapshotService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records the current status of every task active on `date`
    pub async fn capture(&self, date: NaiveDate) -> TrackerResult<Vec<task_snapshots::Model>> {
        let txn = self.db.begin().await?;
        let query = DailySummaryQuery {
            date,
            subsystem_id: None,
            team_id: None,
        };

        let mut snapshots = Vec::new();
        for task in active_tasks(&txn, &query).await? {
            let snapshot = task_snapshots::ActiveModel {
                task_id: Set(task.id),
                date: Set(date),
                status: Set(task.status_on(date).to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            snapshots.push(snapshot);
        }
        txn.commit().await?;

        info!("Captured {} task snapshot(s) for {}", snapshots.len(), date);
        Ok(snapshots)
    }
}

#[async_trait]
impl EntityStore for SnapshotService {
    type Model = task_snapshots::Model;
    type New = NewSnapshot;
    type Patch = SnapshotPatch;
    type Filter = SnapshotFilter;

    const KIND: EntityKind = EntityKind::TaskStatusSnapshot;

    async fn create(&self, input: NewSnapshot) -> TrackerResult<task_snapshots::Model> {
        let txn = self.db.begin().await?;
        hierarchy::validate_parent(&txn, EntityKind::Task, input.task_id).await?;
        let snapshot = task_snapshots::ActiveModel {
            task_id: Set(input.task_id),
            date: Set(input.date),
            status: Set(input.status),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(snapshot)
    }

    async fn get(&self, id: i32) -> TrackerResult<task_snapshots::Model> {
        task_snapshots::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(
        &self,
        filter: SnapshotFilter,
        page: Page,
    ) -> TrackerResult<Vec<task_snapshots::Model>> {
        let mut query = task_snapshots::Entity::find();
        if let Some(task_id) = filter.task_id {
            query = query.filter(task_snapshots::Column::TaskId.eq(task_id));
        }
        if let Some(date) = filter.date {
            query = query.filter(task_snapshots::Column::Date.eq(date));
        }

        let snapshots = query
            .order_by_asc(task_snapshots::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(snapshots)
    }

    async fn update(
        &self,
        id: i32,
        patch: SnapshotPatch,
    ) -> TrackerResult<task_snapshots::Model> {
        let txn = self.db.begin().await?;
        let snapshot = task_snapshots::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;

        let mut active: task_snapshots::ActiveModel = snapshot.into();
        active.status = Set(patch.status);
        let snapshot = active.update(&txn).await?;
        txn.commit().await?;
        Ok(snapshot)
    }

    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::database::test_utils::{seed_bucket, setup_test_db};
    use crate::services::task_service::{NewTask, TaskService};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    async fn seed_task(db: &DatabaseConnection, bucket_id: i32, end: u32) -> i32 {
        let mut status_by_day = BTreeMap::new();
        status_by_day.insert("2025-01-04".to_string(), "Done".to_string());
        TaskService::new(db.clone())
            .create(NewTask {
                task_bucket_id: bucket_id,
                subsystem_id: None,
                team_id: None,
                vendor_system: None,
                subject: "Rollout".to_string(),
                description: "Roll out".to_string(),
                detailed_description: None,
                start_date: day(1),
                end_date: day(end),
                status_by_day,
                order: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_capture_records_active_tasks_only() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let long = seed_task(&db, seeded.bucket_id, 10).await;
        seed_task(&db, seeded.bucket_id, 2).await;
        let service = SnapshotService::new(db);

        let captured = service.capture(day(4)).await.unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].task_id, long);
        assert_eq!(captured[0].status, "Done");

        let later = service.capture(day(5)).await.unwrap();
        assert_eq!(later[0].status, "Pending");

        let listed = service
            .list(
                SnapshotFilter {
                    task_id: Some(long),
                    date: Some(day(4)),
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(listed, captured);
    }

    #[tokio::test]
    async fn test_snapshot_for_missing_task_is_invalid_reference() {
        let service = SnapshotService::new(setup_test_db().await);
        let err = service
            .create(NewSnapshot {
                task_id: 8,
                date: day(1),
                status: "Done".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidReference {
                entity: EntityKind::Task,
                id: 8
            }
        ));
    }

    #[tokio::test]
    async fn test_update_changes_only_status() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let task_id = seed_task(&db, seeded.bucket_id, 10).await;
        let service = SnapshotService::new(db);
        let snapshot = service
            .create(NewSnapshot {
                task_id,
                date: day(3),
                status: "Blocked".to_string(),
            })
            .await
            .unwrap();

        let updated = service
            .update(
                snapshot.id,
                SnapshotPatch {
                    status: "Done".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Done");
        assert_eq!(updated.task_id, task_id);
        assert_eq!(updated.date, day(3));
        assert_eq!(service.get(snapshot.id).await.unwrap(), updated);

        let err = service
            .update(
                snapshot.id + 100,
                SnapshotPatch {
                    status: "Done".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_deleting_task_removes_its_snapshots() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let task_id = seed_task(&db, seeded.bucket_id, 10).await;
        let service = SnapshotService::new(db.clone());
        let snapshot = service
            .create(NewSnapshot {
                task_id,
                date: day(3),
                status: "Blocked".to_string(),
            })
            .await
            .unwrap();

        TaskService::new(db).delete(task_id).await.unwrap();
        assert!(service.get(snapshot.id).await.unwrap_err().is_not_found());
    }
}
