use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::tasks;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::ordering::{self, OrderScope};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewTask {
    pub task_bucket_id: i32,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
    pub vendor_system: Option<String>,
    pub subject: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `YYYY-MM-DD` → status label
    #[serde(default)]
    pub status_by_day: BTreeMap<String, String>,
    /// Defaults to the next position in the bucket
    pub order: Option<i32>,
}

/// Full replacement of a task's fields
///
/// `order` is the one optional field: when absent the stored order is kept,
/// unless the task moves to another bucket, where it is appended.
pub type TaskPatch = NewTask;

#[derive(Clone, Copy, Debug, Default)]
pub struct TaskFilter {
    pub task_bucket_id: Option<i32>,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
}

pub struct TaskService {
    db: DatabaseConnection,
}

impl TaskService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn renumber(&self, bucket_id: i32) -> TrackerResult<Vec<tasks::Model>> {
        let txn = self.db.begin().await?;
        ordering::renumber(&txn, OrderScope::Bucket(bucket_id)).await?;
        txn.commit().await?;

        self.list(
            TaskFilter {
                task_bucket_id: Some(bucket_id),
                ..Default::default()
            },
            Page::new(None, None),
        )
        .await
    }
}

/// Field checks and reference checks shared by create and update
async fn validate_task<C: ConnectionTrait>(
    conn: &C,
    input: &NewTask,
) -> TrackerResult<serde_json::Value> {
    if input.subject.trim().is_empty() {
        return Err(TrackerError::invalid_argument("Task subject cannot be empty"));
    }
    ValidationService::validate_date_range(input.start_date, input.end_date)?;
    let status_by_day = ValidationService::status_map_to_json(&input.status_by_day)?;

    hierarchy::validate_parent(conn, EntityKind::TaskBucket, input.task_bucket_id).await?;
    hierarchy::validate_optional_parent(conn, EntityKind::Subsystem, input.subsystem_id).await?;
    hierarchy::validate_optional_parent(conn, EntityKind::Team, input.team_id).await?;

    Ok(status_by_day)
}

/// Inserts a task on an open connection or transaction
///
/// Also used by the spreadsheet import so imported rows get the same checks
/// and ordering as tasks created one by one.
pub(crate) async fn insert_task<C: ConnectionTrait>(
    conn: &C,
    input: NewTask,
) -> TrackerResult<tasks::Model> {
    let status_by_day = validate_task(conn, &input).await?;
    let order =
        ordering::assign_order(conn, OrderScope::Bucket(input.task_bucket_id), input.order)
            .await?;

    let task = tasks::ActiveModel {
        task_bucket_id: Set(input.task_bucket_id),
        subsystem_id: Set(input.subsystem_id),
        team_id: Set(input.team_id),
        vendor_system: Set(input.vendor_system),
        subject: Set(input.subject),
        description: Set(input.description),
        detailed_description: Set(input.detailed_description),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        status_by_day: Set(status_by_day),
        order: Set(order),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    debug!(
        "Created task {} in bucket {} at order {}",
        task.id, task.task_bucket_id, task.order
    );
    Ok(task)
}

#[async_trait]
impl EntityStore for TaskService {
    type Model = tasks::Model;
    type New = NewTask;
    type Patch = TaskPatch;
    type Filter = TaskFilter;

    const KIND: EntityKind = EntityKind::Task;

    async fn create(&self, input: NewTask) -> TrackerResult<tasks::Model> {
        let txn = self.db.begin().await?;
        let task = insert_task(&txn, input).await?;
        txn.commit().await?;
        Ok(task)
    }

    async fn get(&self, id: i32) -> TrackerResult<tasks::Model> {
        tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(&self, filter: TaskFilter, page: Page) -> TrackerResult<Vec<tasks::Model>> {
        let mut query = tasks::Entity::find();
        if let Some(bucket_id) = filter.task_bucket_id {
            query = query.filter(tasks::Column::TaskBucketId.eq(bucket_id));
        }
        if let Some(subsystem_id) = filter.subsystem_id {
            query = query.filter(tasks::Column::SubsystemId.eq(subsystem_id));
        }
        if let Some(team_id) = filter.team_id {
            query = query.filter(tasks::Column::TeamId.eq(team_id));
        }

        let tasks = query
            .order_by_asc(tasks::Column::Order)
            .order_by_asc(tasks::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    async fn update(&self, id: i32, patch: TaskPatch) -> TrackerResult<tasks::Model> {
        let txn = self.db.begin().await?;
        let task = tasks::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;
        let status_by_day = validate_task(&txn, &patch).await?;

        let order = if patch.task_bucket_id != task.task_bucket_id {
            debug!("Moving task {} to bucket {}", id, patch.task_bucket_id);
            ordering::assign_order(&txn, OrderScope::Bucket(patch.task_bucket_id), patch.order)
                .await?
        } else {
            patch.order.unwrap_or(task.order)
        };

        let mut active: tasks::ActiveModel = task.into();
        active.task_bucket_id = Set(patch.task_bucket_id);
        active.subsystem_id = Set(patch.subsystem_id);
        active.team_id = Set(patch.team_id);
        active.vendor_system = Set(patch.vendor_system);
        active.subject = Set(patch.subject);
        active.description = Set(patch.description);
        active.detailed_description = Set(patch.detailed_description);
        active.start_date = Set(patch.start_date);
        active.end_date = Set(patch.end_date);
        active.status_by_day = Set(status_by_day);
        active.order = Set(order);
        let task = active.update(&txn).await?;
        txn.commit().await?;

        Ok(task)
    }

    /// Removes the task and its snapshots
    async fn delete(&self, id: i32) -> TrackerResult<()> {
        let txn = self.db.begin().await?;
        hierarchy::delete_entity(&txn, Self::KIND, id).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::{seed_bucket, setup_test_db};
    use crate::services::task_bucket_service::TaskBucketService;
    use crate::services::team_service::{NewTeam, TeamService};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn task(bucket_id: i32, subject: &str) -> NewTask {
        NewTask {
            task_bucket_id: bucket_id,
            subsystem_id: None,
            team_id: None,
            vendor_system: None,
            subject: subject.to_string(),
            description: "Routine work".to_string(),
            detailed_description: None,
            start_date: day(1),
            end_date: day(10),
            status_by_day: BTreeMap::new(),
            order: None,
        }
    }

    #[tokio::test]
    async fn test_round_trip_keeps_every_field() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let service = TaskService::new(db);

        let mut input = task(seeded.bucket_id, "Cutover");
        input.vendor_system = Some("SAP".to_string());
        input.status_by_day.insert("2025-01-05".to_string(), "Done".to_string());

        let created = service.create(input).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.vendor_system.as_deref(), Some("SAP"));
        assert_eq!(fetched.status_on(day(5)), "Done");
        assert_eq!(fetched.order, 1);
    }

    #[tokio::test]
    async fn test_missing_bucket_is_invalid_reference() {
        let service = TaskService::new(setup_test_db().await);
        let err = service.create(task(12, "Orphan")).await.unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidReference {
                entity: EntityKind::TaskBucket,
                id: 12
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_team_is_invalid_reference() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let service = TaskService::new(db);

        let mut input = task(seeded.bucket_id, "Cutover");
        input.team_id = Some(31);
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidReference {
                entity: EntityKind::Team,
                id: 31
            }
        ));
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let service = TaskService::new(db);

        let mut input = task(seeded.bucket_id, "Cutover");
        input.start_date = day(9);
        input.end_date = day(2);
        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, TrackerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_update_without_order_keeps_position() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let service = TaskService::new(db);
        service.create(task(seeded.bucket_id, "First")).await.unwrap();
        let second = service.create(task(seeded.bucket_id, "Second")).await.unwrap();
        assert_eq!(second.order, 2);

        let mut patch = task(seeded.bucket_id, "Second, renamed");
        patch.status_by_day.insert("2025-01-02".to_string(), "done".to_string());
        let updated = service.update(second.id, patch).await.unwrap();
        assert_eq!(updated.order, 2);
        assert_eq!(updated.subject, "Second, renamed");
        assert!(updated.is_done_on(day(2)));
    }

    #[tokio::test]
    async fn test_filter_by_team() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let team = TeamService::new(db.clone())
            .create(NewTeam {
                name: "Ops".to_string(),
                email_to: None,
                email_cc: None,
            })
            .await
            .unwrap();
        let service = TaskService::new(db);

        let mut owned = task(seeded.bucket_id, "Owned");
        owned.team_id = Some(team.id);
        let owned = service.create(owned).await.unwrap();
        service.create(task(seeded.bucket_id, "Unowned")).await.unwrap();

        let listed = service
            .list(
                TaskFilter {
                    team_id: Some(team.id),
                    ..Default::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(listed, vec![owned]);
    }

    #[tokio::test]
    async fn test_bucket_with_task_cannot_be_deleted() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let service = TaskService::new(db.clone());
        let buckets = TaskBucketService::new(db);
        let created = service.create(task(seeded.bucket_id, "Blocker")).await.unwrap();

        let err = buckets.delete(seeded.bucket_id).await.unwrap_err();
        assert!(matches!(err, TrackerError::Conflict(_)));
        assert!(buckets.get(seeded.bucket_id).await.is_ok());

        service.delete(created.id).await.unwrap();
        buckets.delete(seeded.bucket_id).await.unwrap();
        assert!(buckets.get(seeded.bucket_id).await.unwrap_err().is_not_found());
    }
}
