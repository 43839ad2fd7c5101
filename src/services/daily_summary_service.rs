//! Per-day completed/pending partition of the active tasks

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::tasks;
use crate::errors::TrackerResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailySummaryQuery {
    pub date: NaiveDate,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct DailySummary {
    pub date: NaiveDate,
    pub subsystem_id: Option<i32>,
    pub team_id: Option<i32>,
    #[cfg_attr(feature = "server", schema(value_type = Vec<crate::database::entities::Task>))]
    pub completed_tasks: Vec<tasks::Model>,
    #[cfg_attr(feature = "server", schema(value_type = Vec<crate::database::entities::Task>))]
    pub pending_tasks: Vec<tasks::Model>,
}

/// Tasks whose inclusive date range covers `query.date`, by primary key
pub async fn active_tasks<C: ConnectionTrait>(
    conn: &C,
    query: &DailySummaryQuery,
) -> TrackerResult<Vec<tasks::Model>> {
    let mut select = tasks::Entity::find()
        .filter(tasks::Column::StartDate.lte(query.date))
        .filter(tasks::Column::EndDate.gte(query.date));
    if let Some(subsystem_id) = query.subsystem_id {
        select = select.filter(tasks::Column::SubsystemId.eq(subsystem_id));
    }
    if let Some(team_id) = query.team_id {
        select = select.filter(tasks::Column::TeamId.eq(team_id));
    }

    let tasks = select.order_by_asc(tasks::Column::Id).all(conn).await?;
    Ok(tasks)
}

pub struct DailySummaryService {
    db: DatabaseConnection,
}

impl DailySummaryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn summarize(&self, query: DailySummaryQuery) -> TrackerResult<DailySummary> {
        let tasks = active_tasks(&self.db, &query).await?;
        let (completed_tasks, pending_tasks): (Vec<_>, Vec<_>) =
            tasks.into_iter().partition(|task| task.is_done_on(query.date));

        debug!(
            "Daily summary for {}: {} completed, {} pending",
            query.date,
            completed_tasks.len(),
            pending_tasks.len()
        );

        Ok(DailySummary {
            date: query.date,
            subsystem_id: query.subsystem_id,
            team_id: query.team_id,
            completed_tasks,
            pending_tasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::database::test_utils::{seed_bucket, setup_test_db};
    use crate::services::store::EntityStore;
    use crate::services::subsystem_service::{NewSubsystem, SubsystemService};
    use crate::services::task_service::{NewTask, TaskService};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(date: NaiveDate) -> DailySummaryQuery {
        DailySummaryQuery {
            date,
            subsystem_id: None,
            team_id: None,
        }
    }

    async fn seed_task(
        db: &DatabaseConnection,
        bucket_id: i32,
        subsystem_id: Option<i32>,
        statuses: &[(&str, &str)],
    ) -> tasks::Model {
        let status_by_day: BTreeMap<String, String> = statuses
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TaskService::new(db.clone())
            .create(NewTask {
                task_bucket_id: bucket_id,
                subsystem_id,
                team_id: None,
                vendor_system: None,
                subject: "Cutover".to_string(),
                description: "Switch traffic".to_string(),
                detailed_description: None,
                start_date: day(2025, 1, 1),
                end_date: day(2025, 1, 10),
                status_by_day,
                order: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_partition_by_status_for_the_day() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let task = seed_task(&db, seeded.bucket_id, None, &[("2025-01-05", "Done")]).await;
        let service = DailySummaryService::new(db);

        let done_day = service.summarize(query(day(2025, 1, 5))).await.unwrap();
        assert_eq!(done_day.completed_tasks, vec![task.clone()]);
        assert!(done_day.pending_tasks.is_empty());

        let next_day = service.summarize(query(day(2025, 1, 6))).await.unwrap();
        assert!(next_day.completed_tasks.is_empty());
        assert_eq!(next_day.pending_tasks, vec![task]);

        let before = service.summarize(query(day(2024, 12, 31))).await.unwrap();
        assert!(before.completed_tasks.is_empty());
        assert!(before.pending_tasks.is_empty());
    }

    #[tokio::test]
    async fn test_subsystem_filter_and_echo() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let subsystem = SubsystemService::new(db.clone())
            .create(NewSubsystem {
                name: "Billing".to_string(),
            })
            .await
            .unwrap();
        let billing = seed_task(&db, seeded.bucket_id, Some(subsystem.id), &[]).await;
        seed_task(&db, seeded.bucket_id, None, &[]).await;
        let service = DailySummaryService::new(db);

        let summary = service
            .summarize(DailySummaryQuery {
                subsystem_id: Some(subsystem.id),
                ..query(day(2025, 1, 3))
            })
            .await
            .unwrap();
        assert_eq!(summary.subsystem_id, Some(subsystem.id));
        assert_eq!(summary.team_id, None);
        assert_eq!(summary.pending_tasks, vec![billing]);
    }

    #[tokio::test]
    async fn test_lists_follow_primary_key() {
        let db = setup_test_db().await;
        let seeded = seed_bucket(&db, "Alpha").await;
        let first = seed_task(&db, seeded.bucket_id, None, &[("2025-01-02", "DONE")]).await;
        let second = seed_task(&db, seeded.bucket_id, None, &[("2025-01-02", "done")]).await;
        let service = DailySummaryService::new(db);

        let summary = service.summarize(query(day(2025, 1, 2))).await.unwrap();
        let ids: Vec<i32> = summary.completed_tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
