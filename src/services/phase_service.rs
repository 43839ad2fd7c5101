use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "server")]
use utoipa::ToSchema;

use crate::database::entities::project_phases;
use crate::errors::{TrackerError, TrackerResult};
use crate::services::hierarchy::{self, EntityKind};
use crate::services::ordering::{self, OrderScope};
use crate::services::store::{EntityStore, Page};
use crate::services::validation::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct NewPhase {
    pub project_id: i32,
    pub label: String,
    pub date: Option<NaiveDate>,
    /// Defaults to the next position in the project
    pub order: Option<i32>,
}

/// Sparse update; absent fields keep their stored value
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(ToSchema))]
pub struct PhasePatch {
    pub label: Option<String>,
    pub date: Option<NaiveDate>,
    pub order: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseFilter {
    pub project_id: Option<i32>,
}

pub struct PhaseService {
    db: DatabaseConnection,
}

impl PhaseService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Phases of one project; `NotFound` when the project does not exist
    pub async fn list_by_project(
        &self,
        project_id: i32,
        page: Page,
    ) -> TrackerResult<Vec<project_phases::Model>> {
        hierarchy::ensure_exists(&self.db, EntityKind::Project, project_id).await?;
        self.list(
            PhaseFilter {
                project_id: Some(project_id),
            },
            page,
        )
        .await
    }

    /// Rewrites the project's phase orders to `1..=N`
    pub async fn renumber(&self, project_id: i32) -> TrackerResult<Vec<project_phases::Model>> {
        let txn = self.db.begin().await?;
        ordering::renumber(&txn, OrderScope::Project(project_id)).await?;
        txn.commit().await?;

        self.list(
            PhaseFilter {
                project_id: Some(project_id),
            },
            Page::new(None, None),
        )
        .await
    }
}

#[async_trait]
impl EntityStore for PhaseService {
    type Model = project_phases::Model;
    type New = NewPhase;
    type Patch = PhasePatch;
    type Filter = PhaseFilter;

    const KIND: EntityKind = EntityKind::ProjectPhase;

    async fn create(&self, input: NewPhase) -> TrackerResult<project_phases::Model> {
        ValidationService::validate_name(Self::KIND, &input.label)?;

        let txn = self.db.begin().await?;
        hierarchy::validate_parent(&txn, EntityKind::Project, input.project_id).await?;
        let order =
            ordering::assign_order(&txn, OrderScope::Project(input.project_id), input.order)
                .await?;

        let phase = project_phases::ActiveModel {
            project_id: Set(input.project_id),
            label: Set(input.label),
            date: Set(input.date),
            order: Set(order),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!(
            "Created phase {} in project {} at order {}",
            phase.id, phase.project_id, phase.order
        );
        Ok(phase)
    }

    async fn get(&self, id: i32) -> TrackerResult<project_phases::Model> {
        project_phases::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))
    }

    async fn list(
        &self,
        filter: PhaseFilter,
        page: Page,
    ) -> TrackerResult<Vec<project_phases::Model>> {
        let mut query = project_phases::Entity::find();
        if let Some(project_id) = filter.project_id {
            query = query.filter(project_phases::Column::ProjectId.eq(project_id));
        }

        let phases = query
            .order_by_asc(project_phases::Column::Order)
            .order_by_asc(project_phases::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await?;
        Ok(phases)
    }

    async fn update(&self, id: i32, patch: PhasePatch) -> TrackerResult<project_phases::Model> {
        if let Some(label) = &patch.label {
            ValidationService::validate_name(Self::KIND, label)?;
        }

        let txn = self.db.begin().await?;
        let phase = project_phases::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TrackerError::not_found(Self::KIND, id))?;

        let mut active: project_phases::ActiveModel = phase.into();
        if let Some(label) = patch.label {
            active.label = Set(label);
        }
        if let Some(date) = patch.date {
            active.date = Set(Some(date));
        }
        if let Some(order) = patch.order {
            active.order = Set(order);
        }
        let phase = active.update(&txn).await?;
        txn.commit().await?;

        Ok(phase)
    }

    /// Removes the phase with its buckets, their tasks and snapshots
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
    use crate::database::test_utils::setup_test_db;
    use crate::services::project_service::{NewProject, ProjectService};

    async fn project(db: &DatabaseConnection, name: &str) -> i32 {
        ProjectService::new(db.clone())
            .create(NewProject {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .id
    }

    fn phase(project_id: i32, label: &str) -> NewPhase {
        NewPhase {
            project_id,
            label: label.to_string(),
            date: None,
            order: None,
        }
    }

    #[tokio::test]
    async fn test_orders_follow_creation_per_project() {
        let db = setup_test_db().await;
        let service = PhaseService::new(db.clone());
        let alpha = project(&db, "Alpha").await;
        let beta = project(&db, "Beta").await;

        let orders = [
            service.create(phase(alpha, "Plan")).await.unwrap().order,
            service.create(phase(alpha, "Build")).await.unwrap().order,
            service.create(phase(beta, "Plan")).await.unwrap().order,
            service.create(phase(alpha, "Ship")).await.unwrap().order,
        ];
        assert_eq!(orders, [1, 2, 1, 3]);
    }

    #[tokio::test]
    async fn test_missing_project_is_invalid_reference() {
        let service = PhaseService::new(setup_test_db().await);
        let err = service.create(phase(77, "Plan")).await.unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidReference {
                entity: EntityKind::Project,
                id: 77
            }
        ));
    }

    #[tokio::test]
    async fn test_list_sorts_by_order_then_id() {
        let db = setup_test_db().await;
        let service = PhaseService::new(db.clone());
        let alpha = project(&db, "Alpha").await;

        let late = service
            .create(NewPhase {
                order: Some(9),
                ..phase(alpha, "Late")
            })
            .await
            .unwrap();
        let first = service.create(phase(alpha, "First")).await.unwrap();
        let tie = service
            .create(NewPhase {
                order: Some(first.order),
                ..phase(alpha, "Tie")
            })
            .await
            .unwrap();

        let listed = service.list_by_project(alpha, Page::default()).await.unwrap();
        let ids: Vec<i32> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first.id, tie.id, late.id]);
    }

    #[tokio::test]
    async fn test_sparse_patch_keeps_absent_fields() {
        let db = setup_test_db().await;
        let service = PhaseService::new(db.clone());
        let alpha = project(&db, "Alpha").await;
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let created = service
            .create(NewPhase {
                date: Some(date),
                ..phase(alpha, "Plan")
            })
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                PhasePatch {
                    order: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.label, "Plan");
        assert_eq!(updated.date, Some(date));
        assert_eq!(updated.order, 5);
    }

    #[tokio::test]
    async fn test_list_by_missing_project_is_not_found() {
        let service = PhaseService::new(setup_test_db().await);
        let err = service.list_by_project(5, Page::default()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_leaves_gap_until_renumbered() {
        let db = setup_test_db().await;
        let service = PhaseService::new(db.clone());
        let alpha = project(&db, "Alpha").await;
        let first = service.create(phase(alpha, "One")).await.unwrap();
        service.create(phase(alpha, "Two")).await.unwrap();
        service.create(phase(alpha, "Three")).await.unwrap();

        service.delete(first.id).await.unwrap();
        let orders: Vec<i32> = service
            .list_by_project(alpha, Page::default())
            .await
            .unwrap()
            .iter()
            .map(|p| p.order)
            .collect();
        assert_eq!(orders, vec![2, 3]);

        let renumbered = service.renumber(alpha).await.unwrap();
        let orders: Vec<i32> = renumbered.iter().map(|p| p.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
