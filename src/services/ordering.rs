//! Sibling ordering within a parent scope
//!
//! New rows get `count(siblings) + 1`. Deletes leave gaps; only [`renumber`]
//! rewrites a scope into the dense sequence `1..=N`. Explicit `order` values
//! from callers are stored as given, so ties are possible and are broken by
//! primary key when reading.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::debug;

use crate::database::entities::{project_phases, task_buckets, tasks};
use crate::errors::TrackerResult;
use crate::services::hierarchy::{self, EntityKind};

/// The parent under which sibling `order` values are compared
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderScope {
    /// Phases of a project
    Project(i32),
    /// Buckets of a phase
    Phase(i32),
    /// Tasks of a bucket
    Bucket(i32),
}

impl OrderScope {
    /// Kind of the row that owns the scope
    pub fn parent_kind(self) -> EntityKind {
        match self {
            OrderScope::Project(_) => EntityKind::Project,
            OrderScope::Phase(_) => EntityKind::ProjectPhase,
            OrderScope::Bucket(_) => EntityKind::TaskBucket,
        }
    }

    pub fn parent_id(self) -> i32 {
        match self {
            OrderScope::Project(id) | OrderScope::Phase(id) | OrderScope::Bucket(id) => id,
        }
    }
}

/// Number of rows currently in the scope
pub async fn sibling_count<C: ConnectionTrait>(conn: &C, scope: OrderScope) -> TrackerResult<u64> {
    let count = match scope {
        OrderScope::Project(id) => {
            project_phases::Entity::find()
                .filter(project_phases::Column::ProjectId.eq(id))
                .count(conn)
                .await?
        }
        OrderScope::Phase(id) => {
            task_buckets::Entity::find()
                .filter(task_buckets::Column::PhaseId.eq(id))
                .count(conn)
                .await?
        }
        OrderScope::Bucket(id) => {
            tasks::Entity::find()
                .filter(tasks::Column::TaskBucketId.eq(id))
                .count(conn)
                .await?
        }
    };
    Ok(count)
}

/// Order value for the next row created in `scope`
pub async fn next_order<C: ConnectionTrait>(conn: &C, scope: OrderScope) -> TrackerResult<i32> {
    let count = sibling_count(conn, scope).await?;
    Ok(i32::try_from(count).unwrap_or(i32::MAX - 1) + 1)
}

/// The caller's explicit order if given, otherwise [`next_order`]
pub async fn assign_order<C: ConnectionTrait>(
    conn: &C,
    scope: OrderScope,
    requested: Option<i32>,
) -> TrackerResult<i32> {
    match requested {
        Some(order) => Ok(order),
        None => next_order(conn, scope).await,
    }
}

/// Rewrites the scope to `1..=N`, keeping the current (order, id) sequence
///
/// Returns the number of rows whose order changed. The scope parent must exist.
pub async fn renumber<C: ConnectionTrait>(conn: &C, scope: OrderScope) -> TrackerResult<u64> {
    hierarchy::ensure_exists(conn, scope.parent_kind(), scope.parent_id()).await?;

    let mut changed = 0;
    match scope {
        OrderScope::Project(id) => {
            let phases = project_phases::Entity::find()
                .filter(project_phases::Column::ProjectId.eq(id))
                .order_by_asc(project_phases::Column::Order)
                .order_by_asc(project_phases::Column::Id)
                .all(conn)
                .await?;
            for (position, phase) in (1..).zip(phases) {
                if phase.order != position {
                    let mut active: project_phases::ActiveModel = phase.into();
                    active.order = Set(position);
                    active.update(conn).await?;
                    changed += 1;
                }
            }
        }
        OrderScope::Phase(id) => {
            let buckets = task_buckets::Entity::find()
                .filter(task_buckets::Column::PhaseId.eq(id))
                .order_by_asc(task_buckets::Column::Order)
                .order_by_asc(task_buckets::Column::Id)
                .all(conn)
                .await?;
            for (position, bucket) in (1..).zip(buckets) {
                if bucket.order != position {
                    let mut active: task_buckets::ActiveModel = bucket.into();
                    active.order = Set(position);
                    active.update(conn).await?;
                    changed += 1;
                }
            }
        }
        OrderScope::Bucket(id) => {
            let siblings = tasks::Entity::find()
                .filter(tasks::Column::TaskBucketId.eq(id))
                .order_by_asc(tasks::Column::Order)
                .order_by_asc(tasks::Column::Id)
                .all(conn)
                .await?;
            for (position, task) in (1..).zip(siblings) {
                if task.order != position {
                    let mut active: tasks::ActiveModel = task.into();
                    active.order = Set(position);
                    active.update(conn).await?;
                    changed += 1;
                }
            }
        }
    }

    debug!("Renumbered {:?}: {} row(s) moved", scope, changed);
    Ok(changed)
}
