//! Parent validation and delete policy for the Project → Phase → Bucket → Task tree
//!
//! Every function takes the caller's connection or transaction, so the checks and
//! the cascade run inside the same transaction as the write that triggered them.

use std::fmt;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use sea_orm::sea_query::Expr;
use tracing::{debug, warn};

use crate::database::entities::{
    project_phases, projects, subsystems, task_buckets, task_snapshots, tasks, teams,
};
use crate::errors::{TrackerError, TrackerResult};

/// The kinds of rows held by the entity store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Team,
    Subsystem,
    Project,
    ProjectPhase,
    TaskBucket,
    Task,
    TaskStatusSnapshot,
}

/// What deleting a row does to the rows that reference it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Remove every descendant, leaves first, then the row itself
    CascadeChildren,
    /// Refuse with `Conflict` while any child exists
    BlockIfHasChildren,
    /// Null out optional references held by other rows
    OrphanReferences,
}

impl EntityKind {
    pub fn delete_policy(self) -> DeletePolicy {
        match self {
            EntityKind::Project
            | EntityKind::ProjectPhase
            | EntityKind::Task
            | EntityKind::TaskStatusSnapshot => DeletePolicy::CascadeChildren,
            EntityKind::TaskBucket => DeletePolicy::BlockIfHasChildren,
            EntityKind::Team | EntityKind::Subsystem => DeletePolicy::OrphanReferences,
        }
    }

    /// Kind of the owned children, if this kind owns any
    pub fn child(self) -> Option<EntityKind> {
        match self {
            EntityKind::Project => Some(EntityKind::ProjectPhase),
            EntityKind::ProjectPhase => Some(EntityKind::TaskBucket),
            EntityKind::TaskBucket => Some(EntityKind::Task),
            EntityKind::Task => Some(EntityKind::TaskStatusSnapshot),
            EntityKind::Team | EntityKind::Subsystem | EntityKind::TaskStatusSnapshot => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Team => "Team",
            EntityKind::Subsystem => "Subsystem",
            EntityKind::Project => "Project",
            EntityKind::ProjectPhase => "ProjectPhase",
            EntityKind::TaskBucket => "TaskBucket",
            EntityKind::Task => "Task",
            EntityKind::TaskStatusSnapshot => "TaskStatusSnapshot",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a row of `kind` with primary key `id` exists
pub async fn exists<C: ConnectionTrait>(conn: &C, kind: EntityKind, id: i32) -> TrackerResult<bool> {
    let count = match kind {
        EntityKind::Team => teams::Entity::find_by_id(id).count(conn).await?,
        EntityKind::Subsystem => subsystems::Entity::find_by_id(id).count(conn).await?,
        EntityKind::Project => projects::Entity::find_by_id(id).count(conn).await?,
        EntityKind::ProjectPhase => project_phases::Entity::find_by_id(id).count(conn).await?,
        EntityKind::TaskBucket => task_buckets::Entity::find_by_id(id).count(conn).await?,
        EntityKind::Task => tasks::Entity::find_by_id(id).count(conn).await?,
        EntityKind::TaskStatusSnapshot => {
            task_snapshots::Entity::find_by_id(id).count(conn).await?
        }
    };
    Ok(count > 0)
}

/// Fails with `InvalidReference` unless `parent_id` names an existing `parent_kind` row
pub async fn validate_parent<C: ConnectionTrait>(
    conn: &C,
    parent_kind: EntityKind,
    parent_id: i32,
) -> TrackerResult<()> {
    if exists(conn, parent_kind, parent_id).await? {
        Ok(())
    } else {
        Err(TrackerError::invalid_reference(parent_kind, parent_id))
    }
}

/// Same as [`validate_parent`] for optional references
pub async fn validate_optional_parent<C: ConnectionTrait>(
    conn: &C,
    parent_kind: EntityKind,
    parent_id: Option<i32>,
) -> TrackerResult<()> {
    match parent_id {
        Some(id) => validate_parent(conn, parent_kind, id).await,
        None => Ok(()),
    }
}

/// Fails with `NotFound` unless the row exists
pub async fn ensure_exists<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    id: i32,
) -> TrackerResult<()> {
    if exists(conn, kind, id).await? {
        Ok(())
    } else {
        Err(TrackerError::not_found(kind, id))
    }
}

/// Checks the delete policy of `kind` against the current children of `id`
pub async fn check_deletable<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    id: i32,
) -> TrackerResult<()> {
    if kind.delete_policy() != DeletePolicy::BlockIfHasChildren {
        return Ok(());
    }

    let Some(child) = kind.child() else {
        return Ok(());
    };

    let children = child_ids(conn, child, &[id]).await?;
    if children.is_empty() {
        Ok(())
    } else {
        warn!(
            "Refusing to delete {} {}: {} associated {} row(s)",
            kind,
            id,
            children.len(),
            child
        );
        Err(TrackerError::conflict(format!(
            "Cannot delete {} {} with associated {}s",
            kind, id, child
        )))
    }
}

/// Deletes one row according to the delete policy of its kind
///
/// Callers pass an open transaction; nothing here commits.
pub async fn delete_entity<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    id: i32,
) -> TrackerResult<()> {
    ensure_exists(conn, kind, id).await?;
    check_deletable(conn, kind, id).await?;

    match kind.delete_policy() {
        DeletePolicy::CascadeChildren => {
            let levels = collect_descendants(conn, kind, id).await?;
            for (child_kind, ids) in levels.iter().rev() {
                debug!("Cascading delete of {} {} row(s)", ids.len(), child_kind);
                delete_ids(conn, *child_kind, ids).await?;
            }
        }
        DeletePolicy::OrphanReferences => orphan_references(conn, kind, id).await?,
        DeletePolicy::BlockIfHasChildren => {}
    }

    delete_ids(conn, kind, &[id]).await?;
    debug!("Deleted {} {}", kind, id);
    Ok(())
}

/// Descendant ids of a row, one entry per level, nearest level first
async fn collect_descendants<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    id: i32,
) -> TrackerResult<Vec<(EntityKind, Vec<i32>)>> {
    let mut levels = Vec::new();
    let mut parent_ids = vec![id];
    let mut current = kind;

    while let Some(child) = current.child() {
        let ids = child_ids(conn, child, &parent_ids).await?;
        if ids.is_empty() {
            break;
        }
        levels.push((child, ids.clone()));
        parent_ids = ids;
        current = child;
    }

    Ok(levels)
}

/// Ids of `child` rows whose parent id is in `parent_ids`
async fn child_ids<C: ConnectionTrait>(
    conn: &C,
    child: EntityKind,
    parent_ids: &[i32],
) -> TrackerResult<Vec<i32>> {
    let parents = parent_ids.to_vec();
    let ids = match child {
        EntityKind::ProjectPhase => {
            project_phases::Entity::find()
                .select_only()
                .column(project_phases::Column::Id)
                .filter(project_phases::Column::ProjectId.is_in(parents))
                .into_tuple::<i32>()
                .all(conn)
                .await?
        }
        EntityKind::TaskBucket => {
            task_buckets::Entity::find()
                .select_only()
                .column(task_buckets::Column::Id)
                .filter(task_buckets::Column::PhaseId.is_in(parents))
                .into_tuple::<i32>()
                .all(conn)
                .await?
        }
        EntityKind::Task => {
            tasks::Entity::find()
                .select_only()
                .column(tasks::Column::Id)
                .filter(tasks::Column::TaskBucketId.is_in(parents))
                .into_tuple::<i32>()
                .all(conn)
                .await?
        }
        EntityKind::TaskStatusSnapshot => {
            task_snapshots::Entity::find()
                .select_only()
                .column(task_snapshots::Column::Id)
                .filter(task_snapshots::Column::TaskId.is_in(parents))
                .into_tuple::<i32>()
                .all(conn)
                .await?
        }
        EntityKind::Team | EntityKind::Subsystem | EntityKind::Project => Vec::new(),
    };
    Ok(ids)
}

async fn delete_ids<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    ids: &[i32],
) -> TrackerResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let ids = ids.to_vec();
    match kind {
        EntityKind::Team => {
            teams::Entity::delete_many()
                .filter(teams::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::Subsystem => {
            subsystems::Entity::delete_many()
                .filter(subsystems::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::Project => {
            projects::Entity::delete_many()
                .filter(projects::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::ProjectPhase => {
            project_phases::Entity::delete_many()
                .filter(project_phases::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::TaskBucket => {
            task_buckets::Entity::delete_many()
                .filter(task_buckets::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::Task => {
            tasks::Entity::delete_many()
                .filter(tasks::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
        EntityKind::TaskStatusSnapshot => {
            task_snapshots::Entity::delete_many()
                .filter(task_snapshots::Column::Id.is_in(ids))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

/// Clears the optional task references pointing at a team or subsystem
async fn orphan_references<C: ConnectionTrait>(
    conn: &C,
    kind: EntityKind,
    id: i32,
) -> TrackerResult<()> {
    let column = match kind {
        EntityKind::Team => tasks::Column::TeamId,
        EntityKind::Subsystem => tasks::Column::SubsystemId,
        _ => return Ok(()),
    };

    let result = tasks::Entity::update_many()
        .col_expr(column, Expr::value(Option::<i32>::None))
        .filter(column.eq(id))
        .exec(conn)
        .await?;

    if result.rows_affected > 0 {
        debug!(
            "Orphaned {} task reference(s) to {} {}",
            result.rows_affected, kind, id
        );
    }
    Ok(())
}
