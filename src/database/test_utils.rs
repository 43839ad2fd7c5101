use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use super::entities::{project_phases, projects, task_buckets};

/// In-memory SQLite with the schema applied
///
/// The pool is pinned to a single connection because every new connection to
/// `:memory:` opens a fresh, empty database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("Failed to connect to test database");

    super::setup_database(&db)
        .await
        .expect("Failed to run migrations");

    db
}

/// Ids of a freshly inserted project → phase → bucket chain
pub struct SeededBucket {
    pub project_id: i32,
    pub phase_id: i32,
    pub bucket_id: i32,
}

/// Inserts one project named `project_name` with a single phase and bucket
pub async fn seed_bucket(db: &DatabaseConnection, project_name: &str) -> SeededBucket {
    let project = projects::ActiveModel {
        name: Set(project_name.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert project");

    let phase = project_phases::ActiveModel {
        project_id: Set(project.id),
        label: Set("Phase 1".to_string()),
        date: Set(None),
        order: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert phase");

    let bucket = task_buckets::ActiveModel {
        phase_id: Set(phase.id),
        name: Set("Backlog".to_string()),
        order: Set(1),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert bucket");

    SeededBucket {
        project_id: project.id,
        phase_id: phase.id,
        bucket_id: bucket.id,
    }
}
