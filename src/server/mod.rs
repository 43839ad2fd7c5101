pub mod app;
pub mod error;
pub mod handlers;
pub mod openapi;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::ServerConfig;
use crate::database::{establish_connection, get_database_url, migrations::Migrator};

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(config: &ServerConfig) -> Result<()> {
    let database_url = get_database_url(Some(&config.database));
    let db = establish_connection(&database_url).await?;

    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let app = app::create_app(db, config.cors_origin.as_deref()).await?;

    log_routes(config.port);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(address.as_str()).await?;
    info!("Server running on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(port: u16) {
    info!("API Endpoints (port {}):", port);
    info!("  /health                          - Health check");
    info!("  /api-docs/openapi.json           - OpenAPI document");
    info!("  /teams, /subsystems, /projects   - CRUD");
    info!("  /phases, /task-buckets, /tasks   - CRUD with sibling ordering");
    info!("  /phases/by-project/:id           - Phases of one project");
    info!("  .../by-*/:id/renumber            - Rewrite sibling order to 1..N");
    info!("  /task-snapshots                  - Status history, /capture for a whole day");
    info!("  /daily-summary?date_query=       - Completed/pending tasks for a day");
    info!("  /import-excel                    - Bulk xlsx import (multipart 'file')");
}

pub async fn init_database(database_path: &str) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database initialized at {}", database_path);
    Ok(())
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (drop all then up)");
            Migrator::fresh(&db).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
