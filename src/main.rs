use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use taskboard::config::ServerConfig;
use taskboard::database::DEFAULT_DATABASE_PATH;
use taskboard::server;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending migrations and serve the HTTP API
    Serve {
        /// YAML file with server settings; flags below override it
        #[clap(short, long)]
        config: Option<PathBuf>,
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(long)]
        host: Option<String>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init {
        #[clap(short, long, default_value = DEFAULT_DATABASE_PATH)]
        database: String,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, default_value = DEFAULT_DATABASE_PATH)]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Serve {
            config,
            port,
            host,
            database,
            cors_origin,
        } => {
            let mut settings = ServerConfig::load(config.as_deref())?;
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(database) = database {
                settings.database = database;
            }
            if cors_origin.is_some() {
                settings.cors_origin = cors_origin;
            }
            if let Some(level) = args.log_level {
                settings.log_level = level;
            }

            setup_logging(&settings.log_level);
            info!(
                "Starting server on {} with database {}",
                settings.bind_address(),
                settings.database
            );
            server::start_server(&settings).await?;
        }
        Commands::Db { command } => {
            setup_logging(args.log_level.as_deref().unwrap_or("info"));
            match command {
                DbCommands::Init { database } => {
                    info!("Initializing database: {}", database);
                    server::init_database(&database).await?;
                }
                DbCommands::Migrate {
                    direction,
                    database,
                } => {
                    info!("Migrating database {}: {:?}", database, direction);
                    server::migrate_database(&database, direction).await?;
                }
            }
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // sqlx logs every statement at info
    let directives = if level == Level::TRACE {
        level.to_string()
    } else {
        format!("sqlx=warn,{}", level)
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .without_time()
        .init();
}
