//! # yumsday-server
//!
//! Backend server for the Yumsday meal-planning application.
//!
//! On startup the SQLite database is opened and brought to the latest schema
//! version before the HTTP listener accepts any connection. A failed migration
//! aborts startup.

mod api;
mod config;
mod error;
mod migrations;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use yumsday_migrate::{Database, DirSource, MigrateOptions, OpenOptions};

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,yumsday_server=debug,yumsday_migrate=debug")
        }))
        .init();

    info!("Starting Yumsday server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open and migrate the database (blocks until done)
    // -----------------------------------------------------------------------
    let options = OpenOptions {
        busy_timeout: config.busy_timeout,
        migrate: MigrateOptions {
            transactional: config.migrate_transactional,
        },
    };

    let db = match &config.migrations_dir {
        Some(dir) => Database::open_at(&config.database_path, &DirSource::new(dir), &options),
        None => Database::open_at(&config.database_path, &migrations::embedded(), &options),
    }
    .with_context(|| {
        format!(
            "failed to open and migrate {}",
            config.database_path.display()
        )
    })?;

    let report = db.migration_report();
    info!(
        from_version = report.from_version,
        to_version = report.to_version,
        applied = report.applied.len(),
        "Database ready"
    );

    let app_state = AppState {
        db: Arc::new(Mutex::new(db)),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
