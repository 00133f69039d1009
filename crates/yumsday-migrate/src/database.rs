//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations have run before any other operation can reach it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::applier::MigrateOptions;
use crate::error::Result;
use crate::migrate::migrate_with;
use crate::script::MigrationReport;
use crate::source::ScriptSource;
use crate::version::VersionStore;

/// Connection settings applied before migrating.
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// How long a statement waits on a database locked by another process.
    pub busy_timeout: Duration,
    pub migrate: MigrateOptions,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            migrate: MigrateOptions::default(),
        }
    }
}

/// Wrapper around a migrated [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    report: MigrationReport,
}

impl Database {
    /// Open (or create) the database at `path` and migrate it.
    pub fn open_at<S: ScriptSource + ?Sized>(
        path: &Path,
        source: &S,
        options: &OpenOptions,
    ) -> Result<Self> {
        tracing::info!(path = %path.display(), "opening database");

        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare(conn, source, options)
    }

    /// Open a private in-memory database and migrate it.
    pub fn open_in_memory<S: ScriptSource + ?Sized>(source: &S) -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, source, &OpenOptions::default())
    }

    fn prepare<S: ScriptSource + ?Sized>(
        conn: Connection,
        source: &S,
        options: &OpenOptions,
    ) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)?;

        // Migrations run with foreign keys off so table rebuilds do not cascade.
        let report = migrate_with(&conn, source, &options.migrate)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self { conn, report })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// What the migration run at open time did.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.report
    }

    /// Currently recorded schema version.
    pub fn schema_version(&self) -> Result<i64> {
        VersionStore::new(&self.conn).current_version()
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
