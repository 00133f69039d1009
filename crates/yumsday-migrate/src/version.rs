//! Version store: the single-row `_migration_version` table.
//!
//! The table holds the version of the last successfully applied script, or
//! [`SENTINEL_VERSION`] when nothing has been applied yet. Nothing else in the
//! crate touches the table directly.

use rusqlite::{params, Connection};

use crate::error::{MigrateError, Result};

/// Name of the metadata table.
pub const VERSION_TABLE: &str = "_migration_version";

/// Recorded version of a database on which no script has run.
pub const SENTINEL_VERSION: i64 = -1;

const CREATE_SQL: &str =
    "CREATE TABLE _migration_version (version INTEGER NOT NULL UNIQUE PRIMARY KEY);";

/// Narrow handle over the metadata table of one connection.
pub struct VersionStore<'a> {
    conn: &'a Connection,
}

impl<'a> VersionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create and seed the metadata table unless it is already readable.
    ///
    /// Safe to call on every startup. If a table with the same name but an
    /// incompatible shape exists, creation fails and the error is fatal.
    pub fn ensure_initialized(&self) -> Result<()> {
        if let Ok(version) = self.current_version() {
            tracing::debug!(version, "migration version table already initialized");
            return Ok(());
        }

        tracing::info!(
            version = SENTINEL_VERSION,
            "initializing migration version table"
        );

        self.conn
            .execute_batch(CREATE_SQL)
            .map_err(|e| MigrateError::VersionInit { source: e })?;

        self.conn
            .execute(
                "INSERT INTO _migration_version (version) VALUES (?1)",
                params![SENTINEL_VERSION],
            )
            .map_err(|e| MigrateError::VersionInit { source: e })?;

        Ok(())
    }

    /// Read the recorded version.
    pub fn current_version(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT version FROM _migration_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .map_err(|e| MigrateError::VersionRead { source: e })
    }

    /// Whether the metadata table exists, without creating it.
    pub fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![VERSION_TABLE],
                |row| row.get(0),
            )
            .map_err(|e| MigrateError::VersionRead { source: e })?;
        Ok(count > 0)
    }

    /// Overwrite the recorded version.
    pub(crate) fn set_version(&self, version: i64) -> Result<()> {
        let affected = self
            .conn
            .execute(
                "UPDATE _migration_version SET version = ?1",
                params![version],
            )
            .map_err(|e| MigrateError::VersionPersist { version, source: e })?;

        // Zero rows means the seed row is gone; the version was not recorded.
        if affected == 0 {
            return Err(MigrateError::VersionPersist {
                version,
                source: rusqlite::Error::QueryReturnedNoRows,
            });
        }
        Ok(())
    }
}
