use thiserror::Error;

/// Errors produced by the migration engine.
///
/// Every variant identifies the phase that failed and, where it applies, the
/// script involved, so a caller can report the failure without extra logging.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A file in the migration source does not match `<version>_<name>.sql`.
    #[error("Failed to load migrations: cannot parse migration version and name from filename {file}")]
    LoadFormat { file: String },

    /// Two files in the migration source parse to the same version.
    #[error("Failed to load migrations: duplicate migration version {version} in {first} and {second}")]
    DuplicateVersion {
        version: i64,
        first: String,
        second: String,
    },

    /// The migration source could not be listed, or a file could not be read.
    #[error("Failed to load migrations: cannot read {path}: {source}")]
    SourceRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The `_migration_version` table could not be created or seeded.
    #[error("Failed to initialize migration version: {source}")]
    VersionInit {
        #[source]
        source: rusqlite::Error,
    },

    /// The `_migration_version` row could not be read.
    #[error("Failed to get current migration version: {source}")]
    VersionRead {
        #[source]
        source: rusqlite::Error,
    },

    /// A migration script failed to execute.
    #[error("Failed to apply migration {version}_{name}: {source}")]
    ScriptExec {
        version: i64,
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A script issued its own `COMMIT`/`END`/`ROLLBACK` inside the per-script
    /// transaction. Statements before that point may already be committed.
    #[error("Failed to apply migration {version}_{name}: script ended the migration transaction, run it with transactional = false")]
    TransactionEnded { version: i64, name: String },

    /// A script executed but its version could not be recorded.
    #[error("Failed to update migration version to {version}: {source}")]
    VersionPersist {
        version: i64,
        #[source]
        source: rusqlite::Error,
    },

    /// SQLite error outside the migration phases (opening, pragmas).
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl MigrateError {
    /// Short name of the phase that produced this error, for log fields.
    pub fn phase(&self) -> &'static str {
        match self {
            MigrateError::LoadFormat { .. }
            | MigrateError::DuplicateVersion { .. }
            | MigrateError::SourceRead { .. } => "load",
            MigrateError::VersionInit { .. } => "initialize",
            MigrateError::VersionRead { .. } => "read-version",
            MigrateError::ScriptExec { .. }
            | MigrateError::TransactionEnded { .. }
            | MigrateError::VersionPersist { .. } => "apply",
            MigrateError::Sqlite(_) => "database",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MigrateError>;
