//! # yumsday-migrate
//!
//! Versioned SQL schema migrations for the Yumsday SQLite database.
//!
//! Scripts named `<version>_<name>.sql` are loaded from a [`ScriptSource`],
//! sorted by version, and every script newer than the version recorded in
//! the `_migration_version` table is executed once. The recorded version is
//! advanced after each script.
//!
//! ```ignore
//! let conn = rusqlite::Connection::open("yumsday.db")?;
//! let report = yumsday_migrate::migrate(&conn, &DirSource::new("migrations"))?;
//! ```

pub mod applier;
pub mod database;
pub mod loader;
pub mod migrate;
pub mod script;
pub mod source;
pub mod version;

mod error;

pub use applier::MigrateOptions;
pub use database::{Database, OpenOptions};
pub use error::{MigrateError, Result};
pub use migrate::{migrate, migrate_with, pending};
pub use script::{AppliedMigration, MigrationReport, MigrationScript, MigrationSet};
pub use source::{DirSource, EmbeddedSource, EntryKind, MemorySource, ScriptSource, SourceEntry};
pub use version::{VersionStore, SENTINEL_VERSION, VERSION_TABLE};
