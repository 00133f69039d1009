//! Public entry points: [`migrate`], [`migrate_with`] and [`pending`].

use rusqlite::Connection;

use crate::applier::{self, MigrateOptions};
use crate::error::Result;
use crate::loader;
use crate::script::{MigrationReport, MigrationScript};
use crate::source::ScriptSource;
use crate::version::{VersionStore, SENTINEL_VERSION};

/// Bring `conn` up to the latest script in `source`.
///
/// Scripts must sit at the root of the source and be named
/// `<version>_<name>.sql`, e.g. `1_db-creation.sql`. Subdirectories are
/// ignored with a warning.
///
/// The version of the last applied script is kept in the `_migration_version`
/// table; later calls only apply scripts with a greater version. Call this
/// once at startup, before the database is used for anything else, and treat
/// an error as fatal.
pub fn migrate<S: ScriptSource + ?Sized>(conn: &Connection, source: &S) -> Result<MigrationReport> {
    migrate_with(conn, source, &MigrateOptions::default())
}

/// [`migrate`] with explicit options.
pub fn migrate_with<S: ScriptSource + ?Sized>(
    conn: &Connection,
    source: &S,
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    tracing::info!(source = %source.describe(), "starting database migration");

    let result = run(conn, source, options);
    match &result {
        Ok(report) => tracing::info!(
            from_version = report.from_version,
            to_version = report.to_version,
            applied = report.applied.len(),
            "database migration completed successfully"
        ),
        Err(e) => tracing::error!(phase = e.phase(), error = %e, "database migration failed"),
    }
    result
}

fn run<S: ScriptSource + ?Sized>(
    conn: &Connection,
    source: &S,
    options: &MigrateOptions,
) -> Result<MigrationReport> {
    // Load everything first: a bad batch must not touch the database at all.
    let scripts = loader::load(source)?;

    let store = VersionStore::new(conn);
    store.ensure_initialized()?;

    let from_version = store.current_version()?;
    tracing::info!(version = from_version, "current database migration version");

    let outcome = applier::apply(conn, &scripts, from_version, options)?;

    let to_version = outcome
        .applied
        .last()
        .map(|m| m.version)
        .unwrap_or(from_version);

    Ok(MigrationReport {
        from_version,
        to_version,
        applied: outcome.applied,
        skipped: outcome.skipped,
    })
}

/// Scripts in `source` that [`migrate`] would apply, without touching the
/// database. An uninitialized database counts as being at the sentinel.
pub fn pending<S: ScriptSource + ?Sized>(
    conn: &Connection,
    source: &S,
) -> Result<Vec<MigrationScript>> {
    let scripts = loader::load(source)?;

    let store = VersionStore::new(conn);
    let current = if store.is_initialized()? {
        store.current_version()?
    } else {
        SENTINEL_VERSION
    };

    Ok(scripts.newer_than(current).into_iter().cloned().collect())
}
