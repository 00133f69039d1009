//! Migration applier: executes unapplied scripts and advances the version.

use std::time::Instant;

use rusqlite::Connection;

use crate::error::{MigrateError, Result};
use crate::script::{AppliedMigration, MigrationScript, MigrationSet};
use crate::version::VersionStore;

/// Knobs for a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Run each script and its version update in one transaction.
    ///
    /// Scripts that issue their own `BEGIN`/`COMMIT` need this off; a script
    /// that ends the transaction is reported as
    /// [`MigrateError::TransactionEnded`]. When off, a failed version update
    /// leaves the script applied but unrecorded, and the next run executes it
    /// again.
    ///
    /// Pragmas that are no-ops inside a transaction (`foreign_keys`) only take
    /// effect in scripts run with this off.
    pub transactional: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            transactional: true,
        }
    }
}

/// What [`apply`] did.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    pub applied: Vec<AppliedMigration>,
    pub skipped: usize,
}

/// Apply every script newer than `current_version`, in the order given.
///
/// Stops at the first failure. Scripts applied before the failure stay
/// applied and recorded.
pub fn apply(
    conn: &Connection,
    scripts: &MigrationSet,
    current_version: i64,
    options: &MigrateOptions,
) -> Result<ApplyOutcome> {
    let mut outcome = ApplyOutcome::default();

    for script in scripts {
        if script.version <= current_version {
            tracing::debug!(
                version = script.version,
                name = %script.name,
                "skipping already applied migration"
            );
            outcome.skipped += 1;
            continue;
        }

        tracing::info!(version = script.version, name = %script.name, "applying migration");
        let started = Instant::now();

        if options.transactional {
            apply_in_transaction(conn, script)?;
        } else {
            apply_unwrapped(conn, script)?;
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            version = script.version,
            name = %script.name,
            elapsed_ms,
            "successfully applied migration"
        );

        outcome.applied.push(AppliedMigration {
            version: script.version,
            name: script.name.clone(),
            elapsed_ms,
        });
    }

    Ok(outcome)
}

fn exec_error(script: &MigrationScript, source: rusqlite::Error) -> MigrateError {
    MigrateError::ScriptExec {
        version: script.version,
        name: script.name.clone(),
        source,
    }
}

// Dropping `tx` on an early return rolls back both the script and the update.
fn apply_in_transaction(conn: &Connection, script: &MigrationScript) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| exec_error(script, e))?;

    let executed = tx.execute_batch(&script.body);

    // The script closed our transaction itself; nothing after this point would be atomic.
    if tx.is_autocommit() {
        return Err(MigrateError::TransactionEnded {
            version: script.version,
            name: script.name.clone(),
        });
    }
    executed.map_err(|e| exec_error(script, e))?;

    VersionStore::new(&tx).set_version(script.version)?;

    tx.commit().map_err(|e| MigrateError::VersionPersist {
        version: script.version,
        source: e,
    })
}

fn apply_unwrapped(conn: &Connection, script: &MigrationScript) -> Result<()> {
    conn.execute_batch(&script.body)
        .map_err(|e| exec_error(script, e))?;

    // The script is live from here on; a failed update means it re-runs next time.
    VersionStore::new(conn).set_version(script.version)
}
