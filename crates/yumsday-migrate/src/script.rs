//! Migration scripts and the ordered set produced by the loader.

use serde::Serialize;

// ---------------------------------------------------------------------------
// MigrationScript
// ---------------------------------------------------------------------------

/// One versioned unit of schema change, parsed from `<version>_<name>.sql`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    /// Non-negative version taken from the filename prefix.
    pub version: i64,
    /// Slug after the first underscore, used for diagnostics only.
    pub name: String,
    /// Raw SQL, executed verbatim as a batch.
    pub body: String,
}

impl MigrationScript {
    pub fn new(version: i64, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            body: body.into(),
        }
    }

    /// `<version>_<name>`, the form used in logs and error messages.
    pub fn label(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }
}

// ---------------------------------------------------------------------------
// MigrationSet
// ---------------------------------------------------------------------------

/// Scripts in application order.
///
/// The loader always returns a set sorted by ascending version. Sets built
/// by hand through [`MigrationSet::from_scripts`] keep the order they were
/// given, and the applier honors that order as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSet {
    scripts: Vec<MigrationScript>,
}

impl MigrationSet {
    pub fn from_scripts(scripts: Vec<MigrationScript>) -> Self {
        Self { scripts }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MigrationScript> {
        self.scripts.iter()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Highest version in the set, if any.
    pub fn latest_version(&self) -> Option<i64> {
        self.scripts.iter().map(|s| s.version).max()
    }

    /// Scripts that a database at `current_version` has not applied yet.
    pub fn newer_than(&self, current_version: i64) -> Vec<&MigrationScript> {
        self.scripts
            .iter()
            .filter(|s| s.version > current_version)
            .collect()
    }

    pub fn into_vec(self) -> Vec<MigrationScript> {
        self.scripts
    }
}

impl<'a> IntoIterator for &'a MigrationSet {
    type Item = &'a MigrationScript;
    type IntoIter = std::slice::Iter<'a, MigrationScript>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// A script that was executed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub elapsed_ms: u64,
}

/// Outcome of a successful [`crate::migrate`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Recorded version before the run (`-1` on a fresh database).
    pub from_version: i64,
    /// Recorded version after the run.
    pub to_version: i64,
    /// Scripts executed by this run, in application order.
    pub applied: Vec<AppliedMigration>,
    /// Scripts skipped because they were already applied.
    pub skipped: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}
