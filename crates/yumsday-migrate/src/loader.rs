//! Script loader: turns a [`ScriptSource`] into a sorted [`MigrationSet`].
//!
//! Every root-level file must be named `<version>_<name>.sql`. One malformed
//! name fails the whole load so that no script from a broken batch is ever
//! applied. Directories are skipped with a warning.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MigrateError, Result};
use crate::script::{MigrationScript, MigrationSet};
use crate::source::ScriptSource;

/// Required migration filename shape.
pub const FILENAME_PATTERN: &str = r"^(\d+)_(.+)\.sql$";

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FILENAME_PATTERN).expect("valid migration filename pattern"))
}

/// Split `12_add-index.sql` into `(12, "add-index")`.
///
/// Returns `None` when the name does not match [`FILENAME_PATTERN`] or the
/// version does not fit an `i64`.
pub fn parse_filename(file_name: &str) -> Option<(i64, String)> {
    let caps = filename_regex().captures(file_name)?;
    let version = caps[1].parse::<i64>().ok()?;
    Some((version, caps[2].to_string()))
}

/// Load and parse every script under the root of `source`.
///
/// The returned set is sorted by ascending version, independent of the order
/// the source lists its entries in (so `10_x.sql` lands after `2_y.sql`).
pub fn load<S: ScriptSource + ?Sized>(source: &S) -> Result<MigrationSet> {
    tracing::debug!(source = %source.describe(), "loading migrations");

    let entries = source.entries().map_err(|e| MigrateError::SourceRead {
        path: source.describe(),
        source: e,
    })?;

    let mut loaded: Vec<(String, MigrationScript)> = Vec::with_capacity(entries.len());

    for entry in entries {
        tracing::debug!(file = %entry.name, "visiting file");

        if entry.is_dir() {
            tracing::warn!(directory = %entry.name, "directory found in migrations");
            continue;
        }

        let (version, name) = parse_filename(&entry.name).ok_or_else(|| {
            MigrateError::LoadFormat {
                file: entry.name.clone(),
            }
        })?;

        let body = source
            .read_to_string(&entry.name)
            .map_err(|e| MigrateError::SourceRead {
                path: format!("{}/{}", source.describe(), entry.name),
                source: e,
            })?;

        loaded.push((entry.name, MigrationScript::new(version, name, body)));
    }

    loaded.sort_by_key(|(_, script)| script.version);

    if let Some(pair) = loaded
        .windows(2)
        .find(|pair| pair[0].1.version == pair[1].1.version)
    {
        return Err(MigrateError::DuplicateVersion {
            version: pair[0].1.version,
            first: pair[0].0.clone(),
            second: pair[1].0.clone(),
        });
    }

    tracing::debug!(count = loaded.len(), "loaded migrations");

    Ok(MigrationSet::from_scripts(
        loaded.into_iter().map(|(_, script)| script).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DirSource, MemorySource};

    const CREATE_USER: &str = "CREATE TABLE user (
    id INTEGER PRIMARY KEY NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
);
";

    const CREATE_BOOK: &str = "CREATE TABLE book (
    id INTEGER PRIMARY KEY NOT NULL UNIQUE,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
);
";

    #[test]
    fn parse_filename_accepts_valid_names() {
        assert_eq!(
            parse_filename("0_create-user-table.sql"),
            Some((0, "create-user-table".to_string()))
        );
        assert_eq!(parse_filename("12_add_index.sql"), Some((12, "add_index".to_string())));
        assert_eq!(parse_filename("007_x.sql"), Some((7, "x".to_string())));
    }

    #[test]
    fn parse_filename_rejects_malformed_names() {
        assert_eq!(parse_filename("migration.sql"), None);
        assert_eq!(parse_filename("1_init.txt"), None);
        assert_eq!(parse_filename("1init.sql"), None);
        assert_eq!(parse_filename("1_.sql"), None);
        assert_eq!(parse_filename("a1_init.sql"), None);
        assert_eq!(parse_filename("99999999999999999999_overflow.sql"), None);
    }

    #[test]
    fn loads_valid_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0_create-user-table.sql"), CREATE_USER).unwrap();
        std::fs::write(dir.path().join("1_create-book-table.sql"), CREATE_BOOK).unwrap();

        let set = load(&DirSource::new(dir.path())).unwrap();
        let scripts = set.into_vec();

        assert_eq!(
            scripts,
            vec![
                MigrationScript::new(0, "create-user-table", CREATE_USER),
                MigrationScript::new(1, "create-book-table", CREATE_BOOK),
            ]
        );
    }

    #[test]
    fn one_bad_filename_fails_the_whole_load() {
        let source = MemorySource::new()
            .with_file("0_a.sql", "SELECT 1;")
            .with_file("migration.sql", "SELECT 2;");

        match load(&source) {
            Err(MigrateError::LoadFormat { file }) => assert_eq!(file, "migration.sql"),
            other => panic!("expected LoadFormat, got {other:?}"),
        }
    }

    #[test]
    fn missing_directory_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&DirSource::new(dir.path().join("invalid"))).unwrap_err();
        assert!(matches!(err, MigrateError::SourceRead { .. }));
    }

    #[test]
    fn directories_are_skipped() {
        let source = MemorySource::new()
            .with_dir("archive")
            .with_file("0_a.sql", "SELECT 1;");

        let set = load(&source).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn output_is_sorted_numerically() {
        let source = MemorySource::new()
            .with_file("10_j.sql", "SELECT 10;")
            .with_file("2_b.sql", "SELECT 2;")
            .with_file("1_a.sql", "SELECT 1;");

        let versions: Vec<i64> = load(&source).unwrap().iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![1, 2, 10]);
    }

    #[test]
    fn duplicate_versions_are_rejected() {
        let source = MemorySource::new()
            .with_file("1_a.sql", "SELECT 1;")
            .with_file("01_b.sql", "SELECT 2;");

        match load(&source) {
            Err(MigrateError::DuplicateVersion { version, .. }) => assert_eq!(version, 1),
            other => panic!("expected DuplicateVersion, got {other:?}"),
        }
    }

    #[test]
    fn empty_source_loads_empty_set() {
        assert!(load(&MemorySource::new()).unwrap().is_empty());
    }
}
