//! Read-only sources of migration scripts.
//!
//! A source exposes the entries directly under its root and can read a file by
//! name. Three implementations are provided:
//!
//! - [`DirSource`] -- an on-disk directory.
//! - [`EmbeddedSource`] -- files compiled into the binary with `include_str!`.
//! - [`MemorySource`] -- owned entries assembled at runtime.

use std::io;
use std::path::{Path, PathBuf};

/// Whether a root entry is a plain file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry directly under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl SourceEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A flat, read-only collection of migration files.
pub trait ScriptSource {
    /// List entries directly under the root (not recursive).
    fn entries(&self) -> io::Result<Vec<SourceEntry>>;

    /// Read the full contents of the root-level file `name`.
    fn read_to_string(&self, name: &str) -> io::Result<String>;

    /// Where the scripts come from, for logs and error messages.
    fn describe(&self) -> String;
}

impl<S: ScriptSource + ?Sized> ScriptSource for &S {
    fn entries(&self) -> io::Result<Vec<SourceEntry>> {
        (**self).entries()
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        (**self).read_to_string(name)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

// ---------------------------------------------------------------------------
// DirSource
// ---------------------------------------------------------------------------

/// Scripts read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ScriptSource for DirSource {
    fn entries(&self) -> io::Result<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name {}", raw.to_string_lossy()),
                )
            })?;
            // Follows symlinks, so a link to a directory is still a directory.
            let kind = if entry.path().is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            entries.push(SourceEntry { name, kind });
        }
        Ok(entries)
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(name))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// EmbeddedSource
// ---------------------------------------------------------------------------

/// Scripts compiled into the binary.
///
/// ```ignore
/// const MIGRATIONS: &[(&str, &str)] = &[
///     ("0_create-user-table.sql", include_str!("../migrations/0_create-user-table.sql")),
/// ];
/// let source = EmbeddedSource::new(MIGRATIONS);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    files: &'static [(&'static str, &'static str)],
}

impl EmbeddedSource {
    pub const fn new(files: &'static [(&'static str, &'static str)]) -> Self {
        Self { files }
    }
}

impl ScriptSource for EmbeddedSource {
    fn entries(&self) -> io::Result<Vec<SourceEntry>> {
        Ok(self
            .files
            .iter()
            .map(|(name, _)| SourceEntry::file(*name))
            .collect())
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        self.files
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, body)| body.to_string())
            .ok_or_else(|| not_found(name))
    }

    fn describe(&self) -> String {
        "embedded migrations".to_string()
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// Owned entries, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<(SourceEntry, Option<String>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.entries
            .push((SourceEntry::file(name), Some(body.into())));
        self
    }

    pub fn with_dir(mut self, name: impl Into<String>) -> Self {
        self.entries.push((SourceEntry::dir(name), None));
        self
    }
}

impl ScriptSource for MemorySource {
    fn entries(&self) -> io::Result<Vec<SourceEntry>> {
        Ok(self.entries.iter().map(|(e, _)| e.clone()).collect())
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        match self.entries.iter().find(|(e, _)| e.name == name) {
            Some((_, Some(body))) => Ok(body.clone()),
            Some((_, None)) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{name} is a directory"),
            )),
            None => Err(not_found(name)),
        }
    }

    fn describe(&self) -> String {
        "in-memory migrations".to_string()
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{name} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_lists_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0_init.sql"), "SELECT 1;").unwrap();
        std::fs::create_dir(dir.path().join("archive")).unwrap();

        let source = DirSource::new(dir.path());
        let mut entries = source.entries().unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![SourceEntry::file("0_init.sql"), SourceEntry::dir("archive")]
        );
        assert_eq!(source.read_to_string("0_init.sql").unwrap(), "SELECT 1;");
    }

    #[test]
    fn dir_source_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path().join("invalid"));
        assert!(source.entries().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn dir_source_rejects_non_utf8_names() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = std::ffi::OsStr::from_bytes(b"1_\xff.sql");
        // Some filesystems refuse such names outright; nothing to list then.
        if std::fs::write(dir.path().join(name), "SELECT 1;").is_err() {
            return;
        }

        let source = DirSource::new(dir.path());
        let err = source.entries().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(matches!(
            crate::loader::load(&source),
            Err(crate::MigrateError::SourceRead { .. })
        ));
    }

    #[test]
    fn embedded_source_reads_by_name() {
        static FILES: &[(&str, &str)] = &[("0_a.sql", "CREATE TABLE a (id INTEGER);")];
        let source = EmbeddedSource::new(FILES);

        assert_eq!(source.entries().unwrap(), vec![SourceEntry::file("0_a.sql")]);
        assert!(source.read_to_string("0_a.sql").unwrap().starts_with("CREATE"));
        assert_eq!(
            source.read_to_string("1_b.sql").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn memory_source_refuses_to_read_directories() {
        let source = MemorySource::new().with_dir("nested");
        assert!(source.entries().unwrap()[0].is_dir());
        assert!(source.read_to_string("nested").is_err());
    }
}
