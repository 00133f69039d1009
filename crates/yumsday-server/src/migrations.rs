//! Application schema, compiled into the binary.
//!
//! When adding a migration, create `migrations/<N>_<description>.sql` and add
//! an entry below. Order here does not matter; the loader sorts by version.

use yumsday_migrate::EmbeddedSource;

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "0_create-user-table.sql",
        include_str!("../migrations/0_create-user-table.sql"),
    ),
    (
        "1_add-user-last-visited-group-index.sql",
        include_str!("../migrations/1_add-user-last-visited-group-index.sql"),
    ),
];

pub fn embedded() -> EmbeddedSource {
    EmbeddedSource::new(MIGRATIONS)
}
