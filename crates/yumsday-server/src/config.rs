//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `yumsday.db`
    pub database_path: PathBuf,

    /// Directory of `<version>_<name>.sql` scripts. When unset, the scripts
    /// compiled into the binary are used.
    /// Env: `MIGRATIONS_DIR`
    pub migrations_dir: Option<PathBuf>,

    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// How long SQLite waits on a lock held by another process.
    /// Env: `BUSY_TIMEOUT_MS`
    /// Default: `5000`
    pub busy_timeout: Duration,

    /// Wrap each migration and its version update in one transaction.
    /// Env: `MIGRATE_TRANSACTIONAL` (true/false)
    /// Default: `true`
    pub migrate_transactional: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("yumsday.db"),
            migrations_dir: None,
            http_addr: ([0, 0, 0, 0], 8080).into(),
            busy_timeout: Duration::from_millis(5000),
            migrate_transactional: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(dir) = var("MIGRATIONS_DIR") {
            if !dir.is_empty() {
                config.migrations_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(addr) = var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Some(val) = var("BUSY_TIMEOUT_MS") {
            match val.parse::<u64>() {
                Ok(ms) => config.busy_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %val, "Invalid BUSY_TIMEOUT_MS, using default"),
            }
        }

        if let Some(val) = var("MIGRATE_TRANSACTIONAL") {
            config.migrate_transactional = val != "false" && val != "0";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}
