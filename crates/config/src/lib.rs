//! # Config - explicit runtime configuration
//!
//! All settings come from environment variables with defaults:
//!
//! ```text
//! SAVEROWS_STORE   row store log path         (default: "save_units.rows")
//! SAVEROWS_SYNC    fsync every row append     (default: "false")
//! SAVEROWS_LOG     log filter directive       (default: "info")
//! ```
//!
//! Values that fail to parse fall back to their default. The resulting
//! [`StoreConfig`] is handed to the row store constructor; nothing here is
//! global.

use std::path::PathBuf;

pub const STORE_PATH_VAR: &str = "SAVEROWS_STORE";
pub const STORE_SYNC_VAR: &str = "SAVEROWS_SYNC";
pub const LOG_VAR: &str = "SAVEROWS_LOG";

pub const DEFAULT_STORE_PATH: &str = "save_units.rows";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Where and how the row store persists its log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path of the append-only row log (created if missing).
    pub path: PathBuf,
    /// If `true`, every append is followed by `fsync`.
    pub sync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            sync: false,
        }
    }
}

impl StoreConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            sync: false,
        }
    }

    #[must_use]
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(STORE_PATH_VAR)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
        let sync = lookup(STORE_SYNC_VAR)
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);
        Self {
            path: PathBuf::from(path),
            sync,
        }
    }
}

/// Log filter directive from `SAVEROWS_LOG`, or [`DEFAULT_LOG_FILTER`].
pub fn log_filter() -> String {
    std::env::var(LOG_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string())
}
