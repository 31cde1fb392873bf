//! # Store Configuration & Constants
//!
//! Every well-known name and default the store uses lives here, next to
//! the [`StoreConfig`] value that carries per-deployment choices.
//!
//! Config files are JSON. Missing fields fall back to the defaults below,
//! so an empty object `{}` is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::encoding::TERMINATOR;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default on-disk location of the state database, relative to the
/// working directory.
pub const DEFAULT_DATA_DIR: &str = "database";

/// Name of the sled tree holding trie state.
pub const DEFAULT_TREE_NAME: &str = "state";

/// Environment variable the operator binary reads a config path from.
pub const CONFIG_ENV_VAR: &str = "TRIE_STORE_CONFIG";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Where and how the persistent store is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory of the sled database.
    pub data_dir: PathBuf,
    /// Tree inside the database that holds the key/value pairs.
    pub tree: String,
    /// Wipe the tree on open. Useful for resyncing state from scratch.
    pub database_reset: bool,
    /// Keep the database in a temporary location removed on drop.
    /// `data_dir` is ignored when set.
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tree: DEFAULT_TREE_NAME.to_string(),
            database_reset: false,
            temporary: false,
        }
    }
}

impl StoreConfig {
    /// Configuration for a throwaway store. Ideal for tests.
    pub fn temporary() -> Self {
        Self {
            temporary: true,
            ..Default::default()
        }
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.tree, DEFAULT_TREE_NAME);
        assert!(!config.database_reset);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config =
            StoreConfig::from_json_str(r#"{"data_dir": "/var/lib/state", "database_reset": true}"#)
                .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/state"));
        assert!(config.database_reset);
        assert_eq!(config.tree, DEFAULT_TREE_NAME);
        assert!(!config.temporary);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"tree": "accounts"}"#).unwrap();

        let config = StoreConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tree, "accounts");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = StoreConfig::from_json_file("/nonexistent/store.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/store.json"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let err = StoreConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn terminator_is_out_of_nibble_range() {
        assert!(TERMINATOR > 0x0f);
    }
}
