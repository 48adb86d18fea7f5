//! Database configuration
//!
//! Loaded from a JSON file or built in code. Example:
//!
//! ```json
//! {
//!   "root": "./Database",
//!   "collections": { "types.User": "Users", "types.Download": "Downloads" },
//!   "sync_writes": false,
//!   "log_level": "info"
//! }
//! ```
//!
//! `collections` maps a record type's default collection name to the
//! directory it is stored under. Every field is optional.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::record::validate_file_name;
use crate::observability::Severity;

/// Configuration for a `Database`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Root directory (created if absent)
    pub root: PathBuf,

    /// Default collection name -> directory name
    pub collections: BTreeMap<String, String>,

    /// fsync each record file after writing it
    pub sync_writes: bool,

    /// Lowest log severity written ("trace", "info", "warn", "error", "fatal")
    pub log_level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./Database"),
            collections: BTreeMap::new(),
            sync_writes: false,
            log_level: "info".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Default configuration rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: DatabaseConfig = serde_json::from_str(&content)
            .map_err(|e| StoreError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Bind a default collection name to a directory name.
    pub fn with_collection(mut self, default_name: &str, dir_name: &str) -> Self {
        self.collections
            .insert(default_name.to_string(), dir_name.to_string());
        self
    }

    /// Enable or disable fsync after each record write.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Parsed log level.
    pub fn severity(&self) -> StoreResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| StoreError::Config(format!("Invalid log_level: {}", e)))
    }

    /// Validate directory names and log level
    pub fn validate(&self) -> StoreResult<()> {
        if self.root.as_os_str().is_empty() {
            return Err(StoreError::Config("root must not be empty".to_string()));
        }

        for (default_name, dir_name) in &self.collections {
            validate_file_name(dir_name).map_err(|_| {
                StoreError::Config(format!(
                    "Invalid directory name '{}' for collection '{}'",
                    dir_name, default_name
                ))
            })?;
            if dir_name == super::database::LOCK_FILE_NAME {
                return Err(StoreError::Config(format!(
                    "Collection '{}' cannot use the reserved name '{}'",
                    default_name, dir_name
                )));
            }
        }

        self.severity()?;
        Ok(())
    }
}
