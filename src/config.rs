//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file in the data directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::storage::DataDir;
use crate::task::CompletionRetention;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// User configuration
    #[serde(default)]
    pub user: UserConfig,

    /// Board behavior configuration
    #[serde(default)]
    pub board: BoardConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// User-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Default user id when none specified
    #[serde(default)]
    pub default: String,
}

/// Board behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// What happens to a completion timestamp when a done task is reopened:
    /// "retain" keeps it, "clear-on-reopen" drops it.
    #[serde(default = "default_completion_retention")]
    pub completion_retention: String,
}

fn default_completion_retention() -> String {
    "retain".to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            completion_retention: default_completion_retention(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Milliseconds to wait for the task-file lock before giving up
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    crate::storage::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory. A missing file yields the
    /// defaults; a file that exists but does not parse is an error, not a
    /// silent fallback.
    pub fn try_load(data_dir: &DataDir) -> Result<Self> {
        let path = data_dir.config_file();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::storage::write_atomic(path, content.as_bytes())?;
        Ok(())
    }

    /// The parsed retention policy.
    pub fn completion_retention(&self) -> Result<CompletionRetention> {
        CompletionRetention::parse(&self.board.completion_retention)
    }

    fn validate(&self) -> Result<()> {
        CompletionRetention::parse(&self.board.completion_retention).map_err(|_| {
            Error::InvalidConfig(format!(
                "board.completion_retention: invalid value '{}' (expected retain|clear-on-reopen)",
                self.board.completion_retention
            ))
        })?;
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
