//! Configuration for cfstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Column family holding raw values
pub const CF_DEFAULT: &str = "default";

/// Column family holding write records
pub const CF_WRITE: &str = "write";

/// Column family holding lock records
pub const CF_LOCK: &str = "lock";

/// Main configuration for a cfstore instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the engine files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── kv.redb          (engine database file)
    pub data_dir: PathBuf,

    /// Create `data_dir` on start if it does not exist
    pub create_dir: bool,

    // -------------------------------------------------------------------------
    // Keyspace Configuration
    // -------------------------------------------------------------------------
    /// The closed set of column families accepted by this instance
    pub column_families: Vec<String>,

    // -------------------------------------------------------------------------
    // Engine Configuration
    // -------------------------------------------------------------------------
    /// Engine page cache size (in bytes)
    pub cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cfstore_data"),
            create_dir: true,
            column_families: vec![
                CF_DEFAULT.to_string(),
                CF_WRITE.to_string(),
                CF_LOCK.to_string(),
            ],
            cache_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings that can be checked without touching disk
    ///
    /// Column family tag collisions are checked when the keyspace is built.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("data_dir must not be empty".to_string()));
        }
        if self.column_families.is_empty() {
            return Err(StoreError::Config(
                "at least one column family must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Whether a missing data directory is created on start
    pub fn create_dir(mut self, create: bool) -> Self {
        self.config.create_dir = create;
        self
    }

    /// Replace the configured column family set
    pub fn column_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.column_families = families.into_iter().map(Into::into).collect();
        self
    }

    /// Set the engine cache size (in bytes)
    pub fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
