//! Configuration file support.
//!
//! ```toml
//! data_dir = "/var/lib/tracedoc"
//! collection = "traces"
//! serialize_upserts = true
//! log_filter = "info,tracedoc_storage=debug"
//! ```
//!
//! Every key is optional. Without `data_dir` the database is ephemeral.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default collection name
pub const DEFAULT_COLLECTION: &str = "traces";

/// Database and tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding collection snapshots; `None` keeps data in memory
    pub data_dir: Option<PathBuf>,
    /// Collection the database reads and writes
    pub collection: String,
    /// Hold a per-master-key lock for the duration of each upsert
    pub serialize_upserts: bool,
    /// `tracing` filter directive used by the command-line tool
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            collection: DEFAULT_COLLECTION.to_string(),
            serialize_upserts: true,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    ///
    /// A file that cannot be read fails with [`Error::Io`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(Error::Config("collection must not be empty".into()));
        }
        Ok(())
    }
}
