//! Serializable factory configuration

use crate::core::{Encoding, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_BACKUP_COUNT: usize = 7;

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

/// Factory-wide settings, loadable from JSON
///
/// ```
/// use logger_factory::FactoryConfig;
///
/// let config = FactoryConfig::from_json(r#"{ "log_files_prefix": "logs/api" }"#).unwrap();
/// assert_eq!(config.backup_count, 7);
/// assert_eq!(config.encoding.as_str(), "utf-8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryConfig {
    /// Path prefix for `{prefix}.log` and `{prefix}.error.log`
    pub log_files_prefix: String,
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
    #[serde(default)]
    pub encoding: Encoding,
    /// Gzip archived files after rotation
    #[serde(default)]
    pub compress_backups: bool,
}

impl FactoryConfig {
    pub fn new(log_files_prefix: impl Into<String>) -> Self {
        Self {
            log_files_prefix: log_files_prefix.into(),
            backup_count: DEFAULT_BACKUP_COUNT,
            encoding: Encoding::default(),
            compress_backups: false,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
