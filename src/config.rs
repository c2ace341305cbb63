// Configuration loaded from ~/.config/tasklist/config.yml

use crate::persistence::{DEFAULT_KEY_PREFIX, SCHEMA_VERSION, StorageKeys};
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default capacity ceiling of the backing store (5 MiB)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// On-disk config file; every field may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    storage_path: Option<PathBuf>,
    key_prefix: Option<String>,
    schema_version: Option<String>,
    quota_bytes: Option<usize>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file backing the key-value store
    pub storage_path: PathBuf,
    /// Namespace for the keys this application owns
    pub key_prefix: String,
    /// Value written under the version key on first open
    pub schema_version: String,
    /// `None` disables the capacity check
    pub quota_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            quota_bytes: Some(DEFAULT_QUOTA_BYTES),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// location is used when present and compiled defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };

        let defaults = Self::default();
        let key_prefix = file.key_prefix.unwrap_or(defaults.key_prefix);
        if key_prefix.trim().is_empty() {
            return Err(eyre!("key_prefix cannot be empty"));
        }

        Ok(Self {
            storage_path: file.storage_path.unwrap_or(defaults.storage_path),
            key_prefix,
            schema_version: file.schema_version.unwrap_or(defaults.schema_version),
            quota_bytes: match file.quota_bytes {
                Some(0) => None,
                Some(bytes) => Some(bytes),
                None => defaults.quota_bytes,
            },
        })
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(&self.key_prefix)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasklist").join("config.yml"))
}

pub fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasklist")
        .join("storage.db")
}
