// Mirrors task list state to and from a key-value store as JSON

use crate::kv::{KeyValueStore, entry_size};
use eyre::{Context, Result, eyre};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub const DEFAULT_KEY_PREFIX: &str = "tasklist";
pub const SCHEMA_VERSION: &str = "1.0";

const PROBE_KEY: &str = "__tasklist_storage_probe__";

/// The three keys this application owns in a shared store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub tasks: String,
    pub filter: String,
    pub version: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            tasks: format!("{}-tasks", prefix),
            filter: format!("{}-filter", prefix),
            version: format!("{}-version", prefix),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.tasks, &self.filter, &self.version]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// JSON persistence over a [`KeyValueStore`]
///
/// Backend failures never escape as panics: writes report them as `Err`, reads
/// fall back to the caller's default.
pub struct PersistenceAdapter<S> {
    kv: S,
    keys: StorageKeys,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(kv: S) -> Self {
        Self::with_keys(kv, StorageKeys::default())
    }

    pub fn with_keys(kv: S, keys: StorageKeys) -> Self {
        Self { kv, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    /// Probe the backend with a throwaway write and delete
    pub fn is_available(&mut self) -> bool {
        let probe = self
            .kv
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|_| self.kv.remove(PROBE_KEY));

        match probe {
            Ok(()) => true,
            Err(e) => {
                debug!(error = ?e, "Storage probe failed");
                false
            }
        }
    }

    /// Serialize `value` as JSON and store it under `key`
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).with_context(|| format!("Failed to serialize value for {}", key))?;
        self.kv
            .set(key, &json)
            .with_context(|| format!("Failed to save {}", key))?;

        debug!(key, bytes = json.len(), "Saved");
        Ok(())
    }

    /// Read and parse the JSON under `key`
    ///
    /// Absent keys, backend failures, and unparseable data all yield `default`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "No stored value, using default");
                return default;
            }
            Err(e) => {
                warn!(key, error = ?e, "Storage unavailable, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Loaded");
                value
            }
            Err(e) => {
                warn!(key, error = ?e, "Stored value is corrupt, using default");
                default
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.kv
            .remove(key)
            .with_context(|| format!("Failed to remove {}", key))
    }

    /// Remove the tasks, filter, and version keys; other keys are untouched
    ///
    /// Every key is attempted even if an earlier removal fails.
    pub fn clear_all(&mut self) -> Result<()> {
        let keys = self.keys.clone();
        let failed: Vec<&str> = keys
            .all()
            .into_iter()
            .filter(|key| match self.remove(key) {
                Ok(()) => false,
                Err(e) => {
                    warn!(key, error = ?e, "Failed to clear key");
                    true
                }
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(eyre!("Failed to clear {}", failed.join(", ")))
        }
    }

    /// Estimated bytes used by every entry in the backend, 0 if it cannot be read
    pub fn usage_estimate(&self) -> usize {
        match self.kv.entries() {
            Ok(entries) => entries.iter().map(|(k, v)| entry_size(k, v)).sum(),
            Err(e) => {
                debug!(error = ?e, "Cannot estimate storage usage");
                0
            }
        }
    }
}
