// Synchronous key-value storage backends

use eyre::{Context, Result, eyre};
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A string-keyed, string-valued store whose every call may fail
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Every entry in the store, including keys owned by other users of it
    fn entries(&self) -> Result<Vec<(String, String)>>;
}

/// Size of one entry with UTF-16 accounting: two bytes per code unit
pub fn entry_size(key: &str, value: &str) -> usize {
    2 * (key.encode_utf16().count() + value.encode_utf16().count())
}

/// Size the store would have after writing `key = value`, given its current entries
fn size_after_write(entries: &[(String, String)], key: &str, value: &str) -> usize {
    let others: usize = entries
        .iter()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| entry_size(k, v))
        .sum();
    others + entry_size(key, value)
}

fn check_quota(quota: Option<usize>, entries: &[(String, String)], key: &str, value: &str) -> Result<()> {
    if let Some(quota) = quota {
        let needed = size_after_write(entries, key, value);
        if needed > quota {
            return Err(eyre!(
                "storage quota exceeded writing {}: {} bytes needed, {} allowed",
                key,
                needed,
                quota
            ));
        }
    }
    Ok(())
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory store with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// A store that fails every call, like storage disabled by the host
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn ensure_enabled(&self) -> Result<()> {
        if self.disabled {
            return Err(eyre!("storage is disabled"));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.ensure_enabled()?;
        let entries = self.entries()?;
        check_quota(self.quota, &entries, key, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.ensure_enabled()?;
        self.entries.remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        self.ensure_enabled()?;
        Ok(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

// ============================================================================
// SQLite backend
// ============================================================================

/// Durable store keeping entries in a single SQLite table
pub struct SqliteKv {
    path: Option<PathBuf>,
    db: Connection,
    quota: Option<usize>,
}

impl SqliteKv {
    /// Open or create the database file, creating parent directories as needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }

        let db = Connection::open(path).context("Failed to open SQLite database")?;
        let store = Self {
            path: Some(path.to_path_buf()),
            db,
            quota: None,
        };
        store.create_schema()?;

        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let store = Self {
            path: None,
            db,
            quota: None,
        };
        store.create_schema()?;

        Ok(store)
    }

    /// Refuse writes that would grow the store beyond `quota` bytes
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating kv schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;

        Ok(())
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .context("Failed to read key")?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.quota.is_some() {
            let entries = self.entries()?;
            check_quota(self.quota, &entries, key, value)?;
        }

        self.db
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                rusqlite::params![key, value],
            )
            .context("Failed to write key")?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .context("Failed to remove key")?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self.db.prepare("SELECT key, value FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
