// A running task list: store state seeded from, and mirrored to, persistence

use crate::error::ValidationError;
use crate::filter::{Filter, TaskCounts};
use crate::kv::KeyValueStore;
use crate::models::{Priority, Task, TaskUpdate};
use crate::persistence::PersistenceAdapter;
use crate::store::TaskStore;
use tracing::{info, warn};

/// Whether the state produced by an operation reached storage
///
/// A failed save never rolls back the in-memory state; the caller only needs it
/// to tell the user that the change will not survive a restart.
#[must_use]
#[derive(Debug)]
pub enum SaveStatus {
    Saved,
    Failed(eyre::Report),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }

    pub fn error(&self) -> Option<&eyre::Report> {
        match self {
            SaveStatus::Saved => None,
            SaveStatus::Failed(e) => Some(e),
        }
    }

    fn and(self, other: SaveStatus) -> SaveStatus {
        match self {
            SaveStatus::Saved => other,
            failed => failed,
        }
    }
}

impl From<eyre::Result<()>> for SaveStatus {
    fn from(result: eyre::Result<()>) -> Self {
        match result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                warn!(error = ?e, "Failed to persist task list");
                SaveStatus::Failed(e)
            }
        }
    }
}

/// Owns the current [`TaskStore`] and saves after every successful operation
pub struct Session<S> {
    store: TaskStore,
    persistence: PersistenceAdapter<S>,
    schema_version: Option<String>,
}

impl<S: KeyValueStore> Session<S> {
    /// Seed state from storage, writing `schema_version` if none is stored yet
    pub fn open(mut persistence: PersistenceAdapter<S>, schema_version: &str) -> Self {
        let keys = persistence.keys().clone();

        let tasks: Vec<Task> = persistence.load(&keys.tasks, Vec::new());
        let filter: Filter = persistence.load(&keys.filter, Filter::All);

        // An unreadable stored version is left in place, never overwritten
        let schema_version = match persistence.backend().get(&keys.version) {
            Ok(Some(raw)) => match serde_json::from_str::<String>(&raw) {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!(key = %keys.version, raw = %raw, error = ?e, "Stored schema version is unreadable");
                    None
                }
            },
            Ok(None) => match persistence.save(&keys.version, schema_version) {
                Ok(()) => {
                    info!(version = schema_version, "Initialized schema version");
                    Some(schema_version.to_string())
                }
                Err(e) => {
                    warn!(error = ?e, "Failed to write schema version");
                    None
                }
            },
            Err(e) => {
                warn!(key = %keys.version, error = ?e, "Cannot read schema version");
                None
            }
        };

        let store = TaskStore::new(tasks, filter);
        info!(tasks = store.tasks().len(), %filter, "Opened task list");

        Self {
            store,
            persistence,
            schema_version,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Stored schema version, `None` if it could not be read or written
    pub fn schema_version(&self) -> Option<&str> {
        self.schema_version.as_deref()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Create a task and return its id
    pub fn create(&mut self, text: &str, priority: Option<Priority>) -> Result<(String, SaveStatus), ValidationError> {
        let next = self.store.create(text, priority)?;
        let id = next.tasks().last().map(|t| t.id.clone()).unwrap_or_default();
        Ok((id, self.commit_tasks(next)))
    }

    pub fn update(&mut self, id: &str, changes: &TaskUpdate) -> Result<SaveStatus, ValidationError> {
        let next = self.store.update(id, changes)?;
        Ok(self.commit_tasks(next))
    }

    pub fn toggle_completion(&mut self, id: &str) -> Result<SaveStatus, ValidationError> {
        let next = self.store.toggle_completion(id)?;
        Ok(self.commit_tasks(next))
    }

    pub fn update_priority(&mut self, id: &str, priority: Priority) -> Result<SaveStatus, ValidationError> {
        let next = self.store.update_priority(id, priority)?;
        Ok(self.commit_tasks(next))
    }

    pub fn delete(&mut self, id: &str) -> Result<SaveStatus, ValidationError> {
        let next = self.store.delete(id)?;
        Ok(self.commit_tasks(next))
    }

    pub fn clear_completed(&mut self) -> SaveStatus {
        let next = self.store.clear_completed();
        self.commit_tasks(next)
    }

    pub fn set_filter(&mut self, filter: Filter) -> SaveStatus {
        self.store = self.store.set_filter(filter);
        let key = self.persistence.keys().filter.clone();
        self.persistence.save(&key, &filter).into()
    }

    /// Remove this application's keys from storage and start over empty
    pub fn reset(&mut self) -> SaveStatus {
        self.store = TaskStore::default();
        self.schema_version = None;
        self.persistence.clear_all().into()
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.store.visible_tasks()
    }

    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    pub fn is_persistence_available(&mut self) -> bool {
        self.persistence.is_available()
    }

    pub fn usage_estimate(&self) -> usize {
        self.persistence.usage_estimate()
    }

    /// Write both the task collection and the filter
    pub fn save_all(&mut self) -> SaveStatus {
        let keys = self.persistence.keys().clone();
        let tasks = SaveStatus::from(self.persistence.save(&keys.tasks, self.store.tasks()));
        let filter = SaveStatus::from(self.persistence.save(&keys.filter, &self.store.filter()));
        tasks.and(filter)
    }

    fn commit_tasks(&mut self, next: TaskStore) -> SaveStatus {
        self.store = next;
        let key = self.persistence.keys().tasks.clone();
        self.persistence.save(&key, self.store.tasks()).into()
    }
}
