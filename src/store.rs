// In-memory task store. Every operation returns a successor state.

use crate::error::ValidationError;
use crate::filter::{Filter, TaskCounts, filtered_sorted};
use crate::ids::generate_id;
use crate::models::{Priority, Task, TaskUpdate, now_ms};
use crate::sanitize::{sanitize_text, validate_text};
use std::collections::HashSet;
use tracing::warn;

const TASK_ID_PREFIX: &str = "task";

/// Authoritative task collection plus the active view filter
///
/// Operations take `&self` and return a new `TaskStore`; the receiver is never
/// modified, so a caller holding the previous state can compare old and new.
/// On `Err` nothing changed.
///
/// Operations addressing a task by id treat an unknown id as a no-op, not an
/// error: the successor has the same content as the receiver. UI code acting on
/// a stale reference (an edit form for a task deleted elsewhere) relies on this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
}

impl TaskStore {
    /// Build a store from previously persisted state
    ///
    /// Tasks with a blank id or blank text are dropped, as are later tasks
    /// reusing an id already seen, so every kept task stays addressable.
    pub fn new(tasks: Vec<Task>, filter: Filter) -> Self {
        let mut seen = HashSet::new();
        let tasks = tasks
            .into_iter()
            .filter(|task| {
                if task.id.trim().is_empty() {
                    warn!(text = %task.text, "Dropping task with blank id");
                    return false;
                }
                if !validate_text(&task.text) {
                    warn!(id = %task.id, "Dropping task with blank text");
                    return false;
                }
                let fresh = seen.insert(task.id.clone());
                if !fresh {
                    warn!(id = %task.id, "Dropping task with duplicate id");
                }
                fresh
            })
            .collect();

        Self { tasks, filter }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    // ========================================================================
    // Collection operations
    // ========================================================================

    /// Append a new task; priority defaults to medium
    pub fn create(&self, text: &str, priority: Option<Priority>) -> Result<Self, ValidationError> {
        let text = Self::clean_text(text)?;

        let task = Task {
            id: generate_id(TASK_ID_PREFIX),
            text,
            completed: false,
            priority: priority.unwrap_or_default(),
            created_at: now_ms(),
        };

        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.extend(self.tasks.iter().cloned());
        tasks.push(task);

        Ok(self.with_tasks(tasks))
    }

    /// Replace text and/or priority of the matching task
    pub fn update(&self, id: &str, changes: &TaskUpdate) -> Result<Self, ValidationError> {
        Self::require_id(id)?;
        let text = changes.text.as_deref().map(Self::clean_text).transpose()?;

        Ok(self.map_task(id, |task| Task {
            text: text.clone().unwrap_or_else(|| task.text.clone()),
            priority: changes.priority.unwrap_or(task.priority),
            ..task.clone()
        }))
    }

    pub fn toggle_completion(&self, id: &str) -> Result<Self, ValidationError> {
        Self::require_id(id)?;

        Ok(self.map_task(id, |task| Task {
            completed: !task.completed,
            ..task.clone()
        }))
    }

    pub fn update_priority(&self, id: &str, priority: Priority) -> Result<Self, ValidationError> {
        self.update(id, &TaskUpdate::priority(priority))
    }

    pub fn delete(&self, id: &str) -> Result<Self, ValidationError> {
        Self::require_id(id)?;

        let tasks = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        Ok(self.with_tasks(tasks))
    }

    /// Remove every completed task
    pub fn clear_completed(&self) -> Self {
        let tasks = self.tasks.iter().filter(|t| !t.completed).cloned().collect();
        self.with_tasks(tasks)
    }

    /// Replace the active view filter
    ///
    /// `Filter` values are validated when parsed (see `Filter::from_str`).
    pub fn set_filter(&self, filter: Filter) -> Self {
        Self {
            tasks: self.tasks.clone(),
            filter,
        }
    }

    // ========================================================================
    // Derived views
    // ========================================================================

    /// Tasks matching the active filter, highest priority first
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filtered_sorted(&self.tasks, self.filter)
    }

    /// Active/completed counts over the whole collection
    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn with_tasks(&self, tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filter: self.filter,
        }
    }

    fn map_task<F>(&self, id: &str, f: F) -> Self
    where
        F: Fn(&Task) -> Task,
    {
        let tasks = self
            .tasks
            .iter()
            .map(|task| if task.id == id { f(task) } else { task.clone() })
            .collect();
        self.with_tasks(tasks)
    }

    fn clean_text(text: &str) -> Result<String, ValidationError> {
        if !validate_text(text) {
            return Err(ValidationError::EmptyText);
        }
        Ok(sanitize_text(text))
    }

    fn require_id(id: &str) -> Result<(), ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        Ok(())
    }
}
