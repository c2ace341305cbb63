// View filtering and priority ordering for the task list

use crate::error::ValidationError;
use crate::models::Task;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which subset of the task list is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// True if `task` belongs to this view
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            _ => Err(ValidationError::InvalidFilter(s.to_string())),
        }
    }
}

/// Global counts, independent of the active filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            active: tasks.len() - completed,
            completed,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.completed
    }
}

/// Tasks matching `filter`, highest priority first.
///
/// The sort is stable, so tasks of equal priority keep collection (creation) order.
pub fn filtered_sorted(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    visible.sort_by_key(|t| t.priority);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn task(id: &str, priority: Priority, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            text: id.to_string(),
            completed,
            priority,
            created_at: 1000,
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!("Active".parse::<Filter>().unwrap(), Filter::Active);
        assert_eq!("completed".parse::<Filter>().unwrap(), Filter::Completed);
        assert_eq!(
            "done".parse::<Filter>(),
            Err(ValidationError::InvalidFilter("done".to_string()))
        );
    }

    #[test]
    fn test_filter_serialization() {
        assert_eq!(serde_json::to_string(&Filter::Active).unwrap(), "\"active\"");
        let parsed: Filter = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, Filter::Completed);
        assert_eq!(Filter::default(), Filter::All);
    }

    #[test]
    fn test_filter_matches() {
        let open = task("a", Priority::Medium, false);
        let done = task("b", Priority::Medium, true);

        assert!(Filter::All.matches(&open) && Filter::All.matches(&done));
        assert!(Filter::Active.matches(&open) && !Filter::Active.matches(&done));
        assert!(!Filter::Completed.matches(&open) && Filter::Completed.matches(&done));
    }

    #[test]
    fn test_priority_sort_is_stable() {
        let tasks = vec![
            task("A", Priority::Low, false),
            task("B", Priority::High, false),
            task("C", Priority::High, false),
        ];

        let sorted = filtered_sorted(&tasks, Filter::All);
        assert_eq!(ids(&sorted), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_filtered_sorted_applies_filter_then_sort() {
        let tasks = vec![
            task("a", Priority::Low, true),
            task("b", Priority::Medium, false),
            task("c", Priority::High, true),
            task("d", Priority::High, false),
        ];

        assert_eq!(ids(&filtered_sorted(&tasks, Filter::Active)), vec!["d", "b"]);
        assert_eq!(ids(&filtered_sorted(&tasks, Filter::Completed)), vec!["c", "a"]);
        assert_eq!(ids(&filtered_sorted(&tasks, Filter::All)), vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn test_counts_are_global() {
        let tasks = vec![
            task("a", Priority::Low, true),
            task("b", Priority::Medium, false),
            task("c", Priority::High, false),
        ];

        let counts = TaskCounts::of(&tasks);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(TaskCounts::of(&[]), TaskCounts::default());
    }
}
