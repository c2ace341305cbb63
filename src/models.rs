// Data models for the task list

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One item in the task list
///
/// Tasks are only produced by [`TaskStore::create`](crate::TaskStore::create) or by
/// deserializing a previously persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Trimmed, HTML-escaped display text (never empty)
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    /// Milliseconds since the Unix epoch, fixed at creation
    pub created_at: i64,
}

/// Display priority. Declaration order is sort order: `High` sorts first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ValidationError::InvalidPriority(s.to_string())),
        }
    }
}

/// Partial update for [`TaskStore::update`](crate::TaskStore::update); `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            priority: None,
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            text: None,
            priority: Some(priority),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.priority.is_none()
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");

        let parsed: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Priority::Medium);
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }

    #[test]
    fn test_priority_default_and_order() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::InvalidPriority("urgent".to_string()))
        );
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let task = Task {
            id: "task-1".to_string(),
            text: "Buy milk".to_string(),
            completed: false,
            priority: Priority::High,
            created_at: 1000,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"createdAt\":1000"));
        assert!(json.contains("\"priority\":\"high\""));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, task);
    }

    #[test]
    fn test_task_update_constructors() {
        assert!(TaskUpdate::default().is_empty());
        assert_eq!(TaskUpdate::text("x").text.as_deref(), Some("x"));
        assert_eq!(TaskUpdate::priority(Priority::Low).priority, Some(Priority::Low));
    }
}
