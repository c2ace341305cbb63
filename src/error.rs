// Validation errors returned by task store operations

use thiserror::Error;

/// Rejected input. The operation that returns one of these made no state change.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Text is empty or whitespace-only.
    #[error("task text cannot be empty")]
    EmptyText,
    /// An operation addressing a task was given an empty id.
    #[error("task id is required")]
    MissingId,
    /// Priority string outside high/medium/low.
    #[error("invalid priority value: {0:?}")]
    InvalidPriority(String),
    /// Filter string outside all/active/completed.
    #[error("invalid filter value: {0:?}")]
    InvalidFilter(String),
}
