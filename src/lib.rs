// Tasklist - single-user task list with priority ordering and key-value persistence

pub mod config;
pub mod error;
pub mod filter;
pub mod ids;
pub mod kv;
pub mod models;
pub mod persistence;
pub mod sanitize;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::ValidationError;
pub use filter::{Filter, TaskCounts, filtered_sorted};
pub use ids::generate_id;
pub use kv::{KeyValueStore, MemoryKv, SqliteKv};
pub use models::{Priority, Task, TaskUpdate, now_ms};
pub use persistence::{PersistenceAdapter, SCHEMA_VERSION, StorageKeys};
pub use sanitize::{sanitize_text, validate_text};
pub use session::{SaveStatus, Session};
pub use store::TaskStore;
