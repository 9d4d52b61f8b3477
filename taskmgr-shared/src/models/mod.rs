//! Database models for the task manager
//!
//! This module contains the four persisted entities and their SQL operations.
//!
//! # Models
//!
//! - `user`: Registered accounts; authors and executors of tasks
//! - `status`: Named task states
//! - `label`: Named tags attached to tasks (many-to-many)
//! - `task`: Tasks with author, executor, status and labels
//!
//! # Example
//!
//! ```no_run
//! use taskmgr_shared::models::status::Status;
//! use taskmgr_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! let status = Status::create(&pool, "new").await?;
//! println!("Created status {}", status.id);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod label;
pub mod status;
pub mod task;
pub mod user;

/// Maximum length of every short text column (names, usernames).
///
/// Mirrors the `VARCHAR(150)` columns in the schema.
pub const MAX_NAME_LENGTH: usize = 150;

/// The kinds of entity the rule layer operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Registered user account
    User,

    /// Task status
    Status,

    /// Task label
    Label,

    /// Task
    Task,
}

impl EntityKind {
    /// Lowercase identifier used in logs and error codes
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Status => "status",
            EntityKind::Label => "label",
            EntityKind::Task => "task",
        }
    }

    /// Human-readable name used in user-facing messages
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Status => "Status",
            EntityKind::Label => "Label",
            EntityKind::Task => "Task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::Status.as_str(), "status");
        assert_eq!(EntityKind::Label.title(), "Label");
        assert_eq!(EntityKind::Task.to_string(), "task");
    }
}
