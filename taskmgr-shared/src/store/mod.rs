//! Persistence port
//!
//! The rule layer talks to storage only through [`Store`]. Two adapters
//! implement it:
//!
//! - [`postgres::PgStore`]: sqlx over PostgreSQL, relying on unique indexes
//!   and `ON DELETE RESTRICT` foreign keys
//! - [`memory::MemoryStore`]: an in-process store that enforces the same
//!   constraints under a single lock
//!
//! Constraint checks are never done as a separate read before the write.
//! Each adapter reports violations from the write itself through
//! [`StoreError`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    label::Label,
    status::Status,
    task::{Task, TaskData},
    user::{User, UserData},
};

pub mod memory;
pub mod postgres;

pub use crate::models::task::TaskQuery;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store adapters.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("unique constraint violated on {field}")]
    UniqueViolation { field: &'static str },

    /// The write references a row that does not exist.
    #[error("{field} references a missing record")]
    InvalidReference { field: &'static str },

    /// The row is still referenced by a task and was not deleted.
    #[error("record is referenced by a task")]
    InUse,

    /// The target row does not exist.
    #[error("record not found")]
    NotFound,

    /// Persistence-layer failure.
    #[error("storage backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Storage contract for users, statuses, labels and tasks.
///
/// Updates replace the full record. Deletes of users, statuses and labels
/// fail with [`StoreError::InUse`] while a task references the row.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// [`StoreError::UniqueViolation`] on `username` when the name is taken.
    async fn insert_user(&self, data: UserData) -> StoreResult<User>;

    /// Replaces a user's writable fields.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] or [`StoreError::UniqueViolation`].
    async fn update_user(&self, id: Uuid, data: UserData) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// [`StoreError::InUse`] while the user authors or executes a task.
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    async fn insert_status(&self, name: &str) -> StoreResult<Status>;

    async fn update_status(&self, id: Uuid, name: &str) -> StoreResult<Status>;

    async fn find_status(&self, id: Uuid) -> StoreResult<Option<Status>>;

    async fn list_statuses(&self) -> StoreResult<Vec<Status>>;

    /// Deletes a status.
    ///
    /// # Errors
    ///
    /// [`StoreError::InUse`] while any task has this status.
    async fn delete_status(&self, id: Uuid) -> StoreResult<()>;

    async fn insert_label(&self, name: &str) -> StoreResult<Label>;

    async fn update_label(&self, id: Uuid, name: &str) -> StoreResult<Label>;

    async fn find_label(&self, id: Uuid) -> StoreResult<Option<Label>>;

    async fn list_labels(&self) -> StoreResult<Vec<Label>>;

    /// Deletes a label.
    ///
    /// # Errors
    ///
    /// [`StoreError::InUse`] while the label is attached to any task.
    async fn delete_label(&self, id: Uuid) -> StoreResult<()>;

    /// Inserts a task authored by `author_id`.
    ///
    /// The row and its label links are written atomically.
    ///
    /// # Errors
    ///
    /// [`StoreError::UniqueViolation`] on `name`, or
    /// [`StoreError::InvalidReference`] naming `status`, `executor`, `author`
    /// or `labels`.
    async fn insert_task(&self, author_id: Uuid, data: TaskData) -> StoreResult<Task>;

    /// Replaces a task's writable fields and label set. The author is kept.
    async fn update_task(&self, id: Uuid, data: TaskData) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists tasks matching every populated constraint, oldest first.
    async fn list_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_wraps_source() {
        let err = StoreError::backend(std::io::Error::other("connection reset"));
        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(err.to_string(), "storage backend error: connection reset");
    }

    #[test]
    fn test_store_error_messages() {
        assert_eq!(
            StoreError::UniqueViolation { field: "name" }.to_string(),
            "unique constraint violated on name"
        );
        assert_eq!(
            StoreError::InvalidReference { field: "status" }.to_string(),
            "status references a missing record"
        );
    }
}
