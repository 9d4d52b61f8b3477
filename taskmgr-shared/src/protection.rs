//! Deletion protection
//!
//! Statuses, labels and users cannot be removed while a task references
//! them. The check is the delete itself: the store refuses the removal under
//! its own referential constraints and the refusal surfaces here as
//! [`DeleteError::Blocked`]. There is no separate "is it referenced?" read
//! that could race a concurrent task insert.

use tracing::info;
use uuid::Uuid;

use crate::models::EntityKind;
use crate::store::{Store, StoreError};

/// Refusal to delete a referenced entity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProtectionError {
    pub kind: EntityKind,
    pub message: String,
}

impl ProtectionError {
    pub fn in_use(kind: EntityKind) -> Self {
        Self {
            kind,
            message: in_use_message(kind).to_string(),
        }
    }

    /// Stable code used in API responses
    pub fn code(&self) -> &'static str {
        "in_use"
    }
}

/// User-facing notice for a blocked delete
pub fn in_use_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Status => "It is not possible to delete a status because it is in use",
        EntityKind::Label => "It is not possible to delete a label because it is in use",
        EntityKind::User => "Unable to delete a user because it is in use",
        // Tasks are never referenced by other rows.
        EntityKind::Task => "It is not possible to delete a task because it is in use",
    }
}

/// Outcome of a failed protected delete
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeleteError {
    /// Still referenced; nothing was removed
    #[error("{0}")]
    Blocked(ProtectionError),

    /// No such record
    #[error("record not found")]
    NotFound,

    /// Storage failure
    #[error(transparent)]
    Store(StoreError),
}

/// Deletes one entity, turning a restrict violation into [`DeleteError::Blocked`]
///
/// # Errors
///
/// See [`DeleteError`]. On any error the entity is left intact.
pub async fn delete_protected(
    store: &dyn Store,
    kind: EntityKind,
    id: Uuid,
) -> Result<(), DeleteError> {
    let result = match kind {
        EntityKind::User => store.delete_user(id).await,
        EntityKind::Status => store.delete_status(id).await,
        EntityKind::Label => store.delete_label(id).await,
        EntityKind::Task => store.delete_task(id).await,
    };

    match result {
        Ok(()) => Ok(()),
        Err(StoreError::InUse) => {
            info!(kind = %kind, %id, "Delete blocked, entity is in use");
            Err(DeleteError::Blocked(ProtectionError::in_use(kind)))
        }
        Err(StoreError::NotFound) => Err(DeleteError::NotFound),
        Err(other) => Err(DeleteError::Store(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{task::TaskData, user::UserData};
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_messages_differ_per_kind() {
        assert_eq!(
            ProtectionError::in_use(EntityKind::Status).to_string(),
            "It is not possible to delete a status because it is in use"
        );
        assert_eq!(
            ProtectionError::in_use(EntityKind::User).message,
            "Unable to delete a user because it is in use"
        );
        assert_eq!(ProtectionError::in_use(EntityKind::Label).code(), "in_use");
    }

    #[tokio::test]
    async fn test_referenced_status_is_blocked_then_released() {
        let store = MemoryStore::new();
        let user = store
            .insert_user(UserData {
                username: "a".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        let status = store.insert_status("new").await.unwrap();
        let task = store
            .insert_task(
                user.id,
                TaskData {
                    name: "t".to_string(),
                    description: String::new(),
                    status_id: status.id,
                    executor_id: user.id,
                    label_ids: vec![],
                },
            )
            .await
            .unwrap();

        let err = delete_protected(&store, EntityKind::Status, status.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DeleteError::Blocked(ref e) if e.kind == EntityKind::Status));
        assert_eq!(store.list_statuses().await.unwrap().len(), 1);

        delete_protected(&store, EntityKind::Task, task.id).await.unwrap();
        delete_protected(&store, EntityKind::Status, status.id).await.unwrap();
        assert!(store.list_statuses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_entity() {
        let store = MemoryStore::new();
        let err = delete_protected(&store, EntityKind::Label, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DeleteError::NotFound));
    }
}
