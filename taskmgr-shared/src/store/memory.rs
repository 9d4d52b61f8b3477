//! In-memory store adapter
//!
//! Keeps every table in a single `RwLock`. Each write validates its
//! constraints and applies the change while holding the write guard, so
//! concurrent requests see the same unique and restrict semantics as the
//! PostgreSQL adapter.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, TaskQuery};
use crate::models::{
    label::Label,
    status::Status,
    task::{Task, TaskData},
    user::{User, UserData},
};

/// Thread-safe in-memory [`Store`].
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    statuses: Vec<Status>,
    labels: Vec<Label>,
    tasks: Vec<Task>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|err| StoreError::backend(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|err| StoreError::backend(std::io::Error::other(err.to_string())))
    }
}

impl State {
    fn check_task_refs(&self, author_id: Uuid, data: &TaskData) -> StoreResult<()> {
        if !self.statuses.iter().any(|s| s.id == data.status_id) {
            return Err(StoreError::InvalidReference { field: "status" });
        }
        if !self.users.iter().any(|u| u.id == author_id) {
            return Err(StoreError::InvalidReference { field: "author" });
        }
        if !self.users.iter().any(|u| u.id == data.executor_id) {
            return Err(StoreError::InvalidReference { field: "executor" });
        }
        let labels_exist = data
            .label_ids
            .iter()
            .all(|id| self.labels.iter().any(|l| l.id == *id));
        if !labels_exist {
            return Err(StoreError::InvalidReference { field: "labels" });
        }
        Ok(())
    }
}

fn normalized_labels(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

/// Generates the name-only entity operations shared by statuses and labels.
macro_rules! named_entity {
    ($table:ident, $ty:ident, $in_use:expr) => {
        pub(super) fn insert(state: &mut State, name: &str) -> StoreResult<$ty> {
            if state.$table.iter().any(|e| e.name == name) {
                return Err(StoreError::UniqueViolation { field: "name" });
            }
            let record = $ty {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: Utc::now(),
            };
            state.$table.push(record.clone());
            Ok(record)
        }

        pub(super) fn update(state: &mut State, id: Uuid, name: &str) -> StoreResult<$ty> {
            if state.$table.iter().any(|e| e.name == name && e.id != id) {
                return Err(StoreError::UniqueViolation { field: "name" });
            }
            let record = state
                .$table
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(StoreError::NotFound)?;
            record.name = name.to_string();
            Ok(record.clone())
        }

        pub(super) fn delete(state: &mut State, id: Uuid) -> StoreResult<()> {
            let index = state
                .$table
                .iter()
                .position(|e| e.id == id)
                .ok_or(StoreError::NotFound)?;
            let in_use: fn(&Task, Uuid) -> bool = $in_use;
            if state.tasks.iter().any(|t| in_use(t, id)) {
                return Err(StoreError::InUse);
            }
            state.$table.remove(index);
            Ok(())
        }
    };
}

mod statuses {
    use super::*;
    named_entity!(statuses, Status, |t, id| t.status_id == id);
}

mod labels {
    use super::*;
    named_entity!(labels, Label, |t, id| t.label_ids.contains(&id));
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, data: UserData) -> StoreResult<User> {
        let mut state = self.write()?;
        if state.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::UniqueViolation { field: "username" });
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            first_name: data.first_name,
            last_name: data.last_name,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: UserData) -> StoreResult<User> {
        let mut state = self.write()?;
        if state
            .users
            .iter()
            .any(|u| u.username == data.username && u.id != id)
        {
            return Err(StoreError::UniqueViolation { field: "username" });
        }

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.username = data.username;
        user.first_name = data.first_name;
        user.last_name = data.last_name;
        user.password_hash = data.password_hash;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.write()?;
        let index = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        if state.tasks.iter().any(|t| t.involves_user(id)) {
            return Err(StoreError::InUse);
        }
        state.users.remove(index);
        Ok(())
    }

    async fn insert_status(&self, name: &str) -> StoreResult<Status> {
        statuses::insert(&mut *self.write()?, name)
    }

    async fn update_status(&self, id: Uuid, name: &str) -> StoreResult<Status> {
        statuses::update(&mut *self.write()?, id, name)
    }

    async fn find_status(&self, id: Uuid) -> StoreResult<Option<Status>> {
        Ok(self.read()?.statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn list_statuses(&self) -> StoreResult<Vec<Status>> {
        Ok(self.read()?.statuses.clone())
    }

    async fn delete_status(&self, id: Uuid) -> StoreResult<()> {
        statuses::delete(&mut *self.write()?, id)
    }

    async fn insert_label(&self, name: &str) -> StoreResult<Label> {
        labels::insert(&mut *self.write()?, name)
    }

    async fn update_label(&self, id: Uuid, name: &str) -> StoreResult<Label> {
        labels::update(&mut *self.write()?, id, name)
    }

    async fn find_label(&self, id: Uuid) -> StoreResult<Option<Label>> {
        Ok(self.read()?.labels.iter().find(|l| l.id == id).cloned())
    }

    async fn list_labels(&self) -> StoreResult<Vec<Label>> {
        Ok(self.read()?.labels.clone())
    }

    async fn delete_label(&self, id: Uuid) -> StoreResult<()> {
        labels::delete(&mut *self.write()?, id)
    }

    async fn insert_task(&self, author_id: Uuid, data: TaskData) -> StoreResult<Task> {
        let mut state = self.write()?;
        if state.tasks.iter().any(|t| t.name == data.name) {
            return Err(StoreError::UniqueViolation { field: "name" });
        }
        state.check_task_refs(author_id, &data)?;

        let task = Task {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            status_id: data.status_id,
            author_id,
            executor_id: data.executor_id,
            label_ids: normalized_labels(data.label_ids),
            created_at: Utc::now(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, data: TaskData) -> StoreResult<Task> {
        let mut state = self.write()?;
        let author_id = state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.author_id)
            .ok_or(StoreError::NotFound)?;
        if state.tasks.iter().any(|t| t.name == data.name && t.id != id) {
            return Err(StoreError::UniqueViolation { field: "name" });
        }
        state.check_task_refs(author_id, &data)?;

        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;
        task.name = data.name;
        task.description = data.description;
        task.status_id = data.status_id;
        task.executor_id = data.executor_id;
        task.label_ids = normalized_labels(data.label_ids);
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        Ok(self
            .read()?
            .tasks
            .iter()
            .filter(|t| query.matches(t))
            .cloned()
            .collect())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.write()?;
        let index = state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound)?;
        state.tasks.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_data(username: &str) -> UserData {
        UserData {
            username: username.to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_status_name_rejected() {
        let store = MemoryStore::new();
        store.insert_status("new").await.unwrap();

        let err = store.insert_status("new").await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { field: "name" }));
        assert_eq!(store.list_statuses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_to_own_name_is_allowed() {
        let store = MemoryStore::new();
        let label = store.insert_label("bug").await.unwrap();

        let renamed = store.update_label(label.id, "bug").await.unwrap();
        assert_eq!(renamed.id, label.id);
    }

    #[tokio::test]
    async fn test_task_with_unknown_status_rejected() {
        let store = MemoryStore::new();
        let user = store.insert_user(user_data("a")).await.unwrap();

        let err = store
            .insert_task(
                user.id,
                TaskData {
                    name: "t".to_string(),
                    description: String::new(),
                    status_id: Uuid::new_v4(),
                    executor_id: user.id,
                    label_ids: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference { field: "status" }));
        assert!(store.list_tasks(&TaskQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_referenced_rows_are_restricted() {
        let store = MemoryStore::new();
        let author = store.insert_user(user_data("author")).await.unwrap();
        let executor = store.insert_user(user_data("executor")).await.unwrap();
        let status = store.insert_status("new").await.unwrap();
        let label = store.insert_label("bug").await.unwrap();
        let task = store
            .insert_task(
                author.id,
                TaskData {
                    name: "t".to_string(),
                    description: String::new(),
                    status_id: status.id,
                    executor_id: executor.id,
                    label_ids: vec![label.id],
                },
            )
            .await
            .unwrap();

        assert!(matches!(store.delete_status(status.id).await, Err(StoreError::InUse)));
        assert!(matches!(store.delete_label(label.id).await, Err(StoreError::InUse)));
        assert!(matches!(store.delete_user(author.id).await, Err(StoreError::InUse)));
        assert!(matches!(store.delete_user(executor.id).await, Err(StoreError::InUse)));

        store.delete_task(task.id).await.unwrap();
        store.delete_status(status.id).await.unwrap();
        store.delete_label(label.id).await.unwrap();
        store.delete_user(executor.id).await.unwrap();
        store.delete_user(author.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete_task(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
    }
}
