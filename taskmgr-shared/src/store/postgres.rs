//! PostgreSQL store adapter
//!
//! Delegates to the model functions in [`crate::models`] and translates
//! constraint failures into [`StoreError`] variants by SQLSTATE and
//! constraint name.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult, TaskQuery};
use crate::models::{
    label::Label,
    status::Status,
    task::{Task, TaskData},
    user::{User, UserData},
};

/// [`Store`] backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool. Migrations must already be applied.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Borrows the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a failed INSERT or UPDATE.
fn write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("users_username_key") => "username",
                _ => "name",
            };
            return StoreError::UniqueViolation { field };
        }
        if db_err.is_foreign_key_violation() {
            let field = match db_err.constraint() {
                Some("tasks_status_id_fkey") => "status",
                Some("tasks_executor_id_fkey") => "executor",
                Some("tasks_author_id_fkey") => "author",
                _ => "labels",
            };
            return StoreError::InvalidReference { field };
        }
    }

    warn!(error = %err, "Database write failed");
    StoreError::backend(err)
}

/// Maps a failed DELETE. A foreign key violation here means the row is
/// still referenced.
fn delete_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            debug!(constraint = ?db_err.constraint(), "Delete refused by foreign key");
            return StoreError::InUse;
        }
    }

    warn!(error = %err, "Database delete failed");
    StoreError::backend(err)
}

fn read_error(err: sqlx::Error) -> StoreError {
    warn!(error = %err, "Database read failed");
    StoreError::backend(err)
}

fn deleted(removed: bool) -> StoreResult<()> {
    if removed {
        Ok(())
    } else {
        Err(StoreError::NotFound)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, data: UserData) -> StoreResult<User> {
        User::create(&self.pool, data).await.map_err(write_error)
    }

    async fn update_user(&self, id: Uuid, data: UserData) -> StoreResult<User> {
        User::update(&self.pool, id, data)
            .await
            .map_err(write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        User::find_by_id(&self.pool, id).await.map_err(read_error)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        User::find_by_username(&self.pool, username)
            .await
            .map_err(read_error)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        User::list(&self.pool).await.map_err(read_error)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        deleted(User::delete(&self.pool, id).await.map_err(delete_error)?)
    }

    async fn insert_status(&self, name: &str) -> StoreResult<Status> {
        Status::create(&self.pool, name).await.map_err(write_error)
    }

    async fn update_status(&self, id: Uuid, name: &str) -> StoreResult<Status> {
        Status::update(&self.pool, id, name)
            .await
            .map_err(write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn find_status(&self, id: Uuid) -> StoreResult<Option<Status>> {
        Status::find_by_id(&self.pool, id).await.map_err(read_error)
    }

    async fn list_statuses(&self) -> StoreResult<Vec<Status>> {
        Status::list(&self.pool).await.map_err(read_error)
    }

    async fn delete_status(&self, id: Uuid) -> StoreResult<()> {
        deleted(Status::delete(&self.pool, id).await.map_err(delete_error)?)
    }

    async fn insert_label(&self, name: &str) -> StoreResult<Label> {
        Label::create(&self.pool, name).await.map_err(write_error)
    }

    async fn update_label(&self, id: Uuid, name: &str) -> StoreResult<Label> {
        Label::update(&self.pool, id, name)
            .await
            .map_err(write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn find_label(&self, id: Uuid) -> StoreResult<Option<Label>> {
        Label::find_by_id(&self.pool, id).await.map_err(read_error)
    }

    async fn list_labels(&self) -> StoreResult<Vec<Label>> {
        Label::list(&self.pool).await.map_err(read_error)
    }

    async fn delete_label(&self, id: Uuid) -> StoreResult<()> {
        deleted(Label::delete(&self.pool, id).await.map_err(delete_error)?)
    }

    async fn insert_task(&self, author_id: Uuid, data: TaskData) -> StoreResult<Task> {
        Task::create(&self.pool, author_id, data)
            .await
            .map_err(write_error)
    }

    async fn update_task(&self, id: Uuid, data: TaskData) -> StoreResult<Task> {
        Task::update(&self.pool, id, data)
            .await
            .map_err(write_error)?
            .ok_or(StoreError::NotFound)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Task::find_by_id(&self.pool, id).await.map_err(read_error)
    }

    async fn list_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        Task::list(&self.pool, query).await.map_err(read_error)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        deleted(Task::delete(&self.pool, id).await.map_err(delete_error)?)
    }
}
