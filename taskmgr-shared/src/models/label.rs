//! Label model and database operations
//!
//! Labels are attached to tasks through the `task_labels` link table. A label
//! still linked to any task cannot be deleted.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE labels (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(150) NOT NULL UNIQUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Label attached to tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Label {
    /// Unique label ID
    pub id: Uuid,

    /// Label name, unique across labels
    pub name: String,

    /// When the label was created
    pub created_at: DateTime<Utc>,
}

impl Label {
    /// Creates a new label
    ///
    /// # Errors
    ///
    /// Returns a unique violation when the name is taken.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            INSERT INTO labels (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Finds a label by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds every label whose ID is in `ids`
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            "SELECT id, name, created_at FROM labels WHERE id = ANY($1) ORDER BY created_at, name",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Renames a label
    ///
    /// Returns None when the label doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns a unique violation when the new name is taken.
    pub async fn update(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"
            UPDATE labels
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a label
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation while the label is linked to a task.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all labels, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Label>("SELECT id, name, created_at FROM labels ORDER BY created_at, name")
            .fetch_all(pool)
            .await
    }
}
