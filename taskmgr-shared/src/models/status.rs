//! Status model and database operations
//!
//! Every task carries exactly one status. A status cannot be deleted while a
//! task references it (`ON DELETE RESTRICT`).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE statuses (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(150) NOT NULL UNIQUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task status such as "new" or "in progress"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    /// Unique status ID
    pub id: Uuid,

    /// Status name, unique across statuses
    pub name: String,

    /// When the status was created
    pub created_at: DateTime<Utc>,
}

impl Status {
    /// Creates a new status
    ///
    /// # Errors
    ///
    /// Returns a unique violation when the name is taken.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Status>(
            r#"
            INSERT INTO statuses (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Finds a status by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Status>("SELECT id, name, created_at FROM statuses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Renames a status
    ///
    /// Returns None when the status doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns a unique violation when the new name is taken.
    pub async fn update(pool: &PgPool, id: Uuid, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Status>(
            r#"
            UPDATE statuses
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

    /// Deletes a status
    ///
    /// # Returns
    ///
    /// True if the status was deleted, false if it didn't exist
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation while any task references the status.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all statuses, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Status>("SELECT id, name, created_at FROM statuses ORDER BY created_at, name")
            .fetch_all(pool)
            .await
    }
}
