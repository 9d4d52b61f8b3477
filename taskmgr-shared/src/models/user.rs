//! User model and database operations
//!
//! Users register themselves, author tasks and are assigned to tasks as
//! executors. A user row cannot be deleted while any task references it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     username VARCHAR(150) NOT NULL UNIQUE,
//!     first_name VARCHAR(150) NOT NULL,
//!     last_name VARCHAR(150) NOT NULL,
//!     password_hash VARCHAR(255) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskmgr_shared::models::user::{User, UserData};
//! use taskmgr_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let user = User::create(&pool, UserData {
//!     username: "jdoe".to_string(),
//!     first_name: "John".to_string(),
//!     last_name: "Doe".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//! }).await?;
//!
//! let found = User::find_by_username(&pool, "jdoe").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing a registered account
///
/// Passwords are stored as Argon2id hashes and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable user columns
///
/// Used for both inserts and updates; updates replace every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    /// Login name
    pub username: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Returns "First Last" for display in task listings
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: UserData) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, first_name, last_name, password_hash,
                      created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, last_name, password_hash,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, last_name, password_hash,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces every writable column of an existing user
    ///
    /// The `updated_at` timestamp is set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UserData,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4,
                password_hash = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, first_name, last_name, password_hash,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if the user didn't exist
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation while any task references the user as
    /// author or executor.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, last_name, password_hash,
                   created_at, updated_at
            FROM users
            ORDER BY created_at, username
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
