//! Task model and database operations
//!
//! A task always has an author, an executor and a status. The author is set
//! once at creation and never rewritten. Labels live in the `task_labels`
//! link table and are aggregated back into `label_ids` on every read.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(150) NOT NULL UNIQUE,
//!     description TEXT NOT NULL DEFAULT '',
//!     status_id UUID NOT NULL REFERENCES statuses(id) ON DELETE RESTRICT,
//!     author_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
//!     executor_id UUID NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE TABLE task_labels (
//!     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     label_id UUID NOT NULL REFERENCES labels(id) ON DELETE RESTRICT,
//!     PRIMARY KEY (task_id, label_id)
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskmgr_shared::models::task::{Task, TaskData, TaskQuery};
//! use taskmgr_shared::db::pool::{create_pool, DatabaseConfig};
//! use uuid::Uuid;
//!
//! # async fn example(status_id: Uuid, author_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let task = Task::create(&pool, author_id, TaskData {
//!     name: "Write report".to_string(),
//!     description: String::new(),
//!     status_id,
//!     executor_id: author_id,
//!     label_ids: vec![],
//! }).await?;
//!
//! let mine = Task::list(&pool, &TaskQuery {
//!     author_id: Some(author_id),
//!     ..Default::default()
//! }).await?;
//! assert!(mine.iter().any(|t| t.id == task.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const SELECT_TASKS: &str = r#"
    SELECT t.id, t.name, t.description, t.status_id, t.author_id, t.executor_id,
           t.created_at,
           COALESCE(
               ARRAY_AGG(tl.label_id ORDER BY tl.label_id)
                   FILTER (WHERE tl.label_id IS NOT NULL),
               '{}'
           ) AS label_ids
    FROM tasks t
    LEFT JOIN task_labels tl ON tl.task_id = t.id
"#;

/// Task assigned to an executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task name, unique across tasks
    pub name: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Current status
    pub status_id: Uuid,

    /// User who created the task
    pub author_id: Uuid,

    /// User assigned to carry out the task
    pub executor_id: Uuid,

    /// Attached labels, sorted by ID
    #[sqlx(default)]
    pub label_ids: Vec<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Writable task columns
///
/// The author is deliberately absent: it is passed separately on create and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    pub name: String,
    pub description: String,
    pub status_id: Uuid,
    pub executor_id: Uuid,
    pub label_ids: Vec<Uuid>,
}

/// Equality constraints applied when listing tasks
///
/// Every populated field narrows the result; the constraints are ANDed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status_id: Option<Uuid>,
    pub executor_id: Option<Uuid>,
    pub label_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
}

impl TaskQuery {
    /// Returns true if the task satisfies every populated constraint
    pub fn matches(&self, task: &Task) -> bool {
        self.status_id.map_or(true, |id| task.status_id == id)
            && self.executor_id.map_or(true, |id| task.executor_id == id)
            && self.label_id.map_or(true, |id| task.label_ids.contains(&id))
            && self.author_id.map_or(true, |id| task.author_id == id)
    }
}

impl Task {
    /// Returns true if the task references the given user as author or executor
    pub fn involves_user(&self, user_id: Uuid) -> bool {
        self.author_id == user_id || self.executor_id == user_id
    }

    /// Creates a task and its label links in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is taken (unique violation)
    /// - Status, author, executor or a label doesn't exist (foreign key violation)
    /// - Database connection fails
    ///
    /// Any failure rolls back the whole insert.
    pub async fn create(pool: &PgPool, author_id: Uuid, data: TaskData) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, description, status_id, author_id, executor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, status_id, author_id, executor_id, created_at
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status_id)
        .bind(author_id)
        .bind(data.executor_id)
        .fetch_one(&mut *tx)
        .await?;

        link_labels(&mut tx, task.id, &data.label_ids).await?;
        tx.commit().await?;

        task.label_ids = sorted(data.label_ids);
        Ok(task)
    }

    /// Finds a task by ID, including its labels
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_TASKS);
        query.push(" WHERE t.id = ").push_bind(id).push(" GROUP BY t.id");

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Replaces the writable columns and the label set of a task
    ///
    /// Returns None when the task doesn't exist.
    ///
    /// # Errors
    ///
    /// Same as [`Task::create`]; a failure leaves the task unchanged.
    pub async fn update(pool: &PgPool, id: Uuid, data: TaskData) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, status_id = $4, executor_id = $5
            WHERE id = $1
            RETURNING id, name, description, status_id, author_id, executor_id, created_at
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status_id)
        .bind(data.executor_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_labels(&mut tx, id, &data.label_ids).await?;
        tx.commit().await?;

        task.label_ids = sorted(data.label_ids);
        Ok(Some(task))
    }

    /// Deletes a task; its label links go with it
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks matching the query, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(pool: &PgPool, filter: &TaskQuery) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_TASKS);
        query.push(" WHERE TRUE");

        if let Some(status_id) = filter.status_id {
            query.push(" AND t.status_id = ").push_bind(status_id);
        }
        if let Some(executor_id) = filter.executor_id {
            query.push(" AND t.executor_id = ").push_bind(executor_id);
        }
        if let Some(author_id) = filter.author_id {
            query.push(" AND t.author_id = ").push_bind(author_id);
        }
        if let Some(label_id) = filter.label_id {
            query
                .push(" AND EXISTS (SELECT 1 FROM task_labels f WHERE f.task_id = t.id AND f.label_id = ")
                .push_bind(label_id)
                .push(")");
        }

        query.push(" GROUP BY t.id ORDER BY t.created_at, t.name");

        query.build_query_as::<Task>().fetch_all(pool).await
    }
}

async fn link_labels(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    task_id: Uuid,
    label_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    if label_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO task_labels (task_id, label_id)
        SELECT $1, UNNEST($2::uuid[])
        "#,
    )
    .bind(task_id)
    .bind(label_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn sorted(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status_id: Uuid, executor_id: Uuid, label_ids: Vec<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "t".to_string(),
            description: String::new(),
            status_id,
            author_id: Uuid::new_v4(),
            executor_id,
            label_ids,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let t = task(Uuid::new_v4(), Uuid::new_v4(), vec![]);
        assert!(TaskQuery::default().matches(&t));
    }

    #[test]
    fn test_query_constraints_are_conjunctive() {
        let status = Uuid::new_v4();
        let executor = Uuid::new_v4();
        let label = Uuid::new_v4();
        let t = task(status, executor, vec![label]);

        let both = TaskQuery {
            status_id: Some(status),
            executor_id: Some(executor),
            label_id: Some(label),
            ..Default::default()
        };
        assert!(both.matches(&t));

        let wrong_executor = TaskQuery {
            executor_id: Some(Uuid::new_v4()),
            ..both
        };
        assert!(!wrong_executor.matches(&t));
    }

    #[test]
    fn test_involves_user() {
        let executor = Uuid::new_v4();
        let t = task(Uuid::new_v4(), executor, vec![]);
        assert!(t.involves_user(executor));
        assert!(t.involves_user(t.author_id));
        assert!(!t.involves_user(Uuid::new_v4()));
    }

    #[test]
    fn test_sorted_dedups_labels() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let out = sorted(vec![a, b, a]);
        assert_eq!(out.len(), 2);
        assert!(out.windows(2).all(|w| w[0] <= w[1]));
    }
}
