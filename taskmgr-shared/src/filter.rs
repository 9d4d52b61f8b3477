//! Task list filtering
//!
//! A [`TaskFilter`] comes straight from the query string of the task list:
//!
//! ```text
//! GET /v1/tasks?status=<uuid>&executor=<uuid>&labels=<uuid>&own_tasks=on
//! ```
//!
//! Blank parameters are ignored. The populated constraints are ANDed. The
//! same semantics are applied in memory by [`filter_tasks`] and in SQL by
//! the PostgreSQL store through [`TaskFilter::to_query`].

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::models::task::{Task, TaskQuery};

/// Narrowing criteria for the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskFilter {
    /// Keep tasks with this status
    #[serde(deserialize_with = "blank_as_none")]
    pub status: Option<Uuid>,

    /// Keep tasks assigned to this user
    #[serde(deserialize_with = "blank_as_none")]
    pub executor: Option<Uuid>,

    /// Keep tasks carrying this label
    #[serde(deserialize_with = "blank_as_none")]
    pub labels: Option<Uuid>,

    /// Keep only tasks authored by the actor
    #[serde(deserialize_with = "checkbox")]
    pub own_tasks: bool,
}

impl TaskFilter {
    /// Equality constraints for the store, resolving `own_tasks` to the actor
    pub fn to_query(&self, actor_id: Uuid) -> TaskQuery {
        TaskQuery {
            status_id: self.status,
            executor_id: self.executor,
            label_id: self.labels,
            author_id: self.own_tasks.then_some(actor_id),
        }
    }

    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        *self == TaskFilter::default()
    }
}

/// Narrows `base` without touching it; order is preserved
pub fn filter_tasks(base: &[Task], filter: &TaskFilter, actor_id: Uuid) -> Vec<Task> {
    let query = filter.to_query(actor_id);
    base.iter().filter(|t| query.matches(t)).cloned().collect()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// HTML checkboxes submit "on"; API clients tend to send "true" or "1"
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(str::trim),
        Some("on" | "true" | "1")
    ))
}
