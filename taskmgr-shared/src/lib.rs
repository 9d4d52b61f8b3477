//! # Task Manager Shared Library
//!
//! This crate contains the entity models, persistence adapters and the rule
//! layer used by the task manager API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, statuses, labels and tasks plus their SQL operations
//! - `db`: Connection pooling and migrations
//! - `store`: Persistence port with PostgreSQL and in-memory adapters
//! - `validation`: Submission forms and field-level error reporting
//! - `auth`: Password hashing, access tokens and authorization predicates
//! - `protection`: Deletion protection for referenced entities
//! - `filter`: Task list narrowing
//! - `manager`: The operations exposed to the request-handling layer

pub mod auth;
pub mod db;
pub mod filter;
pub mod manager;
pub mod models;
pub mod protection;
pub mod store;
pub mod validation;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
