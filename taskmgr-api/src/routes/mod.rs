//! API route handlers, one module per resource
//!
//! Handlers stay thin: extract, call the rule layer, wrap the result with
//! the confirmation message shown to the user.

use serde::Serialize;

pub mod health;
pub mod labels;
pub mod session;
pub mod statuses;
pub mod tasks;
pub mod users;

/// Response for a successful create or update
#[derive(Debug, Serialize)]
pub struct Saved<T> {
    /// Confirmation message
    pub message: &'static str,

    /// The stored record
    pub data: T,
}

/// Response for a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
}

/// Response for list endpoints
#[derive(Debug, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
