//! Submission validation
//!
//! Each entity is created or updated from a form submission. A form is
//! cleaned into the data the store needs, or rejected with a [`FieldErrors`]
//! map of field name to error list. Cleaning never touches the store;
//! uniqueness and reference checks are reported by the store's own
//! constraints and folded into the same map with [`FieldErrors::from_store`].
//!
//! # Example
//!
//! ```
//! use taskmgr_shared::validation::{forms::NameForm, FieldErrorKind};
//!
//! let form = NameForm { name: "  ".to_string() };
//! let errors = form.clean().unwrap_err();
//! assert!(errors.has("name", FieldErrorKind::MissingField));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::EntityKind;
use crate::store::StoreError;

pub mod forms;

/// Default minimum password length
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Tunable validation limits, passed in at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Minimum number of characters in a password
    pub min_password_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

/// Kinds of field-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required value absent or blank
    MissingField,

    /// Value longer than the column allows
    TooLong,

    /// Value collides with an existing record
    Duplicate,

    /// Username contains characters outside the allowed set
    InvalidFormat,

    /// The two password inputs differ
    PasswordMismatch,

    /// Password shorter than the configured minimum
    PasswordTooShort,

    /// Reference to a status, user or label that does not exist
    InvalidChoice,
}

impl FieldErrorKind {
    /// Stable code used in API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::MissingField => "missing_field",
            FieldErrorKind::TooLong => "too_long",
            FieldErrorKind::Duplicate => "duplicate",
            FieldErrorKind::InvalidFormat => "invalid_format",
            FieldErrorKind::PasswordMismatch => "password_mismatch",
            FieldErrorKind::PasswordTooShort => "password_too_short",
            FieldErrorKind::InvalidChoice => "invalid_choice",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field failure with its user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

/// Field name to error list, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<FieldError>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error against `field`
    pub fn add(&mut self, field: &str, kind: FieldErrorKind, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(FieldError {
            field: field.to_string(),
            kind,
            message: message.into(),
        });
    }

    /// Records `missing_field` against `field`
    pub fn missing(&mut self, field: &str) {
        self.add(field, FieldErrorKind::MissingField, messages::REQUIRED);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors recorded against `field`
    pub fn get(&self, field: &str) -> &[FieldError] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `field` carries an error of `kind`
    pub fn has(&self, field: &str, kind: FieldErrorKind) -> bool {
        self.get(field).iter().any(|e| e.kind == kind)
    }

    /// Names of every field with at least one error
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every error, grouped by field
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.values().flatten()
    }

    /// Returns `value` when no errors were recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Converts a constraint failure from the store into field errors
    ///
    /// Unique violations become `duplicate` and dangling references become
    /// `invalid_choice`. Any other store error is handed back unchanged.
    pub fn from_store(kind: EntityKind, err: StoreError) -> Result<FieldErrors, StoreError> {
        let mut errors = FieldErrors::new();
        match err {
            StoreError::UniqueViolation { field } => {
                errors.add(field, FieldErrorKind::Duplicate, messages::duplicate(kind));
            }
            StoreError::InvalidReference { field } => {
                errors.add(field, FieldErrorKind::InvalidChoice, messages::INVALID_CHOICE);
            }
            other => return Err(other),
        }
        Ok(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// User-facing error messages
pub mod messages {
    use crate::models::EntityKind;

    pub const REQUIRED: &str = "This field is required.";

    pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only \
         letters, numbers, and @/./+/-/_ characters.";

    pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

    pub const INVALID_CHOICE: &str =
        "Select a valid choice. That choice is not one of the available choices.";

    pub fn too_long(max: usize, actual: usize) -> String {
        format!("Ensure this value has at most {max} characters (it has {actual}).")
    }

    pub fn password_too_short(min: usize) -> String {
        format!("This password is too short. It must contain at least {min} characters.")
    }

    pub fn duplicate(kind: EntityKind) -> String {
        match kind {
            EntityKind::User => "A user with that username already exists.".to_string(),
            other => format!("{} with this Name already exists.", other.title()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collect_by_field() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        errors.add("password2", FieldErrorKind::PasswordMismatch, messages::PASSWORD_MISMATCH);

        assert!(errors.has("name", FieldErrorKind::MissingField));
        assert!(!errors.has("name", FieldErrorKind::TooLong));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "password2"]);
        assert!(errors.get("status").is_empty());
    }

    #[test]
    fn test_from_store_maps_constraint_failures() {
        let errors = FieldErrors::from_store(
            EntityKind::Status,
            StoreError::UniqueViolation { field: "name" },
        )
        .unwrap();
        assert_eq!(errors.get("name")[0].message, "Status with this Name already exists.");

        let errors = FieldErrors::from_store(
            EntityKind::Task,
            StoreError::InvalidReference { field: "executor" },
        )
        .unwrap();
        assert!(errors.has("executor", FieldErrorKind::InvalidChoice));

        assert!(FieldErrors::from_store(EntityKind::Task, StoreError::InUse).is_err());
    }

    #[test]
    fn test_user_duplicate_message() {
        assert_eq!(
            messages::duplicate(EntityKind::User),
            "A user with that username already exists."
        );
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0]["kind"], "missing_field");
        assert_eq!(json["name"][0]["message"], "This field is required.");
    }
}
