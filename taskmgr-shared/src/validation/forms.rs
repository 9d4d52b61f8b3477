//! Submission forms for users, statuses, labels and tasks
//!
//! Forms deserialize leniently: absent fields become empty and are then
//! reported as `missing_field` by `clean`. Text fields are trimmed before
//! checking; passwords are taken as typed.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{messages, FieldErrorKind, FieldErrors, ValidationConfig};
use crate::models::{task::TaskData, MAX_NAME_LENGTH};

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"))
}

/// Turns `length` failures from the derived validator into `too_long`
/// errors that state the submitted length.
fn length_errors<'a>(
    result: Result<(), ValidationErrors>,
    value_of: impl Fn(&str) -> &'a str,
    errors: &mut FieldErrors,
) {
    let Err(failures) = result else {
        return;
    };

    for (field, _) in failures.field_errors() {
        let field: &str = &field;
        let actual = value_of(field).chars().count();
        errors.add(
            field,
            FieldErrorKind::TooLong,
            messages::too_long(MAX_NAME_LENGTH, actual),
        );
    }
}

/// Registration and profile update form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserForm {
    #[validate(length(max = 150, code = "too_long"))]
    pub username: String,

    #[validate(length(max = 150, code = "too_long"))]
    pub first_name: String,

    #[validate(length(max = 150, code = "too_long"))]
    pub last_name: String,

    pub password1: String,

    pub password2: String,
}

/// A cleaned user submission; the password is still plaintext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl UserForm {
    fn value_of(&self, field: &str) -> &str {
        match field {
            "username" => &self.username,
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            _ => "",
        }
    }

    /// Validates the submission
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn clean(&self, config: &ValidationConfig) -> Result<CleanUser, FieldErrors> {
        let form = UserForm {
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password1: self.password1.clone(),
            password2: self.password2.clone(),
        };
        let mut errors = FieldErrors::new();

        for (field, value) in [
            ("first_name", &form.first_name),
            ("last_name", &form.last_name),
            ("username", &form.username),
            ("password1", &form.password1),
            ("password2", &form.password2),
        ] {
            if value.is_empty() {
                errors.missing(field);
            }
        }

        length_errors(form.validate(), |field| form.value_of(field), &mut errors);

        if !form.username.is_empty() && !username_pattern().is_match(&form.username) {
            errors.add(
                "username",
                FieldErrorKind::InvalidFormat,
                messages::INVALID_USERNAME,
            );
        }

        if !form.password1.is_empty() && !form.password2.is_empty() {
            if form.password1 != form.password2 {
                errors.add(
                    "password2",
                    FieldErrorKind::PasswordMismatch,
                    messages::PASSWORD_MISMATCH,
                );
            } else if form.password2.chars().count() < config.min_password_length {
                errors.add(
                    "password2",
                    FieldErrorKind::PasswordTooShort,
                    messages::password_too_short(config.min_password_length),
                );
            }
        }

        errors.into_result(CleanUser {
            username: form.username,
            first_name: form.first_name,
            last_name: form.last_name,
            password: form.password1,
        })
    }
}

/// Status and label form
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NameForm {
    #[validate(length(max = 150, code = "too_long"))]
    pub name: String,
}

impl NameForm {
    /// Returns the trimmed name
    ///
    /// # Errors
    ///
    /// `missing_field` or `too_long` on `name`.
    pub fn clean(&self) -> Result<String, FieldErrors> {
        let form = NameForm {
            name: self.name.trim().to_string(),
        };
        let mut errors = FieldErrors::new();

        if form.name.is_empty() {
            errors.missing("name");
        }
        length_errors(form.validate(), |_| form.name.as_str(), &mut errors);

        errors.into_result(form.name)
    }
}

/// Task form
///
/// References arrive as raw strings so that a malformed ID can be reported
/// as `invalid_choice` instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TaskForm {
    #[validate(length(max = 150, code = "too_long"))]
    pub name: String,

    pub description: String,

    pub status: String,

    pub executor: String,

    pub labels: Vec<String>,
}

impl TaskForm {
    /// Validates the submission into writable task columns
    ///
    /// Label IDs are deduplicated and sorted.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn clean(&self) -> Result<TaskData, FieldErrors> {
        let form = TaskForm {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            status: self.status.trim().to_string(),
            executor: self.executor.trim().to_string(),
            labels: self.labels.clone(),
        };
        let mut errors = FieldErrors::new();

        if form.name.is_empty() {
            errors.missing("name");
        }
        length_errors(form.validate(), |_| form.name.as_str(), &mut errors);

        let status_id = reference(&form.status, "status", &mut errors);
        let executor_id = reference(&form.executor, "executor", &mut errors);

        let mut label_ids = Vec::with_capacity(form.labels.len());
        for raw in form.labels.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            match Uuid::parse_str(raw) {
                Ok(id) => label_ids.push(id),
                Err(_) => {
                    if !errors.has("labels", FieldErrorKind::InvalidChoice) {
                        errors.add("labels", FieldErrorKind::InvalidChoice, messages::INVALID_CHOICE);
                    }
                }
            }
        }
        label_ids.sort();
        label_ids.dedup();

        match (status_id, executor_id) {
            (Some(status_id), Some(executor_id)) if errors.is_empty() => Ok(TaskData {
                name: form.name,
                description: form.description,
                status_id,
                executor_id,
                label_ids,
            }),
            _ => Err(errors),
        }
    }
}

/// Parses a required reference field
fn reference(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    if raw.is_empty() {
        errors.missing(field);
        return None;
    }
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, FieldErrorKind::InvalidChoice, messages::INVALID_CHOICE);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_user() -> UserForm {
        UserForm {
            username: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            password1: "correct horse".to_string(),
            password2: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_valid_user_is_trimmed() {
        let form = UserForm {
            first_name: "  John ".to_string(),
            ..valid_user()
        };
        let clean = form.clean(&ValidationConfig::default()).unwrap();
        assert_eq!(clean.first_name, "John");
        assert_eq!(clean.password, "correct horse");
    }

    #[test]
    fn test_missing_user_fields() {
        let errors = UserForm::default()
            .clean(&ValidationConfig::default())
            .unwrap_err();
        for field in ["username", "first_name", "last_name", "password1", "password2"] {
            assert!(errors.has(field, FieldErrorKind::MissingField), "{field}");
        }
    }

    #[test]
    fn test_username_format() {
        let form = UserForm {
            username: "john doe!".to_string(),
            ..valid_user()
        };
        let errors = form.clean(&ValidationConfig::default()).unwrap_err();
        assert!(errors.has("username", FieldErrorKind::InvalidFormat));

        let form = UserForm {
            username: "j.doe+work@example-1_".to_string(),
            ..valid_user()
        };
        assert!(form.clean(&ValidationConfig::default()).is_ok());
    }

    #[test]
    fn test_password_mismatch_reported_on_confirmation() {
        let form = UserForm {
            password2: "something else".to_string(),
            ..valid_user()
        };
        let errors = form.clean(&ValidationConfig::default()).unwrap_err();
        assert!(errors.has("password2", FieldErrorKind::PasswordMismatch));
        assert!(!errors.has("password2", FieldErrorKind::PasswordTooShort));
    }

    #[test]
    fn test_password_minimum_follows_config() {
        let form = UserForm {
            password1: "abc".to_string(),
            password2: "abc".to_string(),
            ..valid_user()
        };
        let errors = form.clean(&ValidationConfig::default()).unwrap_err();
        assert_eq!(
            errors.get("password2")[0].message,
            "This password is too short. It must contain at least 8 characters."
        );

        let lenient = ValidationConfig {
            min_password_length: 3,
        };
        assert!(form.clean(&lenient).is_ok());
    }

    #[test]
    fn test_too_long_states_length() {
        let form = NameForm {
            name: "x".repeat(151),
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(
            errors.get("name")[0].message,
            "Ensure this value has at most 150 characters (it has 151)."
        );

        let form = UserForm {
            last_name: "é".repeat(160),
            ..valid_user()
        };
        let errors = form.clean(&ValidationConfig::default()).unwrap_err();
        assert_eq!(
            errors.get("last_name")[0].message,
            "Ensure this value has at most 150 characters (it has 160)."
        );
    }

    #[test]
    fn test_name_at_limit_is_accepted() {
        let form = NameForm {
            name: "x".repeat(MAX_NAME_LENGTH),
        };
        assert_eq!(form.clean().unwrap().len(), MAX_NAME_LENGTH);
    }

    #[test]
    fn test_task_form_requires_references() {
        let form = TaskForm {
            name: "Write report".to_string(),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("status", FieldErrorKind::MissingField));
        assert!(errors.has("executor", FieldErrorKind::MissingField));
        assert!(!errors.has("name", FieldErrorKind::MissingField));
        assert!(errors.get("labels").is_empty());
    }

    #[test]
    fn test_task_form_rejects_malformed_ids() {
        let form = TaskForm {
            name: "Write report".to_string(),
            status: "not-a-uuid".to_string(),
            executor: Uuid::new_v4().to_string(),
            labels: vec!["nope".to_string(), "also nope".to_string()],
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("status", FieldErrorKind::InvalidChoice));
        assert_eq!(errors.get("labels").len(), 1);
    }

    #[test]
    fn test_task_form_dedups_labels() {
        let label = Uuid::new_v4();
        let form = TaskForm {
            name: " Write report ".to_string(),
            description: String::new(),
            status: Uuid::new_v4().to_string(),
            executor: Uuid::new_v4().to_string(),
            labels: vec![label.to_string(), label.to_string(), String::new()],
        };
        let data = form.clean().unwrap();
        assert_eq!(data.name, "Write report");
        assert_eq!(data.label_ids, vec![label]);
    }
}
