//! Error handling for the API server
//!
//! Every handler returns [`ApiResult`]. Rule-layer failures convert through
//! `From<ServiceError>`, so handlers just use `?`. Extractor rejections
//! convert the same way (see [`crate::extract`]).
//!
//! | Failure                      | Status | `error`            |
//! |------------------------------|--------|--------------------|
//! | field validation             | 422    | `validation_error` |
//! | not logged in / bad token    | 401    | `unauthorized`     |
//! | not the owner                | 403    | `forbidden`        |
//! | unknown ID                   | 404    | `not_found`        |
//! | referenced entity on delete  | 409    | `in_use`           |
//! | malformed body or query      | 400    | `bad_request`      |
//! | malformed ID in the path     | 404    | `not_found`        |
//! | anything else                | 500    | `internal_error`   |

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use taskmgr_shared::auth::authorization::AuthzError;
use taskmgr_shared::auth::jwt::JwtError;
use taskmgr_shared::manager::ServiceError;
use taskmgr_shared::validation::FieldErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - delete refused while the entity is referenced
    InUse(String),

    /// Unprocessable entity (422) - per-field errors
    ValidationError(FieldErrors),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "validation_error", "forbidden")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field errors, keyed by field name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InUse(msg) => write!(f, "In use: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} fields", errors.fields().count())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::InUse(msg) => (StatusCode::CONFLICT, "in_use", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthorized(err.to_string()),
            AuthzError::NotSelf | AuthzError::NotAuthor => ApiError::Forbidden(err.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => ApiError::ValidationError(errors),
            ServiceError::Denied(reason) => reason.into(),
            ServiceError::Blocked(blocked) => ApiError::InUse(blocked.message),
            ServiceError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            ServiceError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            ServiceError::Password(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            ServiceError::Store(e) => ApiError::InternalError(format!("Store error: {}", e)),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Create(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            JwtError::Invalid(_) => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::NotFound(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskmgr_shared::models::EntityKind;
    use taskmgr_shared::protection::ProtectionError;
    use taskmgr_shared::validation::FieldErrorKind;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_validation_error_display() {
        let mut errors = FieldErrors::new();
        errors.missing("name");
        errors.add("status", FieldErrorKind::InvalidChoice, "bad");

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 fields");
    }

    #[test]
    fn test_service_error_status_codes() {
        let mut errors = FieldErrors::new();
        errors.missing("name");

        assert_eq!(
            status_of(ServiceError::Validation(errors)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ServiceError::Denied(AuthzError::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ServiceError::Denied(AuthzError::NotAuthor)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::Blocked(ProtectionError::in_use(EntityKind::Label))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::NotFound {
                kind: EntityKind::Task,
                id: Uuid::new_v4()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ServiceError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        assert_eq!(status_of(JwtError::Expired), StatusCode::UNAUTHORIZED);
    }
}
