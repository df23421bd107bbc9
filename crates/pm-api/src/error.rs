//! API error handling
//!
//! Every failure leaves the API as `{ "message": ... }` with a matching
//! status code. Validation failures additionally carry the per-field map.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pm_auth::{messages, JwtError, PasswordError};
use pm_core::error::{PmError, ValidationErrors};
use pm_db::RepositoryError;
use serde::Serialize;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    /// `"<Entity> not found"`
    pub fn not_found(entity: &str) -> Self {
        ApiError::NotFound(format!("{} not found", entity))
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(errors) => errors.full_messages().join(", "),
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            message: self.message(),
            errors: match self {
                ApiError::Validation(errors) if !errors.errors.is_empty() => Some(errors.errors),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PmError> for ApiError {
    fn from(err: PmError) -> Self {
        match err {
            PmError::NotFound(msg) => ApiError::NotFound(msg),
            PmError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            PmError::Forbidden(msg) => ApiError::Forbidden(msg),
            PmError::BadRequest(msg) => ApiError::BadRequest(msg),
            PmError::Validation(errors) => ApiError::Validation(errors),
            PmError::Conflict(msg) => ApiError::Conflict(msg),
            PmError::Database(msg) => {
                tracing::error!(error = %msg, "database error");
                ApiError::internal("Database error")
            }
            PmError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ApiError::Internal(msg)
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        PmError::from(err).into()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingFailed(msg) => {
                tracing::error!(error = %msg, "token encoding failed");
                ApiError::internal("Could not issue token")
            }
            JwtError::Expired | JwtError::Invalid(_) => {
                ApiError::unauthorized(messages::INVALID_TOKEN)
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "password hashing failed");
        ApiError::internal("Could not process password")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pm_error_mapping() {
        let err: ApiError = PmError::not_found("Project").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Project not found");

        let err: ApiError = PmError::forbidden("Managerial access required").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err: ApiError = PmError::Database("connection reset".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Database error");
    }

    #[test]
    fn test_validation_is_bad_request_with_joined_message() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "is required");
        errors.add_base("Please provide email, password and organization");

        let err = ApiError::from(errors);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "Please provide email, password and organization, title is required"
        );
    }

    #[test]
    fn test_jwt_errors_are_unauthorized() {
        let err: ApiError = JwtError::Expired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), messages::INVALID_TOKEN);
    }

    #[test]
    fn test_repository_not_found() {
        let err: ApiError = RepositoryError::NotFound("Leave request").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Leave request not found");
    }
}
