//! Custom error types for the helpdesk service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name → list of validation messages, serialized as the response body
/// of a 400 so clients can attach messages to individual form fields.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Custom error type for the helpdesk service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Record absent, or not visible to the requesting principal. The two
    /// cases are indistinguishable to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Field-level validation failure
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Duplicate value on a unique field
    #[error("Conflict on field {field}")]
    Conflict { field: &'static str, message: String },

    /// Too many attempts against a rate-limited endpoint
    #[error("Too many requests")]
    TooManyRequests,

    /// Internal server error, reported generically
    #[error("Internal server error")]
    InternalServerError,

    /// Database error, reported generically
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl ApiError {
    /// Build a single-field validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Unauthorized"})),
            )
                .into_response(),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("{} not found", what)})),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::Conflict { field, message } => {
                let mut errors = FieldErrors::new();
                errors.insert(field.to_string(), vec![message]);
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": "Too many requests"})),
            )
                .into_response(),
            ApiError::InternalServerError | ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response(),
        }
    }
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("ticket").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("subject", "This field is required")
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict {
                field: "username",
                message: "A user with that username already exists".to_string(),
            }
            .into_response()
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::TooManyRequests.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::InternalServerError.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_builder_keys_by_field() {
        let err = ApiError::validation("username", "A user with that username already exists");
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors["username"],
                    vec!["A user with that username already exists".to_string()]
                );
            }
            _ => panic!("expected validation error"),
        }
    }
}
