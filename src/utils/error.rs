//! Error Handling Utilities
//!
//! Application error taxonomy and its mapping onto HTTP responses.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Field name to ordered list of human-readable violation messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Main application error type covering every flow in the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or empty request payload
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures, keyed by field name
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Password strength violations raised inside the reset flow; carries
    /// only the password messages
    #[error("Password validation failed")]
    PasswordValidation(Vec<String>),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate unique field
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed; details are logged, never returned
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Mailer reported a failed delivery in a flow where that is fatal
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Internal failure with a user-presentable generic message
    #[error("Internal error: {0}")]
    Internal(String),

    /// Server misconfiguration (SMTP relay, templates, signing keys)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            AppError::Validation(errors) => {
                // The field map itself is the response body
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            AppError::PasswordValidation(messages) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": messages })),
            )
                .into_response(),
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
            }
            AppError::Database(err) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::Hashing(err) => {
                error!("Password hashing error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::Delivery(err) => {
                error!("Mail delivery failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Unable to send email" })),
                )
                    .into_response()
            }
            AppError::Internal(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message })),
                )
                    .into_response()
            }
            AppError::Configuration(err) => {
                error!("Configuration error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_carries_field_map() {
        let mut fields = FieldErrors::new();
        fields.insert(
            "password".to_string(),
            vec!["Password must contain at least one digit".to_string()],
        );
        let err = AppError::Validation(fields);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("User not found".into())
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("User already exists.".into())
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Delivery("smtp down".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::BadRequest("Empty request received.".into())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
