//! Request Payloads
//!
//! Wire-level request structures with declarative validation. Missing JSON
//! keys deserialize to empty strings so that presence is reported as a
//! blank-field violation instead of a deserialization failure.

use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{email_validator, password_strength_validator};

/// Payload for POST /api/register
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address, unique across accounts
    #[serde(default)]
    #[validate(length(min = 1, message = "This value should not be blank"))]
    #[validate(custom(function = "email_validator"))]
    pub email: String,

    /// Password, checked against the strength policy
    #[serde(default)]
    #[validate(custom(function = "password_strength_validator"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This value should not be blank"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This value should not be blank"))]
    pub last_name: String,
}

/// Form payload for POST /verifications/email
#[derive(Debug, Clone, Deserialize)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: String,
}

/// Query parameters for GET /verifications/email
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub id: Option<String>,
    pub token: Option<String>,
}

/// Payload for POST /api/forgot-password
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Payload for POST /api/forgot-password/{token}
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Form payload for PATCH /api/users/{id}/email
#[derive(Debug, Clone, Deserialize)]
pub struct PatchEmailRequest {
    #[serde(default)]
    pub email: String,
}
