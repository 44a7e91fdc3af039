//! Validation Utilities
//!
//! Input validation functions for account data and API requests, plus the
//! conversion from constraint violations to the wire-level field error map.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// Validates email address format using a comprehensive regex pattern
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    regex.is_match(email)
}

/// Normalizes email address to lowercase and removes surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Custom validator for email fields using the validator crate
///
/// Empty values pass here so that presence is reported as a separate
/// blank-field violation, not a format one.
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || validate_email(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_email");
        err.message = Some(Cow::Borrowed(messages::INVALID_EMAIL));
        Err(err)
    }
}

/// Validates password strength: minimum length 8, mixed case, at least one
/// digit and one special character. Reports the first unmet requirement.
pub fn password_strength_validator(password: &str) -> Result<(), ValidationError> {
    let fail = |message: &'static str| {
        let mut err = ValidationError::new("password_strength");
        err.message = Some(Cow::Borrowed(message));
        Err(err)
    };

    if password.len() < 8 {
        return fail(messages::PASSWORD_TOO_SHORT);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return fail(messages::PASSWORD_MISSING_LOWERCASE);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return fail(messages::PASSWORD_MISSING_UPPERCASE);
    }
    if !password.chars().any(|c| c.is_numeric()) {
        return fail(messages::PASSWORD_MISSING_DIGIT);
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return fail(messages::PASSWORD_MISSING_SPECIAL);
    }

    Ok(())
}

/// Converts constraint violations into the `{field: [messages]}` map
/// returned by the API.
///
/// Bracket characters are stripped from property paths and field names are
/// rendered in camelCase to match the request payloads.
pub fn violations_to_map(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (field, violations) in errors.field_errors() {
        let field_name = to_camel_case(&field.replace(['[', ']'], ""));
        if field_name.is_empty() {
            continue;
        }
        let entry = map.entry(field_name).or_default();
        for violation in violations {
            let message = violation
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for field '{}'", field));
            entry.push(message);
        }
    }

    map
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Validation error messages for user-facing responses
pub mod messages {
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const FIELD_BLANK: &str = "This value should not be blank";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
    pub const PASSWORD_MISSING_LOWERCASE: &str =
        "Password must contain at least one lowercase letter";
    pub const PASSWORD_MISSING_UPPERCASE: &str =
        "Password must contain at least one uppercase letter";
    pub const PASSWORD_MISSING_DIGIT: &str = "Password must contain at least one digit";
    pub const PASSWORD_MISSING_SPECIAL: &str =
        "Password must contain at least one special character";
}
