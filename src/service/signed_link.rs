//! Signed Verification Links
//!
//! Generates and validates the time-limited, tamper-evident links used to
//! confirm email addresses. A link is an HS256 token binding a purpose, a
//! subject identifier, and an email address to an expiry; validity is a
//! pure function of signature and expiry, with no server-side state.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Purpose claim value for email verification links
pub const VERIFY_EMAIL_PURPOSE: &str = "verify_email";

/// Reasons a signed link can fail validation.
///
/// These are logged server-side only; clients always receive a generic
/// message.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignedLinkError {
    #[error("link has expired")]
    Expired,

    #[error("link signature is invalid or tampered with")]
    InvalidSignature,

    #[error("link was issued for a different purpose")]
    PurposeMismatch,

    #[error("link is bound to a different user or email address")]
    SubjectMismatch,

    #[error("failed to sign link: {0}")]
    Generation(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct VerifyEmailClaims {
    purpose: String,
    sub: String,
    email: String,
    exp: i64,
}

/// A freshly generated signed link
#[derive(Debug, Clone)]
pub struct SignedLink {
    /// Full URL to hand to the notification template
    pub url: String,
    /// Bare token, also present as the `token` query parameter of `url`
    pub token: String,
    /// Instant after which the link stops validating
    pub expires_at: DateTime<Utc>,
}

/// Service for generating and validating signed verification links
#[derive(Clone)]
pub struct SignedLinkService {
    secret: String,
    link_lifetime: Duration,
    base_url: String,
}

impl SignedLinkService {
    pub fn new(secret: String, link_lifetime_minutes: i64, base_url: String) -> Self {
        Self {
            secret,
            link_lifetime: Duration::minutes(link_lifetime_minutes),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generate a signed email verification link for a user.
    pub fn generate(&self, user_id: Uuid, email: &str) -> Result<SignedLink, SignedLinkError> {
        let expires_at = Utc::now() + self.link_lifetime;
        let claims = VerifyEmailClaims {
            purpose: VERIFY_EMAIL_PURPOSE.to_string(),
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SignedLinkError::Generation(e.to_string()))?;

        let url = format!(
            "{}/verifications/email?id={}&token={}",
            self.base_url, user_id, token
        );

        Ok(SignedLink {
            url,
            token,
            expires_at,
        })
    }

    /// Validate a signed link against the user it claims to verify.
    ///
    /// Checks, in order: signature and expiry, the purpose claim, and the
    /// binding of the subject identifier and email address.
    pub fn validate(
        &self,
        token: &str,
        expected_id: Uuid,
        expected_email: &str,
    ) -> Result<(), SignedLinkError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<VerifyEmailClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SignedLinkError::Expired,
            _ => SignedLinkError::InvalidSignature,
        })?;

        let claims = data.claims;
        if claims.purpose != VERIFY_EMAIL_PURPOSE {
            return Err(SignedLinkError::PurposeMismatch);
        }
        if claims.sub != expected_id.to_string() || claims.email != expected_email {
            return Err(SignedLinkError::SubjectMismatch);
        }

        Ok(())
    }

    /// Link lifetime in whole minutes, for template expiry copy
    pub fn link_lifetime_minutes(&self) -> i64 {
        self.link_lifetime.num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SignedLinkService {
        SignedLinkService::new(
            "test-signing-secret".to_string(),
            60,
            "http://localhost:3000/".to_string(),
        )
    }

    #[test]
    fn test_generate_and_validate() {
        let service = service();
        let user_id = Uuid::new_v4();
        let link = service.generate(user_id, "user@example.com").unwrap();

        assert!(link.url.starts_with(&format!(
            "http://localhost:3000/verifications/email?id={}&token=",
            user_id
        )));
        assert!(link.expires_at > Utc::now());
        assert!(service
            .validate(&link.token, user_id, "user@example.com")
            .is_ok());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let user_id = Uuid::new_v4();
        let link = service.generate(user_id, "user@example.com").unwrap();

        let mut tampered = link.token.clone();
        tampered.pop();
        tampered.push('A');

        assert_eq!(
            service.validate(&tampered, user_id, "user@example.com"),
            Err(SignedLinkError::InvalidSignature)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = service();
        let other = SignedLinkService::new(
            "a-different-secret".to_string(),
            60,
            "http://localhost:3000".to_string(),
        );
        let user_id = Uuid::new_v4();
        let link = service.generate(user_id, "user@example.com").unwrap();

        assert_eq!(
            other.validate(&link.token, user_id, "user@example.com"),
            Err(SignedLinkError::InvalidSignature)
        );
    }

    #[test]
    fn test_subject_binding() {
        let service = service();
        let user_id = Uuid::new_v4();
        let link = service.generate(user_id, "user@example.com").unwrap();

        // Different user
        assert_eq!(
            service.validate(&link.token, Uuid::new_v4(), "user@example.com"),
            Err(SignedLinkError::SubjectMismatch)
        );
        // Email changed since the link was issued
        assert_eq!(
            service.validate(&link.token, user_id, "other@example.com"),
            Err(SignedLinkError::SubjectMismatch)
        );
    }

    #[test]
    fn test_expired_link_rejected() {
        let expired = SignedLinkService::new(
            "test-signing-secret".to_string(),
            -2,
            "http://localhost:3000".to_string(),
        );
        let user_id = Uuid::new_v4();
        let link = expired.generate(user_id, "user@example.com").unwrap();

        assert_eq!(
            expired.validate(&link.token, user_id, "user@example.com"),
            Err(SignedLinkError::Expired)
        );
    }
}
