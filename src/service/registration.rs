//! Registration Service
//!
//! Account creation, email verification, and verification resend flows.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use sqlx::types::Json;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::database::DatabasePool;
use crate::models::requests::RegisterRequest;
use crate::models::user::UserRow;
use crate::models::{Role, User, UserStatus};
use crate::service::email::EmailService;
use crate::service::signed_link::SignedLinkService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::security::hash_password;
use crate::utils::validation::{validate_email, violations_to_map};

const SELECT_USER: &str = "SELECT id, email, first_name, last_name, roles, password_hash, \
     email_verified, status, created_at, updated_at FROM users";

/// Failure modes of the email confirmation endpoint.
///
/// Handlers map these onto the HTML outcome pages; the distinction never
/// reaches JSON clients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("verification id is missing or not a valid identifier")]
    InvalidId,

    #[error("no account matches the verification id")]
    UserNotFound,

    #[error("email address is already verified")]
    AlreadyVerified,

    #[error("verification link is invalid or expired")]
    LinkInvalid,

    #[error("failed to persist the verified state")]
    Persistence,
}

/// Service handling account signup and email verification
#[derive(Clone)]
pub struct RegistrationService {
    pool: DatabasePool,
    signed_links: Arc<SignedLinkService>,
    mailer: Option<Arc<EmailService>>,
}

impl RegistrationService {
    pub fn new(
        pool: DatabasePool,
        signed_links: Arc<SignedLinkService>,
        mailer: Option<Arc<EmailService>>,
    ) -> Self {
        Self {
            pool,
            signed_links,
            mailer,
        }
    }

    /// Register a new account.
    ///
    /// The duplicate-email check runs before field validation, so an
    /// existing address conflicts even when the rest of the payload is
    /// invalid. On success a verification email is sent best-effort; its
    /// failure never fails the registration.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        if self.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists.".to_string()));
        }

        if let Err(errors) = request.validate() {
            return Err(AppError::Validation(violations_to_map(&errors)));
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();
        let id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at",
        )
        .bind(id)
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(Json(vec![Role::User]))
        .bind(&password_hash)
        .bind(false)
        .bind(UserStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                AppError::Conflict("User already exists.".to_string())
            }
            _ => {
                error!("Failed to insert user {}: {}", request.email, e);
                AppError::Internal("There was an error creating your account.".to_string())
            }
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit registration for {}: {}", request.email, e);
            AppError::Internal("There was an error creating your account.".to_string())
        })?;

        let user = User::from(row);
        info!("Registered new account {} ({})", user.id, user.email);

        self.send_email_verification(&user).await;

        Ok(user)
    }

    /// Reset the verification flag and send a fresh verification link.
    ///
    /// Best-effort by contract: persistence failures are logged and
    /// swallowed, and delivery failures never surface to the caller.
    pub async fn send_email_verification(&self, user: &User) {
        let reset = sqlx::query(
            "UPDATE users SET email_verified = false, updated_at = $2 WHERE id = $1",
        )
        .bind(user.id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = reset {
            warn!(
                "Failed to reset verification flag for {}: {}",
                user.id, e
            );
        }

        let link = match self.signed_links.generate(user.id, &user.email) {
            Ok(link) => link,
            Err(e) => {
                warn!("Failed to generate verification link for {}: {}", user.id, e);
                return;
            }
        };

        let Some(mailer) = &self.mailer else {
            debug!("No mailer configured, skipping verification email for {}", user.id);
            return;
        };

        if let Err(e) = mailer
            .send_verification_email(
                &user.email,
                user.first_name.as_deref(),
                &link.url,
                self.signed_links.link_lifetime_minutes(),
            )
            .await
        {
            warn!("Failed to send verification email to {}: {}", user.email, e);
        }
    }

    /// Confirm an email address from a signed link's query parameters.
    pub async fn verify_email_address(
        &self,
        id: Option<&str>,
        token: Option<&str>,
    ) -> Result<User, VerificationError> {
        let user_id = id
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(VerificationError::InvalidId)?;
        let token = token.ok_or(VerificationError::LinkInvalid)?;

        let user = self
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                error!("Failed to load user {} for verification: {}", user_id, e);
                VerificationError::Persistence
            })?
            .ok_or(VerificationError::UserNotFound)?;

        if user.email_verified {
            return Err(VerificationError::AlreadyVerified);
        }

        if let Err(e) = self.signed_links.validate(token, user.id, &user.email) {
            warn!("Rejected verification link for {}: {}", user.id, e);
            return Err(VerificationError::LinkInvalid);
        }

        let verified = self.mark_verified(user.id).await.map_err(|e| {
            error!("Failed to persist verification for {}: {}", user.id, e);
            VerificationError::Persistence
        })?;

        info!("Email address verified for {}", verified.id);
        Ok(verified)
    }

    /// Resend the verification email.
    ///
    /// Always succeeds from the caller's perspective; unknown, invalid and
    /// already-verified addresses are indistinguishable from a send.
    pub async fn resend(&self, email: &str) -> AppResult<()> {
        if !validate_email(email) {
            return Ok(());
        }

        let Some(user) = self.find_by_email(email).await? else {
            debug!("Resend requested for unknown address");
            return Ok(());
        };

        if user.email_verified {
            debug!("Resend requested for already verified account {}", user.id);
            return Ok(());
        }

        self.send_email_verification(&user).await;
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET email_verified = true, status = $2, updated_at = $3 \
             WHERE id = $1 \
             RETURNING id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at",
        )
        .bind(id)
        .bind(UserStatus::Verified.as_str())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(User::from(row))
    }
}
