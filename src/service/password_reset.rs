//! Password Reset Service
//!
//! Reset request and password update flows. Unlike verification sends,
//! mail delivery is load-bearing here: a reset link or confirmation that
//! cannot be delivered fails the request, after state has been persisted.

use std::sync::Arc;

use chrono::{Duration, Utc};
use log::{debug, error, info};
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::password_reset::PasswordResetTokenRow;
use crate::models::user::UserRow;
use crate::models::{PasswordResetToken, User};
use crate::service::email::EmailService;
use crate::utils::error::{AppError, AppResult};
use crate::utils::security::{generate_reset_token, hash_password};
use crate::utils::validation::password_strength_validator;

const TOKEN_NOT_FOUND: &str = "Password token not found.";

/// Service handling the forgot-password flow
#[derive(Clone)]
pub struct PasswordResetService {
    pool: DatabasePool,
    mailer: Option<Arc<EmailService>>,
    /// Front-end domain the reset link points at
    frontend_domain: String,
    token_lifetime_hours: i64,
}

impl PasswordResetService {
    pub fn new(
        pool: DatabasePool,
        mailer: Option<Arc<EmailService>>,
        frontend_domain: String,
        token_lifetime_hours: i64,
    ) -> Self {
        Self {
            pool,
            mailer,
            frontend_domain,
            token_lifetime_hours,
        }
    }

    /// Start a password reset for the given address.
    ///
    /// Unknown addresses resolve successfully without side effects, so the
    /// endpoint does not leak which emails have accounts. For known
    /// addresses the token is persisted first; a failed delivery then
    /// surfaces as an error with the token already stored.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let Some(user) = self.find_user_by_email(email).await? else {
            debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::hours(self.token_lifetime_hours);

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO password_reset_tokens (id, user_id, token, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&token)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Created password reset token for {}", user.id);

        let reset_url = self.reset_url(&token);
        let mailer = self.require_mailer()?;
        mailer
            .send_password_reset_email(
                &user.email,
                user.first_name.as_deref(),
                &reset_url,
                self.token_lifetime_hours,
            )
            .await?;

        Ok(())
    }

    /// Set a new password using a reset token.
    ///
    /// Unknown and expired tokens are indistinguishable. The password
    /// update and token consumption commit together; the confirmation
    /// email is sent afterwards and its failure surfaces only once the
    /// new password is already in effect.
    pub async fn update_password(&self, token: &str, password: &str) -> AppResult<User> {
        let reset = self
            .find_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound(TOKEN_NOT_FOUND.to_string()))?;

        if reset.is_expired() {
            debug!("Rejected expired reset token for {}", reset.user_id);
            return Err(AppError::NotFound(TOKEN_NOT_FOUND.to_string()));
        }

        if let Err(violation) = password_strength_validator(password) {
            let message = violation
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Password does not meet the requirements".to_string());
            return Err(AppError::PasswordValidation(vec![message]));
        }

        let password_hash = hash_password(password)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET password_hash = $2, updated_at = $3 \
             WHERE id = $1 \
             RETURNING id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at",
        )
        .bind(reset.user_id)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // Consuming the token also invalidates any other outstanding
        // requests for the same account
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(reset.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let user = User::from(row);
        info!("Password updated for {}", user.id);

        let mailer = self.require_mailer()?;
        mailer
            .send_password_updated_email(&user.email, user.first_name.as_deref())
            .await?;

        Ok(user)
    }

    fn reset_url(&self, token: &str) -> String {
        format!("https://{}/reset-password/{}", self.frontend_domain, token)
    }

    fn require_mailer(&self) -> AppResult<&Arc<EmailService>> {
        self.mailer.as_ref().ok_or_else(|| {
            error!("Password reset flow requires a configured mailer");
            AppError::Delivery("No mailer is configured".to_string())
        })
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_token(&self, token: &str) -> AppResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetTokenRow>(
            "SELECT id, user_id, token, expires_at, created_at \
             FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PasswordResetToken::from))
    }
}
