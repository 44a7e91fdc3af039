//! Password Reset Token Model
//!
//! One outstanding reset request per row; several rows may exist for the
//! same user. Validity is purely a function of the expiry timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single outstanding password reset request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// Unique identifier for the token record
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Opaque token value embedded in the reset link
    pub token: String,

    /// Expiry timestamp after which the token is invalid
    pub expires_at: DateTime<Utc>,

    /// When the reset was requested
    pub created_at: DateTime<Utc>,
}

/// Database row for the password_reset_tokens table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PasswordResetTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PasswordResetTokenRow> for PasswordResetToken {
    fn from(row: PasswordResetTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

impl PasswordResetToken {
    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
