//! Configuration Module
//!
//! Centralized, environment-driven configuration for the account service.

use anyhow::Result;

use crate::database::DatabaseConfig;
use crate::service::email::EmailConfig;

/// Environment variable helpers
pub mod env {
    use std::env;

    /// Get environment variable as string with default
    pub fn get_string(key: &str, default: &str) -> String {
        env::var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get environment variable as u16 with default
    pub fn get_u16(key: &str, default: u16) -> u16 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Get environment variable as i64 with default
    pub fn get_i64(key: &str, default: i64) -> i64 {
        env::var(key)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Check if environment variable is set
    pub fn is_set(key: &str) -> bool {
        env::var(key).is_ok()
    }
}

/// Application configuration combining all service settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Database connection settings
    pub database: DatabaseConfig,

    /// SMTP settings; absent when no mailer is configured
    pub email: Option<EmailConfig>,

    /// Signed verification link settings
    pub verification: VerificationConfig,

    /// Password reset flow settings
    pub password_reset: PasswordResetConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings for generating and validating signed verification links
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    /// HMAC secret for signing verification links
    pub secret: String,
    /// Link lifetime in minutes
    pub link_lifetime_minutes: i64,
    /// Base URL the verification endpoint is served under
    pub base_url: String,
}

/// Settings for the password reset flow
#[derive(Debug, Clone)]
pub struct PasswordResetConfig {
    /// Front-end domain embedded in reset links
    pub frontend_domain: String,
    /// Reset token lifetime in hours
    pub token_lifetime_hours: i64,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    ///
    /// The mailer section is optional: when SMTP credentials are absent the
    /// service runs without outbound email (verification sends become
    /// no-ops, reset flows fail with a delivery error).
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env::get_string("SERVER_HOST", "0.0.0.0"),
            port: env::get_u16("SERVER_PORT", 3000),
        };

        let database = DatabaseConfig::from_env()
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let email = if env::is_set("SMTP_USERNAME") {
            Some(EmailConfig::from_env()?)
        } else {
            None
        };

        let verification = VerificationConfig {
            secret: std::env::var("VERIFICATION_SECRET")
                .map_err(|_| anyhow::anyhow!("VERIFICATION_SECRET environment variable is required"))?,
            link_lifetime_minutes: env::get_i64("VERIFICATION_LINK_LIFETIME_MINUTES", 60),
            base_url: env::get_string("APP_BASE_URL", "http://localhost:3000"),
        };

        let password_reset = PasswordResetConfig {
            frontend_domain: env::get_string("FRONTEND_DOMAIN", "localhost"),
            token_lifetime_hours: env::get_i64("RESET_TOKEN_LIFETIME_HOURS", 24),
        };

        Ok(Self {
            server,
            database,
            email,
            verification,
            password_reset,
        })
    }
}
