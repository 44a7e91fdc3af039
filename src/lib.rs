//! Account Service Library
//!
//! A user registration and account management service with email
//! verification and password reset flows. Designed to run standalone or
//! be embedded as a library behind a custom router.
//!
//! # Features
//!
//! - **Registration**: Account signup with field validation and duplicate
//!   detection
//! - **Email Verification**: Signed, expiring confirmation links with
//!   browser-facing outcome pages and a resend form
//! - **Password Reset**: Opaque single-use reset tokens delivered by email
//! - **User Directory**: Listing, lookup and email patching over a public
//!   projection that never exposes credentials
//! - **Flexible Router**: Endpoint groups toggled via the RouterBuilder
//! - **Database Integration**: PostgreSQL with connection pooling and
//!   embedded migrations
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use account_service::{
//!     api::{AppState, RouterBuilder},
//!     database::DatabaseConfig,
//!     service::{PasswordResetService, RegistrationService, SignedLinkService, UserService},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = DatabaseConfig::from_env()?.create_pool().await?;
//!
//!     let signed_links = Arc::new(SignedLinkService::new(
//!         "signing-secret".to_string(),
//!         60,
//!         "http://localhost:3000".to_string(),
//!     ));
//!
//!     let app_state = AppState {
//!         registration_service: Arc::new(RegistrationService::new(
//!             pool.clone(),
//!             signed_links,
//!             None,
//!         )),
//!         password_reset_service: Arc::new(PasswordResetService::new(
//!             pool.clone(),
//!             None,
//!             "localhost".to_string(),
//!             24,
//!         )),
//!         user_service: Arc::new(UserService::new(pool)),
//!     };
//!
//!     // Only expose the endpoint groups this deployment needs
//!     let app = RouterBuilder::with_all_routes()
//!         .build()
//!         .with_state(app_state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **API Layer**: HTTP handlers, browser-facing pages and configurable
//!   route definitions
//! - **Service Layer**: Registration, verification, password reset and
//!   user management logic
//! - **Models**: Account entities, request payloads and the public
//!   projection
//! - **Database**: Connection management and configuration
//! - **Utils**: Shared validation, security and error handling

/// HTTP API layer with handlers and configurable routing
pub mod api;

/// Configuration management for all service settings
pub mod config;

/// Database connection management and configuration
pub mod database;

/// Data models and request structures
pub mod models;

/// Business logic services
pub mod service;

/// Shared utilities for security, validation, and error handling
pub mod utils;

// Re-export commonly used types for convenient access
pub use api::{create_routes, AppState, RouterBuilder};
pub use models::{
    requests::{
        ForgotPasswordRequest, PatchEmailRequest, RegisterRequest, ResendVerificationRequest,
        ResetPasswordRequest, VerifyEmailQuery,
    },
    PasswordResetToken, PublicUser, Role, User, UserStatus,
};
pub use service::{
    EmailConfig, EmailService, PasswordResetService, RegistrationService, SignedLinkService,
    UserService, VerificationError,
};
pub use utils::error::{AppError, AppResult};

// Re-export database utilities for configuration
pub use database::{DatabaseConfig, DatabasePool};

// Re-export configuration system
pub use config::{env, AppConfig, PasswordResetConfig, ServerConfig, VerificationConfig};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
