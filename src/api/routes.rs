//! API Route Definitions
//!
//! Routes are assembled through a builder so deployments can expose only
//! the endpoint groups they need, for example a registration-only
//! instance or a read-only user directory.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::*;

/// Builder for creating API routes with configurable endpoint groups
#[derive(Default)]
pub struct RouterBuilder {
    /// Health check endpoint (GET /health)
    health_check: bool,
    /// Account signup endpoint (POST /api/register)
    registration: bool,
    /// Email verification pages (GET and POST /verifications/email)
    verification: bool,
    /// User listing, lookup and email patching (/api/users)
    users: bool,
    /// Password reset flow (/api/forgot-password)
    password_reset: bool,
}

impl RouterBuilder {
    /// Creates a new router builder with all routes disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router builder with every endpoint group enabled
    pub fn with_all_routes() -> Self {
        Self {
            health_check: true,
            registration: true,
            verification: true,
            users: true,
            password_reset: true,
        }
    }

    /// Creates a router with only the health check, as a base to add
    /// specific groups onto
    pub fn with_minimal_routes() -> Self {
        Self {
            health_check: true,
            ..Self::default()
        }
    }

    /// Enables or disables the health check endpoint
    pub fn health_check(mut self, enabled: bool) -> Self {
        self.health_check = enabled;
        self
    }

    /// Enables or disables account signup
    pub fn registration(mut self, enabled: bool) -> Self {
        self.registration = enabled;
        self
    }

    /// Enables or disables the email verification pages.
    ///
    /// Registration still works without them, but the links in
    /// verification emails will dead-end.
    pub fn verification(mut self, enabled: bool) -> Self {
        self.verification = enabled;
        self
    }

    /// Enables or disables the user listing and patching endpoints
    pub fn users(mut self, enabled: bool) -> Self {
        self.users = enabled;
        self
    }

    /// Enables or disables the password reset flow
    pub fn password_reset(mut self, enabled: bool) -> Self {
        self.password_reset = enabled;
        self
    }

    /// Builds the Axum router with the configured routes
    pub fn build(self) -> Router<AppState> {
        let mut router = Router::new();

        if self.health_check {
            router = router.route("/health", get(health_check));
        }

        if self.registration {
            router = router.route("/api/register", post(register));
        }

        if self.verification {
            router = router.route(
                "/verifications/email",
                get(verify_email).post(resend_verification),
            );
        }

        if self.users {
            router = router
                .route("/api/users", get(list_users))
                .route("/api/users/:id", get(get_user))
                .route("/api/users/:id/email", patch(patch_email));
        }

        if self.password_reset {
            router = router
                .route("/api/forgot-password", post(forgot_password))
                .route("/api/forgot-password/:token", post(reset_password));
        }

        router
    }
}

/// Creates a router with every endpoint group enabled
pub fn create_routes() -> Router<AppState> {
    RouterBuilder::with_all_routes().build()
}
