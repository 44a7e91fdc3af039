//! Account Service Development Server
//!
//! Standalone HTTP server wiring every endpoint group together for local
//! development. Production deployments embedding the library can build a
//! narrower router via the RouterBuilder.

use std::sync::Arc;

use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use account_service::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    service::{
        EmailService, PasswordResetService, RegistrationService, SignedLinkService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv().ok();

    env_logger::init();

    log::info!(
        "🚀 Starting Account Service v{}",
        account_service::VERSION
    );

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    log::info!("✅ Configuration loaded");

    let database_pool = config.database.create_pool().await?;

    log::info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&database_pool).await?;
    log::info!("✅ Database migrations completed");

    // The mailer is optional; registration degrades to silent skips
    // while reset flows report delivery failures
    let mailer = match &config.email {
        Some(email_config) => {
            let service = EmailService::new(email_config.clone())?;
            log::info!("✅ Mailer configured for {}", email_config.smtp_host);
            Some(Arc::new(service))
        }
        None => {
            log::warn!("⚠️  No mailer configured, outbound email disabled");
            None
        }
    };

    let signed_links = Arc::new(SignedLinkService::new(
        config.verification.secret.clone(),
        config.verification.link_lifetime_minutes,
        config.verification.base_url.clone(),
    ));

    let app_state = AppState {
        registration_service: Arc::new(RegistrationService::new(
            database_pool.clone(),
            signed_links.clone(),
            mailer.clone(),
        )),
        password_reset_service: Arc::new(PasswordResetService::new(
            database_pool.clone(),
            mailer,
            config.password_reset.frontend_domain.clone(),
            config.password_reset.token_lifetime_hours,
        )),
        user_service: Arc::new(UserService::new(database_pool)),
    };

    log::info!("✅ Services initialized");
    log::info!("   - Registration service");
    log::info!("   - Password reset service");
    log::info!("   - User service");

    let app = RouterBuilder::with_all_routes()
        .build()
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any) // Permissive CORS for development
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .into_inner(),
        );

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🌐 Listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
