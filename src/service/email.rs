//! Email Service
//!
//! Sends account notification emails over SMTP. Every message is a
//! multipart alternative with plain text and HTML bodies rendered from
//! embedded Tera templates.

use anyhow::Result;
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};
use tera::{Context, Tera};

use crate::utils::error::{AppError, AppResult};

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
}

impl EmailConfig {
    /// Create email configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            smtp_port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME")
                .map_err(|_| anyhow::anyhow!("SMTP_USERNAME environment variable is required"))?,
            smtp_password: std::env::var("SMTP_PASSWORD")
                .map_err(|_| anyhow::anyhow!("SMTP_PASSWORD environment variable is required"))?,
            from_email: std::env::var("FROM_EMAIL")
                .map_err(|_| anyhow::anyhow!("FROM_EMAIL environment variable is required"))?,
            from_name: std::env::var("FROM_NAME")
                .unwrap_or_else(|_| "Account Service".to_string()),
        })
    }
}

/// Email service for sending account notifications
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Tera,
    config: EmailConfig,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: EmailConfig) -> AppResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Configuration(format!("Failed to configure SMTP relay: {}", e)))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let mut templates = Tera::default();
        Self::add_embedded_templates(&mut templates)?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Add embedded email templates
    fn add_embedded_templates(tera: &mut Tera) -> AppResult<()> {
        let pairs = [
            (
                "verification_email.html",
                include_str!("../../templates/verification_email.html"),
            ),
            (
                "verification_email.txt",
                include_str!("../../templates/verification_email.txt"),
            ),
            (
                "password_reset_email.html",
                include_str!("../../templates/password_reset_email.html"),
            ),
            (
                "password_reset_email.txt",
                include_str!("../../templates/password_reset_email.txt"),
            ),
            (
                "password_updated_email.html",
                include_str!("../../templates/password_updated_email.html"),
            ),
            (
                "password_updated_email.txt",
                include_str!("../../templates/password_updated_email.txt"),
            ),
        ];

        for (name, body) in pairs {
            tera.add_raw_template(name, body).map_err(|e| {
                AppError::Configuration(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(())
    }

    /// Send the email verification link to a new or updated address.
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        first_name: Option<&str>,
        verification_url: &str,
        expires_in_minutes: i64,
    ) -> AppResult<()> {
        info!("Sending verification email to: {}", to_email);

        let mut context = Context::new();
        context.insert("first_name", &first_name);
        context.insert("verification_url", verification_url);
        context.insert("expires_in_minutes", &expires_in_minutes);

        self.render_and_send(
            to_email,
            "Please confirm your email address",
            "verification_email",
            &context,
        )
        .await
    }

    /// Send a password reset link.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        first_name: Option<&str>,
        reset_url: &str,
        expires_in_hours: i64,
    ) -> AppResult<()> {
        info!("Sending password reset email to: {}", to_email);

        let mut context = Context::new();
        context.insert("first_name", &first_name);
        context.insert("reset_url", reset_url);
        context.insert("expires_in_hours", &expires_in_hours);

        self.render_and_send(
            to_email,
            "Reset your password",
            "password_reset_email",
            &context,
        )
        .await
    }

    /// Notify a user that their password was changed.
    pub async fn send_password_updated_email(
        &self,
        to_email: &str,
        first_name: Option<&str>,
    ) -> AppResult<()> {
        info!("Sending password updated email to: {}", to_email);

        let mut context = Context::new();
        context.insert("first_name", &first_name);

        self.render_and_send(
            to_email,
            "Your password was changed",
            "password_updated_email",
            &context,
        )
        .await
    }

    /// Render the text and HTML variants of a template and send them as a
    /// multipart alternative message.
    async fn render_and_send(
        &self,
        to_email: &str,
        subject: &str,
        template: &str,
        context: &Context,
    ) -> AppResult<()> {
        let html_body = self
            .templates
            .render(&format!("{}.html", template), context)
            .map_err(|e| AppError::Internal(format!("Failed to render HTML template: {}", e)))?;

        let text_body = self
            .templates
            .render(&format!("{}.txt", template), context)
            .map_err(|e| AppError::Internal(format!("Failed to render text template: {}", e)))?;

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AppError::Configuration(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid recipient email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!("Email sent successfully to: {}", to_email);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", to_email, e);
                Err(AppError::Delivery(format!("Failed to send email: {}", e)))
            }
        }
    }
}
