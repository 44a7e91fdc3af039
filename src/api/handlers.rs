//! HTTP Request Handlers
//!
//! Axum handlers for the registration, verification, password reset and
//! user endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::pages,
    models::requests::{
        ForgotPasswordRequest, PatchEmailRequest, RegisterRequest, ResendVerificationRequest,
        ResetPasswordRequest, VerifyEmailQuery,
    },
    models::PublicUser,
    service::{PasswordResetService, RegistrationService, UserService, VerificationError},
    utils::error::{AppError, AppResult},
    VERSION,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registration_service: Arc<RegistrationService>,
    pub password_reset_service: Arc<PasswordResetService>,
    pub user_service: Arc<UserService>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    state.user_service.health_check().await?;
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": VERSION,
    })))
}

/// Register a new account
///
/// Takes the raw body so that an empty request and a malformed one get
/// distinct messages instead of a generic extractor rejection.
pub async fn register(
    State(state): State<AppState>,
    body: String,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Empty request received.".to_string()));
    }

    let request: RegisterRequest = serde_json::from_str(&body)
        .map_err(|_| AppError::BadRequest("Malformed request received.".to_string()))?;

    let user = state.registration_service.register(request).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Confirm an email address from a signed link
///
/// Opened from an email client, so every outcome renders as an HTML page.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(params): Query<VerifyEmailQuery>,
) -> (StatusCode, Html<String>) {
    let result = state
        .registration_service
        .verify_email_address(params.id.as_deref(), params.token.as_deref())
        .await;

    match result {
        Ok(_) => (StatusCode::OK, Html(pages::verification_success_page())),
        Err(error) => match error {
            VerificationError::InvalidId => {
                (StatusCode::BAD_REQUEST, Html(pages::invalid_user_id_page()))
            }
            VerificationError::UserNotFound => {
                (StatusCode::NOT_FOUND, Html(pages::user_not_found_page()))
            }
            VerificationError::AlreadyVerified => {
                (StatusCode::CONFLICT, Html(pages::already_verified_page()))
            }
            // Rejected links render the same generic failure as persistence
            // errors; the concrete reason is logged server-side only
            VerificationError::LinkInvalid | VerificationError::Persistence => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::verification_error_page()),
            ),
        },
    }
}

/// Resend the verification email
///
/// Renders the same confirmation page whether or not anything was sent,
/// so the form cannot be used to probe which addresses have accounts.
pub async fn resend_verification(
    State(state): State<AppState>,
    Form(request): Form<ResendVerificationRequest>,
) -> AppResult<(StatusCode, Html<String>)> {
    state.registration_service.resend(&request.email).await?;
    Ok((StatusCode::CREATED, Html(pages::email_sent_page())))
}

/// Start a password reset
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .password_reset_service
        .request_reset(&request.email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set a new password using a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .password_reset_service
        .update_password(&token, &request.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all accounts
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// Fetch one account
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<PublicUser>> {
    let user = state.user_service.get_user(user_id).await?;
    Ok(Json(PublicUser::from(user)))
}

/// Change an account's email address
pub async fn patch_email(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Form(request): Form<PatchEmailRequest>,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .user_service
        .patch_email(user_id, &request.email)
        .await?;
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_routes;
    use crate::service::SignedLinkService;
    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use sqlx::PgPool;
    use tower::ServiceExt;

    fn app(pool: PgPool) -> Router {
        let signed_links = Arc::new(SignedLinkService::new(
            "test-signing-secret".to_string(),
            60,
            "http://localhost:3000".to_string(),
        ));
        let state = AppState {
            registration_service: Arc::new(RegistrationService::new(
                pool.clone(),
                signed_links,
                None,
            )),
            password_reset_service: Arc::new(PasswordResetService::new(
                pool.clone(),
                None,
                "localhost".to_string(),
                24,
            )),
            user_service: Arc::new(UserService::new(pool)),
        };
        create_routes().with_state(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[sqlx::test]
    async fn test_register_empty_body(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request("/api/register", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Empty request received.");
    }

    #[sqlx::test]
    async fn test_register_malformed_body(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request("/api/register", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Malformed request received.");
    }

    #[sqlx::test]
    async fn test_register_returns_public_projection(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request(
                "/api/register",
                r#"{"email":"john.smith@example.com","password":"SecurePass123!",
                   "firstName":"John","lastName":"Smith"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "john.smith@example.com");
        assert_eq!(body["firstName"], "John");
        assert_eq!(body["lastName"], "Smith");
        assert_eq!(body["roles"], serde_json::json!(["ROLE_USER"]));
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
        assert!(body.get("status").is_none());
    }

    #[sqlx::test]
    async fn test_register_validation_errors_as_field_map(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request("/api/register", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let map = body.as_object().unwrap();
        assert!(map.contains_key("email"));
        assert!(map.contains_key("password"));
        assert!(map.contains_key("firstName"));
        assert!(map.contains_key("lastName"));
    }

    #[sqlx::test]
    async fn test_list_users_empty(pool: PgPool) {
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "No users found");
    }

    #[sqlx::test]
    async fn test_verify_email_without_params_renders_error_page(pool: PgPool) {
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .uri("/verifications/email")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let page = body_text(response).await;
        assert!(page.contains("Invalid User ID"));
    }

    #[sqlx::test]
    async fn test_verify_email_unknown_user_renders_not_found_page(pool: PgPool) {
        let uri = format!(
            "/verifications/email?id={}&token=some-token",
            Uuid::new_v4()
        );
        let response = app(pool)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let page = body_text(response).await;
        assert!(page.contains("User Not Found"));
    }

    #[sqlx::test]
    async fn test_resend_always_renders_sent_page(pool: PgPool) {
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/verifications/email")
                    .header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(Body::from("email=nobody%40example.com"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let page = body_text(response).await;
        assert!(page.contains("Email Sent"));
        assert!(page.contains(pages::EMAIL_SENT_MESSAGE));
    }

    #[sqlx::test]
    async fn test_forgot_password_unknown_email_is_no_content(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request(
                "/api/forgot-password",
                r#"{"email":"nobody@example.com"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[sqlx::test]
    async fn test_reset_password_unknown_token(pool: PgPool) {
        let response = app(pool)
            .oneshot(json_request(
                "/api/forgot-password/bogus-token",
                r#"{"password":"SecurePass123!"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Password token not found.");
    }

    #[sqlx::test]
    async fn test_health_check(pool: PgPool) {
        let response = app(pool)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], VERSION);
    }
}
