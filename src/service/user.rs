//! User Service
//!
//! Account lookup and email patching.

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::user::UserRow;
use crate::models::User;
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::validate_email;

const SELECT_USER: &str = "SELECT id, email, first_name, last_name, roles, password_hash, \
     email_verified, status, created_at, updated_at FROM users";

/// Service for account queries and updates
#[derive(Clone)]
pub struct UserService {
    pool: DatabasePool,
}

impl UserService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Verify database connectivity for the health endpoint.
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// List every account. An empty table is reported as not found.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY created_at", SELECT_USER))
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("No users found".to_string()));
        }

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Fetch one account by id.
    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(User::from(row))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Change an account's email address.
    ///
    /// Patching in the address the account already holds is a no-op that
    /// returns the unchanged user; an address held by another account
    /// conflicts. A race lost on the unique index surfaces as the same
    /// conflict.
    pub async fn patch_email(&self, id: Uuid, email: &str) -> AppResult<User> {
        if !validate_email(email) {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }

        let user = self.get_user(id).await?;

        if user.email == email {
            return Ok(user);
        }

        if let Some(other) = self.find_by_email(email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict(
                    "Email address already registered.".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET email = $2, updated_at = $3 \
             WHERE id = $1 \
             RETURNING id, email, first_name, last_name, roles, password_hash, \
             email_verified, status, created_at, updated_at",
        )
        .bind(id)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("users_email_key") => {
                AppError::Conflict("Email address already registered.".to_string())
            }
            _ => AppError::from(e),
        })?;

        tx.commit().await?;

        let updated = User::from(row);
        info!("Email address updated for {}", updated.id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requests::RegisterRequest;
    use crate::service::registration::RegistrationService;
    use crate::service::signed_link::SignedLinkService;
    use sqlx::PgPool;
    use std::sync::Arc;

    async fn create_user(pool: &PgPool, email: &str) -> User {
        let registration = RegistrationService::new(
            pool.clone(),
            Arc::new(SignedLinkService::new(
                "test-signing-secret".to_string(),
                60,
                "http://localhost:3000".to_string(),
            )),
            None,
        );
        registration
            .register(RegisterRequest {
                email: email.to_string(),
                password: "SecurePass123!".to_string(),
                first_name: "John".to_string(),
                last_name: "Smith".to_string(),
            })
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn test_list_users_empty_is_not_found(pool: PgPool) {
        let service = UserService::new(pool);
        let err = service.list_users().await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "No users found"));
    }

    #[sqlx::test]
    async fn test_list_users_ordered_by_creation(pool: PgPool) {
        create_user(&pool, "first@example.com").await;
        create_user(&pool, "second@example.com").await;

        let service = UserService::new(pool);
        let users = service.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email, "first@example.com");
        assert_eq!(users[1].email, "second@example.com");
    }

    #[sqlx::test]
    async fn test_get_user(pool: PgPool) {
        let user = create_user(&pool, "john.smith@example.com").await;
        let service = UserService::new(pool);

        let found = service.get_user(user.id).await.unwrap();
        assert_eq!(found.email, "john.smith@example.com");

        let err = service.get_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test]
    async fn test_patch_email_invalid_format(pool: PgPool) {
        let user = create_user(&pool, "john.smith@example.com").await;
        let service = UserService::new(pool);

        let err = service.patch_email(user.id, "not-an-email").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m == "Invalid email address"));
    }

    #[sqlx::test]
    async fn test_patch_email_same_address_is_noop(pool: PgPool) {
        let user = create_user(&pool, "john.smith@example.com").await;
        let service = UserService::new(pool);
        let baseline = service.get_user(user.id).await.unwrap();

        let patched = service
            .patch_email(user.id, "john.smith@example.com")
            .await
            .unwrap();
        assert_eq!(patched.email, user.email);

        // No write happened
        let reloaded = service.get_user(user.id).await.unwrap();
        assert_eq!(reloaded.updated_at, baseline.updated_at);
    }

    #[sqlx::test]
    async fn test_patch_email_conflict_leaves_both_unchanged(pool: PgPool) {
        let first = create_user(&pool, "first@example.com").await;
        let second = create_user(&pool, "second@example.com").await;
        let service = UserService::new(pool);

        let err = service
            .patch_email(first.id, "second@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(m) if m == "Email address already registered."));

        assert_eq!(service.get_user(first.id).await.unwrap().email, "first@example.com");
        assert_eq!(service.get_user(second.id).await.unwrap().email, "second@example.com");
    }

    #[sqlx::test]
    async fn test_patch_email_updates_address(pool: PgPool) {
        let user = create_user(&pool, "john.smith@example.com").await;
        let service = UserService::new(pool);

        let patched = service
            .patch_email(user.id, "new.address@example.com")
            .await
            .unwrap();
        assert_eq!(patched.email, "new.address@example.com");
        assert!(patched.updated_at > user.updated_at);
    }
}
