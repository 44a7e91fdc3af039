//! User Model
//!
//! Core account entity, its closed status/role sets, and the public
//! projection returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Account lifecycle status.
///
/// Only the pending → verified transition happens through the API;
/// `Blocked` is set by fixtures or administrative tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    #[serde(rename = "status.pending")]
    Pending,
    #[serde(rename = "status.verified")]
    Verified,
    #[serde(rename = "status.blocked")]
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "status.pending",
            UserStatus::Verified => "status.verified",
            UserStatus::Blocked => "status.blocked",
        }
    }

    /// Parses a stored status string; unknown values fall back to Pending.
    pub fn from_db(value: &str) -> Self {
        match value {
            "status.verified" => UserStatus::Verified,
            "status.blocked" => UserStatus::Blocked,
            _ => UserStatus::Pending,
        }
    }
}

/// Closed role set. Every account implicitly holds `Role::User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(other, rename = "ROLE_USER")]
    User,
}

/// Internal user representation including the password hash.
///
/// Never serialized to API responses; handlers convert to [`PublicUser`]
/// before returning.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Stored role set; use [`User::roles`] for the effective set
    pub roles: Vec<Role>,
    /// bcrypt hashed password
    pub password_hash: String,
    pub email_verified: bool,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Effective role set: the stored roles with `Role::User` guaranteed
    /// to be present exactly once.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = self.roles.clone();
        if !roles.contains(&Role::User) {
            roles.push(Role::User);
        }
        roles.dedup();
        roles
    }
}

/// Database row for the users table
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Json<Vec<Role>>,
    pub password_hash: String,
    pub email_verified: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            roles: row.roles.0,
            password_hash: row.password_hash,
            email_verified: row.email_verified,
            status: UserStatus::from_db(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The subset of a user's fields safe to return to any caller.
///
/// Excludes the password hash, verification flag, status, and timestamps,
/// matching the original service's non-sensitive serialization group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<Role>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            roles: user.roles(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser::from(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Smith".to_string()),
            roles: vec![],
            password_hash: "$2b$12$fakehash".to_string(),
            email_verified: false,
            status: UserStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_roles_always_include_base_role() {
        let mut user = sample_user();
        assert_eq!(user.roles(), vec![Role::User]);

        user.roles = vec![Role::Admin];
        assert_eq!(user.roles(), vec![Role::Admin, Role::User]);

        user.roles = vec![Role::User];
        assert_eq!(user.roles(), vec![Role::User]);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [UserStatus::Pending, UserStatus::Verified, UserStatus::Blocked] {
            assert_eq!(UserStatus::from_db(status.as_str()), status);
        }
    }

    #[test]
    fn test_unknown_status_falls_back_to_pending() {
        assert_eq!(UserStatus::from_db("status.bogus"), UserStatus::Pending);
        assert_eq!(UserStatus::from_db(""), UserStatus::Pending);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"ROLE_USER\"");
        assert_eq!(
            serde_json::to_string(&Role::Admin).unwrap(),
            "\"ROLE_ADMIN\""
        );
        // Unknown stored roles decode to the base role rather than failing
        let role: Role = serde_json::from_str("\"ROLE_LEGACY\"").unwrap();
        assert_eq!(role, Role::User);
    }

    #[test]
    fn test_public_projection_excludes_credentials() {
        let user = sample_user();
        let projection = PublicUser::from(&user);
        let json = serde_json::to_value(&projection).unwrap();

        let object = json.as_object().unwrap();
        assert!(object.contains_key("id"));
        assert!(object.contains_key("email"));
        assert!(object.contains_key("firstName"));
        assert!(object.contains_key("lastName"));
        assert!(object.contains_key("roles"));
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("status"));
        assert!(!object.contains_key("emailVerified"));
        assert_eq!(object.len(), 5);
    }
}
