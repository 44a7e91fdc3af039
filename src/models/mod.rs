//! Data models and request structures

pub mod password_reset;
pub mod requests;
pub mod user;

pub use password_reset::PasswordResetToken;
pub use user::{PublicUser, Role, User, UserStatus};
