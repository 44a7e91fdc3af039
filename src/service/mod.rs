//! Business logic services

pub mod email;
pub mod password_reset;
pub mod registration;
pub mod signed_link;
pub mod user;

pub use email::{EmailConfig, EmailService};
pub use password_reset::PasswordResetService;
pub use registration::{RegistrationService, VerificationError};
pub use signed_link::{SignedLink, SignedLinkError, SignedLinkService};
pub use user::UserService;
