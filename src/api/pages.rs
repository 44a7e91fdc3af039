//! Browser-Facing Pages
//!
//! The verification endpoints are opened from email clients, so their
//! outcomes render as small HTML pages instead of JSON.

use std::sync::OnceLock;

use tera::{Context, Tera};

/// Shown when an email address is confirmed
pub const VERIFICATION_SUCCESS_MESSAGE: &str =
    "Your email address has been successfully verified. You may now log into the application";

/// Shown when verification fails for a server-side reason
pub const VERIFICATION_INTERNAL_ERROR_MESSAGE: &str =
    "There was an error confirming your email address. Please try again at a later time \
     or contact an administrator";

/// Shown when the link carries a missing or malformed user id
pub const INVALID_USER_ID_MESSAGE: &str =
    "The verification link does not identify a valid user";

/// Shown when no account matches the link's user id
pub const USER_NOT_FOUND_MESSAGE: &str = "No account matches this verification link";

/// Shown when the address was already confirmed earlier
pub const ALREADY_VERIFIED_MESSAGE: &str = "Your email address has already been verified";

/// Shown after a resend request, regardless of the address's state
pub const EMAIL_SENT_MESSAGE: &str = "Verification email successfully sent";

fn templates() -> &'static Tera {
    static TEMPLATES: OnceLock<Tera> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_template("page.html", include_str!("../../templates/page.html"))
            .expect("embedded page template is valid");
        tera
    })
}

fn render(title: &str, message: &str) -> String {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("message", message);
    templates()
        .render("page.html", &context)
        .expect("embedded page template renders")
}

/// Page confirming a successful email verification
pub fn verification_success_page() -> String {
    render("Email Verified", VERIFICATION_SUCCESS_MESSAGE)
}

/// Page for a missing or malformed user id in the link
pub fn invalid_user_id_page() -> String {
    render("Invalid User ID", INVALID_USER_ID_MESSAGE)
}

/// Page for a link pointing at no known account
pub fn user_not_found_page() -> String {
    render("User Not Found", USER_NOT_FOUND_MESSAGE)
}

/// Page for an address that was confirmed earlier
pub fn already_verified_page() -> String {
    render("Email Address Already Verified", ALREADY_VERIFIED_MESSAGE)
}

/// Page for any server-side verification failure.
///
/// Rejected links also land here; the concrete reason stays in the logs.
pub fn verification_error_page() -> String {
    render("Verification Failed", VERIFICATION_INTERNAL_ERROR_MESSAGE)
}

/// Page confirming a verification email resend
pub fn email_sent_page() -> String {
    render("Email Sent", EMAIL_SENT_MESSAGE)
}
