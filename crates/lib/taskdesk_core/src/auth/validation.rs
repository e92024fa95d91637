//! Profile and credential validation.
//!
//! One policy shared by registration and profile update.

use std::sync::LazyLock;

use regex::Regex;

use super::AuthError;

/// bcrypt only looks at the first 72 bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("Invalid regex")
});

/// Whether `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate username and email for create and update alike.
pub fn validate_profile(username: &str, email: &str) -> Result<(), AuthError> {
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err(AuthError::ValidationError(
            "Username and email are required".into(),
        ));
    }
    if !is_valid_email(email) {
        return Err(AuthError::ValidationError("Invalid email format".into()));
    }
    Ok(())
}

/// Validate a full registration: all fields present, then email, then password.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), AuthError> {
    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::ValidationError(
            "Username, email and password are required".into(),
        ));
    }
    validate_profile(username, email)?;
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::ValidationError(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}
