//! Authentication and session core.
//!
//! Password hashing, JWT access tokens, refresh-token lifecycle and the
//! registration/login/refresh/revocation flows built on top of them.

pub mod jwt;
pub mod password;
pub mod refresh;
pub mod service;
pub mod validation;

use thiserror::Error;

use crate::store::StoreError;

pub use jwt::AccessTokenCodec;
pub use password::PasswordHasher;
pub use refresh::RefreshTokenManager;
pub use service::{AuthService, LoginTokens};

/// Authentication errors.
///
/// Credential, refresh and token variants all surface to clients as 401;
/// they stay distinct here so they can be logged and tested separately.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{context}: {source}")]
    StoreError {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Wrap a store error with context, keeping `DuplicateEmail` as its own kind.
    pub(crate) fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            source => AuthError::StoreError { context, source },
        }
    }
}
