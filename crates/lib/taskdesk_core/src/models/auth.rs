//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! types in `taskdesk_api::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain user. Safe to serialize: carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// User with password hash (for internal auth flows).
///
/// Deliberately not `Serialize`; hand out `.user` at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// Refresh token record stored in the database.
///
/// Only the SHA-256 digest of the opaque token is persisted.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token's absolute expiry lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject user id, string form.
    pub user_id: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
