//! Refresh token lifecycle.
//!
//! Opaque, long-lived, revocable tokens. The plaintext is handed to the
//! client once; only its SHA-256 digest is stored.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::RefreshToken;
use crate::store::RefreshTokenStore;

/// Length of the opaque token handed to clients.
pub const REFRESH_TOKEN_LEN: usize = 64;

/// Parse a refresh token TTL such as `168h` or `7days`.
pub fn parse_ttl(raw: &str) -> Result<Duration, AuthError> {
    let std = humantime::parse_duration(raw.trim())
        .map_err(|e| AuthError::ConfigError(format!("refresh token ttl {raw:?}: {e}")))?;
    let ttl = Duration::from_std(std)
        .map_err(|e| AuthError::ConfigError(format!("refresh token ttl {raw:?}: {e}")))?;
    if ttl <= Duration::zero() {
        return Err(AuthError::ConfigError(format!(
            "refresh token ttl {raw:?} must be positive"
        )));
    }
    Ok(ttl)
}

/// Generate a cryptographically random refresh token (64 alphanumeric chars).
fn generate_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh token for storage.
pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues, looks up and revokes refresh tokens.
///
/// Does not judge expiry; callers compare `expires_at` at the point of use.
#[derive(Clone)]
pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
    ttl: Duration,
}

impl RefreshTokenManager {
    /// `ttl` is fixed for the manager's lifetime.
    pub fn new(store: Arc<dyn RefreshTokenStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create and persist a token for `user_id`. Returns (plaintext, record).
    pub async fn create(&self, user_id: Uuid) -> Result<(String, RefreshToken), AuthError> {
        self.create_at(user_id, Utc::now()).await
    }

    /// Create a token as if the current time were `now`.
    pub async fn create_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(String, RefreshToken), AuthError> {
        let plaintext = generate_token();
        let record = RefreshToken {
            id: Uuid::now_v7(),
            user_id,
            token_hash: hash_token(&plaintext),
            expires_at: now + self.ttl,
        };
        self.store
            .create_refresh_token(&record)
            .await
            .map_err(AuthError::store("creating refresh token"))?;
        debug!(user_id = %user_id, token_id = %record.id, "created refresh token");
        Ok((plaintext, record))
    }

    /// Look up a token by its plaintext value.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<RefreshToken>, AuthError> {
        self.store
            .get_refresh_token_by_hash(&hash_token(token))
            .await
            .map_err(AuthError::store("looking up refresh token"))
    }

    /// Revoke a single token.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        self.store
            .delete_refresh_token(id)
            .await
            .map_err(AuthError::store("deleting refresh token"))
    }

    /// Revoke every token of a user, returning how many were removed.
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.store
            .delete_refresh_tokens_for_user(user_id)
            .await
            .map_err(AuthError::store("deleting refresh tokens"))
    }
}
