//! Authentication service: register/login/refresh/revoke and profile flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::validation::{validate_profile, validate_registration};
use super::{AccessTokenCodec, AuthError, PasswordHasher, RefreshTokenManager};
use crate::models::auth::{User, UserWithPassword};
use crate::store::{RefreshTokenStore, StoreError, UserStore};

/// Token pair returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Composes the hasher, token codec, refresh manager and user store.
///
/// Holds no mutable state of its own; clone freely per request.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    refresh_tokens: RefreshTokenManager,
    tokens: AccessTokenCodec,
    hasher: PasswordHasher,
    /// Verified against on unknown emails so both login failures cost the same.
    dummy_hash: Arc<str>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        tokens: AccessTokenCodec,
        hasher: PasswordHasher,
        refresh_ttl: chrono::Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("taskdesk-dummy-password")?;
        Ok(Self {
            users,
            refresh_tokens: RefreshTokenManager::new(refresh_store, refresh_ttl),
            tokens,
            hasher,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn tokens(&self) -> &AccessTokenCodec {
        &self.tokens
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenManager {
        &self.refresh_tokens
    }

    /// Hash on the blocking pool; bcrypt is deliberately slow.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task: {e}")))?
    }

    async fn verify_password(&self, hash: &str, password: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        let hash = hash.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?
    }

    /// Register a new account.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserWithPassword, AuthError> {
        validate_registration(username, email, password)?;

        // Fast path; the unique constraint still catches concurrent inserts.
        let existing = self
            .users
            .get_user_by_email(email)
            .await
            .map_err(AuthError::store("looking up email"))?;
        if existing.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(password).await?;
        let user = UserWithPassword {
            user: User {
                id: Uuid::now_v7(),
                username: username.to_string(),
                email: email.to_string(),
            },
            password_hash,
        };
        self.users
            .create_user(&user)
            .await
            .map_err(AuthError::store("creating user"))?;

        info!(user_id = %user.user.id, "registered user");
        Ok(user)
    }

    /// Authenticate with email + password.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginTokens, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let found = self
            .users
            .get_user_by_email(email)
            .await
            .map_err(AuthError::store("looking up user"))?;

        let user = match found {
            Some(user) => user,
            None => {
                let _ = self.verify_password(&self.dummy_hash, password).await;
                debug!("login rejected: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.verify_password(&user.password_hash, password).await? {
            debug!(user_id = %user.user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(user.user.id)?;
        let (refresh_token, _) = self.refresh_tokens.create(user.user.id).await?;

        info!(user_id = %user.user.id, "user logged in");
        Ok(LoginTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token. The refresh token
    /// stays valid until it expires or is revoked.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        self.refresh_access_token_at(refresh_token, Utc::now()).await
    }

    /// Refresh as if the current time were `now`.
    pub async fn refresh_access_token_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let record = match self.refresh_tokens.get_by_token(refresh_token).await? {
            Some(record) => record,
            None => {
                debug!("refresh rejected: unknown token");
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        if record.is_expired_at(now) {
            debug!(token_id = %record.id, "refresh rejected: token expired");
            return Err(AuthError::RefreshTokenExpired);
        }

        self.tokens.issue_at(record.user_id, now)
    }

    /// Revoke every refresh token of a user. Access tokens already issued
    /// remain valid until their own expiry.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let revoked = self.refresh_tokens.delete_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "revoked all sessions");
        Ok(revoked)
    }

    /// Verify a bearer access token, returning its user id.
    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        self.tokens.verify(token)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AuthError> {
        self.users
            .get_user_by_id(id)
            .await
            .map_err(AuthError::store("fetching user"))?
            .map(|u| u.user)
            .ok_or_else(|| AuthError::NotFound("user".into()))
    }

    /// Overwrite username and email, under the same rules as registration.
    pub async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
    ) -> Result<User, AuthError> {
        let mut user = self.get_user(id).await?;
        validate_profile(username, email)?;

        user.username = username.to_string();
        user.email = email.to_string();

        let updated = self
            .users
            .update_user(&user)
            .await
            .map_err(AuthError::store("updating user"))?;
        if !updated {
            return Err(AuthError::NotFound("user".into()));
        }

        info!(user_id = %id, "updated profile");
        Ok(user)
    }

    /// Delete an account. Refresh tokens are revoked first; tasks and labels
    /// go with the user row.
    pub async fn delete_account(&self, id: Uuid) -> Result<(), AuthError> {
        self.refresh_tokens.delete_all_for_user(id).await?;
        let deleted = self
            .users
            .delete_user(id)
            .await
            .map_err(AuthError::store("deleting user"))?;
        if !deleted {
            return Err(AuthError::NotFound("user".into()));
        }
        info!(user_id = %id, "deleted account");
        Ok(())
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> Result<(), StoreError> {
        self.users.ping().await
    }
}
