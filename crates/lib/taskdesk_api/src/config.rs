//! API configuration.

use std::time::Duration;

use axum::http::HeaderValue;
use taskdesk_core::auth::jwt::persisted_jwt_secret;
use taskdesk_core::auth::refresh::parse_ttl;
use thiserror::Error;

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Configuration for the HTTP API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// HMAC secret for access tokens.
    pub jwt_secret: String,
    /// Lifetime of refresh tokens issued at login.
    pub refresh_token_ttl: chrono::Duration,
    /// Single origin allowed by CORS, with credentials.
    pub cors_origin: HeaderValue,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                     | Default                            |
    /// |------------------------------|------------------------------------|
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file      |
    /// | `REFRESH_TOKEN_EXPIRE_TIME`  | required, e.g. `168h`              |
    /// | `CORS_ORIGIN`                | `http://localhost:5173`            |
    /// | `REQUEST_TIMEOUT_SECS`       | `10`                               |
    /// | `BCRYPT_COST`                | `bcrypt::DEFAULT_COST` (12)        |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`ApiConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET")
            .or_else(|| get("AUTH_SECRET"))
            .unwrap_or_else(persisted_jwt_secret);

        let raw_ttl =
            get("REFRESH_TOKEN_EXPIRE_TIME").ok_or(ConfigError::Missing("REFRESH_TOKEN_EXPIRE_TIME"))?;
        let refresh_token_ttl = parse_ttl(&raw_ttl).map_err(|e| ConfigError::Invalid {
            var: "REFRESH_TOKEN_EXPIRE_TIME",
            reason: e.to_string(),
        })?;

        let cors_origin = get("CORS_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .parse::<HeaderValue>()
            .map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGIN",
                reason: e.to_string(),
            })?;

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("REQUEST_TIMEOUT_SECS", &raw)?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(raw) => parse_number("BCRYPT_COST", &raw)?,
            None => taskdesk_core::auth::PasswordHasher::default().cost(),
        };

        Ok(Self {
            jwt_secret,
            refresh_token_ttl,
            cors_origin,
            request_timeout,
            bcrypt_cost,
        })
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
