//! Authentication middleware: Bearer token extraction and JWT verification.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;

/// Identity attached to request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Reasons the gate turns a request away. All surface as 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Malformed authorization header")]
    MalformedAuthHeader,

    #[error("Invalid or expired token")]
    Unauthorized,
}

impl From<GateError> for AppError {
    fn from(e: GateError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

/// Pull the token out of an `Authorization` value of the form `Bearer <token>`.
///
/// The value must split on spaces into exactly two non-empty parts; the
/// scheme is matched case-insensitively.
pub fn parse_bearer(header: &str) -> Result<&str, GateError> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(GateError::MalformedAuthHeader),
    }
}

/// Axum middleware: verifies the bearer token and injects
/// [`AuthenticatedUser`] into request extensions. Never touches the store.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(GateError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| GateError::MalformedAuthHeader)?;

    let token = parse_bearer(header)?;

    let user_id = state.auth.verify_access_token(token).map_err(|e| {
        debug!(reason = %e, "rejected bearer token");
        GateError::Unauthorized
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
