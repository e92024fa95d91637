//! JWT access token issuance and verification.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::AccessClaims;

/// Access token lifetime: 24 hours.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// HMAC algorithms accepted on verify. Tokens are always issued as HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Signs and verifies stateless access tokens with a symmetric secret.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AccessTokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked by hand against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id` expiring 24 hours from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// `InvalidToken` covers structure, algorithm, signature and claim
    /// problems; `TokenExpired` is returned once `now` is past `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if now.timestamp() > data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Uuid::parse_str(&data.claims.user_id)
            .map_err(|_| AuthError::InvalidToken("malformed user_id claim".into()))
    }
}

/// Read the secret persisted under the user data dir, generating and
/// saving a fresh one on first use. Fallback when no secret is configured.
pub fn persisted_jwt_secret() -> String {
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(&secret_path, &secret) {
        warn!(path = %secret_path.display(), error = %e, "could not persist JWT secret");
    } else {
        info!(path = %secret_path.display(), "generated new JWT secret");
    }
    secret
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskdesk")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn codec() -> AccessTokenCodec {
        AccessTokenCodec::new(SECRET)
    }

    /// Assemble a token from raw JSON parts and a raw signature segment.
    fn raw_token(header: &str, payload: &str, signature: &str) -> String {
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload),
            signature
        )
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let user_id = Uuid::now_v7();
        let token = codec().issue(user_id).unwrap();
        assert_eq!(codec().verify(&token).unwrap(), user_id);
    }

    #[test]
    fn token_expires_after_24_hours() {
        let user_id = Uuid::now_v7();
        let issued = Utc::now();
        let token = codec().issue_at(user_id, issued).unwrap();

        let just_before = issued + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS - 1);
        assert_eq!(codec().verify_at(&token, just_before).unwrap(), user_id);

        let after = issued + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS + 1);
        let err = codec().verify_at(&token, after).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = AccessTokenCodec::new(b"other-secret")
            .issue(Uuid::now_v7())
            .unwrap();
        let err = codec().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn alg_none_is_invalid() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let payload = format!(r#"{{"user_id":"{}","exp":{exp}}}"#, Uuid::now_v7());
        for header in [r#"{"alg":"none","typ":"JWT"}"#, r#"{"alg":"None"}"#] {
            let token = raw_token(header, &payload, "");
            let err = codec().verify(&token).unwrap_err();
            assert!(matches!(err, AuthError::InvalidToken(_)), "{header}");
        }
    }

    #[test]
    fn non_hmac_algorithm_is_invalid() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let payload = format!(r#"{{"user_id":"{}","exp":{exp}}}"#, Uuid::now_v7());
        let token = raw_token(r#"{"alg":"RS256","typ":"JWT"}"#, &payload, "c2ln");
        let err = codec().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn other_hmac_variant_is_accepted() {
        let user_id = Uuid::now_v7();
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(codec().verify(&token).unwrap(), user_id);
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let token = codec().issue(Uuid::now_v7()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let forged = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"user_id":"{}","exp":{exp}}}"#,
            Uuid::now_v7()
        ));
        parts[1] = &forged;
        let err = codec().verify(&parts.join(".")).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn malformed_or_missing_user_id_is_invalid() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let key = EncodingKey::from_secret(SECRET);

        let bad_id = AccessClaims {
            user_id: "not-a-uuid".into(),
            exp,
        };
        let token = encode(&Header::default(), &bad_id, &key).unwrap();
        assert!(matches!(
            codec().verify(&token).unwrap_err(),
            AuthError::InvalidToken(_)
        ));

        let no_id = serde_json::json!({ "exp": exp });
        let token = encode(&Header::default(), &no_id, &key).unwrap();
        assert!(matches!(
            codec().verify(&token).unwrap_err(),
            AuthError::InvalidToken(_)
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert!(matches!(
                codec().verify(token).unwrap_err(),
                AuthError::InvalidToken(_)
            ));
        }
    }
}
