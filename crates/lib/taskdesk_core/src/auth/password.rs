//! Password hashing via bcrypt.

use super::AuthError;

/// Salted bcrypt hasher with a fixed work factor.
///
/// bcrypt embeds a fresh random salt in every hash and compares digests in
/// constant time on verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Hasher with an explicit cost (4..=31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AuthError::HashingError(format!("bcrypt hash: {e}")))
    }

    /// Verify a plaintext password against a stored bcrypt hash.
    pub fn verify(&self, hash: &str, plaintext: &str) -> Result<bool, AuthError> {
        bcrypt::verify(plaintext, hash)
            .map_err(|e| AuthError::HashingError(format!("bcrypt verify: {e}")))
    }
}
