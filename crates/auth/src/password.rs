//! Password hashing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[source] bcrypt::BcryptError),
}

/// Hash a plaintext password with bcrypt at the default cost.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(PasswordError::Hash)
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// Returns `false` for malformed hashes as well as mismatches; the caller
/// never learns which.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
