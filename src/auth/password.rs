//! One-way hashing of user secrets.

use super::AuthError;

/// Longest secret bcrypt can hash in full, leaving room for its trailing NUL.
pub const MAX_SECRET_BYTES: usize = 71;

/// Hash a secret with bcrypt at the given cost.
///
/// Secrets longer than [`MAX_SECRET_BYTES`] are refused rather than truncated.
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, AuthError> {
    if secret.len() > MAX_SECRET_BYTES {
        return Err(AuthError::InvalidCredential);
    }
    bcrypt::non_truncating_hash(secret, cost)
        .map_err(|e| AuthError::Backend(format!("failed to hash secret: {}", e)))
}

/// Check a secret against a stored bcrypt hash.
///
/// A malformed stored hash, or a secret too long to compare in full, counts
/// as a mismatch.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    bcrypt::non_truncating_verify(secret, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COST: u32 = 4;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_secret("pw1", COST).unwrap();
        assert_ne!(hash, "pw1");
        assert!(verify_secret("pw1", &hash));
        assert!(!verify_secret("pw2", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_secret("same", COST).unwrap();
        let b = hash_secret("same", COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify_secret("pw1", "not-a-bcrypt-hash"));
        assert!(!verify_secret("", ""));
    }

    #[test]
    fn test_invalid_cost_is_a_backend_error() {
        assert!(matches!(hash_secret("pw", 1), Err(AuthError::Backend(_))));
    }

    #[test]
    fn test_long_secret_is_not_truncated() {
        let prefix = "a".repeat(MAX_SECRET_BYTES);
        // A hash of the longest accepted secret must not accept anything longer.
        let hash = hash_secret(&prefix, COST).unwrap();
        assert!(verify_secret(&prefix, &hash));
        assert!(!verify_secret(&format!("{}right", prefix), &hash));
        assert_eq!(
            hash_secret(&format!("{}right", prefix), COST),
            Err(AuthError::InvalidCredential)
        );
    }
}
