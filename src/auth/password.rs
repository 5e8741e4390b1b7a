use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppResult;

pub fn hash_password(password: &str) -> AppResult<String> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash_password("rahasia123").unwrap();
        assert_ne!(hashed, "rahasia123");
        assert!(verify_password("rahasia123", &hashed));
        assert!(!verify_password("salah", &hashed));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("rahasia123", "bukan-hash-bcrypt"));
    }
}
