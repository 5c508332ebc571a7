//! Password hashing.

/// Hash a password with bcrypt at `cost`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check `password` against a stored hash. Unparseable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// A value no password verifies against, for accounts created on someone's behalf.
pub fn unusable_password_hash() -> String {
    format!("!{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse", 4).unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_unusable_hash_never_verifies() {
        let hash = unusable_password_hash();
        assert!(!verify_password("", &hash));
        assert!(!verify_password(&hash, &hash));
    }
}
