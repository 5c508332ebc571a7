//! API keys for the data-push endpoints.
//!
//! Keys look like `rk_` followed by 32 hex characters. Only the SHA-256 hex
//! digest is stored, plus a short prefix so admins can tell keys apart.

use sha2::{Digest, Sha256};

const KEY_PREFIX: &str = "rk_";
const DISPLAY_PREFIX_LEN: usize = 8;

/// A freshly generated key. `plaintext` is shown to the admin exactly once.
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    pub plaintext: String,
    pub prefix: String,
    pub hash: String,
}

pub fn generate_api_key() -> GeneratedApiKey {
    let plaintext = format!("{KEY_PREFIX}{}", uuid::Uuid::new_v4().simple());
    let prefix = plaintext.chars().take(DISPLAY_PREFIX_LEN).collect();
    let hash = hash_api_key(&plaintext);
    GeneratedApiKey {
        plaintext,
        prefix,
        hash,
    }
}

/// SHA-256 hex digest of a presented key.
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let key = generate_api_key();
        assert!(key.plaintext.starts_with("rk_"));
        assert_eq!(key.plaintext.len(), 35);
        assert!(key.plaintext[3..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.prefix, key.plaintext[..8]);
        assert_eq!(key.hash, hash_api_key(&key.plaintext));
        assert_eq!(key.hash.len(), 64);
    }

    #[test]
    fn test_keys_are_distinct() {
        assert_ne!(generate_api_key().plaintext, generate_api_key().plaintext);
    }
}
