//! Cryptographic utilities for kiosk API key generation and hashing.

use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a new visitor kiosk API key.
///
/// Keys are prefixed with `wo_` followed by 32 URL-safe base64 characters.
/// Only the SHA-256 hash of the key is persisted in module settings.
pub fn generate_kiosk_key() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!(
        "wo_{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    )
}

/// Extracts the prefix from a kiosk key (first 8 characters after "wo_").
pub fn extract_key_prefix(key: &str) -> Option<&str> {
    if key.starts_with("wo_") && key.len() >= 11 {
        Some(&key[3..11])
    } else {
        None
    }
}

/// Checks a presented kiosk key against a stored SHA-256 hex hash.
pub fn key_matches(presented: &str, stored_hash: &str) -> bool {
    sha256_hex(presented) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("same_input"), sha256_hex("same_input"));
        assert_ne!(sha256_hex("input1"), sha256_hex("input2"));
    }

    #[test]
    fn test_generate_kiosk_key_shape() {
        let key = generate_kiosk_key();
        assert!(key.starts_with("wo_"));
        assert_eq!(key.len(), 35);
    }

    #[test]
    fn test_generate_kiosk_key_unique() {
        assert_ne!(generate_kiosk_key(), generate_kiosk_key());
    }

    #[test]
    fn test_extract_key_prefix() {
        assert_eq!(extract_key_prefix("wo_abcdefgh12345"), Some("abcdefgh"));
        assert_eq!(extract_key_prefix("wo_short"), None);
        assert_eq!(extract_key_prefix("invalid_key"), None);
    }

    #[test]
    fn test_key_matches() {
        let key = generate_kiosk_key();
        let hash = sha256_hex(&key);
        assert!(key_matches(&key, &hash));
        assert!(!key_matches("wo_wrong", &hash));
    }
}
