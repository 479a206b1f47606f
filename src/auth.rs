use base64::{engine::general_purpose::STANDARD, Engine as _}; // padded standard alphabet
use sha2::{Digest, Sha256}; // 256-bit digest behind every stored credential
use subtle::ConstantTimeEq; // comparison without early exit on the first differing byte

use crate::error::FixError;

/// Length of a stored credential: 32 digest bytes in padded base64.
pub const STORED_CREDENTIAL_LEN: usize = 44;

/*------------------------ Hashing ---------------------*/

/// Hash a plaintext password into its stored form.
/// SHA-256 over the UTF-8 bytes, then standard base64 with padding.
/// No salt is mixed in, so every account with the same password stores the same string.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    STANDARD.encode(digest)
}

// Same as `hash_password` for secrets that arrive as raw bytes (e.g. read from a table file).
// `key` only labels the error.
pub fn hash_secret_bytes(key: &str, secret: &[u8]) -> Result<String, FixError> {
    let text = std::str::from_utf8(secret).map_err(|source| FixError::Encoding {
        key: key.to_string(),
        source,
    })?;
    Ok(hash_password(text))
}

/*------------------------ Verification ---------------------*/

// Verify a plaintext secret against a stored credential by hashing the candidate
// and comparing the two encodings.
pub fn verify_credential(secret: &str, stored: &str) -> bool {
    let candidate = hash_password(secret);
    candidate.as_bytes().ct_eq(stored.as_bytes()).into()
}

// Byte variant of `verify_credential`; non-UTF-8 input never verifies.
pub fn verify_secret_bytes(secret: &[u8], stored: &str) -> bool {
    match std::str::from_utf8(secret) {
        Ok(text) => verify_credential(text, stored),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_password("admin123"), hash_password("admin123"));
        assert_eq!(hash_password(""), hash_password(""));
    }

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(hash_password("admin123"), "JAvlGPq9JyTdtvBO6x2llnRI1+gxwIyPqCKAn3THIKk=");
        assert_eq!(hash_password("password123"), "75K3eLr+dx6JJFuJ7LwIpEpOFmwGZZkRiB84PURz6U8=");
        assert_eq!(hash_password(""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn hash_has_fixed_length() {
        for pw in ["a", "admin123", "a much longer passphrase with spaces", "pässwörd"] {
            let h = hash_password(pw);
            assert_eq!(h.len(), STORED_CREDENTIAL_LEN);
            assert!(h.ends_with('='));
        }
    }

    #[test]
    fn byte_secrets_match_str_secrets() {
        let h = hash_secret_bytes("admin@test.com", "pässwörd".as_bytes()).unwrap();
        assert_eq!(h, hash_password("pässwörd"));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = hash_secret_bytes("mario@test.com", &[0x70, 0xff, 0xfe]).unwrap_err();
        match err {
            FixError::Encoding { key, .. } => assert_eq!(key, "mario@test.com"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let stored = hash_password("password123");
        assert!(verify_credential("password123", &stored));
        assert!(!verify_credential("Password123", &stored));
        assert!(!verify_credential("password123", "password123"));
        assert!(!verify_secret_bytes(&[0xff], &stored));
        assert!(verify_secret_bytes(b"password123", &stored));
    }
}
