//! Opaque URL-safe tokens and their storage digests.
//!
//! Remember tokens and password-reset tokens are both drawn from here. The
//! plaintext token goes to the client; for the remember token only the
//! digest is ever written to the database.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 16;

/// Draw a fresh random URL-safe token
pub fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// One-way digest of a token for storage
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_url_safe_and_distinct() {
        let first = new_token();
        let second = new_token();

        assert_ne!(first, second);
        // 16 bytes, base64 without padding
        assert_eq!(first.len(), 22);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_digest_is_deterministic() {
        let token = new_token();

        assert_eq!(digest(&token), digest(&token));
        assert_ne!(digest(&token), digest("other"));
        // sha256 as hex
        assert_eq!(digest(&token).len(), 64);
    }
}
