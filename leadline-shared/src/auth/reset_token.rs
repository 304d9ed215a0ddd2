/// Password-reset token generation and hashing
///
/// Reset tokens are single-use, time-boxed secrets delivered by email. Only
/// the SHA-256 hash of a token is ever persisted; consumption compares the
/// hash of the supplied token against the stored hash with an exact string
/// match, so no constant-time guarantee beyond hash-then-compare is needed
/// and raw tokens never touch the database.
///
/// # Example
///
/// ```
/// use leadline_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let (token, hash) = generate_reset_token();
/// assert_eq!(token.len(), 48);
/// assert_eq!(hash, hash_reset_token(&token));
/// ```

use chrono::Duration;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of a reset token in characters
pub const RESET_TOKEN_LENGTH: usize = 48;

/// How long a reset token stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// Returns the reset-token validity window as a chrono duration
pub fn reset_token_ttl() -> Duration {
    Duration::minutes(RESET_TOKEN_TTL_MINUTES)
}

/// Generates a new reset token
///
/// Returns (plaintext_token, sha256_hex_hash). The plaintext goes into the
/// reset URL emailed to the user; only the hash is stored.
///
/// Token space is 62^48, generated from the thread-local CSPRNG.
pub fn generate_reset_token() -> (String, String) {
    let token = generate_random_string(RESET_TOKEN_LENGTH);
    let hash = hash_reset_token(&token);

    (token, hash)
}

/// Generates a random base62 string (URL-safe, no padding)
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a reset token with SHA-256
///
/// Returns the hex-encoded digest (64 characters), matching the
/// `reset_token_hash` column width.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let (token, hash) = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_LENGTH);
        assert_eq!(hash.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let (token, hash) = generate_reset_token();
        assert_eq!(hash, hash_reset_token(&token));
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_reset_token();
        let (b, _) = generate_reset_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_tokens_different_hashes() {
        assert_ne!(hash_reset_token("token-a"), hash_reset_token("token-b"));
    }

    #[test]
    fn test_ttl() {
        assert_eq!(reset_token_ttl().num_minutes(), 30);
    }
}
