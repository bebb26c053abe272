use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Hashes opaque bearer tokens with HMAC-SHA-256 before they are persisted,
/// and mints new ones.
///
/// Only the hex digest ever reaches the database; a leaked `sessions` table
/// cannot be replayed without the key.
#[derive(Debug)]
pub struct TokenHasher {
    key: Zeroizing<Vec<u8>>,
}

#[derive(Debug, Error)]
pub enum TokenHasherError {
    #[error("token HMAC key must not be empty")]
    EmptyKey,
    #[error("HMAC key rejected: {0}")]
    InvalidKey(String),
    #[error("failed to gather randomness: {0}")]
    Random(String),
}

impl TokenHasher {
    /// Random bytes per minted token.
    pub const TOKEN_BYTES: usize = 32;

    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, TokenHasherError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(TokenHasherError::EmptyKey);
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
        })
    }

    /// Hex-encoded HMAC-SHA-256 of `token`.
    pub fn hash_token(&self, token: &str) -> Result<String, TokenHasherError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|err| TokenHasherError::InvalidKey(err.to_string()))?;
        mac.update(token.as_bytes());

        let digest = mac.finalize().into_bytes();
        Ok(hex::encode(digest))
    }

    /// A fresh URL-safe token drawn from the OS RNG.
    pub fn generate_token(&self) -> Result<String, TokenHasherError> {
        let mut bytes = Zeroizing::new([0u8; Self::TOKEN_BYTES]);
        OsRng
            .try_fill_bytes(&mut *bytes)
            .map_err(|err| TokenHasherError::Random(err.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(&*bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_tokens_to_hex() {
        let hasher = TokenHasher::new("token-key").unwrap();
        let digest = hasher.hash_token("opaque-token").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hasher.hash_token("opaque-token").unwrap());
    }

    #[test]
    fn digest_depends_on_key() {
        let a = TokenHasher::new("key-a").unwrap();
        let b = TokenHasher::new("key-b").unwrap();
        assert_ne!(a.hash_token("same").unwrap(), b.hash_token("same").unwrap());
    }

    #[test]
    fn generated_tokens_are_unique_and_url_safe() {
        let hasher = TokenHasher::new("token-key").unwrap();
        let first = hasher.generate_token().unwrap();
        let second = hasher.generate_token().unwrap();
        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn rejects_empty_key() {
        assert!(matches!(
            TokenHasher::new(""),
            Err(TokenHasherError::EmptyKey)
        ));
    }
}
