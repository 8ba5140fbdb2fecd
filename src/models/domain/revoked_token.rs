use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A logged-out access token, remembered until it would have expired anyway.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RevokedToken {
    pub token_hash: String,
    /// Unix seconds; after this the JWT is rejected on its own.
    pub expires_at: i64,
}

impl RevokedToken {
    pub fn new(token: &str, expires_at: i64) -> Self {
        Self {
            token_hash: hash_token(token),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now().timestamp()
    }
}

pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revoked_token_stores_hash_not_token() {
        let token = RevokedToken::new("header.payload.signature", Utc::now().timestamp() + 60);

        assert_ne!(token.token_hash, "header.payload.signature");
        assert_eq!(token.token_hash.len(), 64);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_revoked_token_expired() {
        let token = RevokedToken::new("abc", Utc::now().timestamp() - 1);
        assert!(token.is_expired());
    }

    #[test]
    fn test_hash_token_consistency() {
        assert_eq!(hash_token("my-secret-token"), hash_token("my-secret-token"));
        assert_ne!(hash_token("token1"), hash_token("token2"));
    }
}
