//! HS256 session tokens

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub is_admin: bool,
    #[serde(default)]
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signing secret plus token lifetime
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::hours(lifetime_hours),
        }
    }

    pub fn issue(&self, username: &str, is_admin: bool, email: &str) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            is_admin,
            email: email.to_string(),
            exp: (now + self.lifetime).timestamp(),
            iat: now.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Claims of a valid, unexpired token
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                debug!("[AUTH] Token rejected: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_verifies() {
        let keys = TokenKeys::new("secret", 24);
        let token = keys.issue("alice", false, "alice@example.com").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert!(!claims.is_admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenKeys::new("one", 24).issue("alice", true, "").unwrap();
        assert!(TokenKeys::new("two", 24).verify(&token).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        //! A negative lifetime puts `exp` well past the validation leeway
        let keys = TokenKeys::new("secret", -2);
        let token = keys.issue("alice", false, "").unwrap();
        assert!(keys.verify(&token).is_none());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(TokenKeys::new("secret", 24).verify("not-a-token").is_none());
    }
}
