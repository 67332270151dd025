//! Signed session tokens
//!
//! A session token is an HS256 JWT carrying the user id and username. It is
//! stored in an HttpOnly cookie by the web layer and validated on every request.
//!
//! ```rust
//! use crypto_core::SessionKeys;
//!
//! let keys = SessionKeys::from_secret(b"a-long-random-secret", 14);
//! let token = keys.generate_session_token(42, "pickle").unwrap();
//! let claims = keys.validate_token(&token).unwrap();
//! assert_eq!(claims.user_id().unwrap(), 42);
//! ```

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;
const SESSION_TOKEN_TYPE: &str = "session";

/// Session claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id as decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "session"
    pub token_type: String,
    /// Username at the time of sign-in
    pub username: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

/// Signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Lifetime of issued tokens, in seconds (used for the cookie max-age).
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn generate_session_token(&self, user_id: i64, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            token_type: SESSION_TOKEN_TYPE.to_string(),
            username: username.to_string(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate session token: {e}"))
    }

    /// Verify signature, expiry and token type.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))?;

        if data.claims.token_type != SESSION_TOKEN_TYPE {
            return Err(anyhow!("Unexpected token type: {}", data.claims.token_type));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> SessionKeys {
        SessionKeys::from_secret(b"test-secret-for-session-tokens", 14)
    }

    #[test]
    fn test_generate_and_validate() {
        let keys = keys();
        let token = keys.generate_session_token(7, "pickle").unwrap();
        assert_eq!(token.matches('.').count(), 2);

        let claims = keys.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "pickle");
        assert_eq!(claims.token_type, "session");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_validate_invalid_token() {
        assert!(keys().validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = SessionKeys::from_secret(b"some-other-secret", 14);
        let token = other.generate_session_token(7, "pickle").unwrap();
        assert!(keys().validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = SessionKeys::from_secret(b"test-secret-for-session-tokens", -1);
        let token = expired.generate_session_token(7, "pickle").unwrap();
        assert!(keys().validate_token(&token).is_err());
    }

    #[test]
    fn test_ttl_secs() {
        assert_eq!(keys().ttl_secs(), 14 * 24 * 3600);
    }
}
