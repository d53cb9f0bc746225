//! Bearer token issuing and verification (HS256 JWT).

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use store_ratings_core::UserId;

use super::AuthError;
use crate::config::JwtConfig;

/// Token payload. The token identifies an account and nothing else; the role
/// is read from the database on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub id: i32,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiry (unix seconds).
    pub exp: u64,
}

/// Signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs: config.ttl.as_secs(),
        }
    }

    /// Issue a token for `user_id`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            id: user_id.as_i32(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::TokenCreation)
    }

    /// Check signature and expiry and return the account id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| UserId::new(data.claims.id))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })
    }
}
