//! Stateless session token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying the account id as subject. There is no
//! server-side revocation list: logout only clears the client cookie. All
//! issuance and validation goes through [`TokenIssuer`] so a revocation store
//! could be added here later without touching callers.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// Tolerated clock skew when validating exp.
const LEEWAY_SECONDS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Account id.
    sub: String,
    /// Issued-at, unix seconds.
    iat: i64,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Signs and validates session tokens with a server-held secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }

    /// Issue a signed, time-boxed token for an account.
    ///
    /// # Errors
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue(&self, account_id: Uuid) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: account_id.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Invalid)
    }

    /// Validate a token and return the account id it asserts.
    ///
    /// # Errors
    /// `TokenError::Expired` when the token is past its expiry,
    /// `TokenError::Invalid` for any other defect.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECONDS;

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(
            |err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}
