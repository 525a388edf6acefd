//! Google ID token verification against the provider's JWKS.
//!
//! The client obtains an ID token from Google Identity Services and posts it
//! as `credential`. Verification checks the RS256 signature with Google's
//! published keys and pins issuer plus audience to the configured client id.
//! The key set is cached for ten minutes; an unknown `kid` forces a refresh
//! so key rotation never strands a fresh token behind a stale cache.

use anyhow::{Context, Result};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

const JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
// Cap on the JWKS response body.
const MAX_JWKS_BYTES: usize = 512 * 1024;
const LEEWAY_SECONDS: u64 = 60;

#[derive(Debug, Error)]
pub enum GoogleError {
    /// Could not obtain the signing keys; the caller should map this to a
    /// dependency failure, not an authentication failure.
    #[error("failed to fetch Google signing keys: {0}")]
    Jwks(String),

    /// The token itself is defective: bad signature, claims, or audience.
    #[error("Google token verification failed: {0}")]
    Verification(String),
}

/// Claims asserted by a verified Google ID token.
#[derive(Debug, Deserialize)]
pub struct GoogleClaims {
    /// Google's stable account identifier.
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    /// RSA modulus, base64url.
    n: Option<String>,
    /// RSA exponent, base64url.
    e: Option<String>,
}

struct CachedJwks {
    keys: JwkSet,
    fetched_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < JWKS_CACHE_TTL
    }
}

/// Verifies Google ID tokens for one OAuth client id.
pub struct GoogleTokenVerifier {
    client: Client,
    client_id: String,
    cache: RwLock<Option<CachedJwks>>,
}

impl GoogleTokenVerifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(client_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("failed to build Google JWKS client")?;
        Ok(Self {
            client,
            client_id,
            cache: RwLock::new(None),
        })
    }

    /// Verify an ID token and return its claims.
    ///
    /// # Errors
    /// `GoogleError::Jwks` when the key set cannot be fetched,
    /// `GoogleError::Verification` for any defect in the token itself.
    pub async fn verify(&self, token: &str) -> Result<GoogleClaims, GoogleError> {
        let header = decode_header(token)
            .map_err(|e| GoogleError::Verification(format!("undecodable header: {e}")))?;
        let kid = header
            .kid
            .ok_or_else(|| GoogleError::Verification("missing kid".to_string()))?;

        let jwk = self.key_for(&kid).await?;
        let decoding_key = rsa_key(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_issuer(ISSUERS);
        validation.leeway = LEEWAY_SECONDS;

        let data = decode::<GoogleClaims>(token, &decoding_key, &validation)
            .map_err(|e| GoogleError::Verification(format!("signature or claims: {e}")))?;

        Ok(data.claims)
    }

    /// Find the key for `kid`, refreshing the cached set when it is stale or
    /// does not contain the kid (key rotation).
    async fn key_for(&self, kid: &str) -> Result<Jwk, GoogleError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh() {
                    if let Some(jwk) = find_key(&cached.keys, kid) {
                        return Ok(jwk);
                    }
                }
            }
        }

        info!(kid, "refreshing Google JWKS");
        let fetched = self.fetch_jwks().await?;
        let jwk = find_key(&fetched, kid);
        *self.cache.write().await = Some(CachedJwks {
            keys: fetched,
            fetched_at: Instant::now(),
        });

        jwk.ok_or_else(|| {
            GoogleError::Verification(format!("no Google key for kid {kid} after refresh"))
        })
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, GoogleError> {
        let response = self
            .client
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| GoogleError::Jwks(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(GoogleError::Jwks(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GoogleError::Jwks(format!("read failed: {e}")))?;

        if bytes.len() > MAX_JWKS_BYTES {
            return Err(GoogleError::Jwks(format!(
                "response too large: {} bytes",
                bytes.len()
            )));
        }

        serde_json::from_slice(&bytes).map_err(|e| GoogleError::Jwks(format!("bad JWKS: {e}")))
    }
}

fn find_key(set: &JwkSet, kid: &str) -> Option<Jwk> {
    set.keys
        .iter()
        .find(|key| key.kid.as_deref() == Some(kid))
        .cloned()
}

/// Build an RS256 decoding key from a JWK. The algorithm is fixed, never
/// taken from the token header.
fn rsa_key(jwk: &Jwk) -> Result<DecodingKey, GoogleError> {
    if jwk.kty != "RSA" {
        return Err(GoogleError::Verification(format!(
            "unsupported key type {}",
            jwk.kty
        )));
    }
    let n = jwk
        .n
        .as_ref()
        .ok_or_else(|| GoogleError::Verification("RSA JWK missing n".to_string()))?;
    let e = jwk
        .e
        .as_ref()
        .ok_or_else(|| GoogleError::Verification("RSA JWK missing e".to_string()))?;
    DecodingKey::from_rsa_components(n, e)
        .map_err(|e| GoogleError::Verification(format!("bad RSA components: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwks_parses_standard_shape() {
        let set: JwkSet = serde_json::from_str(
            r#"{"keys":[
                {"kid":"abc","kty":"RSA","alg":"RS256","use":"sig","n":"0vx7agoebGcQ","e":"AQAB"},
                {"kid":"def","kty":"RSA","alg":"RS256","use":"sig","n":"xjlc7dDdYwUm","e":"AQAB"}
            ]}"#,
        )
        .expect("parse");
        assert_eq!(set.keys.len(), 2);
        assert!(find_key(&set, "def").is_some());
        assert!(find_key(&set, "zzz").is_none());
    }

    #[test]
    fn rsa_key_requires_components() {
        let jwk = Jwk {
            kid: Some("abc".to_string()),
            kty: "RSA".to_string(),
            n: None,
            e: Some("AQAB".to_string()),
        };
        assert!(matches!(rsa_key(&jwk), Err(GoogleError::Verification(_))));

        let jwk = Jwk {
            kid: Some("abc".to_string()),
            kty: "EC".to_string(),
            n: None,
            e: None,
        };
        assert!(matches!(rsa_key(&jwk), Err(GoogleError::Verification(_))));
    }

    #[test]
    fn claims_default_optional_fields() {
        let claims: GoogleClaims = serde_json::from_str(
            r#"{"sub":"108417","email":"alice@test.com"}"#,
        )
        .expect("parse");
        assert_eq!(claims.sub, "108417");
        assert!(!claims.email_verified);
        assert!(claims.name.is_none());
        assert!(claims.picture.is_none());
    }

    #[test]
    fn cached_jwks_freshness() {
        let cached = CachedJwks {
            keys: JwkSet { keys: vec![] },
            fetched_at: Instant::now(),
        };
        assert!(cached.is_fresh());

        let stale = CachedJwks {
            keys: JwkSet { keys: vec![] },
            fetched_at: Instant::now() - JWKS_CACHE_TTL - Duration::from_secs(1),
        };
        assert!(!stale.is_fresh());
    }

    #[tokio::test]
    async fn garbage_token_fails_before_any_fetch() {
        let verifier = GoogleTokenVerifier::new("client-id".to_string()).expect("verifier");
        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(GoogleError::Verification(_))
        ));
    }
}
