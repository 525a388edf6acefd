//! Password hashing with Argon2id.
//!
//! Hashing and verification are CPU-bound, so the async entry points run the
//! work on the blocking thread pool; in-flight requests on the event loop are
//! never stalled behind a hash.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, SaltString},
    Algorithm, Argon2, Params, PasswordVerifier, Version,
};

// OWASP 2024 recommended parameters: m=19456 KiB, t=2, p=1.
const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC-formatted string with a fresh random salt.
pub(crate) fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?;
    Ok(digest.to_string())
}

/// Verify a password against a PHC-formatted hash.
pub(crate) fn verify_blocking(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|e| anyhow!("invalid hash format: {e}"))?;
    match hasher()?.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("password verification failed: {e}")),
    }
}

/// Hash on the blocking pool so the event loop keeps serving other requests.
pub(crate) async fn hash(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .context("password hashing task failed")?
}

/// Verify on the blocking pool; see [`hash`].
pub(crate) async fn verify(password: &str, digest: &str) -> Result<bool> {
    let password = password.to_string();
    let digest = digest.to_string();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &digest))
        .await
        .context("password verification task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let digest = hash_blocking("Secret123").expect("hash");
        assert_ne!(digest, "Secret123");
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_blocking("Secret123", &digest).expect("verify"));
        assert!(!verify_blocking("Wrong456", &digest).expect("verify"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_blocking("Secret123").expect("hash");
        let second = hash_blocking("Secret123").expect("hash");
        assert_ne!(first, second);
    }

    #[test]
    fn verify_rejects_garbage_digest() {
        assert!(verify_blocking("Secret123", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn async_round_trip() {
        let digest = hash("Secret123").await.expect("hash");
        assert!(verify("Secret123", &digest).await.expect("verify"));
        assert!(!verify("Wrong456", &digest).await.expect("verify"));
    }
}
