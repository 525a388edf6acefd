//! # Quickshow Auth Service
//!
//! `quickshow` is the authentication and account-verification authority for
//! the Quickshow movie ticket booking platform. It owns user accounts,
//! credential hashing, session token issuance, email verification and
//! password reset via one-time codes, and Google sign-in reconciliation.
//!
//! ## Accounts
//!
//! Emails are normalized to lowercase and globally unique. An account always
//! carries a local password hash, a federated (Google) identifier, or both;
//! it is never left unauthenticatable.
//!
//! ## Sessions
//!
//! Sessions are stateless signed tokens (HS256) delivered in an `HttpOnly`
//! cookie. Logout clears the cookie only; there is no server-side revocation
//! list. Token issuance is isolated behind [`api::handlers::auth::token::TokenIssuer`]
//! so a denylist can be added without touching callers.
//!
//! ## Verification
//!
//! Email verification and password reset use numeric one-time codes stored
//! on the account with a bounded validity window. Codes are single-use:
//! consumption clears them atomically in the database.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
