//! Auth state and configuration shared across handlers.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

use super::google::GoogleTokenVerifier;
use super::token::TokenIssuer;
use crate::api::email::EmailSender;

const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
const DEFAULT_OTP_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    public_base_url: String,
    token_ttl_days: i64,
    otp_ttl_millis: i64,
    require_verified_login: bool,
    google_client_id: Option<String>,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString, public_base_url: String) -> Self {
        Self {
            jwt_secret,
            public_base_url,
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            otp_ttl_millis: DEFAULT_OTP_TTL_MILLIS,
            require_verified_login: false,
            google_client_id: None,
        }
    }

    #[must_use]
    pub fn with_token_ttl_days(mut self, days: i64) -> Self {
        self.token_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_millis(mut self, millis: i64) -> Self {
        self.otp_ttl_millis = millis;
        self
    }

    #[must_use]
    pub fn with_require_verified_login(mut self, required: bool) -> Self {
        self.require_verified_login = required;
        self
    }

    #[must_use]
    pub fn with_google_client_id(mut self, client_id: Option<String>) -> Self {
        self.google_client_id = client_id;
        self
    }

    pub(crate) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    pub(crate) fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    #[must_use]
    pub fn token_ttl_days(&self) -> i64 {
        self.token_ttl_days
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_days * 24 * 60 * 60
    }

    pub(crate) fn otp_ttl_millis(&self) -> i64 {
        self.otp_ttl_millis
    }

    #[must_use]
    pub fn require_verified_login(&self) -> bool {
        self.require_verified_login
    }

    pub(crate) fn google_client_id(&self) -> Option<&str> {
        self.google_client_id.as_deref()
    }

    /// Cookies are marked `Secure` only when the client is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenIssuer,
    mailer: Arc<dyn EmailSender>,
    google: Option<GoogleTokenVerifier>,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the Google verifier cannot be constructed.
    pub fn new(config: AuthConfig, mailer: Arc<dyn EmailSender>) -> Result<Self> {
        let tokens = TokenIssuer::new(
            config.jwt_secret().clone(),
            config.token_ttl_seconds(),
        );
        let google = match config.google_client_id() {
            Some(client_id) => Some(GoogleTokenVerifier::new(client_id.to_string())?),
            None => None,
        };
        Ok(Self {
            config,
            tokens,
            mailer,
            google,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub(crate) fn mailer(&self) -> &dyn EmailSender {
        self.mailer.as_ref()
    }

    pub(crate) fn google(&self) -> Option<&GoogleTokenVerifier> {
        self.google.as_ref()
    }
}
