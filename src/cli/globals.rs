use secrecy::SecretString;

/// Deployment configuration shared by the server and admin actions.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub public_base_url: String,
    pub token_ttl_days: i64,
    pub google_client_id: Option<String>,
    pub require_verified_login: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString, public_base_url: String) -> Self {
        Self {
            jwt_secret,
            public_base_url,
            token_ttl_days: 7,
            google_client_id: None,
            require_verified_login: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            SecretString::from("topsecret"),
            "https://quickshow.dev".to_string(),
        );
        assert_eq!(args.jwt_secret.expose_secret(), "topsecret");
        assert_eq!(args.public_base_url, "https://quickshow.dev");
        assert_eq!(args.token_ttl_days, 7);
        assert!(args.google_client_id.is_none());
        assert!(!args.require_verified_login);
    }
}
