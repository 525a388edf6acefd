//! Authenticated-caller extraction shared by protected endpoints.

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::handlers::auth::session::{extract_bearer_token, extract_session_token};
use crate::api::handlers::auth::state::AuthState;

/// The verified identity behind a request. Only proves token possession;
/// handlers that need account state still load the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
}

/// Authenticate a request from its headers: session cookie first, then a
/// bearer token. Any defect (missing, malformed, expired, bad signature)
/// collapses to `Unauthorized`.
pub(crate) fn require_auth(headers: &HeaderMap, state: &AuthState) -> Result<Principal, ApiError> {
    let token = extract_session_token(headers)
        .or_else(|| extract_bearer_token(headers))
        .ok_or(ApiError::Unauthorized)?;

    let account_id = state
        .tokens()
        .verify(token)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Principal { account_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::state::test_support::auth_state;
    use axum::http::header;

    #[test]
    fn cookie_token_wins_over_bearer() {
        let state = auth_state();
        let cookie_id = Uuid::new_v4();
        let bearer_id = Uuid::new_v4();
        let cookie_token = state.tokens().issue(cookie_id).expect("issue");
        let bearer_token = state.tokens().issue(bearer_id).expect("issue");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("quickshow_session={cookie_token}").parse().unwrap(),
        );
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {bearer_token}").parse().unwrap(),
        );

        let principal = require_auth(&headers, &state).expect("auth");
        assert_eq!(principal.account_id, cookie_id);
    }

    #[test]
    fn bearer_token_alone_authenticates() {
        let state = auth_state();
        let id = Uuid::new_v4();
        let token = state.tokens().issue(id).expect("issue");

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );

        let principal = require_auth(&headers, &state).expect("auth");
        assert_eq!(principal.account_id, id);
    }

    #[test]
    fn missing_and_garbage_tokens_are_unauthorized() {
        let state = auth_state();
        assert!(matches!(
            require_auth(&HeaderMap::new(), &state),
            Err(ApiError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "quickshow_session=not-a-jwt".parse().unwrap(),
        );
        assert!(matches!(
            require_auth(&headers, &state),
            Err(ApiError::Unauthorized)
        ));
    }
}
