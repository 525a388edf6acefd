//! Session cookie plumbing plus the logout and session-probe endpoints.
//!
//! The session token travels in an `HttpOnly` cookie. Cross-site deployments
//! (HTTPS frontend on another origin) need `SameSite=None; Secure`; local
//! HTTP development gets `SameSite=Lax` since `None` without `Secure` is
//! rejected by browsers.

use axum::{
    extract::Extension,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::handlers::auth::{
    principal::require_auth,
    state::{AuthConfig, AuthState},
    types::Envelope,
};

pub(crate) const SESSION_COOKIE: &str = "quickshow_session";

/// Build the Set-Cookie value carrying a fresh session token.
pub(crate) fn session_cookie(config: &AuthConfig, token: &str) -> String {
    let max_age = config.token_ttl_seconds();
    if config.session_cookie_secure() {
        format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=None; Secure; Path=/; Max-Age={max_age}")
    } else {
        format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}")
    }
}

/// Build the Set-Cookie value that expires the session cookie immediately.
/// Attributes must match [`session_cookie`] or browsers keep the old cookie.
pub(crate) fn clear_session_cookie(config: &AuthConfig) -> String {
    if config.session_cookie_secure() {
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=None; Secure; Path=/; Max-Age=0")
    } else {
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

/// Pull the session token from the request's Cookie header, if present.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}

/// Pull a bearer token from the Authorization header, if present.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared", body = Envelope),
    )
)]
pub async fn logout(Extension(state): Extension<Arc<AuthState>>) -> Response {
    // No server-side session to revoke; clearing the cookie is the whole
    // operation and succeeds even without a valid token.
    (
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config()),
        )],
        Json(Envelope::ok("Logged out")),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/v1/auth/is-auth",
    tag = "auth",
    responses(
        (status = 200, description = "Session token is valid", body = Envelope),
        (status = 401, description = "Missing or invalid session token"),
    )
)]
pub async fn is_auth(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, ApiError> {
    require_auth(&headers, &state)?;
    Ok(Json(Envelope::ok("Authenticated")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::state::test_support::{auth_state, auth_state_with};
    use secrecy::SecretString;
    use uuid::Uuid;

    #[test]
    fn secure_cookie_is_cross_site() {
        let state = auth_state();
        let cookie = session_cookie(state.config(), "tok");
        assert!(cookie.starts_with("quickshow_session=tok; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn insecure_cookie_is_lax() {
        let config = AuthConfig::new(
            SecretString::from("secret"),
            "http://localhost:3000".to_string(),
        );
        let cookie = session_cookie(&config, "tok");
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn clear_cookie_matches_attributes() {
        let state = auth_state();
        let cookie = clear_session_cookie(state.config());
        assert!(cookie.starts_with("quickshow_session=; "));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn extracts_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; quickshow_session=abc123; lang=en".parse().unwrap(),
        );
        assert_eq!(extract_session_token(&headers), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "quickshow_session=".parse().unwrap());
        assert_eq!(extract_session_token(&headers), None);
    }

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic abc123".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn logout_clears_cookie() {
        let state = auth_state();
        let response = logout(Extension(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(cookie.contains("quickshow_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn is_auth_accepts_valid_cookie() {
        let state = auth_state();
        let token = state.tokens().issue(Uuid::new_v4()).expect("issue");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("quickshow_session={token}").parse().unwrap(),
        );
        let result = is_auth(Extension(state), headers).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn is_auth_rejects_missing_token() {
        let state = auth_state();
        let result = is_auth(Extension(state), HeaderMap::new()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn is_auth_rejects_token_from_other_secret() {
        let state = auth_state();
        let other = auth_state_with(AuthConfig::new(
            SecretString::from("other-secret"),
            "https://quickshow.dev".to_string(),
        ));
        let token = other.tokens().issue(Uuid::new_v4()).expect("issue");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let result = is_auth(Extension(state), headers).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }
}
