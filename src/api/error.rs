//! Error taxonomy for the auth API.
//!
//! Every failure a handler can surface maps to exactly one variant here, and
//! each variant maps to one HTTP status. The response body is always the
//! `{success: false, message}` envelope; internals (SQL errors, provider
//! responses, token values) never leak into it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API failure modes.
///
/// `Internal` wraps an `anyhow::Error` so storage and dependency code can use
/// `?` freely; the cause is logged at the boundary and the client only sees a
/// generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or rejected input.
    #[error("{0}")]
    Validation(String),

    /// Duplicate email or federated identifier.
    #[error("{0}")]
    Conflict(String),

    /// Email/password pair did not match.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account has no local password; it was created via federated sign-in.
    #[error("This account uses Google sign-in; log in with Google instead")]
    WrongMethod,

    /// Federated assertion rejected (bad signature, audience, or unverified email).
    #[error("{0}")]
    AuthenticationFailed(String),

    /// Login blocked until the email is verified (deployment policy).
    #[error("Email not verified")]
    EmailNotVerified,

    /// Missing or invalid session token.
    #[error("Unauthorized")]
    Unauthorized,

    /// One-time code did not match or has expired. Deliberately a single
    /// outcome so callers cannot tell which condition failed.
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    /// Account or record absent.
    #[error("{0}")]
    NotFound(String),

    /// A required external dependency failed.
    #[error("{0}")]
    Dependency(String),

    /// Unexpected failure; details are logged, never returned.
    #[error("Something went wrong")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidOrExpiredCode => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidCredentials
            | Self::WrongMethod
            | Self::AuthenticationFailed(_)
            | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EmailNotVerified => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Dependency(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::WrongMethod
                | Self::AuthenticationFailed(_)
                | Self::Unauthorized
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("Internal error: {err:#}");
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
