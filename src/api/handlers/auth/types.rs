//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SendPasswordResetRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoogleSignInRequest {
    /// Google ID token obtained by the client.
    pub credential: String,
}

/// Envelope for responses with no extra data.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
}

impl Envelope {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Account fields returned after register/login/federated sign-in.
/// Never includes the password hash or OTP material.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    pub data: SessionData,
    /// Whether the best-effort email (verification/welcome) was delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}

/// Outcome envelope for operations that trigger an email.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmailOutcomeResponse {
    pub success: bool,
    pub message: String,
    pub email_sent: bool,
}

/// Profile projection for `GET /v1/user/data`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDataResponse {
    pub success: bool,
    pub data: UserData,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}
