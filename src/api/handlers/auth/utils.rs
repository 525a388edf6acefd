//! Small helpers for auth validation and one-time codes.

use chrono::Utc;
use rand::Rng;
use regex::Regex;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Full names are 3-30 characters after trimming.
pub(crate) fn valid_full_name(full_name: &str) -> bool {
    let len = full_name.trim().chars().count();
    (3..=30).contains(&len)
}

/// Passwords need at least 6 characters with one lowercase letter, one
/// uppercase letter, and one digit.
pub(crate) fn valid_password(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Uniformly random 6-digit one-time code.
pub(crate) fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// A submitted code must look like a 6-digit OTP before touching the store.
pub(crate) fn valid_otp(otp: &str) -> bool {
    otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit())
}

/// Current unix timestamp in milliseconds, matching the stored expiries.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
