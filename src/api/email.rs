//! Email delivery abstraction and templates.
//!
//! Handlers render a template, then hand the message to an [`EmailSender`]
//! after the account state has been committed. Delivery is best-effort: a
//! failed send never rolls back the operation, and the handler reports the
//! outcome to the client as `emailSent` so it can offer a retry.
//!
//! The default sender for local dev is `LogEmailSender`, which logs and
//! returns `Ok(())`. A real SMTP or API-backed sender only needs to implement
//! the trait; handlers do not change.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
}

/// Email delivery abstraction used by the auth handlers.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can report
    /// `emailSent: false`.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            "email send stub"
        );
        Ok(())
    }
}

const VERIFY_TEMPLATE: &str = "\
<h1>Verify your email</h1>\
<p>Hi, use this code to verify the Quickshow account for {{email}}:</p>\
<p><strong>{{otp}}</strong></p>\
<p>The code expires in 24 hours. If you didn't create an account, you can \
safely ignore this email.</p>";

const RESET_TEMPLATE: &str = "\
<h1>Reset your password</h1>\
<p>Use this code to reset the password for {{email}}:</p>\
<p><strong>{{otp}}</strong></p>\
<p>The code expires in 24 hours. If you didn't request a reset, you can \
safely ignore this email.</p>";

const WELCOME_TEMPLATE: &str = "\
<h1>Welcome to Quickshow, {{name}}!</h1>\
<p>Your account for {{email}} is ready. Book your first show any time.</p>";

#[must_use]
pub fn verification_email(to_email: &str, otp: &str) -> EmailMessage {
    EmailMessage {
        to_email: to_email.to_string(),
        subject: "Quickshow account verification code".to_string(),
        html_body: VERIFY_TEMPLATE
            .replace("{{email}}", to_email)
            .replace("{{otp}}", otp),
    }
}

#[must_use]
pub fn password_reset_email(to_email: &str, otp: &str) -> EmailMessage {
    EmailMessage {
        to_email: to_email.to_string(),
        subject: "Quickshow password reset code".to_string(),
        html_body: RESET_TEMPLATE
            .replace("{{email}}", to_email)
            .replace("{{otp}}", otp),
    }
}

#[must_use]
pub fn welcome_email(to_email: &str, full_name: &str) -> EmailMessage {
    EmailMessage {
        to_email: to_email.to_string(),
        subject: "Welcome to Quickshow".to_string(),
        html_body: WELCOME_TEMPLATE
            .replace("{{name}}", full_name)
            .replace("{{email}}", to_email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let message = verification_email("alice@test.com", "123456");
        assert!(LogEmailSender.send(&message).await.is_ok());
    }

    #[test]
    fn verification_email_substitutes_placeholders() {
        let message = verification_email("alice@test.com", "123456");
        assert!(message.html_body.contains("alice@test.com"));
        assert!(message.html_body.contains("123456"));
        assert!(!message.html_body.contains("{{"));
    }

    #[test]
    fn welcome_email_uses_name() {
        let message = welcome_email("bob@test.com", "Bob Tables");
        assert!(message.html_body.contains("Bob Tables"));
        assert!(!message.html_body.contains("{{"));
    }
}
