//! Database helpers for accounts and verification state.
//!
//! Concurrency relies on the database, not application locks: duplicate
//! registrations lose on the unique email index, and one-time codes are
//! consumed with compare-and-set updates so a replayed code finds nothing to
//! update.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, full_name, email, password_hash, google_id, role, \
     is_verified, verify_otp, verify_otp_expires_at, reset_otp, reset_otp_expires_at, \
     profile_picture_url";

/// A persisted account row.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub verify_otp: String,
    pub verify_otp_expires_at: i64,
    pub reset_otp: String,
    pub reset_otp_expires_at: i64,
    pub profile_picture_url: Option<String>,
}

/// Fields for a new account. Email must already be normalized.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub role: String,
    pub is_verified: bool,
}

/// Outcome when inserting a new account: the unique index decides races.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(Account),
    Conflict,
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        google_id: row.get("google_id"),
        role: row.get("role"),
        is_verified: row.get("is_verified"),
        verify_otp: row.get("verify_otp"),
        verify_otp_expires_at: row.get("verify_otp_expires_at"),
        reset_otp: row.get("reset_otp"),
        reset_otp_expires_at: row.get("reset_otp_expires_at"),
        profile_picture_url: row.get("profile_picture_url"),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by email")?;

    Ok(row.as_ref().map(account_from_row))
}

pub(crate) async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by id")?;

    Ok(row.as_ref().map(account_from_row))
}

pub(crate) async fn find_by_google_id(pool: &PgPool, google_id: &str) -> Result<Option<Account>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE google_id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(google_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account by google id")?;

    Ok(row.as_ref().map(account_from_row))
}

/// Insert a new account. A unique violation on email or google id is a
/// `Conflict`, never an error: the loser of a registration race lands here.
pub(crate) async fn insert_account(pool: &PgPool, new: &NewAccount) -> Result<InsertOutcome> {
    let query = format!(
        "INSERT INTO accounts (full_name, email, password_hash, google_id, role, is_verified) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.google_id)
        .bind(&new.role)
        .bind(new.is_verified)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(account_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert account"),
    }
}

/// Store a fresh verification code, overwriting (and invalidating) any prior one.
pub(crate) async fn set_verify_otp(
    pool: &PgPool,
    id: Uuid,
    otp: &str,
    expires_at_millis: i64,
) -> Result<()> {
    let query = "UPDATE accounts \
         SET verify_otp = $2, verify_otp_expires_at = $3, updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(otp)
        .bind(expires_at_millis)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store verification code")?;
    Ok(())
}

/// Consume a verification code: exact match, unexpired, not yet cleared.
/// Marks the account verified and clears the code in one statement, so a
/// second submission of the same code matches zero rows.
pub(crate) async fn consume_verify_otp(
    pool: &PgPool,
    id: Uuid,
    otp: &str,
    now_millis: i64,
) -> Result<bool> {
    let query = "UPDATE accounts \
         SET is_verified = TRUE, verify_otp = '', verify_otp_expires_at = 0, updated_at = NOW() \
         WHERE id = $1 \
           AND verify_otp <> '' \
           AND verify_otp = $2 \
           AND verify_otp_expires_at > $3 \
         RETURNING id";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(id)
        .bind(otp)
        .bind(now_millis)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume verification code")?;

    Ok(row.is_some())
}

/// Store a fresh password-reset code, overwriting any prior one.
pub(crate) async fn set_reset_otp(
    pool: &PgPool,
    id: Uuid,
    otp: &str,
    expires_at_millis: i64,
) -> Result<()> {
    let query = "UPDATE accounts \
         SET reset_otp = $2, reset_otp_expires_at = $3, updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(otp)
        .bind(expires_at_millis)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to store reset code")?;
    Ok(())
}

/// Consume a reset code and set the new password hash in the same
/// compare-and-set statement; replays match zero rows.
pub(crate) async fn consume_reset_otp(
    pool: &PgPool,
    email: &str,
    otp: &str,
    new_password_hash: &str,
    now_millis: i64,
) -> Result<bool> {
    let query = "UPDATE accounts \
         SET password_hash = $3, reset_otp = '', reset_otp_expires_at = 0, updated_at = NOW() \
         WHERE email = $1 \
           AND reset_otp <> '' \
           AND reset_otp = $2 \
           AND reset_otp_expires_at > $4 \
         RETURNING id";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(otp)
        .bind(new_password_hash)
        .bind(now_millis)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume reset code")?;

    Ok(row.is_some())
}

/// Attach a federated identifier to an existing account (merge-by-email) and
/// sync profile fields from the provider. The password hash is untouched.
pub(crate) async fn attach_google_identity(
    pool: &PgPool,
    id: Uuid,
    google_id: &str,
    profile_picture_url: Option<&str>,
) -> Result<()> {
    let query = "UPDATE accounts \
         SET google_id = $2, \
             is_verified = TRUE, \
             profile_picture_url = COALESCE($3, profile_picture_url), \
             updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(google_id)
        .bind(profile_picture_url)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to attach google identity")?;
    Ok(())
}

/// Refresh the avatar for an already-linked federated account.
pub(crate) async fn update_profile_picture(
    pool: &PgPool,
    id: Uuid,
    profile_picture_url: &str,
) -> Result<()> {
    let query = "UPDATE accounts \
         SET profile_picture_url = $2, updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(id)
        .bind(profile_picture_url)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update profile picture")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn new_account_holds_fields() {
        let new = NewAccount {
            full_name: "Alice Tester".to_string(),
            email: "alice@test.com".to_string(),
            password_hash: Some("$argon2id$stub".to_string()),
            google_id: None,
            role: "user".to_string(),
            is_verified: false,
        };
        assert_eq!(new.email, "alice@test.com");
        assert!(new.google_id.is_none());
    }

    #[test]
    fn insert_outcome_debug_names() {
        assert_eq!(format!("{:?}", InsertOutcome::Conflict), "Conflict");
    }
}
