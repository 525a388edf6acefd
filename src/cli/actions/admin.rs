use crate::api::handlers::auth::admin::{bootstrap_admin, BootstrapOutcome};
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// Handle the admin bootstrap action.
///
/// Idempotent: creating an admin that already exists is a no-op, not an error.
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::AdminBootstrap {
            dsn,
            email,
            password,
            full_name,
            ..
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .connect(&dsn)
                .await
                .context("Failed to connect to database")?;

            match bootstrap_admin(&pool, &email, &password, &full_name).await? {
                BootstrapOutcome::Created(id) => {
                    info!(account_id = %id, "Admin account created");
                }
                BootstrapOutcome::AlreadyExists => {
                    warn!("Admin account already exists, nothing to do");
                }
            }
        }
        Action::Server { .. } => unreachable!("server is handled elsewhere"),
    }

    Ok(())
}
