//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! server library. The server never runs them itself.

use super::{CommandError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    wayfarer_server::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
