//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use wayfarer_server::db::{self, RepositoryError};
use wayfarer_server::services::{AuthError, ServiceError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Registration or login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A trip service refused the operation.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// No user has the given email.
    #[error("No user with email: {0}")]
    UnknownUser(String),

    /// Reading the password failed.
    #[error("Could not read password: {0}")]
    Input(#[from] std::io::Error),

    /// Invalid argument or environment value.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Connect to the database named by `WAYFARER_DATABASE_URL` or `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("WAYFARER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("WAYFARER_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&SecretString::from(url)).await?)
}
