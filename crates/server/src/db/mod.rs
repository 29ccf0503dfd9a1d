//! Database operations for the `wayfarer` `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `user` - Accounts (local password or federated)
//! - `trip`, `trip_member` - Trips and their rosters
//! - `activity` - Itinerary entries
//! - `expense`, `expense_split` - Shared costs and per-member shares
//! - `memory` - Photos and notes
//! - `friend_request` - Friend requests and accepted friendships
//! - `message`, `trip_message` - Private and group chat
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p wayfarer-cli -- migrate
//! ```
//!
//! Repositories borrow the pool for single statements. Steps that must run
//! together take a `&mut PgConnection` so the calling service can put them
//! in one transaction.

pub mod activities;
pub mod admin;
pub mod chat;
pub mod expenses;
pub mod friends;
pub mod members;
pub mod memories;
pub mod messages;
pub mod trips;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activities::ActivityRepository;
pub use admin::AdminRepository;
pub use chat::TripChatRepository;
pub use expenses::ExpenseRepository;
pub use friends::FriendRepository;
pub use members::MemberRepository;
pub use memories::MemoryRepository;
pub use messages::MessageRepository;
pub use trips::TripRepository;
pub use users::UserRepository;

/// SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the transaction lost a race with a concurrent one and may be
    /// retried by the client.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => matches!(
                db_err.code().as_deref(),
                Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
            ),
            _ => false,
        }
    }
}

/// Map a unique or exclusion violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Map a foreign key violation to [`RepositoryError::NotFound`].
pub(crate) fn not_found_on_foreign_key(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
