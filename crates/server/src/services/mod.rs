//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password registration and login
//! - `access` - Trip membership checks shared by the route handlers
//! - `membership` - Invitations, removals and ownership succession
//! - `expenses` - Expense creation with split generation, paid flags, balances
//! - `accounts` - Admin account removal

pub mod access;
pub mod accounts;
pub mod auth;
pub mod expenses;
pub mod membership;

use thiserror::Error;

use wayfarer_core::membership::MembershipError;

use crate::db::RepositoryError;

pub use accounts::AccountService;
pub use auth::{AuthError, AuthService};
pub use expenses::ExpenseService;
pub use membership::MembershipService;

/// Errors returned by the trip services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// A membership rule refused the change.
    #[error(transparent)]
    Membership(#[from] MembershipError),

    /// The named resource does not exist or is not visible to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller may see the resource but not change it this way.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    /// The input failed validation.
    #[error("invalid input: {0}")]
    Invalid(String),
}
