//! Domain models served by the API.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod activity;
pub mod expense;
pub mod memory;
pub mod session;
pub mod social;
pub mod trip;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserSummary};
