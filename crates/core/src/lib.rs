//! Wayfarer Core - domain types and trip rules.
//!
//! This crate is shared by every Wayfarer component:
//! - `server` - JSON API for trips, expenses, friends and chat
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The server executes the plans produced here inside its
//! database transactions.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, money and statuses
//! - [`membership`] - Ownership succession when a member leaves a trip
//! - [`splitting`] - Dividing an expense across trip members
//! - [`balances`] - Netting unpaid splits into per-member balances

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod balances;
pub mod membership;
pub mod splitting;
pub mod types;

pub use types::*;
