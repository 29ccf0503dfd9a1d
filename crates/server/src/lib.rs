//! Wayfarer Server library.
//!
//! The JSON API for trip planning and expense sharing, as a library so the
//! CLI and the integration tests can reuse its repositories and services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

/// Migrations for the `wayfarer` schema and the session table.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
