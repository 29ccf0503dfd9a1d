//! User management commands.
//!
//! # Environment Variables
//!
//! - `WAYFARER_NEW_USER_PASSWORD` - Password for `user create`; when unset the
//!   first line of standard input is used.

use std::io::BufRead;

use wayfarer_core::{Email, UserRole};
use wayfarer_server::db::UserRepository;
use wayfarer_server::services::AuthService;

use super::{CommandError, connect};

fn read_password() -> Result<String, CommandError> {
    if let Ok(password) = std::env::var("WAYFARER_NEW_USER_PASSWORD") {
        return Ok(password);
    }

    tracing::info!("Reading password from standard input...");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Create a user with a password.
pub async fn create(email: &str, name: &str, admin: bool) -> Result<(), CommandError> {
    let password = read_password()?;
    let role = if admin {
        UserRole::Admin
    } else {
        UserRole::User
    };

    let pool = connect().await?;
    let user = AuthService::new(&pool)
        .register(email, name, &password, role)
        .await?;

    tracing::info!(
        "User created! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(())
}

async fn set_role(email: &str, role: UserRole) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);
    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_string()))?;

    let user = users.set_role(user.id, role).await?;
    tracing::info!("{} is now {}", user.email, user.role);
    tracing::warn!("The change applies the next time the user logs in.");
    Ok(())
}

/// Give a user the admin role.
pub async fn promote(email: &str) -> Result<(), CommandError> {
    set_role(email, UserRole::Admin).await
}

/// Take the admin role away.
pub async fn demote(email: &str) -> Result<(), CommandError> {
    set_role(email, UserRole::User).await
}
