//! Admin dashboard handlers.
//!
//! Role checks read the session, so a promotion or demotion applies the
//! next time that user logs in.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
};
use serde::Deserialize;

use wayfarer_core::{UserId, UserRole};

use crate::db::admin::SiteStats;
use crate::db::{AdminRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::services::AccountService;
use crate::state::AppState;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(users))
        .route("/users/{id}/role", put(set_role))
        .route("/users/{id}", delete(delete_user))
}

/// Role change request body.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: UserRole,
}

/// Site-wide counts.
pub async fn stats(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<SiteStats>> {
    let stats = AdminRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}

/// Every account, newest first.
pub async fn users(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// Promote or demote an account.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<User>> {
    if id == admin.id && body.role != UserRole::Admin {
        return Err(AppError::BadRequest(
            "administrators cannot demote themselves".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .set_role(id, body.role)
        .await?;
    tracing::info!(admin = %admin.id, user_id = %id, role = %body.role, "User role changed");
    Ok(Json(user))
}

/// Delete an account after it leaves all of its trips.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    AccountService::new(state.pool())
        .delete_user(admin.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
