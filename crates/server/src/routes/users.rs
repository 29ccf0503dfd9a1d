//! User profile handlers.

use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use serde::Deserialize;

use wayfarer_core::UserId;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::models::user::ProfileUpdate;
use crate::state::AppState;

/// Most results returned by a search.
const SEARCH_LIMIT: i64 = 20;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/search", get(search))
        .route("/users/me", put(update_me))
        .route("/users/{id}", get(show))
}

/// Query parameters for user search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Find other users whose email or display name contains `q`.
pub async fn search(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<User>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let users = UserRepository::new(state.pool())
        .search(q, current.id, SEARCH_LIMIT)
        .await?;
    Ok(Json(users))
}

/// A user's profile.
pub async fn show(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("user".to_string()))
}

/// Update the caller's own profile.
pub async fn update_me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>> {
    let update = update.validated().map_err(AppError::BadRequest)?;
    let user = UserRepository::new(state.pool())
        .update_profile(current.id, &update)
        .await?;
    Ok(Json(user))
}
