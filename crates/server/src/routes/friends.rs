//! Friend handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;

use wayfarer_core::{FriendRequestId, UserId};

use crate::db::FriendRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::UserSummary;
use crate::models::social::{FriendRequest, IncomingRequest};
use crate::state::AppState;

/// Build the friends router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(index))
        .route("/friends/requests", get(requests).post(send_request))
        .route("/friends/accept/{id}", post(accept))
        .route("/friends/decline/{id}", post(decline))
        .route("/friends/{user_id}", delete(unfriend))
}

/// Friend request body.
#[derive(Debug, Deserialize)]
pub struct FriendRequestBody {
    pub user_id: UserId,
}

/// The caller's friends.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>> {
    let friends = FriendRepository::new(state.pool())
        .friends(current.id)
        .await?;
    Ok(Json(friends))
}

/// Pending requests sent to the caller.
pub async fn requests(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<IncomingRequest>>> {
    let requests = FriendRepository::new(state.pool())
        .incoming(current.id)
        .await?;
    Ok(Json(requests))
}

/// Ask another user to be friends.
pub async fn send_request(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<FriendRequestBody>,
) -> Result<impl IntoResponse> {
    if body.user_id == current.id {
        return Err(AppError::BadRequest(
            "you cannot send a friend request to yourself".to_string(),
        ));
    }

    let request = FriendRepository::new(state.pool())
        .send_request(current.id, body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Accept a request addressed to the caller.
pub async fn accept(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<FriendRequestId>,
) -> Result<Json<FriendRequest>> {
    let request = FriendRepository::new(state.pool())
        .accept(id, current.id)
        .await?;
    Ok(Json(request))
}

/// Decline a request addressed to the caller.
pub async fn decline(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<FriendRequestId>,
) -> Result<StatusCode> {
    FriendRepository::new(state.pool())
        .decline(id, current.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// End a friendship.
pub async fn unfriend(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    FriendRepository::new(state.pool())
        .remove(current.id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
