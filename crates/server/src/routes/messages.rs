//! Private message handlers. Only friends can message each other.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};

use wayfarer_core::UserId;

use crate::db::{FriendRepository, MessageRepository};
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::social::{Message, normalize_message};
use crate::state::AppState;

/// Build the messages router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages/unread", get(unread))
        .route("/messages/{user_id}", get(conversation).post(send))
        .route("/messages/{user_id}/read", put(mark_read))
}

/// Message request body.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub content: String,
}

/// Unread message count.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// Result of marking a conversation read.
#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

async fn require_friend(state: &AppState, user: UserId, other: UserId) -> Result<()> {
    if FriendRepository::new(state.pool())
        .are_friends(user, other)
        .await?
    {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you can only message your friends".to_string(),
        ))
    }
}

/// Messages the caller has not read yet.
pub async fn unread(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UnreadCount>> {
    let count = MessageRepository::new(state.pool())
        .unread_count(current.id)
        .await?;
    Ok(Json(UnreadCount { count }))
}

/// The recent conversation with a friend, oldest first.
pub async fn conversation(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Message>>> {
    require_friend(&state, current.id, user_id).await?;
    let messages = MessageRepository::new(state.pool())
        .conversation(current.id, user_id)
        .await?;
    Ok(Json(messages))
}

/// Send a message to a friend.
pub async fn send(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<MessageRequest>,
) -> Result<impl IntoResponse> {
    require_friend(&state, current.id, user_id).await?;
    let content = normalize_message(&body.content).map_err(AppError::BadRequest)?;
    let message = MessageRepository::new(state.pool())
        .send(current.id, user_id, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Mark everything `user_id` sent the caller as read.
pub async fn mark_read(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<MarkedRead>> {
    let updated = MessageRepository::new(state.pool())
        .mark_read(current.id, user_id)
        .await?;
    Ok(Json(MarkedRead { updated }))
}
