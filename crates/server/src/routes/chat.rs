//! Trip group chat handlers. Clients poll for new messages.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use wayfarer_core::TripId;

use crate::db::TripChatRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::social::{TripMessage, normalize_message};
use crate::services::access;
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/trips/{id}/chat", get(history).post(post_message))
}

/// Chat message request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

/// Recent messages, oldest first.
pub async fn history(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Vec<TripMessage>>> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let messages = TripChatRepository::new(state.pool())
        .history(trip_id)
        .await?;
    Ok(Json(messages))
}

/// Post to the trip's chat.
pub async fn post_message(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(body): Json<ChatRequest>,
) -> Result<impl IntoResponse> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let content = normalize_message(&body.content).map_err(AppError::BadRequest)?;
    let message = TripChatRepository::new(state.pool())
        .post(trip_id, current.id, &content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}
