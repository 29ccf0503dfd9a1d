//! Trip memory handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use wayfarer_core::{MemoryId, TripId};

use crate::db::MemoryRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::memory::{Memory, NewMemory};
use crate::services::access;
use crate::state::AppState;

/// Build the memories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/memories", get(index).post(create))
        .route("/memories/{id}", delete(destroy))
}

/// The trip's memories, newest first.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Vec<Memory>>> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let memories = MemoryRepository::new(state.pool())
        .list_for_trip(trip_id)
        .await?;
    Ok(Json(memories))
}

/// Add a photo or a note.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(body): Json<NewMemory>,
) -> Result<impl IntoResponse> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let body = body.validated().map_err(AppError::BadRequest)?;
    let memory = MemoryRepository::new(state.pool())
        .create(trip_id, current.id, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(memory)))
}

/// Delete a memory. Its author or the trip owner.
pub async fn destroy(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<MemoryId>,
) -> Result<StatusCode> {
    let memories = MemoryRepository::new(state.pool());
    let memory = memories
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("memory".to_string()))?;

    let membership = access::require_member(state.pool(), memory.trip_id, current.id)
        .await
        .map_err(|e| access::hide_trip_as(e, "memory"))?;
    if memory.user_id != current.id && !membership.is_owner() {
        return Err(AppError::Forbidden(
            "only the author or the trip owner can delete a memory".to_string(),
        ));
    }

    memories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
