//! Trip handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use wayfarer_core::TripId;

use crate::db::TripRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::trip::{Trip, TripDetails};
use crate::services::{MembershipService, access};
use crate::state::AppState;

/// Build the trips router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips", get(index).post(create))
        .route("/trips/invitations", get(invitations))
        .route("/trips/{id}", get(show).put(update).delete(destroy))
}

/// Trips the caller has accepted.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trip>>> {
    let trips = TripRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;
    Ok(Json(trips))
}

/// Trips with a pending invitation for the caller.
pub async fn invitations(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Trip>>> {
    let trips = TripRepository::new(state.pool())
        .list_invitations(current.id)
        .await?;
    Ok(Json(trips))
}

/// Create a trip owned by the caller.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(details): Json<TripDetails>,
) -> Result<impl IntoResponse> {
    let details = details.validated().map_err(AppError::BadRequest)?;
    let trip = TripRepository::new(state.pool())
        .create(current.id, &details)
        .await?;

    tracing::info!(trip_id = %trip.id, owner = %current.id, "Trip created");
    Ok((StatusCode::CREATED, Json(trip)))
}

/// Trip detail, visible to members and invitees.
pub async fn show(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<Json<Trip>> {
    access::require_participant(state.pool(), id, current.id).await?;
    TripRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("trip".to_string()))
}

/// Edit a trip. Owner only.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
    Json(details): Json<TripDetails>,
) -> Result<Json<Trip>> {
    access::require_owner(state.pool(), id, current.id).await?;
    let details = details.validated().map_err(AppError::BadRequest)?;
    let trip = TripRepository::new(state.pool()).update(id, &details).await?;
    Ok(Json(trip))
}

/// Delete a trip and everything in it. Owner only.
pub async fn destroy(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<StatusCode> {
    MembershipService::new(state.pool())
        .delete_trip(id, current.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
