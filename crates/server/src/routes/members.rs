//! Trip roster handlers: invitations, answers and removals.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use wayfarer_core::membership::Departure;
use wayfarer_core::{MemberStatus, TripId, UserId};

use crate::db::MemberRepository;
use crate::error::Result;
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::trip::TripMember;
use crate::services::{MembershipService, access};
use crate::state::AppState;

/// Build the members router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/members", get(index).post(invite))
        .route("/trips/{id}/members/{user_id}", delete(remove))
        .route("/trips/{id}/invitation/accept", post(accept))
        .route("/trips/{id}/invitation/decline", post(decline))
}

/// Invitation request body.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// The caller's standing after accepting.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub trip_id: TripId,
    pub status: MemberStatus,
}

/// The roster, owner first.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<Json<Vec<TripMember>>> {
    access::require_member(state.pool(), id, current.id).await?;
    let members = MemberRepository::new(state.pool()).list(id).await?;
    Ok(Json(members))
}

/// Invite a user by email. Owner only.
pub async fn invite(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
    Json(body): Json<InviteRequest>,
) -> Result<impl IntoResponse> {
    let member = MembershipService::new(state.pool())
        .invite(id, current.id, &body.email)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Accept the caller's invitation. Accepting twice is harmless.
pub async fn accept(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<Json<InvitationResponse>> {
    MembershipService::new(state.pool())
        .respond(id, current.id, true)
        .await?;
    Ok(Json(InvitationResponse {
        trip_id: id,
        status: MemberStatus::Accepted,
    }))
}

/// Decline the caller's invitation.
pub async fn decline(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<StatusCode> {
    MembershipService::new(state.pool())
        .respond(id, current.id, false)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Leave the trip, or remove another member as its owner.
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(TripId, UserId)>,
) -> Result<Json<Departure>> {
    let departure = MembershipService::new(state.pool())
        .remove(id, current.id, user_id)
        .await?;
    Ok(Json(departure))
}
