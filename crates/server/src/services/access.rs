//! Trip visibility and permission checks.
//!
//! A user with no row on a trip gets `NotFound`, so outsiders cannot
//! discover which trip ids exist. A user with a row but too little standing
//! gets `Forbidden`.

use sqlx::PgPool;

use wayfarer_core::{TripId, UserId};

use super::ServiceError;
use crate::db::MemberRepository;
use crate::db::members::Membership;

async fn membership(
    pool: &PgPool,
    trip_id: TripId,
    user_id: UserId,
) -> Result<Membership, ServiceError> {
    MemberRepository::new(pool)
        .membership(trip_id, user_id)
        .await?
        .ok_or(ServiceError::NotFound("trip"))
}

/// Require any row on the trip, pending invitations included.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the user is not on the trip.
pub async fn require_participant(
    pool: &PgPool,
    trip_id: TripId,
    user_id: UserId,
) -> Result<Membership, ServiceError> {
    membership(pool, trip_id, user_id).await
}

/// Require an accepted membership.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the user is not on the trip, or
/// `ServiceError::Forbidden` if the invitation is still pending.
pub async fn require_member(
    pool: &PgPool,
    trip_id: TripId,
    user_id: UserId,
) -> Result<Membership, ServiceError> {
    let membership = membership(pool, trip_id, user_id).await?;
    if !membership.is_accepted() {
        return Err(ServiceError::Forbidden("accept the invitation first"));
    }
    Ok(membership)
}

/// Require the trip's owner.
///
/// # Errors
///
/// Returns `ServiceError::NotFound` if the user is not on the trip, or
/// `ServiceError::Forbidden` if they are not its owner.
pub async fn require_owner(
    pool: &PgPool,
    trip_id: TripId,
    user_id: UserId,
) -> Result<Membership, ServiceError> {
    let membership = membership(pool, trip_id, user_id).await?;
    if !membership.is_owner() {
        return Err(ServiceError::Forbidden("only the trip owner can do this"));
    }
    Ok(membership)
}

/// Report a hidden trip as a missing `what`, for resources reached by their
/// own id rather than the trip's.
#[must_use]
pub fn hide_trip_as(err: ServiceError, what: &'static str) -> ServiceError {
    match err {
        ServiceError::NotFound("trip") => ServiceError::NotFound(what),
        other => other,
    }
}
