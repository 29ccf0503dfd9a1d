//! Itinerary handlers.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use wayfarer_core::{ActivityId, TripId, UserId};

use crate::db::ActivityRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::activity::{Activity, ActivityDetails};
use crate::services::access;
use crate::state::AppState;

/// Build the activities router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/activities", get(index).post(create))
        .route("/activities/{id}", put(update).delete(destroy))
}

/// Load an activity the caller may change: any accepted member of its trip.
async fn editable_activity(
    state: &AppState,
    id: ActivityId,
    user: UserId,
) -> Result<Activity> {
    let activity = ActivityRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("activity".to_string()))?;
    access::require_member(state.pool(), activity.trip_id, user)
        .await
        .map_err(|e| access::hide_trip_as(e, "activity"))?;
    Ok(activity)
}

/// The trip's itinerary in time order.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Vec<Activity>>> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let activities = ActivityRepository::new(state.pool())
        .list_for_trip(trip_id)
        .await?;
    Ok(Json(activities))
}

/// Add an activity.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(details): Json<ActivityDetails>,
) -> Result<impl IntoResponse> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let details = details.validated().map_err(AppError::BadRequest)?;
    let activity = ActivityRepository::new(state.pool())
        .create(trip_id, current.id, &details)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Replace an activity's details.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
    Json(details): Json<ActivityDetails>,
) -> Result<Json<Activity>> {
    editable_activity(&state, id, current.id).await?;
    let details = details.validated().map_err(AppError::BadRequest)?;
    let activity = ActivityRepository::new(state.pool())
        .update(id, &details)
        .await?;
    Ok(Json(activity))
}

/// Remove an activity.
pub async fn destroy(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ActivityId>,
) -> Result<StatusCode> {
    editable_activity(&state, id, current.id).await?;
    ActivityRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
