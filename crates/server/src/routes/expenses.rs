//! Expense handlers.
//!
//! Amounts travel as decimal strings (`"90.00"`).

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};
use serde::{Deserialize, Serialize};

use wayfarer_core::balances::Balance;
use wayfarer_core::{ExpenseId, TripId, UserId};

use crate::db::ExpenseRepository;
use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::RequireAuth;
use crate::models::expense::{ExpenseWithSplits, NewExpense};
use crate::services::{ExpenseService, access};
use crate::state::AppState;

/// Build the expenses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trips/{id}/expenses", get(index).post(create))
        .route("/trips/{id}/balances", get(balances))
        .route("/expenses/{id}", delete(destroy))
        .route("/expenses/{id}/splits/{user_id}", put(set_paid))
}

/// Paid flag request and response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct SplitPaid {
    pub is_paid: bool,
}

fn service(state: &AppState) -> ExpenseService<'_> {
    ExpenseService::new(state.pool(), state.config().split_basis)
}

/// The trip's expenses, newest first, with their splits.
pub async fn index(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Vec<ExpenseWithSplits>>> {
    access::require_member(state.pool(), trip_id, current.id).await?;
    let expenses = ExpenseRepository::new(state.pool())
        .list_for_trip(trip_id)
        .await?;
    Ok(Json(expenses))
}

/// Record an expense paid by the caller.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
    Json(body): Json<NewExpense>,
) -> Result<impl IntoResponse> {
    let body = body.validated().map_err(AppError::BadRequest)?;
    let created = service(&state).create(trip_id, current.id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete an expense. Payer or trip owner.
pub async fn destroy(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ExpenseId>,
) -> Result<StatusCode> {
    service(&state).delete(id, current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark one split paid or unpaid. Payer or debtor.
pub async fn set_paid(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(ExpenseId, UserId)>,
    Json(body): Json<SplitPaid>,
) -> Result<Json<SplitPaid>> {
    service(&state)
        .set_split_paid(id, current.id, user_id, body.is_paid)
        .await?;
    Ok(Json(body))
}

/// Net balances from unpaid splits.
pub async fn balances(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<Vec<Balance>>> {
    let balances = service(&state).balances(trip_id, current.id).await?;
    Ok(Json(balances))
}
