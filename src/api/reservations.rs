//! Reservation API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::Reservation;
use crate::scheduling;
use crate::AppState;

use super::error::ApiError;
use super::identity::CurrentUser;

/// Book a time slot for the caller.
///
/// Confirmed while capacity remains, waitlisted once full (when the slot
/// and class both allow it), rejected otherwise. Re-booking a slot the
/// caller already holds recomputes and overwrites the existing row.
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(slot_id): Path<String>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let reservation =
        scheduling::reserve(&state.db, &state.slot_locks, &slot_id, &user.0).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Cancel a reservation; allowed for its owner and the class coach.
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(reservation_id): Path<String>,
) -> Result<Json<Reservation>, ApiError> {
    let reservation = scheduling::cancel(&state.db, &reservation_id, &user.0).await?;
    Ok(Json(reservation))
}
