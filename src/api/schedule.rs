//! Schedule API endpoint.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::scheduling::{self, CoachClassSummary, ScheduleSlot};
use crate::AppState;

use super::error::ApiError;
use super::identity::CurrentUser;

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub time_slots: Vec<ScheduleSlot>,
    /// Totals for classes the caller coaches; empty for everyone else
    pub coach_summary: Vec<CoachClassSummary>,
}

/// Upcoming slots with capacity figures and the caller's own bookings.
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let now = Utc::now();
    let time_slots = scheduling::upcoming_schedule(&state.db, &user.0, now).await?;
    let coach_summary = scheduling::coach_summary(&state.db, &user.0, now).await?;

    Ok(Json(ScheduleResponse {
        time_slots,
        coach_summary,
    }))
}
