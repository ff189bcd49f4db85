//! Habit API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::db::{
    CreateHabitRequest, Habit, HabitLog, HabitLogStatus, HabitStatus, UpsertHabitLogRequest,
};
use crate::habits::{habit_overview, HabitOverviewPage};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::identity::CurrentUser;
use super::validation::{
    parse_date, validate_description, validate_name, validate_notes, validate_reminder_time,
    validate_target_per_week,
};

fn validate_habit_request(req: &CreateHabitRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name) {
        errors.add("name", e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }
    if req.status.parse::<HabitStatus>().is_err() {
        errors.add("status", "Status must be active, paused, or archived");
    }
    if let Err(e) = validate_target_per_week(req.target_per_week) {
        errors.add("target_per_week", e);
    }
    if let Err(e) = validate_reminder_time(&req.reminder_time) {
        errors.add("reminder_time", e);
    }

    errors.finish()
}

/// The caller's habits with streaks derived from their full log history.
pub async fn list_habits(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<HabitOverviewPage>, ApiError> {
    let page = habit_overview(&state.db, &user.0, Utc::now().date_naive()).await?;
    Ok(Json(page))
}

pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    validate_habit_request(&req)?;

    let habit = Habit::create(&state.db, &user.0, &req).await?;
    Ok((StatusCode::CREATED, Json(habit)))
}

/// Upsert the log row for one day of one habit.
pub async fn upsert_habit_log(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(habit_id): Path<String>,
    Json(req): Json<UpsertHabitLogRequest>,
) -> Result<Json<HabitLog>, ApiError> {
    let habit = Habit::get_by_id(&state.db, &habit_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Habit not found"))?;

    if habit.user_id != user.0 {
        return Err(ApiError::forbidden("This habit belongs to another user"));
    }

    let mut errors = ValidationErrorBuilder::new();
    let logged_for = match parse_date(&req.logged_for) {
        Ok(date) => {
            if date > Utc::now().date_naive() {
                errors.add("logged_for", "Cannot log a habit for a future date");
            }
            Some(date)
        }
        Err(e) => {
            errors.add("logged_for", e);
            None
        }
    };
    let status = match req.status.parse::<HabitLogStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "Status must be pending, completed, or skipped");
            None
        }
    };
    if let Err(e) = validate_notes(&req.notes) {
        errors.add("notes", e);
    }
    errors.finish()?;

    let (Some(logged_for), Some(status)) = (logged_for, status) else {
        return Err(ApiError::bad_request("Invalid log entry"));
    };

    let log = HabitLog::upsert(
        &state.db,
        &habit.id,
        &user.0,
        logged_for,
        status,
        req.notes.as_deref(),
    )
    .await?;

    Ok(Json(log))
}
