//! Gym class and time slot API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::{CreateGymClassRequest, CreateTimeSlotRequest, GymClass, TimeSlot};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::identity::CurrentUser;
use super::validation::{
    parse_datetime, validate_capacity, validate_description, validate_name,
};

fn validate_class_request(req: &CreateGymClassRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.title) {
        errors.add("title", e);
    }
    if let Err(e) = validate_description(&req.description) {
        errors.add("description", e);
    }
    if req.default_capacity < 1 {
        errors.add("default_capacity", "Default capacity must be at least 1");
    }

    errors.finish()
}

pub async fn list_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GymClass>>, ApiError> {
    let classes = GymClass::list_all(&state.db).await?;
    Ok(Json(classes))
}

/// Create a class owned by the caller.
pub async fn create_class(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<CreateGymClassRequest>,
) -> Result<(StatusCode, Json<GymClass>), ApiError> {
    validate_class_request(&req)?;

    let class = GymClass::create(&state.db, &user.0, &req).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// Add a time slot to a class. Only the coach may schedule occurrences.
pub async fn create_time_slot(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(class_id): Path<String>,
    Json(req): Json<CreateTimeSlotRequest>,
) -> Result<(StatusCode, Json<TimeSlot>), ApiError> {
    let class = GymClass::get_by_id(&state.db, &class_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Gym class not found"))?;

    if class.coach_id != user.0 {
        return Err(ApiError::forbidden("Only the coach can schedule this class"));
    }

    let mut errors = ValidationErrorBuilder::new();
    let starts_at = match parse_datetime(&req.starts_at) {
        Ok(ts) => Some(ts),
        Err(e) => {
            errors.add("starts_at", e);
            None
        }
    };
    let ends_at = match parse_datetime(&req.ends_at) {
        Ok(ts) => Some(ts),
        Err(e) => {
            errors.add("ends_at", e);
            None
        }
    };
    if let (Some(start), Some(end)) = (starts_at, ends_at) {
        if end <= start {
            errors.add("ends_at", "Slot must end after it starts");
        }
    }
    if let Err(e) = validate_capacity(req.capacity) {
        errors.add("capacity", e);
    }
    errors.finish()?;

    let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) else {
        return Err(ApiError::bad_request("Invalid time range"));
    };

    let slot = TimeSlot::create(
        &state.db,
        &class.id,
        starts_at,
        ends_at,
        req.capacity,
        req.allow_waitlist,
        req.location.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}
