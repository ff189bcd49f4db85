//! Schedule view-models.
//!
//! Plain data records for the presentation layer: upcoming slots with
//! remaining capacity and the caller's own booking, plus per-class totals
//! for coaches.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::engine::ScheduleError;
use crate::db::{GymClass, Reservation, ReservationStatus, TimeSlot};

#[derive(Debug, Clone, Serialize)]
pub struct OwnReservation {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSlot {
    pub id: String,
    pub title: String,
    pub coach: String,
    pub starts_at: String,
    pub ends_at: String,
    pub location: Option<String>,
    pub capacity: i64,
    pub remaining: i64,
    pub waitlisted: i64,
    pub allow_waitlist: bool,
    /// The caller's non-cancelled reservation on this slot, if any
    pub reservation: Option<OwnReservation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoachClassSummary {
    pub id: String,
    pub title: String,
    pub upcoming_slots: usize,
    pub confirmed: i64,
    pub waitlisted: i64,
}

/// Slots from the last day onward, soonest first, annotated for `user_id`.
pub async fn upcoming_schedule(
    db: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ScheduleSlot>, ScheduleError> {
    let slots = TimeSlot::list_from(db, now - Duration::days(1)).await?;

    let mut out = Vec::with_capacity(slots.len());
    for slot in slots {
        let confirmed = Reservation::confirmed_count(db, &slot.id).await?;
        let waitlisted =
            Reservation::count_for_slot_status(db, &slot.id, ReservationStatus::Waitlisted).await?;
        let capacity = slot.effective_capacity();

        let reservation = Reservation::get_for_slot_user(db, &slot.id, user_id)
            .await?
            .filter(|r| r.status_enum() != ReservationStatus::Cancelled)
            .map(|r| OwnReservation {
                id: r.id,
                status: r.status,
            });

        let allow_waitlist = slot.effective_allow_waitlist();
        out.push(ScheduleSlot {
            id: slot.id,
            title: slot.title,
            coach: slot.coach_name,
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
            location: slot.location,
            capacity,
            remaining: (capacity - confirmed).max(0),
            waitlisted,
            allow_waitlist,
            reservation,
        });
    }

    Ok(out)
}

/// Per-class booking totals across upcoming slots, for classes the caller
/// coaches. Empty for users who coach nothing.
pub async fn coach_summary(
    db: &SqlitePool,
    coach_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<CoachClassSummary>, ScheduleError> {
    let classes = GymClass::list_for_coach(db, coach_id).await?;

    let mut out = Vec::with_capacity(classes.len());
    for class in classes {
        let slots = TimeSlot::list_for_class_from(db, &class.id, now).await?;
        let mut confirmed = 0i64;
        let mut waitlisted = 0i64;
        for slot in &slots {
            confirmed += Reservation::confirmed_count(db, &slot.id).await?;
            waitlisted +=
                Reservation::count_for_slot_status(db, &slot.id, ReservationStatus::Waitlisted)
                    .await?;
        }
        out.push(CoachClassSummary {
            id: class.id,
            title: class.title,
            upcoming_slots: slots.len(),
            confirmed,
            waitlisted,
        });
    }

    Ok(out)
}
