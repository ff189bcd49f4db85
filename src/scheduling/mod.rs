//! Class reservation engine.
//!
//! Booking decisions (confirmed vs waitlisted vs rejected), per-user
//! overlap validation, cancellation rights, and the schedule view-models
//! built on top of them.

mod engine;
mod schedule;

pub use engine::{cancel, overlaps, reserve, ScheduleError, SlotLocks};
pub use schedule::{
    coach_summary, upcoming_schedule, CoachClassSummary, OwnReservation, ScheduleSlot,
};
