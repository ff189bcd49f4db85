//! Reservation booking and cancellation.
//!
//! Capacity is never stored; the confirmed count is recomputed from live
//! reservation rows on every booking. The read-count-then-write sequence
//! for a slot runs under that slot's in-process lock, so two concurrent
//! bookings for the last open spot can never both confirm.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::db::models::time_slot::parse_timestamp;
use crate::db::{Reservation, ReservationStatus, TimeSlot};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Time slot not found")]
    SlotNotFound,

    #[error("Reservation not found")]
    ReservationNotFound,

    #[error("This class is full and waitlists are disabled")]
    SlotFull,

    #[error("You already have a reservation that overlaps this time ({title}, {starts_at} - {ends_at})")]
    OverlapConflict {
        title: String,
        starts_at: String,
        ends_at: String,
    },

    #[error("Only the reservation owner or the class coach can cancel")]
    NotAllowed,

    #[error("Stored slot has an unreadable timestamp")]
    BadTimestamp(#[from] chrono::ParseError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Per-slot booking locks.
///
/// One mutex per time slot id, created on first use. Holding the lock for
/// the whole reserve sequence serializes capacity decisions for that slot
/// within this process, which is the only writer of the SQLite file.
#[derive(Default)]
pub struct SlotLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, slot_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(slot_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Whether two half-open intervals `[s1, e1)` and `[s2, e2)` overlap.
///
/// The single inequality covers nesting, partial overlap on either side,
/// and full containment; adjacent intervals (`e1 == s2`) do not overlap.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Book a slot for a user.
///
/// Upserts the (slot, user) reservation: an existing row (including a
/// cancelled one) has its status recomputed and overwritten, never
/// duplicated. Fails without writing when the user has a conflicting
/// reservation elsewhere, or when the slot is full and waitlisting is
/// disabled on either the slot or its class.
pub async fn reserve(
    db: &SqlitePool,
    locks: &SlotLocks,
    slot_id: &str,
    user_id: &str,
) -> Result<Reservation, ScheduleError> {
    let lock = locks.lock_for(slot_id);
    let _guard = lock.lock().await;

    let slot = TimeSlot::get_with_class(db, slot_id)
        .await?
        .ok_or(ScheduleError::SlotNotFound)?;

    check_no_overlap(db, &slot.id, slot.starts_at_utc()?, slot.ends_at_utc()?, user_id).await?;

    let confirmed = Reservation::confirmed_count(db, slot_id).await?;
    let capacity = slot.effective_capacity();

    let status = if confirmed >= capacity {
        if slot.effective_allow_waitlist() {
            ReservationStatus::Waitlisted
        } else {
            return Err(ScheduleError::SlotFull);
        }
    } else {
        ReservationStatus::Confirmed
    };

    let reservation = Reservation::upsert(db, slot_id, user_id, status).await?;

    info!(
        slot_id = %slot_id,
        user_id = %user_id,
        status = %reservation.status,
        confirmed = confirmed,
        capacity = capacity,
        "Reservation booked"
    );

    Ok(reservation)
}

/// Reject the booking when the user holds a confirmed or waitlisted
/// reservation on any other slot whose interval overlaps the candidate.
///
/// The candidate slot itself is skipped so re-booking the same slot stays
/// an upsert rather than a self-conflict.
async fn check_no_overlap(
    db: &SqlitePool,
    candidate_slot_id: &str,
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    user_id: &str,
) -> Result<(), ScheduleError> {
    let active = Reservation::active_for_user(db, user_id).await?;

    for held in active {
        if held.class_time_slot_id == candidate_slot_id {
            continue;
        }
        let held_start = parse_timestamp(&held.starts_at)?;
        let held_end = parse_timestamp(&held.ends_at)?;
        if overlaps(candidate_start, candidate_end, held_start, held_end) {
            return Err(ScheduleError::OverlapConflict {
                title: held.title,
                starts_at: held.starts_at,
                ends_at: held.ends_at,
            });
        }
    }

    Ok(())
}

/// Cancel a reservation.
///
/// Allowed for the booking user and for the coach of the slot's class.
/// No waitlisted reservation is promoted when a confirmed spot frees up;
/// freed capacity is simply available to the next booking.
pub async fn cancel(
    db: &SqlitePool,
    reservation_id: &str,
    acting_user_id: &str,
) -> Result<Reservation, ScheduleError> {
    let reservation = Reservation::get_by_id(db, reservation_id)
        .await?
        .ok_or(ScheduleError::ReservationNotFound)?;

    let slot = TimeSlot::get_with_class(db, &reservation.class_time_slot_id)
        .await?
        .ok_or(ScheduleError::SlotNotFound)?;

    if acting_user_id != reservation.user_id && acting_user_id != slot.coach_id {
        return Err(ScheduleError::NotAllowed);
    }

    let updated = Reservation::set_status(db, reservation_id, ReservationStatus::Cancelled).await?;

    info!(
        reservation_id = %reservation_id,
        acting_user_id = %acting_user_id,
        "Reservation cancelled"
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateGymClassRequest, GymClass, User};
    use chrono::TimeZone;

    fn ts(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
    }

    #[test]
    fn test_overlap_predicate() {
        // Partial overlap at the start and end
        assert!(overlaps(ts(9, 0), ts(10, 0), ts(9, 30), ts(10, 30)));
        assert!(overlaps(ts(9, 30), ts(10, 30), ts(9, 0), ts(10, 0)));
        // Nested and containing
        assert!(overlaps(ts(9, 15), ts(9, 45), ts(9, 0), ts(10, 0)));
        assert!(overlaps(ts(9, 0), ts(10, 0), ts(9, 15), ts(9, 45)));
        // Identical
        assert!(overlaps(ts(9, 0), ts(10, 0), ts(9, 0), ts(10, 0)));
        // Adjacent half-open intervals share only the boundary instant
        assert!(!overlaps(ts(9, 0), ts(10, 0), ts(10, 0), ts(11, 0)));
        assert!(!overlaps(ts(10, 0), ts(11, 0), ts(9, 0), ts(10, 0)));
        // Disjoint
        assert!(!overlaps(ts(9, 0), ts(10, 0), ts(11, 0), ts(12, 0)));
    }

    async fn seed_class(
        db: &SqlitePool,
        default_capacity: i64,
        waitlist_enabled: bool,
    ) -> (User, GymClass) {
        let coach = User::create(db, "Coach", &format!("coach-{}@gym.test", uuid::Uuid::new_v4()))
            .await
            .unwrap();
        let class = GymClass::create(
            db,
            &coach.id,
            &CreateGymClassRequest {
                title: "Strength".to_string(),
                description: None,
                default_capacity,
                waitlist_enabled,
            },
        )
        .await
        .unwrap();
        (coach, class)
    }

    async fn seed_slot(
        db: &SqlitePool,
        class: &GymClass,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        capacity: Option<i64>,
        allow_waitlist: bool,
    ) -> TimeSlot {
        TimeSlot::create(db, &class.id, start, end, capacity, allow_waitlist, None)
            .await
            .unwrap()
    }

    async fn seed_member(db: &SqlitePool, name: &str) -> User {
        User::create(db, name, &format!("{}-{}@gym.test", name, uuid::Uuid::new_v4()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_reserve_confirms_under_capacity() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 2, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;
        let member = seed_member(&db, "ada").await;

        let reservation = reserve(&db, &locks, &slot.id, &member.id).await.unwrap();
        assert_eq!(reservation.status_enum(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_reserve_waitlists_at_capacity() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 10, true).await;
        // Slot capacity overrides the class default
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), Some(1), true).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        let a = reserve(&db, &locks, &slot.id, &first.id).await.unwrap();
        let b = reserve(&db, &locks, &slot.id, &second.id).await.unwrap();
        assert_eq!(a.status_enum(), ReservationStatus::Confirmed);
        assert_eq!(b.status_enum(), ReservationStatus::Waitlisted);
    }

    #[tokio::test]
    async fn test_reserve_rejects_full_slot_without_waitlist() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 1, false).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        reserve(&db, &locks, &slot.id, &first.id).await.unwrap();
        let err = reserve(&db, &locks, &slot.id, &second.id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::SlotFull));

        // Nothing was persisted for the rejected booking
        let row = Reservation::get_for_slot_user(&db, &slot.id, &second.id)
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_waitlist_needs_slot_and_class_flags() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        // Class allows waitlists, the slot does not
        let (_, class) = seed_class(&db, 1, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, false).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        reserve(&db, &locks, &slot.id, &first.id).await.unwrap();
        let err = reserve(&db, &locks, &slot.id, &second.id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::SlotFull));
    }

    #[tokio::test]
    async fn test_rebooking_is_an_upsert() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 5, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;
        let member = seed_member(&db, "ada").await;

        let first = reserve(&db, &locks, &slot.id, &member.id).await.unwrap();
        let second = reserve(&db, &locks, &slot.id, &member.id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.status_enum(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_overlap_rejected_then_allowed_after_cancel() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 5, true).await;
        let slot_a = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;
        let slot_b = seed_slot(&db, &class, ts(9, 30), ts(10, 30), None, true).await;
        let member = seed_member(&db, "ada").await;

        let held = reserve(&db, &locks, &slot_a.id, &member.id).await.unwrap();

        let err = reserve(&db, &locks, &slot_b.id, &member.id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::OverlapConflict { .. }));

        cancel(&db, &held.id, &member.id).await.unwrap();

        let booked = reserve(&db, &locks, &slot_b.id, &member.id).await.unwrap();
        assert_eq!(booked.status_enum(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_adjacent_slots_do_not_conflict() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 5, true).await;
        let slot_a = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;
        let slot_b = seed_slot(&db, &class, ts(10, 0), ts(11, 0), None, true).await;
        let member = seed_member(&db, "ada").await;

        reserve(&db, &locks, &slot_a.id, &member.id).await.unwrap();
        let booked = reserve(&db, &locks, &slot_b.id, &member.id).await.unwrap();
        assert_eq!(booked.status_enum(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_waitlisted_reservation_still_blocks_overlap() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 1, true).await;
        let slot_a = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;
        let slot_b = seed_slot(&db, &class, ts(9, 30), ts(10, 30), None, true).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        reserve(&db, &locks, &slot_a.id, &first.id).await.unwrap();
        let waitlisted = reserve(&db, &locks, &slot_a.id, &second.id).await.unwrap();
        assert_eq!(waitlisted.status_enum(), ReservationStatus::Waitlisted);

        let err = reserve(&db, &locks, &slot_b.id, &second.id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::OverlapConflict { .. }));
    }

    #[tokio::test]
    async fn test_cancel_rights() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (coach, class) = seed_class(&db, 5, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;

        let member = seed_member(&db, "ada").await;
        let stranger = seed_member(&db, "mallory").await;

        let reservation = reserve(&db, &locks, &slot.id, &member.id).await.unwrap();

        let err = cancel(&db, &reservation.id, &stranger.id).await.unwrap_err();
        assert!(matches!(err, ScheduleError::NotAllowed));

        // The coach of the class may cancel on the member's behalf
        let updated = cancel(&db, &reservation.id, &coach.id).await.unwrap();
        assert_eq!(updated.status_enum(), ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancelled_spot_is_not_auto_promoted() {
        let db = crate::db::test_pool().await;
        let locks = SlotLocks::new();
        let (_, class) = seed_class(&db, 1, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        let confirmed = reserve(&db, &locks, &slot.id, &first.id).await.unwrap();
        let waitlisted = reserve(&db, &locks, &slot.id, &second.id).await.unwrap();

        cancel(&db, &confirmed.id, &first.id).await.unwrap();

        // The waitlisted booking keeps its status until re-booked explicitly
        let row = Reservation::get_by_id(&db, &waitlisted.id).await.unwrap().unwrap();
        assert_eq!(row.status_enum(), ReservationStatus::Waitlisted);

        // Re-booking recomputes against the freed spot
        let rebooked = reserve(&db, &locks, &slot.id, &second.id).await.unwrap();
        assert_eq!(rebooked.status_enum(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_never_oversell() {
        let db = crate::db::test_pool().await;
        let locks = Arc::new(SlotLocks::new());
        let (_, class) = seed_class(&db, 1, true).await;
        let slot = seed_slot(&db, &class, ts(9, 0), ts(10, 0), None, true).await;

        let first = seed_member(&db, "ada").await;
        let second = seed_member(&db, "grace").await;

        let (a, b) = tokio::join!(
            reserve(&db, &locks, &slot.id, &first.id),
            reserve(&db, &locks, &slot.id, &second.id),
        );
        let statuses = [a.unwrap().status_enum(), b.unwrap().status_enum()];

        // Exactly one confirmed, the other waitlisted, whichever won the race
        assert_eq!(
            statuses.iter().filter(|s| **s == ReservationStatus::Confirmed).count(),
            1
        );
        assert_eq!(
            statuses.iter().filter(|s| **s == ReservationStatus::Waitlisted).count(),
            1
        );
        assert_eq!(Reservation::confirmed_count(&db, &slot.id).await.unwrap(), 1);
    }
}
