//! Class reservation models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// The three reservation states. Only `Confirmed` counts against capacity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Waitlisted,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Waitlisted => "waitlisted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "waitlisted" => Ok(Self::Waitlisted),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown reservation status: {}", s)),
        }
    }
}

/// One user's reservation on one time slot.
///
/// At most one row per (slot, user); re-booking after cancellation reuses
/// the row rather than inserting a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: String,
    pub class_time_slot_id: String,
    pub user_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Reservation {
    pub fn status_enum(&self) -> ReservationStatus {
        self.status.parse().unwrap_or(ReservationStatus::Cancelled)
    }
}

/// An active (confirmed or waitlisted) reservation joined with its slot's
/// interval, for overlap validation.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveReservationSlot {
    pub reservation_id: String,
    pub class_time_slot_id: String,
    pub status: String,
    pub starts_at: String,
    pub ends_at: String,
    pub title: String,
}

impl Reservation {
    /// Insert or overwrite the (slot, user) reservation with the given status.
    pub async fn upsert(
        db: &SqlitePool,
        slot_id: &str,
        user_id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO class_reservations (id, class_time_slot_id, user_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(class_time_slot_id, user_id)
            DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(slot_id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Self::get_for_slot_user(db, slot_id, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(db: &SqlitePool, id: &str) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, class_time_slot_id, user_id, status, created_at, updated_at
            FROM class_reservations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn get_for_slot_user(
        db: &SqlitePool,
        slot_id: &str,
        user_id: &str,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, class_time_slot_id, user_id, status, created_at, updated_at
            FROM class_reservations
            WHERE class_time_slot_id = ? AND user_id = ?
            "#,
        )
        .bind(slot_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Number of confirmed reservations currently held against a slot.
    ///
    /// Always recomputed from the live rows; no counter is stored.
    pub async fn confirmed_count(db: &SqlitePool, slot_id: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM class_reservations
            WHERE class_time_slot_id = ? AND status = 'confirmed'
            "#,
        )
        .bind(slot_id)
        .fetch_one(db)
        .await?;
        Ok(row.0)
    }

    pub async fn count_for_slot_status(
        db: &SqlitePool,
        slot_id: &str,
        status: ReservationStatus,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM class_reservations
            WHERE class_time_slot_id = ? AND status = ?
            "#,
        )
        .bind(slot_id)
        .bind(status.as_str())
        .fetch_one(db)
        .await?;
        Ok(row.0)
    }

    /// The user's confirmed/waitlisted reservations with their slot
    /// intervals. Cancelled rows never contribute to conflicts.
    pub async fn active_for_user(
        db: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<ActiveReservationSlot>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT r.id AS reservation_id, r.class_time_slot_id, r.status,
                   s.starts_at, s.ends_at, c.title
            FROM class_reservations r
            JOIN class_time_slots s ON s.id = r.class_time_slot_id
            JOIN gym_classes c ON c.id = s.gym_class_id
            WHERE r.user_id = ? AND r.status IN ('confirmed', 'waitlisted')
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn set_status(
        db: &SqlitePool,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE class_reservations
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(crate::db::now_timestamp())
        .bind(id)
        .execute(db)
        .await?;

        Self::get_by_id(db, id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}
