//! Class time slot models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// One scheduled occurrence of a gym class.
///
/// `starts_at`/`ends_at` are a half-open interval `[starts_at, ends_at)`
/// stored as RFC 3339 UTC strings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeSlot {
    pub id: String,
    pub gym_class_id: String,
    pub starts_at: String,
    pub ends_at: String,
    /// Falls back to the class's default_capacity when NULL
    pub capacity: Option<i64>,
    pub allow_waitlist: i64,
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTimeSlotRequest {
    pub starts_at: String,
    pub ends_at: String,
    pub capacity: Option<i64>,
    #[serde(default = "default_allow_waitlist")]
    pub allow_waitlist: bool,
    pub location: Option<String>,
}

fn default_allow_waitlist() -> bool {
    true
}

/// Time slot joined with its gym class, as needed by the schedule view
/// and the reservation engine.
#[derive(Debug, Clone, FromRow)]
pub struct SlotWithClass {
    pub id: String,
    pub gym_class_id: String,
    pub starts_at: String,
    pub ends_at: String,
    pub capacity: Option<i64>,
    pub allow_waitlist: i64,
    pub location: Option<String>,
    pub title: String,
    pub coach_id: String,
    pub coach_name: String,
    pub default_capacity: i64,
    pub waitlist_enabled: i64,
}

impl SlotWithClass {
    /// Effective capacity: the slot's own, else the class default.
    pub fn effective_capacity(&self) -> i64 {
        self.capacity.unwrap_or(self.default_capacity)
    }

    /// Waitlisting requires both the slot and the class to allow it.
    pub fn effective_allow_waitlist(&self) -> bool {
        self.allow_waitlist != 0 && self.waitlist_enabled != 0
    }

    pub fn starts_at_utc(&self) -> chrono::ParseResult<DateTime<Utc>> {
        parse_timestamp(&self.starts_at)
    }

    pub fn ends_at_utc(&self) -> chrono::ParseResult<DateTime<Utc>> {
        parse_timestamp(&self.ends_at)
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> chrono::ParseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

const SLOT_WITH_CLASS_SELECT: &str = r#"
    SELECT s.id, s.gym_class_id, s.starts_at, s.ends_at, s.capacity, s.allow_waitlist, s.location,
           c.title, c.coach_id, u.name AS coach_name, c.default_capacity, c.waitlist_enabled
    FROM class_time_slots s
    JOIN gym_classes c ON c.id = s.gym_class_id
    JOIN users u ON u.id = c.coach_id
"#;

impl TimeSlot {
    pub async fn create(
        db: &SqlitePool,
        gym_class_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        capacity: Option<i64>,
        allow_waitlist: bool,
        location: Option<&str>,
    ) -> Result<TimeSlot, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now_timestamp();
        let waitlist = if allow_waitlist { 1i64 } else { 0i64 };

        sqlx::query(
            r#"
            INSERT INTO class_time_slots (id, gym_class_id, starts_at, ends_at, capacity, allow_waitlist, location, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(gym_class_id)
        .bind(crate::db::format_timestamp(starts_at))
        .bind(crate::db::format_timestamp(ends_at))
        .bind(capacity)
        .bind(waitlist)
        .bind(location)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Self::get_by_id(db, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(db: &SqlitePool, id: &str) -> Result<Option<TimeSlot>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, gym_class_id, starts_at, ends_at, capacity, allow_waitlist, location, created_at, updated_at
            FROM class_time_slots
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Slot joined with its class and coach, for capacity decisions.
    pub async fn get_with_class(
        db: &SqlitePool,
        id: &str,
    ) -> Result<Option<SlotWithClass>, sqlx::Error> {
        let sql = format!("{SLOT_WITH_CLASS_SELECT} WHERE s.id = ?");
        sqlx::query_as(&sql).bind(id).fetch_optional(db).await
    }

    /// Upcoming slots of one class, soonest first.
    pub async fn list_for_class_from(
        db: &SqlitePool,
        gym_class_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, gym_class_id, starts_at, ends_at, capacity, allow_waitlist, location, created_at, updated_at
            FROM class_time_slots
            WHERE gym_class_id = ? AND starts_at >= ?
            ORDER BY starts_at ASC
            "#,
        )
        .bind(gym_class_id)
        .bind(crate::db::format_timestamp(since))
        .fetch_all(db)
        .await
    }

    /// Slots starting at or after `since`, soonest first.
    pub async fn list_from(
        db: &SqlitePool,
        since: DateTime<Utc>,
    ) -> Result<Vec<SlotWithClass>, sqlx::Error> {
        let sql = format!("{SLOT_WITH_CLASS_SELECT} WHERE s.starts_at >= ? ORDER BY s.starts_at ASC");
        sqlx::query_as(&sql)
            .bind(crate::db::format_timestamp(since))
            .fetch_all(db)
            .await
    }
}
