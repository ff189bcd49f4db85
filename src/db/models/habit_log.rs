//! Habit log models and DTOs.
//!
//! One row per (habit, calendar day); writes are upserts keyed on that
//! pair, rows are never deleted in the normal flow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitLogStatus {
    Pending,
    Completed,
    Skipped,
}

impl HabitLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for HabitLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HabitLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "skipped" => Ok(Self::Skipped),
            _ => Err(format!("Unknown habit log status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HabitLog {
    pub id: String,
    pub habit_id: String,
    pub user_id: String,
    /// "YYYY-MM-DD"
    pub logged_for: String,
    pub status: String,
    pub notes: Option<String>,
    /// Set only while status is completed
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl HabitLog {
    pub fn status_enum(&self) -> HabitLogStatus {
        self.status.parse().unwrap_or(HabitLogStatus::Pending)
    }

    pub fn logged_for_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.logged_for, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertHabitLogRequest {
    /// "YYYY-MM-DD", must not be in the future
    pub logged_for: String,
    pub status: String,
    pub notes: Option<String>,
}

impl HabitLog {
    /// Insert or overwrite the (habit, day) log row.
    ///
    /// `completed_at` is stamped when the status is completed and cleared
    /// otherwise, so a day demoted from completed loses the timestamp too.
    pub async fn upsert(
        db: &SqlitePool,
        habit_id: &str,
        user_id: &str,
        logged_for: NaiveDate,
        status: HabitLogStatus,
        notes: Option<&str>,
    ) -> Result<HabitLog, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now_timestamp();
        let completed_at = match status {
            HabitLogStatus::Completed => Some(now.clone()),
            _ => None,
        };
        let day = logged_for.format("%Y-%m-%d").to_string();

        sqlx::query(
            r#"
            INSERT INTO habit_logs (id, habit_id, user_id, logged_for, status, notes, completed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(habit_id, logged_for)
            DO UPDATE SET status = excluded.status,
                          notes = excluded.notes,
                          completed_at = excluded.completed_at,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(habit_id)
        .bind(user_id)
        .bind(&day)
        .bind(status.as_str())
        .bind(notes)
        .bind(&completed_at)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Self::get_for_day(db, habit_id, &day)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_for_day(
        db: &SqlitePool,
        habit_id: &str,
        day: &str,
    ) -> Result<Option<HabitLog>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, habit_id, user_id, logged_for, status, notes, completed_at, created_at, updated_at
            FROM habit_logs
            WHERE habit_id = ? AND logged_for = ?
            "#,
        )
        .bind(habit_id)
        .bind(day)
        .fetch_optional(db)
        .await
    }

    /// Full history for a habit, newest day first.
    pub async fn list_for_habit(
        db: &SqlitePool,
        habit_id: &str,
    ) -> Result<Vec<HabitLog>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, habit_id, user_id, logged_for, status, notes, completed_at, created_at, updated_at
            FROM habit_logs
            WHERE habit_id = ?
            ORDER BY logged_for DESC
            "#,
        )
        .bind(habit_id)
        .fetch_all(db)
        .await
    }

    /// Whether the habit already has a completed log for the given day.
    pub async fn completed_on(
        db: &SqlitePool,
        habit_id: &str,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM habit_logs
            WHERE habit_id = ? AND logged_for = ? AND status = 'completed'
            "#,
        )
        .bind(habit_id)
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(db)
        .await?;
        Ok(row.0 > 0)
    }
}
