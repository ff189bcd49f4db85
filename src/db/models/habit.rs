//! Habit models and DTOs.
//!
//! Streak figures are derived on every read (see `habits::streaks`), never
//! stored on the row.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Active,
    Paused,
    Archived,
}

impl HabitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HabitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Unknown habit status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub target_per_week: i64,
    /// "HH:MM", local to the user
    pub reminder_time: Option<String>,
    pub reminder_enabled: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub target_per_week: i64,
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub reminder_enabled: bool,
}

fn default_status() -> String {
    "active".to_string()
}

impl Habit {
    pub async fn create(
        db: &SqlitePool,
        user_id: &str,
        req: &CreateHabitRequest,
    ) -> Result<Habit, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now_timestamp();
        let reminder = if req.reminder_enabled { 1i64 } else { 0i64 };

        sqlx::query(
            r#"
            INSERT INTO habits (id, user_id, name, description, status, target_per_week, reminder_time, reminder_enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.status)
        .bind(req.target_per_week)
        .bind(&req.reminder_time)
        .bind(reminder)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Self::get_by_id(db, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(db: &SqlitePool, id: &str) -> Result<Option<Habit>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, name, description, status, target_per_week, reminder_time, reminder_enabled, created_at, updated_at
            FROM habits
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<Habit>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, name, description, status, target_per_week, reminder_time, reminder_enabled, created_at, updated_at
            FROM habits
            WHERE user_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Active habits with reminders switched on, for the reminder job.
    pub async fn list_reminder_enabled_for_user(
        db: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<Habit>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, name, description, status, target_per_week, reminder_time, reminder_enabled, created_at, updated_at
            FROM habits
            WHERE user_id = ? AND reminder_enabled = 1 AND status = 'active'
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Distinct users owning at least one reminder-enabled habit.
    pub async fn users_with_reminders(db: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT user_id
            FROM habits
            WHERE reminder_enabled = 1 AND status = 'active'
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
