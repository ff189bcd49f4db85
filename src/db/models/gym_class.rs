//! Gym class (offering) models and DTOs.
//!
//! A gym class is the recurring definition owned by a coach; concrete
//! occurrences live in `class_time_slots`.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GymClass {
    pub id: String,
    pub coach_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Used when a time slot has no capacity of its own
    pub default_capacity: i64,
    pub waitlist_enabled: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGymClassRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_capacity")]
    pub default_capacity: i64,
    #[serde(default = "default_waitlist_enabled")]
    pub waitlist_enabled: bool,
}

fn default_capacity() -> i64 {
    10
}

fn default_waitlist_enabled() -> bool {
    true
}

impl GymClass {
    pub async fn create(
        db: &SqlitePool,
        coach_id: &str,
        req: &CreateGymClassRequest,
    ) -> Result<GymClass, sqlx::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = crate::db::now_timestamp();
        let waitlist = if req.waitlist_enabled { 1i64 } else { 0i64 };

        sqlx::query(
            r#"
            INSERT INTO gym_classes (id, coach_id, title, description, default_capacity, waitlist_enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(coach_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.default_capacity)
        .bind(waitlist)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Self::get_by_id(db, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(db: &SqlitePool, id: &str) -> Result<Option<GymClass>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, coach_id, title, description, default_capacity, waitlist_enabled, created_at, updated_at
            FROM gym_classes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<GymClass>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, coach_id, title, description, default_capacity, waitlist_enabled, created_at, updated_at
            FROM gym_classes
            ORDER BY title ASC
            "#,
        )
        .fetch_all(db)
        .await
    }

    pub async fn list_for_coach(
        db: &SqlitePool,
        coach_id: &str,
    ) -> Result<Vec<GymClass>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, coach_id, title, description, default_capacity, waitlist_enabled, created_at, updated_at
            FROM gym_classes
            WHERE coach_id = ?
            ORDER BY title ASC
            "#,
        )
        .bind(coach_id)
        .fetch_all(db)
        .await
    }
}
