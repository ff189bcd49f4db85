//! Habit list view-models.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use super::streaks::compute_streaks;
use crate::db::{Habit, HabitLog, HabitLogStatus};

/// Recent log rows included per habit
const RECENT_LOG_LIMIT: usize = 21;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub logged_for: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitOverview {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub target_per_week: i64,
    pub reminder_time: Option<String>,
    pub reminder_enabled: bool,
    pub current_streak: i64,
    pub longest_streak: i64,
    /// Percent of logged days completed; None when nothing is logged yet
    pub completion_rate: Option<i64>,
    pub recent_logs: Vec<LogEntry>,
}

/// The habit leading one of the streak boards.
#[derive(Debug, Clone, Serialize)]
pub struct StreakLeader {
    pub habit_id: String,
    pub name: String,
    pub streak: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitOverviewPage {
    pub habits: Vec<HabitOverview>,
    pub best_current: Option<StreakLeader>,
    pub best_longest: Option<StreakLeader>,
    pub today: String,
}

/// All of a user's habits with streaks derived from their full log
/// history, plus the best current/longest streak across them.
pub async fn habit_overview(
    db: &SqlitePool,
    user_id: &str,
    today: NaiveDate,
) -> Result<HabitOverviewPage, sqlx::Error> {
    let habits = Habit::list_for_user(db, user_id).await?;

    let mut out = Vec::with_capacity(habits.len());
    for habit in habits {
        let logs = HabitLog::list_for_habit(db, &habit.id).await?;
        let streaks = compute_streaks(&logs, today);

        let completed = logs
            .iter()
            .filter(|log| log.status_enum() == HabitLogStatus::Completed)
            .count();
        let completion_rate = if logs.is_empty() {
            None
        } else {
            Some((completed as f64 / logs.len() as f64 * 100.0).round() as i64)
        };

        let recent_logs = logs
            .iter()
            .take(RECENT_LOG_LIMIT)
            .map(|log| LogEntry {
                id: log.id.clone(),
                logged_for: log.logged_for.clone(),
                status: log.status.clone(),
                notes: log.notes.clone(),
            })
            .collect();

        out.push(HabitOverview {
            id: habit.id,
            name: habit.name,
            description: habit.description,
            status: habit.status,
            target_per_week: habit.target_per_week,
            reminder_time: habit.reminder_time,
            reminder_enabled: habit.reminder_enabled != 0,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            completion_rate,
            recent_logs,
        });
    }

    let best_current = leader(&out, |h| h.current_streak);
    let best_longest = leader(&out, |h| h.longest_streak);

    Ok(HabitOverviewPage {
        habits: out,
        best_current,
        best_longest,
        today: today.format("%Y-%m-%d").to_string(),
    })
}

fn leader(habits: &[HabitOverview], key: impl Fn(&HabitOverview) -> i64) -> Option<StreakLeader> {
    habits
        .iter()
        .max_by_key(|h| key(h))
        .map(|h| StreakLeader {
            habit_id: h.id.clone(),
            name: h.name.clone(),
            streak: key(h),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateHabitRequest, User};
    use chrono::Duration;

    async fn seed_habit(db: &SqlitePool, user: &User, name: &str) -> Habit {
        Habit::create(
            db,
            &user.id,
            &CreateHabitRequest {
                name: name.to_string(),
                description: None,
                status: "active".to_string(),
                target_per_week: 5,
                reminder_time: None,
                reminder_enabled: false,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_overview_streaks_and_completion_rate() {
        let db = crate::db::test_pool().await;
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let user = User::create(&db, "Ada", "ada@gym.test").await.unwrap();

        let stretch = seed_habit(&db, &user, "Stretch").await;
        seed_habit(&db, &user, "Water").await;

        // Stretch: completed today and yesterday, skipped the day before
        for offset in 0..2 {
            HabitLog::upsert(
                &db,
                &stretch.id,
                &user.id,
                today - Duration::days(offset),
                HabitLogStatus::Completed,
                None,
            )
            .await
            .unwrap();
        }
        HabitLog::upsert(
            &db,
            &stretch.id,
            &user.id,
            today - Duration::days(2),
            HabitLogStatus::Skipped,
            None,
        )
        .await
        .unwrap();

        let page = habit_overview(&db, &user.id, today).await.unwrap();
        assert_eq!(page.habits.len(), 2);

        // Ordered by name
        assert_eq!(page.habits[0].name, "Stretch");
        assert_eq!(page.habits[1].name, "Water");

        let stretch_view = &page.habits[0];
        assert_eq!(stretch_view.current_streak, 2);
        assert_eq!(stretch_view.longest_streak, 2);
        assert_eq!(stretch_view.completion_rate, Some(67));
        assert_eq!(stretch_view.recent_logs.len(), 3);
        // Newest first
        assert_eq!(stretch_view.recent_logs[0].logged_for, "2026-03-02");

        let water_view = &page.habits[1];
        assert_eq!(water_view.current_streak, 0);
        assert_eq!(water_view.completion_rate, None);

        assert_eq!(page.best_current.as_ref().unwrap().name, "Stretch");
        assert_eq!(page.best_current.as_ref().unwrap().streak, 2);
    }

    #[tokio::test]
    async fn test_overview_empty() {
        let db = crate::db::test_pool().await;
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let user = User::create(&db, "Ada", "ada@gym.test").await.unwrap();

        let page = habit_overview(&db, &user.id, today).await.unwrap();
        assert!(page.habits.is_empty());
        assert!(page.best_current.is_none());
        assert!(page.best_longest.is_none());
    }
}
