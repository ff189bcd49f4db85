//! Daily habit reminder job.
//!
//! A cron-scheduled sweep: for every user owning reminder-enabled habits,
//! collect the ones with no completed log for today and hand the list to
//! the mailer. Without SMTP configured the sweep still runs and logs what
//! it would have sent.

use chrono::{NaiveDate, Utc};
use cron::Schedule;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::ReminderConfig;
use crate::db::{DbPool, Habit, HabitLog, User};
use crate::notifications::Mailer;

/// Reminder-enabled active habits with no completed log dated `today`.
pub async fn habits_due_for_reminder(
    db: &SqlitePool,
    user_id: &str,
    today: NaiveDate,
) -> Result<Vec<Habit>, sqlx::Error> {
    let habits = Habit::list_reminder_enabled_for_user(db, user_id).await?;

    let mut due = Vec::new();
    for habit in habits {
        if !HabitLog::completed_on(db, &habit.id, today).await? {
            due.push(habit);
        }
    }
    Ok(due)
}

/// Result of one reminder sweep
#[derive(Debug, Default)]
pub struct ReminderCycleResult {
    pub users_notified: usize,
    pub habits_due: usize,
    pub errors: usize,
}

pub struct ReminderJob {
    db: DbPool,
    config: ReminderConfig,
    mailer: Option<Arc<Mailer>>,
}

impl ReminderJob {
    pub fn new(db: DbPool, config: ReminderConfig, mailer: Option<Arc<Mailer>>) -> Self {
        Self { db, config, mailer }
    }

    /// Run the sweep on its cron schedule until shutdown.
    pub async fn run(self) {
        if !self.config.enabled {
            info!("Habit reminders disabled");
            return;
        }

        let schedule = match Schedule::from_str(&self.config.schedule) {
            Ok(schedule) => schedule,
            Err(e) => {
                error!(error = %e, schedule = %self.config.schedule, "Invalid reminder schedule");
                return;
            }
        };

        info!(schedule = %self.config.schedule, "Habit reminder job started");

        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                warn!("Reminder schedule has no upcoming runs");
                return;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let result = self.run_cycle(Utc::now().date_naive()).await;
            info!(
                users_notified = result.users_notified,
                habits_due = result.habits_due,
                errors = result.errors,
                "Reminder sweep finished"
            );
        }
    }

    /// One sweep over all users with reminder-enabled habits.
    pub async fn run_cycle(&self, today: NaiveDate) -> ReminderCycleResult {
        let mut result = ReminderCycleResult::default();

        let user_ids = match Habit::users_with_reminders(&self.db).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Failed to enumerate users for reminders");
                result.errors += 1;
                return result;
            }
        };

        for user_id in user_ids {
            match self.remind_user(&user_id, today).await {
                Ok(0) => {}
                Ok(due) => {
                    result.users_notified += 1;
                    result.habits_due += due;
                }
                Err(e) => {
                    result.errors += 1;
                    warn!(error = %e, user_id = %user_id, "Failed to send habit reminder");
                }
            }
        }

        result
    }

    async fn remind_user(&self, user_id: &str, today: NaiveDate) -> anyhow::Result<usize> {
        let due = habits_due_for_reminder(&self.db, user_id, today).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let Some(user) = User::get_by_id(&self.db, user_id).await? else {
            return Ok(0);
        };

        match &self.mailer {
            Some(mailer) => mailer.send_habit_reminder(&user, &due).await?,
            None => info!(
                user_id = %user_id,
                habits = due.len(),
                "SMTP not configured, skipping reminder delivery"
            ),
        }

        Ok(due.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CreateHabitRequest, HabitLogStatus};

    async fn seed_habit(
        db: &SqlitePool,
        user: &User,
        name: &str,
        reminder_enabled: bool,
        status: &str,
    ) -> Habit {
        Habit::create(
            db,
            &user.id,
            &CreateHabitRequest {
                name: name.to_string(),
                description: None,
                status: status.to_string(),
                target_per_week: 7,
                reminder_time: Some("07:00".to_string()),
                reminder_enabled,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_due_selection() {
        let db = crate::db::test_pool().await;
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let user = User::create(&db, "Ada", "ada@gym.test").await.unwrap();

        let done = seed_habit(&db, &user, "Stretch", true, "active").await;
        let pending = seed_habit(&db, &user, "Water", true, "active").await;
        let skipped_today = seed_habit(&db, &user, "Read", true, "active").await;
        seed_habit(&db, &user, "No reminders", false, "active").await;
        seed_habit(&db, &user, "Paused", true, "paused").await;

        HabitLog::upsert(&db, &done.id, &user.id, today, HabitLogStatus::Completed, None)
            .await
            .unwrap();
        // A skipped log today still leaves the habit due
        HabitLog::upsert(
            &db,
            &skipped_today.id,
            &user.id,
            today,
            HabitLogStatus::Skipped,
            None,
        )
        .await
        .unwrap();
        // Completed yesterday doesn't count for today
        HabitLog::upsert(
            &db,
            &pending.id,
            &user.id,
            today.pred_opt().unwrap(),
            HabitLogStatus::Completed,
            None,
        )
        .await
        .unwrap();

        let due = habits_due_for_reminder(&db, &user.id, today).await.unwrap();
        let names: Vec<&str> = due.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Read", "Water"]);
    }

    #[tokio::test]
    async fn test_cycle_counts_users_without_mailer() {
        let db = crate::db::test_pool().await;
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        let ada = User::create(&db, "Ada", "ada@gym.test").await.unwrap();
        let grace = User::create(&db, "Grace", "grace@gym.test").await.unwrap();
        seed_habit(&db, &ada, "Stretch", true, "active").await;
        // Grace's only reminder habit is already completed
        let done = seed_habit(&db, &grace, "Water", true, "active").await;
        HabitLog::upsert(&db, &done.id, &grace.id, today, HabitLogStatus::Completed, None)
            .await
            .unwrap();

        let job = ReminderJob::new(db.clone(), ReminderConfig::default(), None);
        let result = job.run_cycle(today).await;
        assert_eq!(result.users_notified, 1);
        assert_eq!(result.habits_due, 1);
        assert_eq!(result.errors, 0);
    }
}
