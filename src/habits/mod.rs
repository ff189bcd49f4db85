//! Habit tracking: streak derivation, list view-models, and the daily
//! reminder job.

mod overview;
mod reminders;
mod streaks;

pub use overview::{habit_overview, HabitOverview, HabitOverviewPage, LogEntry, StreakLeader};
pub use reminders::{habits_due_for_reminder, ReminderJob};
pub use streaks::{compute_streaks, Streaks};
