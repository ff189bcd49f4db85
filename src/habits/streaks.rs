//! Consecutive-day streak derivation.
//!
//! Streaks are recomputed from the raw log rows on every read. The inputs
//! are tiny (a few dozen rows per habit), and deriving on read avoids
//! stale stored counters when logs are edited out of order.

use chrono::NaiveDate;

use crate::db::{HabitLog, HabitLogStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    /// Consecutive completed days ending at the as-of date
    pub current: i64,
    /// Longest run of consecutive completed days anywhere in the history
    pub longest: i64,
}

/// Derive current and longest streaks from one habit's log rows.
///
/// Order of `logs` is not assumed. Rows with unparseable dates contribute
/// nothing. Pure and deterministic for a given log set and `as_of`.
pub fn compute_streaks(logs: &[HabitLog], as_of: NaiveDate) -> Streaks {
    let mut entries: Vec<(NaiveDate, bool)> = logs
        .iter()
        .filter_map(|log| {
            log.logged_for_date()
                .map(|date| (date, log.status_enum() == HabitLogStatus::Completed))
        })
        .collect();
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    Streaks {
        current: current_streak(&entries, as_of),
        longest: longest_streak(&entries),
    }
}

/// Walk backward from `as_of`, counting completed days until the first gap.
///
/// A row dated strictly before the expected day proves the expected day has
/// no completed entry and ends the scan. Rows on or after the expected day
/// that don't match (wrong status, duplicate, future date) are skipped
/// without advancing the expectation.
fn current_streak(entries: &[(NaiveDate, bool)], as_of: NaiveDate) -> i64 {
    let mut expected = as_of;
    let mut current = 0;

    for &(date, completed) in entries {
        if completed && date == expected {
            current += 1;
            match expected.pred_opt() {
                Some(prev) => expected = prev,
                None => break,
            }
        } else if date < expected {
            break;
        }
    }

    current
}

/// Longest run of day-consecutive completed rows, independent of the as-of
/// date. Scanning in descending order, a completed row extends the run when
/// it is dated exactly one day before the previous completed row.
fn longest_streak(entries: &[(NaiveDate, bool)]) -> i64 {
    let mut longest = 0;
    let mut sequence = 0;
    let mut previous: Option<NaiveDate> = None;

    for &(date, completed) in entries {
        if !completed {
            sequence = 0;
            previous = None;
            continue;
        }

        sequence = match previous {
            Some(prev) if prev.pred_opt() == Some(date) => sequence + 1,
            _ => 1,
        };
        previous = Some(date);
        longest = longest.max(sequence);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset_from_today: i64) -> NaiveDate {
        today() - chrono::Duration::days(offset_from_today)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn log(date: NaiveDate, status: HabitLogStatus) -> HabitLog {
        HabitLog {
            id: uuid::Uuid::new_v4().to_string(),
            habit_id: "habit".to_string(),
            user_id: "user".to_string(),
            logged_for: date.format("%Y-%m-%d").to_string(),
            status: status.as_str().to_string(),
            notes: None,
            completed_at: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn completed(offset: i64) -> HabitLog {
        log(day(offset), HabitLogStatus::Completed)
    }

    #[test]
    fn test_empty_logs() {
        assert_eq!(compute_streaks(&[], today()), Streaks { current: 0, longest: 0 });
    }

    #[test]
    fn test_single_completed_today() {
        let logs = vec![completed(0)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn test_three_consecutive_days() {
        let logs = vec![completed(0), completed(1), completed(2)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let logs = vec![completed(1), completed(0), completed(2)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_gap_breaks_current_streak() {
        // Completed today and two days ago; yesterday missing
        let logs = vec![completed(0), completed(2)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn test_skipped_yesterday_breaks_current_streak() {
        let logs = vec![
            completed(0),
            log(day(1), HabitLogStatus::Skipped),
            completed(2),
            completed(3),
        ];
        // The skipped row is passed over, then day 2 < expected day 1 ends the scan
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 1, longest: 2 });
    }

    #[test]
    fn test_historical_run_only() {
        // Five consecutive completed days ending 10 days ago, nothing today
        let logs: Vec<HabitLog> = (10..15).map(completed).collect();
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 0, longest: 5 });
    }

    #[test]
    fn test_longest_picks_best_of_several_runs() {
        let mut logs: Vec<HabitLog> = (0..2).map(completed).collect();
        logs.extend((5..9).map(completed));
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 2, longest: 4 });
    }

    #[test]
    fn test_streak_ending_yesterday_does_not_count_as_current() {
        let logs = vec![completed(1), completed(2), completed(3)];
        // First row is dated before the expected day (today), so the scan
        // stops immediately
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 0, longest: 3 });
    }

    #[test]
    fn test_pending_today_does_not_end_the_scan() {
        // Today's row exists but is pending; it is skipped, and the streak
        // cannot start because today has no completed entry
        let logs = vec![log(day(0), HabitLogStatus::Pending), completed(1)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 0, longest: 1 });
    }

    #[test]
    fn test_future_rows_are_skipped() {
        let logs = vec![completed(-1), completed(0), completed(1)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 2, longest: 3 });
    }

    #[test]
    fn test_malformed_dates_contribute_nothing() {
        let mut bad = completed(0);
        bad.logged_for = "not-a-date".to_string();
        let logs = vec![bad, completed(0)];
        assert_eq!(compute_streaks(&logs, today()), Streaks { current: 1, longest: 1 });
    }
}
