//! Input validation for API requests.
//!
//! Validation functions return `Result<(), String>` so handlers can
//! collect failures per field with the `ValidationErrorBuilder` from the
//! `error` module.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_NOTES_LEN: usize = 500;
pub const MAX_TARGET_PER_WEEK: i64 = 14;

/// Validate a habit or class name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if name.len() > MAX_NAME_LEN {
        return Err(format!("Name is too long (max {} characters)", MAX_NAME_LEN));
    }
    Ok(())
}

pub fn validate_description(description: &Option<String>) -> Result<(), String> {
    if let Some(d) = description {
        if d.len() > MAX_DESCRIPTION_LEN {
            return Err(format!(
                "Description is too long (max {} characters)",
                MAX_DESCRIPTION_LEN
            ));
        }
    }
    Ok(())
}

pub fn validate_notes(notes: &Option<String>) -> Result<(), String> {
    if let Some(n) = notes {
        if n.len() > MAX_NOTES_LEN {
            return Err(format!("Notes are too long (max {} characters)", MAX_NOTES_LEN));
        }
    }
    Ok(())
}

/// Weekly habit target: at least once, at most twice a day
pub fn validate_target_per_week(target: i64) -> Result<(), String> {
    if !(1..=MAX_TARGET_PER_WEEK).contains(&target) {
        return Err(format!(
            "Target per week must be between 1 and {}",
            MAX_TARGET_PER_WEEK
        ));
    }
    Ok(())
}

/// Validate an "HH:MM" reminder time (optional field)
pub fn validate_reminder_time(time: &Option<String>) -> Result<(), String> {
    if let Some(t) = time {
        NaiveTime::parse_from_str(t, "%H:%M")
            .map_err(|_| "Reminder time must be in HH:MM format".to_string())?;
    }
    Ok(())
}

/// Parse a "YYYY-MM-DD" date
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| "Date must be in YYYY-MM-DD format".to_string())
}

/// Parse an RFC 3339 timestamp
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| "Timestamp must be RFC 3339 (e.g. 2026-03-02T09:00:00Z)".to_string())
}

/// Validate a positive capacity (optional override on a slot)
pub fn validate_capacity(capacity: Option<i64>) -> Result<(), String> {
    if let Some(c) = capacity {
        if c < 1 {
            return Err("Capacity must be at least 1".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Stretch").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_target_per_week() {
        assert!(validate_target_per_week(1).is_ok());
        assert!(validate_target_per_week(14).is_ok());
        assert!(validate_target_per_week(0).is_err());
        assert!(validate_target_per_week(15).is_err());
    }

    #[test]
    fn test_validate_reminder_time() {
        assert!(validate_reminder_time(&None).is_ok());
        assert!(validate_reminder_time(&Some("07:00".to_string())).is_ok());
        assert!(validate_reminder_time(&Some("7am".to_string())).is_err());
        assert!(validate_reminder_time(&Some("25:00".to_string())).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-03-02").is_ok());
        assert!(parse_date("02-03-2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
    }

    #[test]
    fn test_parse_datetime() {
        assert!(parse_datetime("2026-03-02T09:00:00Z").is_ok());
        assert!(parse_datetime("2026-03-02 09:00").is_err());
    }

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(1)).is_ok());
        assert!(validate_capacity(Some(0)).is_err());
    }
}
