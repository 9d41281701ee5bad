//! Parsing of raw user input into storable logs.
//!
//! Every function here rejects malformed input with a [`ValidationError`]
//! before anything reaches the store, so a failed entry never leaves a
//! partial write behind.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::log_entry::{NewDailyScore, NewExerciseLog, NewRoutineLog, NewSleepLog};
use crate::time::clock_time_ms;
use crate::weekend::{WeekendMode, is_weekend};

pub const MAX_SCORE: i64 = 10;

/// Rejected user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("invalid time for {field}: {value} (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("{field} must be a whole number: {value}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must not be negative: {value}")]
    Negative { field: &'static str, value: i64 },
    #[error("{field} must be between 0 and 10: {value}")]
    ScoreOutOfRange { field: &'static str, value: i64 },
}

/// Parses an ISO `YYYY-MM-DD` date, returning it zero-padded.
pub fn parse_display_date(value: &str) -> Result<String, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Parses `HH:MM` into milliseconds since midnight.
pub fn parse_clock_time(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        field,
        value: value.to_string(),
    };
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    Ok(clock_time_ms(hours, minutes))
}

fn parse_whole(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            field,
            value: value.to_string(),
        })
}

/// Parses a non-negative whole number of minutes.
pub fn parse_minutes(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let minutes = parse_whole(field, value)?;
    if minutes < 0 {
        return Err(ValidationError::Negative {
            field,
            value: minutes,
        });
    }
    Ok(minutes)
}

/// Parses a score on the 0–10 scale.
pub fn parse_score(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    let score = parse_whole(field, value)?;
    if !(0..=MAX_SCORE).contains(&score) {
        return Err(ValidationError::ScoreOutOfRange {
            field,
            value: score,
        });
    }
    Ok(score)
}

fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(trimmed.to_string())
}

/// Blank optional text is stored as absent.
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Builds a routine log from a title and a duration in minutes.
///
/// The start time is placed `minutes` before `now`.
pub fn routine_from_input(
    title: &str,
    minutes: &str,
    notes: Option<&str>,
    date: &str,
    now: DateTime<Utc>,
) -> Result<NewRoutineLog, ValidationError> {
    let title = require_text("title", title)?;
    let duration_ms = parse_minutes("duration", minutes)?.saturating_mul(60_000);
    let display_date = parse_display_date(date)?;
    Ok(NewRoutineLog {
        title,
        start_time: now.timestamp_millis().saturating_sub(duration_ms),
        duration_ms,
        notes: optional_text(notes),
        display_date,
    })
}

pub fn sleep_from_input(
    sleep_time: &str,
    wake_time: &str,
    description: Option<&str>,
    date: &str,
) -> Result<NewSleepLog, ValidationError> {
    let sleep_time_ms = parse_clock_time("sleep time", sleep_time)?;
    let wake_time_ms = parse_clock_time("wake time", wake_time)?;
    let display_date = parse_display_date(date)?;
    Ok(NewSleepLog::new(
        sleep_time_ms,
        wake_time_ms,
        optional_text(description),
        display_date,
    ))
}

pub fn exercise_from_input(
    activity_type: &str,
    minutes: &str,
    description: Option<&str>,
    date: &str,
) -> Result<NewExerciseLog, ValidationError> {
    Ok(NewExerciseLog {
        activity_type: require_text("activity type", activity_type)?,
        duration_minutes: parse_minutes("duration", minutes)?,
        description: optional_text(description),
        display_date: parse_display_date(date)?,
    })
}

/// Builds a daily score, honouring the weekend convention.
///
/// On a weekend day the office score is not asked for and is stored as zero;
/// any value supplied is ignored. On a weekday it is required.
pub fn daily_score_from_input(
    office_score: Option<&str>,
    personal_score: &str,
    reflection: Option<&str>,
    date: &str,
    mode: WeekendMode,
) -> Result<NewDailyScore, ValidationError> {
    let display_date = parse_display_date(date)?;
    let office_work_score = if is_weekend(&display_date, mode) {
        0
    } else {
        let value = office_score
            .filter(|value| !value.trim().is_empty())
            .ok_or(ValidationError::Missing {
                field: "office score",
            })?;
        parse_score("office score", value)?
    };
    Ok(NewDailyScore {
        office_work_score,
        personal_project_score: parse_score("personal score", personal_score)?,
        reflection: optional_text(reflection),
        display_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn clock_time_parses_hours_and_minutes() {
        assert_eq!(parse_clock_time("t", "23:00").unwrap(), 23 * 3_600_000);
        assert_eq!(parse_clock_time("t", " 7:05 ").unwrap(), 7 * 3_600_000 + 5 * 60_000);
    }

    #[test]
    fn clock_time_rejects_garbage() {
        for value in ["", "7", "24:00", "12:60", "aa:bb", "-1:30"] {
            assert!(
                matches!(
                    parse_clock_time("sleep time", value),
                    Err(ValidationError::InvalidTime { .. })
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn display_date_is_normalised() {
        assert_eq!(parse_display_date("2024-1-6").unwrap(), "2024-01-06");
        assert!(matches!(
            parse_display_date("2024-02-30"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn routine_start_time_precedes_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let log = routine_from_input("Meditate", "15", Some("  "), "2025-03-01", now).unwrap();
        assert_eq!(log.duration_ms, 15 * 60_000);
        assert_eq!(log.start_time, now.timestamp_millis() - 15 * 60_000);
        assert_eq!(log.notes, None);
    }

    #[test]
    fn routine_requires_title_and_numeric_duration() {
        let now = Utc::now();
        assert_eq!(
            routine_from_input("  ", "15", None, "2025-03-01", now).unwrap_err(),
            ValidationError::Missing { field: "title" }
        );
        assert!(matches!(
            routine_from_input("Read", "ten", None, "2025-03-01", now),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            routine_from_input("Read", "-5", None, "2025-03-01", now),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn sleep_input_computes_overnight_duration() {
        let log = sleep_from_input("23:00", "07:00", Some("restless"), "2025-03-02").unwrap();
        assert_eq!(log.duration_ms, 8 * 3_600_000);
        assert_eq!(log.description.as_deref(), Some("restless"));
    }

    #[test]
    fn exercise_requires_activity() {
        let log = exercise_from_input("Swim", "45", None, "2025-03-02").unwrap();
        assert_eq!(log.duration_minutes, 45);
        assert_eq!(
            exercise_from_input("", "45", None, "2025-03-02").unwrap_err(),
            ValidationError::Missing {
                field: "activity type"
            }
        );
    }

    #[test]
    fn weekday_score_requires_office_score() {
        let err =
            daily_score_from_input(None, "7", None, "2024-01-08", WeekendMode::SatSun).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Missing {
                field: "office score"
            }
        );

        let score =
            daily_score_from_input(Some("6"), "7", None, "2024-01-08", WeekendMode::SatSun)
                .unwrap();
        assert_eq!(score.office_work_score, 6);
        assert_eq!(score.personal_project_score, 7);
    }

    #[test]
    fn weekend_score_forces_office_to_zero() {
        let score =
            daily_score_from_input(Some("9"), "7", None, "2024-01-05", WeekendMode::FriSat)
                .unwrap();
        assert_eq!(score.office_work_score, 0);

        let score =
            daily_score_from_input(None, "4", None, "2024-01-07", WeekendMode::SatSun).unwrap();
        assert_eq!(score.office_work_score, 0);
    }

    #[test]
    fn scores_must_stay_in_range() {
        assert_eq!(
            parse_score("personal score", "11").unwrap_err(),
            ValidationError::ScoreOutOfRange {
                field: "personal score",
                value: 11
            }
        );
        assert_eq!(parse_score("personal score", "0").unwrap(), 0);
        assert_eq!(parse_score("personal score", "10").unwrap(), 10);
    }
}
