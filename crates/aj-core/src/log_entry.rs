//! Journal log records and the [`LogEntry`] union over the four log kinds.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::time::sleep_duration_ms;

/// Store-assigned identifier. Unique within a single log kind only.
pub type LogId = i64;

/// Discriminant for the four log kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Routine,
    Sleep,
    Exercise,
    DailyScore,
}

impl LogKind {
    pub const ALL: [Self; 4] = [Self::Routine, Self::Sleep, Self::Exercise, Self::DailyScore];
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Routine => "routine",
            Self::Sleep => "sleep",
            Self::Exercise => "exercise",
            Self::DailyScore => "daily_score",
        };
        write!(f, "{s}")
    }
}

impl FromStr for LogKind {
    type Err = UnknownLogKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routine" => Ok(Self::Routine),
            "sleep" => Ok(Self::Sleep),
            "exercise" => Ok(Self::Exercise),
            "daily_score" | "score" => Ok(Self::DailyScore),
            _ => Err(UnknownLogKind(s.to_string())),
        }
    }
}

/// Error type for unknown log kind strings.
#[derive(Debug, Clone)]
pub struct UnknownLogKind(String);

impl fmt::Display for UnknownLogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log kind: {}", self.0)
    }
}

impl std::error::Error for UnknownLogKind {}

/// A timed routine, either entered by hand or committed by the stopwatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineLog {
    pub id: LogId,
    pub title: String,
    /// Epoch milliseconds.
    pub start_time: i64,
    pub duration_ms: i64,
    pub notes: Option<String>,
    pub display_date: String,
}

/// A night of sleep. Clock times are milliseconds since local midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepLog {
    pub id: LogId,
    pub sleep_time_ms: i64,
    pub wake_time_ms: i64,
    pub duration_ms: i64,
    pub description: Option<String>,
    pub display_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseLog {
    pub id: LogId,
    pub activity_type: String,
    pub duration_minutes: i64,
    pub description: Option<String>,
    pub display_date: String,
}

/// Subjective scores for one day, each on a 0–10 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyScoreLog {
    pub id: LogId,
    pub office_work_score: i64,
    pub personal_project_score: i64,
    pub reflection: Option<String>,
    pub display_date: String,
}

/// One journal record of any kind.
///
/// Every consumer matches exhaustively, so a new kind is a compile error at
/// each site that needs to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Routine(RoutineLog),
    Sleep(SleepLog),
    Exercise(ExerciseLog),
    DailyScore(DailyScoreLog),
}

impl LogEntry {
    pub const fn kind(&self) -> LogKind {
        match self {
            Self::Routine(_) => LogKind::Routine,
            Self::Sleep(_) => LogKind::Sleep,
            Self::Exercise(_) => LogKind::Exercise,
            Self::DailyScore(_) => LogKind::DailyScore,
        }
    }

    pub const fn id(&self) -> LogId {
        match self {
            Self::Routine(log) => log.id,
            Self::Sleep(log) => log.id,
            Self::Exercise(log) => log.id,
            Self::DailyScore(log) => log.id,
        }
    }

    pub fn display_date(&self) -> &str {
        match self {
            Self::Routine(log) => &log.display_date,
            Self::Sleep(log) => &log.display_date,
            Self::Exercise(log) => &log.display_date,
            Self::DailyScore(log) => &log.display_date,
        }
    }
}

impl From<RoutineLog> for LogEntry {
    fn from(log: RoutineLog) -> Self {
        Self::Routine(log)
    }
}

impl From<SleepLog> for LogEntry {
    fn from(log: SleepLog) -> Self {
        Self::Sleep(log)
    }
}

impl From<ExerciseLog> for LogEntry {
    fn from(log: ExerciseLog) -> Self {
        Self::Exercise(log)
    }
}

impl From<DailyScoreLog> for LogEntry {
    fn from(log: DailyScoreLog) -> Self {
        Self::DailyScore(log)
    }
}

/// A routine log ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoutineLog {
    pub title: String,
    pub start_time: i64,
    pub duration_ms: i64,
    pub notes: Option<String>,
    pub display_date: String,
}

/// A sleep log ready to be stored.
///
/// Built through [`NewSleepLog::new`] so the stored duration always follows
/// the overnight wraparound rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSleepLog {
    pub sleep_time_ms: i64,
    pub wake_time_ms: i64,
    pub duration_ms: i64,
    pub description: Option<String>,
    pub display_date: String,
}

impl NewSleepLog {
    pub fn new(
        sleep_time_ms: i64,
        wake_time_ms: i64,
        description: Option<String>,
        display_date: impl Into<String>,
    ) -> Self {
        Self {
            sleep_time_ms,
            wake_time_ms,
            duration_ms: sleep_duration_ms(sleep_time_ms, wake_time_ms),
            description,
            display_date: display_date.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExerciseLog {
    pub activity_type: String,
    pub duration_minutes: i64,
    pub description: Option<String>,
    pub display_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDailyScore {
    pub office_work_score: i64,
    pub personal_project_score: i64,
    pub reflection: Option<String>,
    pub display_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrips_through_strings() {
        for kind in LogKind::ALL {
            let parsed: LogKind = kind.to_string().parse().expect("should parse");
            assert_eq!(parsed, kind);
        }
        assert_eq!("score".parse::<LogKind>().unwrap(), LogKind::DailyScore);
    }

    #[test]
    fn unknown_kind_errors() {
        let err = "nap".parse::<LogKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown log kind: nap");
    }

    #[test]
    fn entry_exposes_common_fields() {
        let entry = LogEntry::from(ExerciseLog {
            id: 7,
            activity_type: "Run".to_string(),
            duration_minutes: 30,
            description: None,
            display_date: "2025-03-01".to_string(),
        });
        assert_eq!(entry.kind(), LogKind::Exercise);
        assert_eq!(entry.id(), 7);
        assert_eq!(entry.display_date(), "2025-03-01");
    }

    #[test]
    fn entry_serializes_with_kind_tag() {
        let entry = LogEntry::from(DailyScoreLog {
            id: 1,
            office_work_score: 0,
            personal_project_score: 8,
            reflection: Some("good".to_string()),
            display_date: "2024-01-06".to_string(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "daily_score");
        assert_eq!(json["personal_project_score"], 8);
    }

    #[test]
    fn new_sleep_log_applies_wraparound() {
        let log = NewSleepLog::new(23 * 3_600_000, 7 * 3_600_000, None, "2025-03-02");
        assert_eq!(log.duration_ms, 8 * 3_600_000);
    }
}
