//! The persistence seam between the journal and its storage engine.

use thiserror::Error;

use crate::log_entry::{
    DailyScoreLog, ExerciseLog, LogId, NewDailyScore, NewExerciseLog, NewRoutineLog, NewSleepLog,
    RoutineLog, SleepLog,
};

/// Failures raised by a [`LogStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage engine could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A table the journal relies on does not exist.
    #[error("schema missing: {0}")]
    SchemaMissing(String),
    /// Any other failure reported by the engine.
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Typed CRUD over the four log kinds plus a key/value settings table.
///
/// Reads return every row with no ordering guarantee. Deleting an id that does
/// not exist is not an error. Each call is expected to be atomic on its own.
pub trait LogStore {
    fn insert_routine_log(&mut self, log: &NewRoutineLog) -> Result<LogId, StorageError>;
    fn insert_sleep_log(&mut self, log: &NewSleepLog) -> Result<LogId, StorageError>;
    fn insert_exercise_log(&mut self, log: &NewExerciseLog) -> Result<LogId, StorageError>;
    fn insert_daily_score(&mut self, log: &NewDailyScore) -> Result<LogId, StorageError>;

    fn routine_logs(&self) -> Result<Vec<RoutineLog>, StorageError>;
    fn sleep_logs(&self) -> Result<Vec<SleepLog>, StorageError>;
    fn exercise_logs(&self) -> Result<Vec<ExerciseLog>, StorageError>;
    fn daily_scores(&self) -> Result<Vec<DailyScoreLog>, StorageError>;

    fn delete_routine_log(&mut self, id: LogId) -> Result<(), StorageError>;
    fn delete_sleep_log(&mut self, id: LogId) -> Result<(), StorageError>;
    fn delete_exercise_log(&mut self, id: LogId) -> Result<(), StorageError>;
    fn delete_daily_score(&mut self, id: LogId) -> Result<(), StorageError>;

    fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Inserts or replaces the value stored under `key`.
    fn set_setting(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
