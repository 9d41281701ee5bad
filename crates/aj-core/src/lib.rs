//! Core domain logic for the activity journal.
//!
//! This crate contains the fundamental types and logic for:
//! - Log entries: the four journal record kinds and their tagged union
//! - Journal: merging every kind into one date-ordered, published feed
//! - Stopwatch: resumable elapsed-time tracking committed as routine logs
//! - Weekend mode: the persisted weekend convention and its date predicate
//! - Validation: turning raw user input into storable logs

pub mod journal;
pub mod log_entry;
pub mod stopwatch;
pub mod store;
pub mod time;
pub mod validate;
pub mod weekend;

pub use journal::{DateGroup, Journal, group_by_date};
pub use log_entry::{
    DailyScoreLog, ExerciseLog, LogEntry, LogId, LogKind, NewDailyScore, NewExerciseLog,
    NewRoutineLog, NewSleepLog, RoutineLog, SleepLog, UnknownLogKind,
};
pub use stopwatch::{RoutineRecorder, Stopwatch, StopwatchState};
pub use store::{LogStore, StorageError};
pub use validate::ValidationError;
pub use weekend::{
    UnknownWeekendMode, WEEKEND_MODE_KEY, WeekendMode, is_weekend, resolve_weekend_mode,
    save_weekend_mode,
};
