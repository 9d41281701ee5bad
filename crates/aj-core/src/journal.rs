//! The log aggregator: merges the four log kinds into one published feed.
//!
//! # Concurrency
//!
//! [`Journal`] holds its store behind a mutex that stays locked across
//! read, sort, and publish, so two refreshes can never interleave and publish
//! a torn feed. The feed and the weekend mode are published on
//! `tokio::sync::watch` channels; the journal is the only writer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::log_entry::{
    LogEntry, LogId, NewDailyScore, NewExerciseLog, NewRoutineLog, NewSleepLog,
};
use crate::store::{LogStore, StorageError};
use crate::validate::parse_display_date;
use crate::weekend::{WeekendMode, resolve_weekend_mode, save_weekend_mode};

/// Entries sharing one display date, in feed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup<'a> {
    pub date: &'a str,
    pub entries: Vec<&'a LogEntry>,
}

/// Single owner of the published journal feed.
pub struct Journal<S> {
    store: Mutex<S>,
    feed: watch::Sender<Vec<LogEntry>>,
    weekend_mode: watch::Sender<WeekendMode>,
}

impl<S: LogStore> Journal<S> {
    /// Wraps a store and loads the initial feed and settings.
    pub fn new(store: S) -> Result<Self, StorageError> {
        let (feed, _) = watch::channel(Vec::new());
        let (weekend_mode, _) = watch::channel(WeekendMode::default());
        let journal = Self {
            store: Mutex::new(store),
            feed,
            weekend_mode,
        };
        journal.refresh()?;
        journal.load_settings()?;
        Ok(journal)
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_settings(&self) -> Result<(), StorageError> {
        let mode = resolve_weekend_mode(&*self.lock())?;
        self.weekend_mode.send_replace(mode);
        Ok(())
    }

    /// Current feed snapshot, newest date first.
    pub fn feed(&self) -> Vec<LogEntry> {
        self.feed.borrow().clone()
    }

    /// Receiver that observes every republished feed.
    pub fn subscribe(&self) -> watch::Receiver<Vec<LogEntry>> {
        self.feed.subscribe()
    }

    pub fn weekend_mode(&self) -> WeekendMode {
        *self.weekend_mode.borrow()
    }

    pub fn subscribe_weekend_mode(&self) -> watch::Receiver<WeekendMode> {
        self.weekend_mode.subscribe()
    }

    /// Persists a new weekend mode and republishes it.
    pub fn set_weekend_mode(&self, mode: WeekendMode) -> Result<(), StorageError> {
        save_weekend_mode(&mut *self.lock(), mode)?;
        self.weekend_mode.send_replace(mode);
        tracing::debug!(%mode, "weekend mode updated");
        Ok(())
    }

    /// Re-reads every log kind and republishes the merged feed.
    ///
    /// On failure the previously published feed is left untouched.
    pub fn refresh(&self) -> Result<(), StorageError> {
        let store = self.lock();
        self.refresh_locked(&store)
    }

    fn refresh_locked(&self, store: &S) -> Result<(), StorageError> {
        let entries = collect_entries(store)?;
        tracing::debug!(entries = entries.len(), "feed refreshed");
        self.feed.send_replace(entries);
        Ok(())
    }

    /// Runs one mutation and refreshes while still holding the store lock.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut S) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut store = self.lock();
        let result = op(&mut store)?;
        self.refresh_locked(&store)?;
        Ok(result)
    }

    pub fn add_routine_log(&self, log: &NewRoutineLog) -> Result<LogId, StorageError> {
        let log = NewRoutineLog {
            display_date: canonical_date(&log.display_date),
            ..log.clone()
        };
        let id = self.mutate(|store| store.insert_routine_log(&log))?;
        tracing::debug!(id, title = %log.title, "routine log added");
        Ok(id)
    }

    /// Adds a sleep log. The duration wraps past midnight when the wake time
    /// is earlier on the clock than the sleep time.
    pub fn add_sleep_log(
        &self,
        sleep_time_ms: i64,
        wake_time_ms: i64,
        description: Option<String>,
        display_date: &str,
    ) -> Result<LogId, StorageError> {
        let log = NewSleepLog::new(sleep_time_ms, wake_time_ms, description, display_date);
        self.insert_sleep_log(&log)
    }

    /// Adds an already-built sleep log.
    pub fn insert_sleep_log(&self, log: &NewSleepLog) -> Result<LogId, StorageError> {
        let log = NewSleepLog {
            display_date: canonical_date(&log.display_date),
            ..log.clone()
        };
        let id = self.mutate(|store| store.insert_sleep_log(&log))?;
        tracing::debug!(id, duration_ms = log.duration_ms, "sleep log added");
        Ok(id)
    }

    pub fn add_exercise_log(&self, log: &NewExerciseLog) -> Result<LogId, StorageError> {
        let log = NewExerciseLog {
            display_date: canonical_date(&log.display_date),
            ..log.clone()
        };
        let id = self.mutate(|store| store.insert_exercise_log(&log))?;
        tracing::debug!(id, activity = %log.activity_type, "exercise log added");
        Ok(id)
    }

    pub fn add_daily_score(&self, log: &NewDailyScore) -> Result<LogId, StorageError> {
        let log = NewDailyScore {
            display_date: canonical_date(&log.display_date),
            ..log.clone()
        };
        let id = self.mutate(|store| store.insert_daily_score(&log))?;
        tracing::debug!(id, date = %log.display_date, "daily score added");
        Ok(id)
    }

    /// Deletes one entry through the store method for its own kind.
    pub fn delete_log(&self, entry: &LogEntry) -> Result<(), StorageError> {
        let id = entry.id();
        self.mutate(|store| match entry {
            LogEntry::Routine(_) => store.delete_routine_log(id),
            LogEntry::Sleep(_) => store.delete_sleep_log(id),
            LogEntry::Exercise(_) => store.delete_exercise_log(id),
            LogEntry::DailyScore(_) => store.delete_daily_score(id),
        })?;
        tracing::debug!(id, kind = %entry.kind(), "log deleted");
        Ok(())
    }
}

/// Zero-pads a parseable date so the feed's string sort matches calendar
/// order. Anything unparseable is stored as given.
fn canonical_date(value: &str) -> String {
    parse_display_date(value).unwrap_or_else(|_| value.to_string())
}

fn collect_entries<S: LogStore + ?Sized>(store: &S) -> Result<Vec<LogEntry>, StorageError> {
    let mut entries: Vec<LogEntry> = Vec::new();
    entries.extend(store.routine_logs()?.into_iter().map(LogEntry::from));
    entries.extend(store.sleep_logs()?.into_iter().map(LogEntry::from));
    entries.extend(store.exercise_logs()?.into_iter().map(LogEntry::from));
    entries.extend(store.daily_scores()?.into_iter().map(LogEntry::from));
    // Zero-padded ISO dates sort correctly as strings. The sort is stable, so
    // entries sharing a date keep their read order.
    entries.sort_by(|a, b| b.display_date().cmp(a.display_date()));
    Ok(entries)
}

/// Groups a feed by display date, keeping feed order for groups and entries.
pub fn group_by_date(feed: &[LogEntry]) -> Vec<DateGroup<'_>> {
    let mut groups: Vec<DateGroup<'_>> = Vec::new();
    for entry in feed {
        match groups.iter_mut().find(|group| group.date == entry.display_date()) {
            Some(group) => group.entries.push(entry),
            None => groups.push(DateGroup {
                date: entry.display_date(),
                entries: vec![entry],
            }),
        }
    }
    groups
}
