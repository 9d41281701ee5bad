//! Storage layer for the activity journal.
//!
//! Provides persistence for the four log kinds and the settings table using
//! `rusqlite`, exposed to the rest of the workspace through
//! [`aj_core::LogStore`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. [`aj_core::Journal`] provides
//! that synchronization by owning the database behind a mutex.
//!
//! # Schema
//!
//! Each log kind lives in its own table with an `INTEGER PRIMARY KEY AUTOINCREMENT`
//! id, so ids are unique within a kind but collide freely across kinds.
//!
//! `display_date` is stored as TEXT in zero-padded ISO format (`2024-01-15`) so
//! lexicographic ordering matches calendar ordering. Sleep clock times are
//! milliseconds since local midnight; routine start times are epoch milliseconds.

use std::path::Path;

use aj_core::{
    DailyScoreLog, ExerciseLog, LogId, LogKind, LogStore, NewDailyScore, NewExerciseLog,
    NewRoutineLog, NewSleepLog, RoutineLog, SleepLog, StorageError,
};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(code, message))
                if matches!(
                    code.code,
                    ErrorCode::CannotOpen | ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                Self::Unavailable(message.unwrap_or_else(|| code.to_string()))
            }
            DbError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(message)))
                if message.starts_with("no such table") =>
            {
                Self::SchemaMissing(message)
            }
            other => Self::Backend(Box::new(other)),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS routine_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                start_time INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL CHECK (duration_ms >= 0),
                notes TEXT,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_routine_log_date ON routine_log(display_date);

            -- sleep_time_ms / wake_time_ms: milliseconds since local midnight
            -- duration_ms: wake - sleep, plus one day when sleep is later on the clock
            CREATE TABLE IF NOT EXISTS sleep_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sleep_time_ms INTEGER NOT NULL,
                wake_time_ms INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL CHECK (duration_ms >= 0),
                description TEXT,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sleep_log_date ON sleep_log(display_date);

            CREATE TABLE IF NOT EXISTS exercise_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity_type TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                description TEXT,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exercise_log_date ON exercise_log(display_date);

            CREATE TABLE IF NOT EXISTS daily_score (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                office_work_score INTEGER NOT NULL CHECK (office_work_score BETWEEN 0 AND 10),
                personal_project_score INTEGER NOT NULL CHECK (personal_project_score BETWEEN 0 AND 10),
                reflection TEXT,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_daily_score_date ON daily_score(display_date);

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    pub fn insert_routine_log(&mut self, log: &NewRoutineLog) -> Result<LogId, DbError> {
        self.conn.execute(
            "
            INSERT INTO routine_log (title, start_time, duration_ms, notes, display_date)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                log.title,
                log.start_time,
                log.duration_ms,
                log.notes,
                log.display_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_sleep_log(&mut self, log: &NewSleepLog) -> Result<LogId, DbError> {
        self.conn.execute(
            "
            INSERT INTO sleep_log (sleep_time_ms, wake_time_ms, duration_ms, description, display_date)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                log.sleep_time_ms,
                log.wake_time_ms,
                log.duration_ms,
                log.description,
                log.display_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_exercise_log(&mut self, log: &NewExerciseLog) -> Result<LogId, DbError> {
        self.conn.execute(
            "
            INSERT INTO exercise_log (activity_type, duration_minutes, description, display_date)
            VALUES (?, ?, ?, ?)
            ",
            params![
                log.activity_type,
                log.duration_minutes,
                log.description,
                log.display_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_daily_score(&mut self, log: &NewDailyScore) -> Result<LogId, DbError> {
        self.conn.execute(
            "
            INSERT INTO daily_score (office_work_score, personal_project_score, reflection, display_date)
            VALUES (?, ?, ?, ?)
            ",
            params![
                log.office_work_score,
                log.personal_project_score,
                log.reflection,
                log.display_date,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists all routine logs in insertion order.
    pub fn list_routine_logs(&self) -> Result<Vec<RoutineLog>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, title, start_time, duration_ms, notes, display_date
            FROM routine_log
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RoutineLog {
                id: row.get(0)?,
                title: row.get(1)?,
                start_time: row.get(2)?,
                duration_ms: row.get(3)?,
                notes: row.get(4)?,
                display_date: row.get(5)?,
            })
        })?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Lists all sleep logs in insertion order.
    pub fn list_sleep_logs(&self) -> Result<Vec<SleepLog>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, sleep_time_ms, wake_time_ms, duration_ms, description, display_date
            FROM sleep_log
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SleepLog {
                id: row.get(0)?,
                sleep_time_ms: row.get(1)?,
                wake_time_ms: row.get(2)?,
                duration_ms: row.get(3)?,
                description: row.get(4)?,
                display_date: row.get(5)?,
            })
        })?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Lists all exercise logs in insertion order.
    pub fn list_exercise_logs(&self) -> Result<Vec<ExerciseLog>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, activity_type, duration_minutes, description, display_date
            FROM exercise_log
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ExerciseLog {
                id: row.get(0)?,
                activity_type: row.get(1)?,
                duration_minutes: row.get(2)?,
                description: row.get(3)?,
                display_date: row.get(4)?,
            })
        })?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Lists all daily scores in insertion order.
    pub fn list_daily_scores(&self) -> Result<Vec<DailyScoreLog>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, office_work_score, personal_project_score, reflection, display_date
            FROM daily_score
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DailyScoreLog {
                id: row.get(0)?,
                office_work_score: row.get(1)?,
                personal_project_score: row.get(2)?,
                reflection: row.get(3)?,
                display_date: row.get(4)?,
            })
        })?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }

    /// Deletes one log by kind and id. Missing ids are ignored.
    pub fn delete_log(&mut self, kind: LogKind, id: LogId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?", table_name(kind)), [id])?;
        tracing::debug!(%kind, id, deleted, "delete log");
        Ok(())
    }

    /// Counts stored logs of one kind.
    pub fn count_logs(&self, kind: LogKind) -> Result<i64, DbError> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table_name(kind)),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Stores a setting, replacing any previous value under the same key.
    pub fn set_setting(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }
}

const fn table_name(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Routine => "routine_log",
        LogKind::Sleep => "sleep_log",
        LogKind::Exercise => "exercise_log",
        LogKind::DailyScore => "daily_score",
    }
}

impl LogStore for Database {
    fn insert_routine_log(&mut self, log: &NewRoutineLog) -> Result<LogId, StorageError> {
        Ok(Self::insert_routine_log(self, log)?)
    }

    fn insert_sleep_log(&mut self, log: &NewSleepLog) -> Result<LogId, StorageError> {
        Ok(Self::insert_sleep_log(self, log)?)
    }

    fn insert_exercise_log(&mut self, log: &NewExerciseLog) -> Result<LogId, StorageError> {
        Ok(Self::insert_exercise_log(self, log)?)
    }

    fn insert_daily_score(&mut self, log: &NewDailyScore) -> Result<LogId, StorageError> {
        Ok(Self::insert_daily_score(self, log)?)
    }

    fn routine_logs(&self) -> Result<Vec<RoutineLog>, StorageError> {
        Ok(self.list_routine_logs()?)
    }

    fn sleep_logs(&self) -> Result<Vec<SleepLog>, StorageError> {
        Ok(self.list_sleep_logs()?)
    }

    fn exercise_logs(&self) -> Result<Vec<ExerciseLog>, StorageError> {
        Ok(self.list_exercise_logs()?)
    }

    fn daily_scores(&self) -> Result<Vec<DailyScoreLog>, StorageError> {
        Ok(self.list_daily_scores()?)
    }

    fn delete_routine_log(&mut self, id: LogId) -> Result<(), StorageError> {
        Ok(self.delete_log(LogKind::Routine, id)?)
    }

    fn delete_sleep_log(&mut self, id: LogId) -> Result<(), StorageError> {
        Ok(self.delete_log(LogKind::Sleep, id)?)
    }

    fn delete_exercise_log(&mut self, id: LogId) -> Result<(), StorageError> {
        Ok(self.delete_log(LogKind::Exercise, id)?)
    }

    fn delete_daily_score(&mut self, id: LogId) -> Result<(), StorageError> {
        Ok(self.delete_log(LogKind::DailyScore, id)?)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(Self::get_setting(self, key)?)
    }

    fn set_setting(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(Self::set_setting(self, key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use aj_core::{WeekendMode, resolve_weekend_mode};

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "routine_log"),
            vec![
                "id",
                "title",
                "start_time",
                "duration_ms",
                "notes",
                "display_date"
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "sleep_log"),
            vec![
                "id",
                "sleep_time_ms",
                "wake_time_ms",
                "duration_ms",
                "description",
                "display_date",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "exercise_log"),
            vec![
                "id",
                "activity_type",
                "duration_minutes",
                "description",
                "display_date"
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "daily_score"),
            vec![
                "id",
                "office_work_score",
                "personal_project_score",
                "reflection",
                "display_date",
            ]
        );
        assert_eq!(table_columns(&db.conn, "settings"), vec!["key", "value"]);

        for (table, index) in [
            ("routine_log", "idx_routine_log_date"),
            ("sleep_log", "idx_sleep_log_date"),
            ("exercise_log", "idx_exercise_log_date"),
            ("daily_score", "idx_daily_score_date"),
        ] {
            assert!(
                index_names(&db.conn, table).contains(index),
                "missing {index} on {table}"
            );
        }
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    fn routine(title: &str, date: &str) -> NewRoutineLog {
        NewRoutineLog {
            title: title.to_string(),
            start_time: 1_735_732_800_000,
            duration_ms: 900_000,
            notes: Some("before work".to_string()),
            display_date: date.to_string(),
        }
    }

    #[test]
    fn init_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_routine_log(&routine("Stretch", "2025-01-01"))
            .unwrap();
        db.init().unwrap();
        assert_eq!(db.count_logs(LogKind::Routine).unwrap(), 1);
    }

    #[test]
    fn insert_and_list_round_trip_every_kind() {
        let mut db = Database::open_in_memory().unwrap();

        let routine_id = db
            .insert_routine_log(&routine("Stretch", "2025-01-01"))
            .unwrap();
        let sleep_id = db
            .insert_sleep_log(&NewSleepLog::new(
                82_800_000,
                25_200_000,
                Some("woke once".to_string()),
                "2025-01-02",
            ))
            .unwrap();
        let exercise_id = db
            .insert_exercise_log(&NewExerciseLog {
                activity_type: "Cycling".to_string(),
                duration_minutes: 40,
                description: None,
                display_date: "2025-01-02".to_string(),
            })
            .unwrap();
        let score_id = db
            .insert_daily_score(&NewDailyScore {
                office_work_score: 7,
                personal_project_score: 5,
                reflection: Some("steady".to_string()),
                display_date: "2025-01-03".to_string(),
            })
            .unwrap();

        assert_eq!(
            db.list_routine_logs().unwrap(),
            vec![RoutineLog {
                id: routine_id,
                title: "Stretch".to_string(),
                start_time: 1_735_732_800_000,
                duration_ms: 900_000,
                notes: Some("before work".to_string()),
                display_date: "2025-01-01".to_string(),
            }]
        );
        assert_eq!(
            db.list_sleep_logs().unwrap(),
            vec![SleepLog {
                id: sleep_id,
                sleep_time_ms: 82_800_000,
                wake_time_ms: 25_200_000,
                duration_ms: 28_800_000,
                description: Some("woke once".to_string()),
                display_date: "2025-01-02".to_string(),
            }]
        );
        assert_eq!(
            db.list_exercise_logs().unwrap(),
            vec![ExerciseLog {
                id: exercise_id,
                activity_type: "Cycling".to_string(),
                duration_minutes: 40,
                description: None,
                display_date: "2025-01-02".to_string(),
            }]
        );
        assert_eq!(
            db.list_daily_scores().unwrap(),
            vec![DailyScoreLog {
                id: score_id,
                office_work_score: 7,
                personal_project_score: 5,
                reflection: Some("steady".to_string()),
                display_date: "2025-01-03".to_string(),
            }]
        );
    }

    #[test]
    fn ids_are_scoped_per_kind() {
        let mut db = Database::open_in_memory().unwrap();
        let routine_id = db
            .insert_routine_log(&routine("Stretch", "2025-01-01"))
            .unwrap();
        let exercise_id = db
            .insert_exercise_log(&NewExerciseLog {
                activity_type: "Walk".to_string(),
                duration_minutes: 20,
                description: None,
                display_date: "2025-01-01".to_string(),
            })
            .unwrap();
        assert_eq!(routine_id, 1);
        assert_eq!(exercise_id, 1);

        db.delete_log(LogKind::Exercise, exercise_id).unwrap();
        assert_eq!(db.count_logs(LogKind::Exercise).unwrap(), 0);
        assert_eq!(db.count_logs(LogKind::Routine).unwrap(), 1);
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_routine_log(&routine("Stretch", "2025-01-01"))
            .unwrap();
        db.delete_log(LogKind::Routine, 42).unwrap();
        assert_eq!(db.count_logs(LogKind::Routine).unwrap(), 1);
    }

    #[test]
    fn set_setting_replaces_previous_value() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("weekendMode").unwrap(), None);

        db.set_setting("weekendMode", "FriSat").unwrap();
        db.set_setting("weekendMode", "SatSun").unwrap();
        assert_eq!(db.get_setting("weekendMode").unwrap().as_deref(), Some("SatSun"));

        let rows: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn weekend_mode_resolves_through_store() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(resolve_weekend_mode(&db).unwrap(), WeekendMode::SatSun);

        db.set_setting(aj_core::WEEKEND_MODE_KEY, "FriSat").unwrap();
        assert_eq!(resolve_weekend_mode(&db).unwrap(), WeekendMode::FriSat);

        db.set_setting(aj_core::WEEKEND_MODE_KEY, "garbage").unwrap();
        assert_eq!(resolve_weekend_mode(&db).unwrap(), WeekendMode::SatSun);
    }

    #[test]
    fn out_of_range_score_is_rejected_by_schema() {
        let mut db = Database::open_in_memory().unwrap();
        let result = db.insert_daily_score(&NewDailyScore {
            office_work_score: 11,
            personal_project_score: 5,
            reflection: None,
            display_date: "2025-01-03".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn dropped_table_surfaces_as_schema_missing() {
        let db = Database::open_in_memory().unwrap();
        db.conn.execute_batch("DROP TABLE sleep_log;").unwrap();

        let err = LogStore::sleep_logs(&db).unwrap_err();
        assert!(
            matches!(err, StorageError::SchemaMissing(ref message) if message.contains("sleep_log")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn reopening_on_disk_database_keeps_rows() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("aj.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.insert_routine_log(&routine("Journal", "2025-01-05"))
                .unwrap();
            db.set_setting("weekendMode", "FriSat").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_routine_logs().unwrap()[0].title, "Journal");
        assert_eq!(db.get_setting("weekendMode").unwrap().as_deref(), Some("FriSat"));
    }
}
