//! Add command: validates raw input and stores one log entry.

use std::io::Write;

use aj_core::validate::{
    daily_score_from_input, exercise_from_input, routine_from_input, sleep_from_input,
};
use aj_core::{Journal, LogKind, LogStore, is_weekend};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::AddEntry;

/// Scores below this earn an encouraging note after the entry is saved.
const LOW_SCORE: i64 = 5;
const ENCOURAGEMENT: &str = "Don't give up! Tomorrow is a new day.";

pub fn run<W: Write, S: LogStore>(
    writer: &mut W,
    journal: &Journal<S>,
    entry: &AddEntry,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    let default_date = today.format("%Y-%m-%d").to_string();
    let date_or_today =
        |date: Option<&str>| date.map_or_else(|| default_date.clone(), str::to_string);

    let mut encourage = false;
    let (kind, id, date) = match entry {
        AddEntry::Routine {
            title,
            minutes,
            notes,
            date,
        } => {
            let log = routine_from_input(
                title,
                minutes,
                notes.as_deref(),
                &date_or_today(date.as_deref()),
                now,
            )
            .context("invalid routine entry")?;
            let id = journal.add_routine_log(&log)?;
            (LogKind::Routine, id, log.display_date)
        }
        AddEntry::Sleep {
            sleep,
            wake,
            description,
            date,
        } => {
            let log = sleep_from_input(
                sleep,
                wake,
                description.as_deref(),
                &date_or_today(date.as_deref()),
            )
            .context("invalid sleep entry")?;
            let id = journal.insert_sleep_log(&log)?;
            (LogKind::Sleep, id, log.display_date)
        }
        AddEntry::Exercise {
            activity,
            minutes,
            description,
            date,
        } => {
            let log = exercise_from_input(
                activity,
                minutes,
                description.as_deref(),
                &date_or_today(date.as_deref()),
            )
            .context("invalid exercise entry")?;
            let id = journal.add_exercise_log(&log)?;
            (LogKind::Exercise, id, log.display_date)
        }
        AddEntry::Score {
            office,
            personal,
            reflection,
            date,
        } => {
            let mode = journal.weekend_mode();
            let log = daily_score_from_input(
                office.as_deref(),
                personal,
                reflection.as_deref(),
                &date_or_today(date.as_deref()),
                mode,
            )
            .context("invalid score entry")?;
            let weekend = is_weekend(&log.display_date, mode);
            if office.is_some() && weekend {
                writeln!(
                    writer,
                    "{} is a weekend day ({}); office score recorded as 0.",
                    log.display_date,
                    mode.display_name()
                )?;
            }
            let id = journal.add_daily_score(&log)?;
            let low_office = !weekend && log.office_work_score < LOW_SCORE;
            encourage = low_office || log.personal_project_score < LOW_SCORE;
            (LogKind::DailyScore, id, log.display_date)
        }
    };

    writeln!(writer, "Added {kind} #{id} for {date}")?;
    if encourage {
        writeln!(writer, "{ENCOURAGEMENT}")?;
    }
    Ok(())
}
