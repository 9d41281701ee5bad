//! List command: the journal feed grouped by date, newest first.

use std::fmt::Write as _;
use std::io::Write;

use aj_core::time::{format_clock_time, format_duration};
use aj_core::{DateGroup, Journal, LogEntry, LogStore, group_by_date};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonGroup<'a> {
    date: &'a str,
    entries: &'a [&'a LogEntry],
}

pub fn run<W: Write, S: LogStore>(writer: &mut W, journal: &Journal<S>, json: bool) -> Result<()> {
    // A failed refresh leaves the last published feed in place.
    if let Err(err) = journal.refresh() {
        tracing::warn!(error = %err, "journal refresh failed");
        writeln!(
            writer,
            "Could not refresh journal ({err}); showing the last loaded entries."
        )?;
    }

    let feed = journal.feed();
    let groups = group_by_date(&feed);

    if json {
        let groups: Vec<JsonGroup<'_>> = groups
            .iter()
            .map(|group| JsonGroup {
                date: group.date,
                entries: &group.entries,
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&groups)?)?;
    } else {
        write!(writer, "{}", format_groups(&groups))?;
    }
    Ok(())
}

/// Format grouped entries for human-readable output.
pub fn format_groups(groups: &[DateGroup<'_>]) -> String {
    let mut output = String::new();
    if groups.is_empty() {
        output.push_str("No journal entries yet.\n");
        return output;
    }
    for group in groups {
        let _ = writeln!(output, "{}", group.date);
        for entry in &group.entries {
            let _ = writeln!(output, "  {}", format_entry(entry));
        }
    }
    output
}

fn format_entry(entry: &LogEntry) -> String {
    let (label, detail, note) = match entry {
        LogEntry::Routine(log) => (
            "routine",
            format!("{} ({})", log.title, format_duration(log.duration_ms)),
            log.notes.as_deref(),
        ),
        LogEntry::Sleep(log) => (
            "sleep",
            format!(
                "{} -> {} ({})",
                format_clock_time(log.sleep_time_ms),
                format_clock_time(log.wake_time_ms),
                format_duration(log.duration_ms)
            ),
            log.description.as_deref(),
        ),
        LogEntry::Exercise(log) => (
            "exercise",
            format!("{}, {} min", log.activity_type, log.duration_minutes),
            log.description.as_deref(),
        ),
        LogEntry::DailyScore(log) => (
            "score",
            format!(
                "office {}/10, personal {}/10",
                log.office_work_score, log.personal_project_score
            ),
            log.reflection.as_deref(),
        ),
    };
    let label = format!("{label} #{}", entry.id());
    match note {
        Some(note) => format!("{label:<12}  {detail} - {note}"),
        None => format!("{label:<12}  {detail}"),
    }
}
