//! Command-line argument definitions.

use std::path::PathBuf;

use aj_core::{LogId, LogKind, WeekendMode};
use clap::{Parser, Subcommand};

/// Personal activity journal.
///
/// Records routines, sleep, exercise, and daily scores in a local database,
/// with a stopwatch for timing routines as they happen.
#[derive(Debug, Parser)]
#[command(name = "aj", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a log entry.
    Add {
        #[command(subcommand)]
        entry: AddEntry,
    },

    /// Show the journal grouped by date, newest first.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete one log entry.
    Delete {
        /// Kind of log: routine, sleep, exercise, or score.
        kind: LogKind,

        /// Id of the log within its kind.
        id: LogId,
    },

    /// Show or change settings.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Run an interactive stopwatch that records a routine on reset.
    ///
    /// Reads `start`, `pause`, `reset`, and `quit` from standard input.
    Stopwatch {
        /// Title for the recorded routine.
        #[arg(long)]
        title: Option<String>,
    },

    /// Query active calories for a date from the configured provider.
    Calories {
        /// Date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show database location and entry counts.
    Status,
}

/// Log kinds that can be added.
#[derive(Debug, Subcommand)]
pub enum AddEntry {
    /// A timed routine.
    Routine {
        #[arg(long)]
        title: String,

        /// Duration in whole minutes.
        #[arg(long)]
        minutes: String,

        #[arg(long)]
        notes: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// A night of sleep.
    Sleep {
        /// Time fell asleep (HH:MM).
        #[arg(long)]
        sleep: String,

        /// Time woke up (HH:MM).
        #[arg(long)]
        wake: String,

        #[arg(long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// An exercise session.
    Exercise {
        /// Activity type (e.g., Running).
        #[arg(long)]
        activity: String,

        /// Duration in whole minutes.
        #[arg(long)]
        minutes: String,

        #[arg(long)]
        description: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Daily office and personal project scores (0-10).
    Score {
        /// Office work score. Ignored on weekend days.
        #[arg(long)]
        office: Option<String>,

        /// Personal project score.
        #[arg(long)]
        personal: String,

        #[arg(long)]
        reflection: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

/// Settings that can be shown or changed.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show or set which days count as the weekend.
    Weekend {
        /// FriSat or SatSun. Shows the current mode when omitted.
        mode: Option<WeekendMode>,
    },
}
