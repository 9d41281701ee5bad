//! Weekend-mode setting and the weekend predicate used by score entry.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::store::{LogStore, StorageError};

/// Settings key under which the weekend mode is persisted.
pub const WEEKEND_MODE_KEY: &str = "weekendMode";

/// Which two weekdays count as the weekend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum WeekendMode {
    FriSat,
    #[default]
    SatSun,
}

impl WeekendMode {
    /// The value persisted in the settings table.
    pub const fn id(self) -> &'static str {
        match self {
            Self::FriSat => "FriSat",
            Self::SatSun => "SatSun",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::FriSat => "Friday & Saturday",
            Self::SatSun => "Saturday & Sunday",
        }
    }

    /// Interprets a stored value, falling back to the default for anything
    /// unrecognised.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }

    const fn weekend_days(self) -> [Weekday; 2] {
        match self {
            Self::FriSat => [Weekday::Fri, Weekday::Sat],
            Self::SatSun => [Weekday::Sat, Weekday::Sun],
        }
    }
}

impl fmt::Display for WeekendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for WeekendMode {
    type Err = UnknownWeekendMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FriSat" => Ok(Self::FriSat),
            "SatSun" => Ok(Self::SatSun),
            _ => Err(UnknownWeekendMode(s.to_string())),
        }
    }
}

/// Error type for unknown weekend-mode strings.
#[derive(Debug, Clone)]
pub struct UnknownWeekendMode(String);

impl fmt::Display for UnknownWeekendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown weekend mode: {} (expected FriSat or SatSun)",
            self.0
        )
    }
}

impl std::error::Error for UnknownWeekendMode {}

/// Returns true when `date` (ISO `YYYY-MM-DD`) falls on a weekend day.
///
/// Malformed dates are never a weekend.
pub fn is_weekend(date: &str, mode: WeekendMode) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .is_ok_and(|date| mode.weekend_days().contains(&date.weekday()))
}

/// Reads the persisted weekend mode, defaulting to [`WeekendMode::SatSun`].
pub fn resolve_weekend_mode<S: LogStore + ?Sized>(store: &S) -> Result<WeekendMode, StorageError> {
    let mode = store
        .get_setting(WEEKEND_MODE_KEY)?
        .map_or_else(WeekendMode::default, |value| WeekendMode::from_id(&value));
    Ok(mode)
}

pub fn save_weekend_mode<S: LogStore + ?Sized>(
    store: &mut S,
    mode: WeekendMode,
) -> Result<(), StorageError> {
    store.set_setting(WEEKEND_MODE_KEY, mode.id())
}
