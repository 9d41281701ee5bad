//! Clock-time and duration arithmetic shared by the log kinds and the stopwatch.

use std::time::Duration;

/// One full day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

const HOUR_MS: i64 = 60 * 60 * 1000;
const MINUTE_MS: i64 = 60 * 1000;

/// Elapsed sleep between two clock times, wrapping past midnight.
///
/// Both arguments are milliseconds since midnight. When the wake time is
/// earlier on the clock than the sleep time, one day is added so the result
/// is the elapsed time across midnight.
pub const fn sleep_duration_ms(sleep_time_ms: i64, wake_time_ms: i64) -> i64 {
    (wake_time_ms - sleep_time_ms).rem_euclid(DAY_MS)
}

/// Milliseconds since midnight for an hour/minute pair.
pub const fn clock_time_ms(hours: i64, minutes: i64) -> i64 {
    hours * HOUR_MS + minutes * MINUTE_MS
}

/// Formats milliseconds since midnight as `HH:MM`.
pub fn format_clock_time(ms: i64) -> String {
    let ms = ms.rem_euclid(DAY_MS);
    format!("{:02}:{:02}", ms / HOUR_MS, (ms % HOUR_MS) / MINUTE_MS)
}

/// Formats stopwatch elapsed time as `HH:MM:SS`.
///
/// Hours are not wrapped at 24; longer sessions widen the hour field.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Human-readable duration for routine logs, e.g. `1h 5m 3s` or `12m 0s`.
pub fn format_duration(ms: i64) -> String {
    if ms < 0 {
        return "0m 0s".to_string();
    }
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / MINUTE_MS) % 60;
    let hours = ms / HOUR_MS;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

/// Converts a [`Duration`] to whole milliseconds, saturating at `i64::MAX`.
pub fn duration_to_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
