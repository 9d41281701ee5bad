//! Settings command for the weekend convention.

use std::io::Write;

use aj_core::{Journal, LogStore, WeekendMode};
use anyhow::{Context, Result};

/// Shows the weekend mode, or persists a new one when `mode` is given.
pub fn weekend<W: Write, S: LogStore>(
    writer: &mut W,
    journal: &Journal<S>,
    mode: Option<WeekendMode>,
) -> Result<()> {
    match mode {
        Some(mode) => {
            journal
                .set_weekend_mode(mode)
                .context("failed to save weekend mode")?;
            writeln!(
                writer,
                "Weekend mode set to {mode} ({})",
                mode.display_name()
            )?;
        }
        None => {
            let mode = journal.weekend_mode();
            writeln!(writer, "Weekend mode: {mode} ({})", mode.display_name())?;
        }
    }
    Ok(())
}
