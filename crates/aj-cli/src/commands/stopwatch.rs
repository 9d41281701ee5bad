//! Interactive stopwatch driven by line commands on standard input.
//!
//! Each published `HH:MM:SS` value is printed on its own line while commands
//! are read concurrently. `reset` records the run as a routine log; `quit` or
//! end of input leaves without recording.

use std::io::Write;
use std::time::Duration;

use aj_core::time::{duration_to_ms, format_duration};
use aj_core::{Stopwatch, StopwatchState};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "Commands: start, pause, reset, status, quit";

pub async fn run<R, W>(input: R, writer: &mut W, stopwatch: &Stopwatch) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut display = stopwatch.subscribe();

    writeln!(writer, "{HELP}")?;
    writeln!(writer, "{}", stopwatch.formatted())?;
    writer.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stopwatch command")? else {
                    break;
                };
                if !handle_command(line.trim(), writer, stopwatch)? {
                    break;
                }
            }
            changed = display.changed() => {
                if changed.is_err() {
                    break;
                }
                let formatted = display.borrow_and_update().clone();
                writeln!(writer, "{formatted}")?;
            }
        }
        writer.flush()?;
    }

    let elapsed = stopwatch.elapsed();
    if elapsed > Duration::ZERO {
        writeln!(
            writer,
            "Left without recording {}.",
            format_duration(duration_to_ms(elapsed))
        )?;
    }
    Ok(())
}

/// Applies one command. Returns `false` when the session should end.
fn handle_command<W: Write>(command: &str, writer: &mut W, stopwatch: &Stopwatch) -> Result<bool> {
    match command {
        "" => {}
        "start" => stopwatch.start(),
        "pause" => stopwatch.pause(),
        "reset" => {
            let elapsed = stopwatch.reset();
            writeln!(
                writer,
                "Recorded {}.",
                format_duration(duration_to_ms(elapsed))
            )?;
        }
        "status" => {
            let state = match stopwatch.state() {
                StopwatchState::Idle => "idle",
                StopwatchState::Running => "running",
                StopwatchState::Paused => "paused",
            };
            writeln!(writer, "{state} {}", stopwatch.formatted())?;
        }
        "quit" | "exit" => return Ok(false),
        other => writeln!(writer, "Unknown command '{other}'. {HELP}")?,
    }
    Ok(true)
}
