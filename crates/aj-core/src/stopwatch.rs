//! Resumable elapsed-time stopwatch that commits finished runs as routine logs.
//!
//! Elapsed time is always computed as "now minus baseline", never by counting
//! ticks, so scheduling jitter in the one-second tick never accumulates. The
//! baseline is shifted back by whatever was accumulated before a pause, which
//! is what lets [`Stopwatch::start`] resume instead of restarting.
//!
//! At most one tick task runs per stopwatch. Pausing or resetting aborts it
//! and bumps a generation counter under the state lock; a tick that was
//! already in flight sees the stale generation and exits without writing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::journal::Journal;
use crate::log_entry::{LogId, NewRoutineLog};
use crate::store::{LogStore, StorageError};
use crate::time::{duration_to_ms, format_elapsed};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Title used for committed runs when none is configured.
pub const DEFAULT_TITLE: &str = "Stopwatch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
}

/// Destination for completed stopwatch runs.
pub trait RoutineRecorder: Send + Sync {
    fn record_routine(&self, log: &NewRoutineLog) -> Result<LogId, StorageError>;
}

impl<S: LogStore + Send> RoutineRecorder for Journal<S> {
    fn record_routine(&self, log: &NewRoutineLog) -> Result<LogId, StorageError> {
        self.add_routine_log(log)
    }
}

#[derive(Debug)]
struct Inner {
    state: StopwatchState,
    /// Elapsed time frozen at the last pause.
    accumulated: Duration,
    /// `now - accumulated` at the last start; only set while running.
    baseline: Option<Instant>,
    generation: u64,
    ticker: Option<JoinHandle<()>>,
}

impl Inner {
    fn elapsed(&self) -> Duration {
        match (self.state, self.baseline) {
            (StopwatchState::Running, Some(baseline)) => {
                Instant::now().saturating_duration_since(baseline)
            }
            _ => self.accumulated,
        }
    }

    fn stop_ticker(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    display: watch::Sender<String>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Start/pause/reset stopwatch publishing `HH:MM:SS` once per second.
pub struct Stopwatch {
    shared: Arc<Shared>,
    recorder: Arc<dyn RoutineRecorder>,
    title: String,
}

impl Stopwatch {
    pub fn new(recorder: Arc<dyn RoutineRecorder>) -> Self {
        Self::with_title(recorder, DEFAULT_TITLE)
    }

    /// Creates a stopwatch whose committed runs carry `title`.
    pub fn with_title(recorder: Arc<dyn RoutineRecorder>, title: impl Into<String>) -> Self {
        let (display, _) = watch::channel(format_elapsed(Duration::ZERO));
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: StopwatchState::Idle,
                    accumulated: Duration::ZERO,
                    baseline: None,
                    generation: 0,
                    ticker: None,
                }),
                display,
            }),
            recorder,
            title: title.into(),
        }
    }

    pub fn state(&self) -> StopwatchState {
        self.shared.lock().state
    }

    /// Accumulated elapsed time, including the current run if running.
    pub fn elapsed(&self) -> Duration {
        self.shared.lock().elapsed()
    }

    /// Last published `HH:MM:SS` value.
    pub fn formatted(&self) -> String {
        self.shared.display.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.shared.display.subscribe()
    }

    /// Starts or resumes the stopwatch. Does nothing if already running.
    ///
    /// The tick task needs a Tokio runtime; called outside one, the stopwatch
    /// logs a warning and stays in its current state.
    pub fn start(&self) {
        let mut inner = self.shared.lock();
        if inner.state == StopwatchState::Running {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("stopwatch start ignored outside a tokio runtime");
            return;
        };
        let now = Instant::now();
        let baseline = now.checked_sub(inner.accumulated).unwrap_or(now);
        inner.baseline = Some(baseline);
        inner.state = StopwatchState::Running;
        inner.generation = inner.generation.wrapping_add(1);
        let generation = inner.generation;
        inner.ticker = Some(runtime.spawn(tick_loop(Arc::clone(&self.shared), generation)));
        tracing::info!(resumed_from = ?inner.accumulated, "stopwatch started");
    }

    /// Pauses the stopwatch, freezing the accumulated elapsed time.
    pub fn pause(&self) {
        let mut inner = self.shared.lock();
        if inner.state != StopwatchState::Running {
            return;
        }
        inner.accumulated = inner.elapsed();
        inner.baseline = None;
        inner.state = StopwatchState::Paused;
        inner.stop_ticker();
        self.shared
            .display
            .send_replace(format_elapsed(inner.accumulated));
        tracing::info!(elapsed = ?inner.accumulated, "stopwatch paused");
    }

    /// Stops the stopwatch, commits the accumulated time as a routine log and
    /// zeroes the display.
    ///
    /// The commit is fire-and-forget: a storage failure is logged rather than
    /// returned. Returns the committed elapsed time.
    pub fn reset(&self) -> Duration {
        let elapsed = {
            let mut inner = self.shared.lock();
            let elapsed = inner.elapsed();
            inner.stop_ticker();
            inner.accumulated = Duration::ZERO;
            inner.baseline = None;
            inner.state = StopwatchState::Idle;
            self.shared
                .display
                .send_replace(format_elapsed(Duration::ZERO));
            elapsed
        };
        tracing::info!(?elapsed, "stopwatch reset");

        let log = self.completed_run(elapsed);
        if let Err(err) = self.recorder.record_routine(&log) {
            tracing::warn!(error = %err, "failed to record stopwatch run");
        }
        elapsed
    }

    fn completed_run(&self, elapsed: Duration) -> NewRoutineLog {
        let duration_ms = duration_to_ms(elapsed);
        NewRoutineLog {
            title: self.title.clone(),
            start_time: Utc::now().timestamp_millis(),
            duration_ms,
            notes: None,
            display_date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
        }
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        self.shared.lock().stop_ticker();
    }
}

async fn tick_loop(shared: Arc<Shared>, generation: u64) {
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let inner = shared.lock();
        if inner.generation != generation || inner.state != StopwatchState::Running {
            break;
        }
        shared.display.send_replace(format_elapsed(inner.elapsed()));
    }
}
