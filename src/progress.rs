//! Periodic, read-only progress reporting.

use crate::{
    result::{SearchResult, rate},
    state::SharedSearchState,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fmt,
    time::{Duration, Instant},
};
use tracing::info;

#[derive(Clone, Debug)]
pub struct ProgressSnapshot {
    pub attempts: u64,
    pub elapsed: Duration,
    pub best: Option<SearchResult>,
}

impl ProgressSnapshot {
    pub fn rate(&self) -> f64 {
        rate(self.attempts, self.elapsed)
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {} attempts, {:.2} hashes/sec, ",
            self.attempts,
            self.rate()
        )?;
        match &self.best {
            Some(best) => write!(f, "Best: {best}"),
            None => f.write_str("No match yet"),
        }
    }
}

/// Where progress lines end up.
pub trait ProgressSink: Send + Sync {
    fn report(&self, snapshot: &ProgressSnapshot);

    /// Called once when the search is over.
    fn finish(&self) {}
}

/// Emits each snapshot as an `info` log line.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, snapshot: &ProgressSnapshot) {
        info!("{snapshot}");
    }
}

/// Shows the latest snapshot on a terminal spinner.
pub struct SpinnerSink {
    bar: ProgressBar,
}

impl SpinnerSink {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message("Mining...");
        Self { bar }
    }
}

impl Default for SpinnerSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for SpinnerSink {
    fn report(&self, snapshot: &ProgressSnapshot) {
        self.bar.set_message(snapshot.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub struct ProgressReporter<'a> {
    interval: Duration,
    state: &'a SharedSearchState,
    start: Instant,
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(
        interval: Duration,
        state: &'a SharedSearchState,
        start: Instant,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            interval,
            state,
            start,
            sink,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed = self.start.elapsed();
        ProgressSnapshot {
            attempts: self.state.attempts(),
            elapsed,
            best: self
                .state
                .best()
                .map(|best| SearchResult::new(best, elapsed)),
        }
    }

    /// Reports every interval until the search is cancelled.
    pub fn run(&self) {
        while !self.state.cancellation().wait_timeout(self.interval) {
            self.sink.report(&self.snapshot());
        }
        self.sink.finish();
    }
}
