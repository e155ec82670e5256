//! Fans a search out over worker threads and collects the outcome.

use crate::{
    config::{RunConfig, SearchOptions},
    error::{Error, Result},
    progress::{ProgressReporter, ProgressSink},
    result::{SearchOutcome, SearchResult},
    state::{Cancellation, SharedSearchState},
    worker::{DEFAULT_BATCH_SIZE, SearchWorker},
};
use std::{
    sync::{
        OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};
use tracing::{info, warn};

pub struct Coordinator {
    config: RunConfig,
    options: SearchOptions,
    batch_size: usize,
    progress: Option<Box<dyn ProgressSink>>,
    state: SharedSearchState,
    started: AtomicBool,
    start: OnceLock<Instant>,
}

impl Coordinator {
    pub fn new(config: RunConfig, options: SearchOptions) -> Self {
        Self {
            config,
            options,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: None,
            state: SharedSearchState::new(),
            started: AtomicBool::new(false),
            start: OnceLock::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Reports progress to `sink` if the options enable an interval.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Runs the search to completion on the calling thread.
    ///
    /// Returns once a worker finds a match or [`Coordinator::stop`] is called.
    /// Every worker is seeded before any thread starts, so a seeding failure
    /// leaves nothing running.
    pub fn run(&self) -> Result<SearchOutcome> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyRan);
        }
        if self.options.workers == 0 {
            return Err(Error::NoWorkers);
        }

        let workers = (0..self.options.workers)
            .map(|id| SearchWorker::new(id, &self.config, &self.state, self.batch_size))
            .collect::<Result<Vec<_>>>()?;

        let start = *self.start.get_or_init(Instant::now);
        info!(
            workers = self.options.workers,
            pattern = %self.config.pattern,
            track_best = self.config.track_best,
            "search started"
        );

        let panicked = thread::scope(|scope| {
            let handles = workers
                .into_iter()
                .map(|mut worker| {
                    let cancellation = self.state.cancellation();
                    scope.spawn(move || {
                        let _guard = CancelOnExit(cancellation);
                        worker.run();
                    })
                })
                .collect::<Vec<_>>();

            let reporter = match (&self.progress, self.options.progress_interval) {
                (Some(sink), Some(interval)) => {
                    let reporter = ProgressReporter::new(interval, &self.state, start, &**sink);
                    Some(scope.spawn(move || reporter.run()))
                }
                _ => None,
            };

            let mut panicked = false;
            for handle in handles {
                panicked |= handle.join().is_err();
            }

            if let Some(reporter) = reporter {
                panicked |= reporter.join().is_err();
            }
            panicked
        });

        if panicked {
            warn!("search aborted after a worker panic");
            return Err(Error::WorkerPanicked);
        }

        let elapsed = start.elapsed();
        let outcome = SearchOutcome {
            best: self
                .state
                .best()
                .map(|best| SearchResult::new(best, elapsed)),
            attempts: self.state.attempts(),
            elapsed,
        };
        info!(
            attempts = outcome.attempts,
            elapsed = ?outcome.elapsed,
            matched = outcome.is_match(),
            "search finished"
        );
        Ok(outcome)
    }

    /// Asks every worker to stop. Safe to call any number of times, from any
    /// thread, before, during or after [`Coordinator::run`].
    pub fn stop(&self) {
        if self.state.cancellation().cancel() {
            info!("stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state.cancellation().is_cancelled()
    }

    pub fn attempts(&self) -> u64 {
        self.state.attempts()
    }

    /// Snapshot of the best candidate so far, with the time elapsed since the
    /// search started.
    pub fn current_best(&self) -> Option<SearchResult> {
        let elapsed = self
            .start
            .get()
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.state
            .best()
            .map(|best| SearchResult::new(best, elapsed))
    }
}

/// Cancels the search when a worker thread ends, including by unwinding, so a
/// panicking worker cannot leave the others running.
struct CancelOnExit<'a>(&'a Cancellation);

impl Drop for CancelOnExit<'_> {
    fn drop(&mut self) {
        self.0.cancel();
    }
}
