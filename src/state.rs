//! State shared between the coordinator, its workers and the progress reporter.

use crate::{pattern::is_better, result::BestCandidate};
use std::{
    sync::{
        Condvar, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

/// One-shot stop signal.
///
/// Workers poll [`Cancellation::is_cancelled`] between batches; the progress
/// reporter blocks on [`Cancellation::wait_timeout`]. The flag only ever goes
/// from `false` to `true`.
#[derive(Debug, Default)]
pub struct Cancellation {
    flag: AtomicBool,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Returns `true` for the single call that performed the transition.
    pub fn cancel(&self) -> bool {
        if self
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.cvar.notify_all();
        true
    }

    /// Sleeps for up to `timeout`, waking early on cancellation. Returns
    /// whether the signal has fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .cvar
            .wait_timeout_while(guard, timeout, |_| !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        self.is_cancelled()
    }
}

/// Result of offering a candidate to the best slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offer {
    Accepted,
    /// The slot already holds something at least as good.
    Rejected(BestCandidate),
}

#[derive(Debug, Default)]
pub struct SharedSearchState {
    attempts: AtomicU64,
    best: Mutex<Option<BestCandidate>>,
    cancellation: Cancellation,
}

impl SharedSearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one evaluated candidate and returns the new total.
    pub fn record_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn best(&self) -> Option<BestCandidate> {
        *self.lock_best()
    }

    /// Replaces the best candidate if `candidate` strictly outranks it.
    pub fn offer(&self, candidate: BestCandidate) -> Offer {
        let mut best = self.lock_best();
        match &*best {
            Some(current) if !outranks(&candidate, current) => Offer::Rejected(*current),
            _ => {
                *best = Some(candidate);
                Offer::Accepted
            }
        }
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    // The slot is a plain `Copy` record, so a poisoned lock still holds a
    // consistent value.
    fn lock_best(&self) -> MutexGuard<'_, Option<BestCandidate>> {
        self.best.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Matches rank above non-matches; within a kind the lower address wins.
fn outranks(candidate: &BestCandidate, current: &BestCandidate) -> bool {
    match (candidate.matched, current.matched) {
        (true, false) => true,
        (false, true) => false,
        _ => is_better(&candidate.address, Some(&current.address)),
    }
}
