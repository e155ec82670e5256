//! The per-thread search loop.

use crate::{
    address::{Address, Create2Input, Salt, checksum_encode},
    config::RunConfig,
    error::Result,
    pattern::is_better,
    result::BestCandidate,
    state::{Offer, SharedSearchState},
};
use rand::{RngCore, SeedableRng, rngs::OsRng, rngs::SmallRng};
use tracing::{debug, info};

/// Attempts between two cancellation checks.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Supplies the salt for each attempt.
pub trait SaltSource {
    fn fill_salt(&mut self, salt: &mut Salt);
}

/// Fast, non-cryptographic salt stream.
///
/// Only the seed comes from the operating system. The stream is allowed to be
/// predictable: the search needs coverage, not secrecy, and a secure generator
/// per attempt would cost most of the hash rate.
pub struct SaltRng(SmallRng);

impl SaltRng {
    /// Seeds from the OS. Fails rather than fall back to a fixed seed, since
    /// identically seeded workers would search the same salts.
    pub fn from_os() -> Result<Self> {
        Ok(Self(SmallRng::from_rng(OsRng)?))
    }
}

impl SaltSource for SaltRng {
    fn fill_salt(&mut self, salt: &mut Salt) {
        self.0.fill_bytes(salt);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopped,
}

pub struct SearchWorker<'a, S = SaltRng> {
    id: usize,
    config: &'a RunConfig,
    state: &'a SharedSearchState,
    salts: S,
    input: Create2Input,
    salt: Salt,
    // Last best address this worker knows of; avoids locking for candidates
    // that cannot win.
    local_best: Option<Address>,
    attempts: u64,
    batch_size: usize,
}

impl<'a> SearchWorker<'a, SaltRng> {
    pub fn new(
        id: usize,
        config: &'a RunConfig,
        state: &'a SharedSearchState,
        batch_size: usize,
    ) -> Result<Self> {
        Ok(Self::with_salts(
            id,
            config,
            state,
            SaltRng::from_os()?,
            batch_size,
        ))
    }
}

impl<'a, S> SearchWorker<'a, S>
where
    S: SaltSource,
{
    pub fn with_salts(
        id: usize,
        config: &'a RunConfig,
        state: &'a SharedSearchState,
        salts: S,
        batch_size: usize,
    ) -> Self {
        Self {
            id,
            config,
            state,
            salts,
            input: Create2Input::new(&config.create2_prefix, &config.init_code_hash),
            salt: [0; 32],
            local_best: None,
            attempts: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Attempts made by this worker.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Runs batches until this worker finds a match or the search is cancelled.
    pub fn run(&mut self) {
        debug!(worker = self.id, "worker started");
        while !self.state.cancellation().is_cancelled() {
            if self.run_batch() == WorkerState::Stopped {
                break;
            }
        }
        debug!(worker = self.id, attempts = self.attempts, "worker stopped");
    }

    /// Runs one batch of attempts, then checks for cancellation.
    pub fn run_batch(&mut self) -> WorkerState {
        for _ in 0..self.batch_size {
            if self.attempt() == WorkerState::Stopped {
                return WorkerState::Stopped;
            }
        }

        if self.state.cancellation().is_cancelled() {
            WorkerState::Stopped
        } else {
            WorkerState::Running
        }
    }

    fn attempt(&mut self) -> WorkerState {
        self.salts.fill_salt(&mut self.salt);
        self.input.set_salt(&self.salt);
        let address = self.input.address();

        self.attempts += 1;
        let attempts = self.state.record_attempt();

        if self.config.pattern.matches(&address) {
            self.accept_match(address, attempts);
            return WorkerState::Stopped;
        }

        if self.config.track_best && is_better(&address, self.local_best.as_ref()) {
            self.track(address, attempts);
        }
        WorkerState::Running
    }

    fn accept_match(&mut self, address: Address, attempts: u64) {
        let candidate = BestCandidate {
            salt: self.salt,
            address,
            attempts,
            matched: true,
        };

        match self.state.offer(candidate) {
            Offer::Accepted => info!(
                worker = self.id,
                address = %checksum_encode(&address),
                attempts,
                "found matching address"
            ),
            Offer::Rejected(best) => debug!(
                worker = self.id,
                best = %checksum_encode(&best.address),
                "match lost to a lower address"
            ),
        }

        // Any match ends the search; only the first caller flips the signal.
        self.state.cancellation().cancel();
    }

    fn track(&mut self, address: Address, attempts: u64) {
        let candidate = BestCandidate {
            salt: self.salt,
            address,
            attempts,
            matched: false,
        };

        match self.state.offer(candidate) {
            Offer::Accepted => {
                self.local_best = Some(address);
                debug!(
                    worker = self.id,
                    address = %checksum_encode(&address),
                    attempts,
                    "new lowest address"
                );
            }
            Offer::Rejected(best) => self.local_best = Some(best.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address::derive, pattern::Pattern};

    /// Salts 1, 2, 3, ... as big-endian integers.
    struct CountingSalts(u64);

    impl SaltSource for CountingSalts {
        fn fill_salt(&mut self, salt: &mut Salt) {
            self.0 += 1;
            *salt = counting_salt(self.0);
        }
    }

    fn counting_salt(n: u64) -> Salt {
        let mut salt = [0; 32];
        salt[24..].copy_from_slice(&n.to_be_bytes());
        salt
    }

    fn config(pattern: Pattern) -> RunConfig {
        RunConfig::new(&[0x00], pattern).unwrap()
    }

    fn unreachable_pattern() -> Pattern {
        Pattern::Exact([0xff; 20])
    }

    #[test]
    fn counts_every_attempt_exactly() {
        let config = config(unreachable_pattern());
        let state = SharedSearchState::new();
        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 1000);

        for _ in 0..3 {
            assert_eq!(worker.run_batch(), WorkerState::Running);
        }
        assert_eq!(state.attempts(), 3000);
        assert_eq!(worker.attempts(), 3000);
        assert_eq!(state.best(), None);
    }

    #[test]
    fn stops_on_match_and_records_it() {
        let probe = config(unreachable_pattern());
        let salt = counting_salt(6);
        let target = derive(&probe.create2_prefix, &salt, &probe.init_code_hash);

        let config = config(Pattern::Exact(target));
        let state = SharedSearchState::new();
        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 100);
        worker.run();

        assert_eq!(worker.attempts(), 6);
        assert!(state.cancellation().is_cancelled());
        assert_eq!(
            state.best(),
            Some(BestCandidate {
                salt,
                address: target,
                attempts: 6,
                matched: true,
            })
        );
    }

    #[test]
    fn cancelled_worker_does_nothing() {
        let config = config(unreachable_pattern());
        let state = SharedSearchState::new();
        state.cancellation().cancel();

        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 10);
        worker.run();
        assert_eq!(state.attempts(), 0);
    }

    #[test]
    fn batch_reports_external_cancellation() {
        let config = config(unreachable_pattern());
        let state = SharedSearchState::new();
        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 10);

        assert_eq!(worker.run_batch(), WorkerState::Running);
        state.cancellation().cancel();
        assert_eq!(worker.run_batch(), WorkerState::Stopped);
        assert_eq!(state.attempts(), 20);
    }

    #[test]
    fn tracks_lowest_address_without_stopping() {
        let config = config(unreachable_pattern()).track_best(true);
        let state = SharedSearchState::new();
        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 500);
        assert_eq!(worker.run_batch(), WorkerState::Running);

        let (attempts, salt, address) = (1..=500)
            .map(|n| {
                let salt = counting_salt(n);
                (n, salt, derive(&config.create2_prefix, &salt, &config.init_code_hash))
            })
            .min_by_key(|(_, _, address)| *address)
            .unwrap();

        assert_eq!(
            state.best(),
            Some(BestCandidate {
                salt,
                address,
                attempts,
                matched: false,
            })
        );
        assert!(!state.cancellation().is_cancelled());
    }

    #[test]
    fn without_tracking_non_matches_are_ignored() {
        let config = config(unreachable_pattern());
        let state = SharedSearchState::new();
        let mut worker = SearchWorker::with_salts(0, &config, &state, CountingSalts(0), 50);
        worker.run_batch();
        assert_eq!(state.best(), None);
    }

    #[test]
    fn os_seeded_generators_differ() {
        let mut a = SaltRng::from_os().unwrap();
        let mut b = SaltRng::from_os().unwrap();
        let (mut x, mut y) = ([0; 32], [0; 32]);
        a.fill_salt(&mut x);
        b.fill_salt(&mut y);
        assert_ne!(x, y);
        assert_ne!(x, [0; 32]);
    }
}
