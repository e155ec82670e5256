//! Search results as reported to callers.

use crate::address::{Address, Salt, checksum_encode};
use std::{fmt, time::Duration};

/// The best candidate recorded so far, as stored in the shared slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestCandidate {
    pub salt: Salt,
    pub address: Address,
    /// Global attempt count at the moment this candidate was evaluated.
    pub attempts: u64,
    /// Whether the candidate satisfies the configured pattern.
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub salt: Salt,
    pub address: Address,
    pub attempts: u64,
    pub duration: Duration,
    pub matched: bool,
}

impl SearchResult {
    pub fn new(best: BestCandidate, duration: Duration) -> Self {
        Self {
            salt: best.salt,
            address: best.address,
            attempts: best.attempts,
            duration,
            matched: best.matched,
        }
    }

    pub fn salt_hex(&self) -> String {
        format!("0x{}", hex::encode(self.salt))
    }

    pub fn checksum_address(&self) -> String {
        checksum_encode(&self.address)
    }

    /// Attempts per second up to the discovery of this result.
    pub fn rate(&self) -> f64 {
        rate(self.attempts, self.duration)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (salt: {})", self.checksum_address(), self.salt_hex())
    }
}

/// What a finished search hands back.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// `None` when the search was stopped before anything was recorded.
    pub best: Option<SearchResult>,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        self.best.as_ref().is_some_and(|best| best.matched)
    }

    pub fn rate(&self) -> f64 {
        rate(self.attempts, self.elapsed)
    }
}

pub(crate) fn rate(attempts: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        attempts as f64 / seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn result() -> SearchResult {
        SearchResult::new(
            BestCandidate {
                salt: [0x11; 32],
                address: hex!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
                attempts: 500,
                matched: true,
            },
            Duration::from_secs(2),
        )
    }

    #[test]
    fn formats_salt_and_address() {
        let result = result();
        assert_eq!(result.salt_hex(), format!("0x{}", "11".repeat(32)));
        assert_eq!(
            result.checksum_address(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
        assert_eq!(
            result.to_string(),
            format!(
                "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed (salt: 0x{})",
                "11".repeat(32)
            )
        );
    }

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        assert_eq!(result().rate(), 250.0);
        assert_eq!(rate(10, Duration::ZERO), 0.0);
    }

    #[test]
    fn outcome_match_flag() {
        let mut outcome = SearchOutcome {
            best: None,
            attempts: 0,
            elapsed: Duration::ZERO,
        };
        assert!(!outcome.is_match());

        let mut best = result();
        best.matched = false;
        outcome.best = Some(best);
        assert!(!outcome.is_match());

        outcome.best = Some(result());
        assert!(outcome.is_match());
    }
}
