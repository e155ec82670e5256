//! Run configuration and the input validation that happens before a search.

use crate::{
    address::{Address, CREATE2_PREFIX_LEN, FACTORY_ADDRESS, Hash, create2_prefix, keccak256},
    error::{Error, Result},
    pattern::Pattern,
};
use std::{fs, path::Path, time::Duration};

/// Immutable inputs of a single search, shared by reference with every worker.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub factory: Address,
    pub init_code_hash: Hash,
    pub create2_prefix: [u8; CREATE2_PREFIX_LEN],
    pub pattern: Pattern,
    /// Record the lowest address seen even when it does not match.
    pub track_best: bool,
}

impl RunConfig {
    pub fn new(init_code: &[u8], pattern: Pattern) -> Result<Self> {
        if init_code.is_empty() {
            return Err(Error::EmptyInitCode);
        }
        Self::with_init_code_hash(keccak256(init_code), pattern)
    }

    /// Fails if a prefix or suffix pattern is empty or longer than an address.
    pub fn with_init_code_hash(init_code_hash: Hash, pattern: Pattern) -> Result<Self> {
        match &pattern {
            Pattern::Exact(_) => {}
            Pattern::Prefix(bytes) => check_pattern_length("prefix", bytes)?,
            Pattern::Suffix(bytes) => check_pattern_length("suffix", bytes)?,
        }

        Ok(Self {
            factory: FACTORY_ADDRESS,
            init_code_hash,
            create2_prefix: create2_prefix(&FACTORY_ADDRESS),
            pattern,
            track_best: false,
        })
    }

    pub fn track_best(mut self, enabled: bool) -> Self {
        self.track_best = enabled;
        self
    }
}

/// How a search is run, as opposed to what it looks for.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    pub workers: usize,
    /// Progress interval; `None` disables periodic reporting.
    pub progress_interval: Option<Duration>,
}

impl SearchOptions {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::NoWorkers);
        }
        Ok(Self {
            workers,
            progress_interval: None,
        })
    }

    pub fn progress_every(mut self, seconds: u64) -> Result<Self> {
        if seconds == 0 {
            return Err(Error::ZeroInterval);
        }
        self.progress_interval = Some(Duration::from_secs(seconds));
        Ok(self)
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            progress_interval: None,
        }
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn decode_hex(what: &'static str, s: &str) -> Result<Vec<u8>> {
    hex::decode(strip_hex_prefix(s)).map_err(|source| Error::InvalidHex { what, source })
}

fn check_pattern_length(kind: &'static str, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() || bytes.len() > 20 {
        return Err(Error::PatternLength {
            kind,
            expected: "1 to 20",
            actual: bytes.len(),
        });
    }
    Ok(())
}

impl Pattern {
    /// Parses a full 20-byte target address.
    pub fn exact_from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex("target", s)?;
        let actual = bytes.len();
        let target: Address = bytes.try_into().map_err(|_| Error::PatternLength {
            kind: "target",
            expected: "exactly 20",
            actual,
        })?;
        Ok(Pattern::Exact(target))
    }

    pub fn prefix_from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex("prefix", s)?;
        check_pattern_length("prefix", &bytes)?;
        Ok(Pattern::Prefix(bytes))
    }

    pub fn suffix_from_hex(s: &str) -> Result<Self> {
        let bytes = decode_hex("suffix", s)?;
        check_pattern_length("suffix", &bytes)?;
        Ok(Pattern::Suffix(bytes))
    }
}

/// Decodes init code given literally on the command line.
pub fn init_code_from_hex(s: &str) -> Result<Vec<u8>> {
    let code = decode_hex("bytecode", s)?;
    if code.is_empty() {
        return Err(Error::EmptyInitCode);
    }
    Ok(code)
}

/// Reads hex init code from a file. An odd trailing nibble is padded with `0`.
pub fn init_code_from_file(path: &Path) -> Result<Vec<u8>> {
    let content = fs::read_to_string(path).map_err(|source| Error::ReadInitCode {
        path: path.to_owned(),
        source,
    })?;

    let mut code = strip_hex_prefix(&content).to_owned();
    if code.len() % 2 != 0 {
        code.push('0');
    }
    init_code_from_hex(&code)
}
