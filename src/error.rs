use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid hex for {what}: {source}")]
    InvalidHex {
        what: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("{kind} must be {expected} bytes, got {actual}")]
    PatternLength {
        kind: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("init code is empty")]
    EmptyInitCode,

    #[error("failed to read init code from {}: {source}", path.display())]
    ReadInitCode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("progress interval must be at least one second")]
    ZeroInterval,

    #[error("failed to seed salt generator: {0}")]
    Seed(#[from] rand::Error),

    #[error("search has already been run")]
    AlreadyRan,

    #[error("a search worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, Error>;
