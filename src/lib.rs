//! Brute-force CREATE2 salt miner for the ERC-2470 singleton factory.
//!
//! - `address`: CREATE2 derivation and EIP-55 encoding
//! - `pattern`: byte patterns and candidate ordering
//! - `worker` / `coordinator`: the concurrent search
//! - `progress`: periodic status reporting

pub mod address;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pattern;
pub mod progress;
pub mod result;
pub mod state;
pub mod worker;

pub use address::{Address, FACTORY_ADDRESS, Salt, checksum_encode, derive, keccak256};
pub use config::{RunConfig, SearchOptions};
pub use coordinator::Coordinator;
pub use error::{Error, Result};
pub use pattern::{Pattern, is_better};
pub use result::{SearchOutcome, SearchResult};
