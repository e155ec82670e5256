//! CREATE2 address derivation and EIP-55 checksum encoding.

use hex_literal::hex;
use sha3::{Digest, Keccak256};

pub type Address = [u8; 20];
pub type Salt = [u8; 32];
pub type Hash = [u8; 32];

/// The ERC-2470 singleton factory every candidate is derived from.
pub const FACTORY_ADDRESS: Address = hex!("ce0042B868300000d44A59004Da54A005ffdcf9f");

pub const CREATE2_PREFIX_LEN: usize = 1 + 20;
pub const CREATE2_INPUT_LEN: usize = CREATE2_PREFIX_LEN + 32 + 32;

const SALT_START: usize = CREATE2_PREFIX_LEN;
const SALT_END: usize = SALT_START + 32;

pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Returns `0xff ‖ factory`, the constant head of every CREATE2 preimage.
pub fn create2_prefix(factory: &Address) -> [u8; CREATE2_PREFIX_LEN] {
    let mut prefix = [0_u8; CREATE2_PREFIX_LEN];
    prefix[0] = 0xff;
    prefix[1..].copy_from_slice(factory);
    prefix
}

/// Derives the CREATE2 address for a single salt.
///
/// Workers use [`Create2Input`] directly so the buffer and hasher are reused
/// across attempts; this function is the allocation-free one-shot form.
pub fn derive(prefix: &[u8; CREATE2_PREFIX_LEN], salt: &Salt, init_code_hash: &Hash) -> Address {
    let mut input = Create2Input::new(prefix, init_code_hash);
    input.set_salt(salt);
    input.address()
}

/// Reusable 85-byte CREATE2 preimage with its own hasher.
///
/// Only the salt window changes between attempts. The prefix and init code
/// hash are written once.
#[derive(Clone)]
pub struct Create2Input {
    buffer: [u8; CREATE2_INPUT_LEN],
    hasher: Keccak256,
}

impl Create2Input {
    pub fn new(prefix: &[u8; CREATE2_PREFIX_LEN], init_code_hash: &Hash) -> Self {
        let mut buffer = [0_u8; CREATE2_INPUT_LEN];
        buffer[..SALT_START].copy_from_slice(prefix);
        buffer[SALT_END..].copy_from_slice(init_code_hash);
        Self {
            buffer,
            hasher: Keccak256::new(),
        }
    }

    pub fn set_salt(&mut self, salt: &Salt) {
        self.buffer[SALT_START..SALT_END].copy_from_slice(salt);
    }

    pub fn salt(&self) -> Salt {
        let mut salt = [0_u8; 32];
        salt.copy_from_slice(&self.buffer[SALT_START..SALT_END]);
        salt
    }

    /// Hashes the current preimage and returns the low 20 bytes of the digest.
    pub fn address(&mut self) -> Address {
        self.hasher.update(&self.buffer);
        let digest = self.hasher.finalize_reset();

        let mut address = [0_u8; 20];
        address.copy_from_slice(&digest[12..]);
        address
    }
}

fn check_char(c: char, index: usize, hash: &[u8]) -> char {
    if (hash[index / 2] >> (4 * (1 - index % 2)) & 0x0f) >= 8 {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    }
}

/// EIP-55 mixed-case encoding, `0x` prefixed. Display only.
pub fn checksum_encode(address: &Address) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + 40);
    out.push_str("0x");
    out.extend(
        lower
            .chars()
            .enumerate()
            .map(|(i, c)| check_char(c, i, &hash)),
    );
    out
}
