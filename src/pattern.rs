//! Byte-level address patterns and the ordering used to rank candidates.

use crate::address::Address;
use std::fmt;

/// What a candidate address has to look like to end the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Exact(Address),
    Prefix(Vec<u8>),
    Suffix(Vec<u8>),
}

impl Pattern {
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            Pattern::Exact(target) => address == target,
            Pattern::Prefix(prefix) => {
                let n = prefix.len().min(20);
                address[..n] == prefix[..n]
            }
            Pattern::Suffix(suffix) => {
                let n = suffix.len().min(20);
                address[20 - n..] == suffix[suffix.len() - n..]
            }
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Pattern::Exact(target) => target,
            Pattern::Prefix(bytes) | Pattern::Suffix(bytes) => bytes,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Pattern::Exact(_) => "exact match",
            Pattern::Prefix(_) => "prefix",
            Pattern::Suffix(_) => "suffix",
        };
        write!(f, "{kind}: 0x{}", hex::encode(self.bytes()))
    }
}

/// Whether `candidate` strictly improves on `current`.
///
/// Lower addresses are better, compared byte by byte from the left. Anything
/// beats an empty slot and nothing beats itself.
pub fn is_better(candidate: &Address, current: Option<&Address>) -> bool {
    match current {
        None => true,
        Some(current) => candidate < current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    const ADDRESS: Address = hex!("1234567890abcdef1234567890abcdef12345678");

    #[test]
    fn matches_prefix_suffix_and_target() {
        assert!(Pattern::Prefix(hex!("1234").to_vec()).matches(&ADDRESS));
        assert!(Pattern::Suffix(hex!("5678").to_vec()).matches(&ADDRESS));
        assert!(Pattern::Exact(ADDRESS).matches(&ADDRESS));
        assert!(!Pattern::Prefix(hex!("9999").to_vec()).matches(&ADDRESS));
        assert!(!Pattern::Suffix(hex!("1234").to_vec()).matches(&ADDRESS));

        let mut other = ADDRESS;
        other[19] ^= 1;
        assert!(!Pattern::Exact(other).matches(&ADDRESS));
    }

    #[test]
    fn every_true_prefix_and_suffix_matches() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..64 {
            let address: Address = rng.r#gen();
            for n in 1..=20 {
                assert!(Pattern::Prefix(address[..n].to_vec()).matches(&address));
                assert!(Pattern::Suffix(address[20 - n..].to_vec()).matches(&address));

                let mut prefix = address[..n].to_vec();
                prefix[rng.gen_range(0..n)] ^= 0x80;
                assert!(!Pattern::Prefix(prefix).matches(&address));

                let mut suffix = address[20 - n..].to_vec();
                suffix[rng.gen_range(0..n)] ^= 0x01;
                assert!(!Pattern::Suffix(suffix).matches(&address));
            }
        }
    }

    #[test]
    fn full_length_prefix_equals_exact() {
        let pattern = Pattern::Prefix(ADDRESS.to_vec());
        assert!(pattern.matches(&ADDRESS));
        assert!(!pattern.matches(&[0; 20]));
    }

    #[test]
    fn display() {
        assert_eq!(Pattern::Prefix(vec![0xab]).to_string(), "prefix: 0xab");
        assert_eq!(Pattern::Suffix(vec![0xcd, 0xef]).to_string(), "suffix: 0xcdef");
        assert_eq!(
            Pattern::Exact(ADDRESS).to_string(),
            "exact match: 0x1234567890abcdef1234567890abcdef12345678",
        );
    }

    #[test]
    fn lower_address_is_better() {
        let one = hex!("0000000000000000000000000000000000000001");
        let two = hex!("0000000000000000000000000000000000000002");
        assert!(is_better(&one, Some(&two)));
        assert!(!is_better(&two, Some(&one)));
        assert!(!is_better(&one, Some(&one)));
    }

    #[test]
    fn first_differing_byte_decides() {
        let high_first = hex!("0100000000000000000000000000000000000000");
        let high_last = hex!("00ffffffffffffffffffffffffffffffffffffff");
        assert!(is_better(&high_last, Some(&high_first)));
        assert!(!is_better(&high_first, Some(&high_last)));
    }

    #[test]
    fn comparator_is_a_strict_order() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..256 {
            let x: Address = rng.r#gen();
            let mut y = x;
            y[rng.gen_range(0..20)] = rng.r#gen();

            assert!(is_better(&x, None));
            assert!(!is_better(&x, Some(&x)));
            if x != y {
                assert!(is_better(&x, Some(&y)) ^ is_better(&y, Some(&x)));
            }
        }
    }
}
