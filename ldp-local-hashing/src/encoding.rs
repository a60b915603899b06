//! Seeded hashing of domain indexes into the hash range.
//!
//! The hash is XXH32 over the index's decimal digits, keyed by the per-report
//! seed and reduced modulo `g`. Any XXH32 implementation reproduces the same
//! value for the same `(index, seed, g)`, which is what an aggregator needs to
//! test reports against candidate values.

use thiserror::Error;
use xxhash_rust::xxh32::xxh32;

use crate::params::PrivacyParameters;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("index {index} outside domain of size {domain_size}")]
    IndexOutOfRange { index: usize, domain_size: usize },
}

/// Hash `index` with `seed` into `[0, hash_range)`.
pub fn encode(index: usize, seed: u32, hash_range: u32) -> u32 {
    debug_assert!(hash_range > 0, "hash range must be non-zero");
    let digits = index.to_string();
    xxh32(digits.as_bytes(), seed) % hash_range
}

/// [`encode`] bound to one parameter snapshot, with a domain bounds check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashEncoder {
    hash_range: u32,
    domain_size: usize,
}

impl HashEncoder {
    pub fn new(parameters: &PrivacyParameters) -> Self {
        Self {
            hash_range: parameters.hash_range(),
            domain_size: parameters.domain_size(),
        }
    }

    pub fn encode(&self, index: usize, seed: u32) -> Result<u32, EncodeError> {
        if index >= self.domain_size {
            return Err(EncodeError::IndexOutOfRange {
                index,
                domain_size: self.domain_size,
            });
        }
        Ok(encode(index, seed, self.hash_range))
    }
}
