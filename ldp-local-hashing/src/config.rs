use serde::{Deserialize, Serialize};

use crate::params::{ParameterError, PrivacyParameters, BINARY_HASH_RANGE};

/// Serializable client settings, e.g. the `[client]` table of a config file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct LhConfig {
    pub epsilon: f64,
    pub domain_size: usize,
    #[serde(default = "default_hash_range")]
    pub hash_range: u32,
    #[serde(default)]
    pub optimized: bool,
}

const fn default_hash_range() -> u32 {
    BINARY_HASH_RANGE
}

impl LhConfig {
    /// Binary local hashing (`g = 2`).
    pub fn binary(epsilon: f64, domain_size: usize) -> Self {
        Self {
            epsilon,
            domain_size,
            hash_range: BINARY_HASH_RANGE,
            optimized: false,
        }
    }

    /// Optimized local hashing (`g = round(e^epsilon) + 1`).
    pub fn optimized(epsilon: f64, domain_size: usize) -> Self {
        Self {
            optimized: true,
            ..Self::binary(epsilon, domain_size)
        }
    }

    pub fn with_hash_range(mut self, hash_range: u32) -> Self {
        self.hash_range = hash_range;
        self
    }

    pub fn calibrate(&self) -> Result<PrivacyParameters, ParameterError> {
        PrivacyParameters::calibrate(
            self.epsilon,
            self.domain_size,
            self.hash_range,
            self.optimized,
        )
    }
}
