use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Hash range used by binary local hashing.
pub const BINARY_HASH_RANGE: u32 = 2;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("epsilon must be finite and > 0, got {0}")]
    InvalidEpsilon(f64),
    #[error("domain size must be > 0")]
    EmptyDomain,
    #[error("hash range must be >= 2, got {0}")]
    InvalidHashRange(u32),
    #[error("optimized hash range for epsilon {epsilon} does not fit in u32")]
    HashRangeOverflow { epsilon: f64 },
}

/// Calibrated randomized-response parameters for one client.
///
/// Values are only produced by [`PrivacyParameters::calibrate`] and
/// [`PrivacyParameters::recalibrate`], so `p + q * (g - 1) == 1` holds for every
/// instance (up to floating point error).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrivacyParameters {
    epsilon: f64,
    domain_size: usize,
    hash_range: u32,
    optimized: bool,
    p: f64,
    q: f64,
}

impl PrivacyParameters {
    /// Derive `g`, `p` and `q` for the given budget.
    ///
    /// With `optimized` set the supplied `hash_range` is ignored and replaced by
    /// `round(e^epsilon) + 1`.
    pub fn calibrate(
        epsilon: f64,
        domain_size: usize,
        hash_range: u32,
        optimized: bool,
    ) -> Result<Self, ParameterError> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ParameterError::InvalidEpsilon(epsilon));
        }
        let e_epsilon = epsilon.exp();
        if !e_epsilon.is_finite() {
            return Err(ParameterError::InvalidEpsilon(epsilon));
        }
        if domain_size == 0 {
            return Err(ParameterError::EmptyDomain);
        }
        let effective_range = if optimized {
            let tuned = optimized_hash_range(epsilon)?;
            if tuned != hash_range {
                info!(
                    "optimized local hashing overrides hash range requested={} effective={}",
                    hash_range, tuned
                );
            }
            tuned
        } else {
            hash_range
        };
        if effective_range < BINARY_HASH_RANGE {
            return Err(ParameterError::InvalidHashRange(effective_range));
        }

        let denominator = e_epsilon + f64::from(effective_range) - 1.0;
        let p = e_epsilon / denominator;
        let q = 1.0 / denominator;
        debug!(
            "calibrated local hashing epsilon={} d={} g={} optimized={} p={:.6} q={:.6}",
            epsilon, domain_size, effective_range, optimized, p, q
        );
        Ok(Self {
            epsilon,
            domain_size,
            hash_range: effective_range,
            optimized,
            p,
            q,
        })
    }

    /// Merge the supplied fields over `self` and calibrate the result.
    ///
    /// Unset fields keep their current value. The stored hash range is the
    /// effective one, so leaving optimized mode without a new `hash_range`
    /// keeps the range the optimized mode last chose.
    pub fn recalibrate(
        &self,
        epsilon: Option<f64>,
        domain_size: Option<usize>,
        hash_range: Option<u32>,
        optimized: Option<bool>,
    ) -> Result<Self, ParameterError> {
        Self::calibrate(
            epsilon.unwrap_or(self.epsilon),
            domain_size.unwrap_or(self.domain_size),
            hash_range.unwrap_or(self.hash_range),
            optimized.unwrap_or(self.optimized),
        )
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Effective hash range `g`.
    pub fn hash_range(&self) -> u32 {
        self.hash_range
    }

    pub fn optimized(&self) -> bool {
        self.optimized
    }

    /// Probability of reporting the hashed value unchanged.
    pub fn p(&self) -> f64 {
        self.p
    }

    /// Probability of reporting any one specific other value.
    pub fn q(&self) -> f64 {
        self.q
    }
}

/// Hash range chosen by optimized local hashing, `round(e^epsilon) + 1`.
pub fn optimized_hash_range(epsilon: f64) -> Result<u32, ParameterError> {
    let range = epsilon.exp().round() + 1.0;
    if !range.is_finite() || range > f64::from(u32::MAX) {
        return Err(ParameterError::HashRangeOverflow { epsilon });
    }
    Ok(range as u32)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn probabilities_normalize_across_ranges() {
        for epsilon in [0.01, 0.1, 0.5, 1.0, 2.0, 4.0, 8.0] {
            for hash_range in [2, 3, 4, 16, 1_024] {
                let params = PrivacyParameters::calibrate(epsilon, 10, hash_range, false).unwrap();
                let total = params.p() + params.q() * f64::from(hash_range - 1);
                assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn probabilities_match_closed_form() {
        let params = PrivacyParameters::calibrate(0.75, 32, 5, false).unwrap();
        let e = 0.75f64.exp();
        assert_abs_diff_eq!(params.p(), e / (e + 4.0), epsilon = 1e-12);
        assert_abs_diff_eq!(params.q(), 1.0 / (e + 4.0), epsilon = 1e-12);
    }

    #[test]
    fn binary_local_hashing_with_ln_three() {
        let params = PrivacyParameters::calibrate(3f64.ln(), 4, BINARY_HASH_RANGE, false).unwrap();
        assert_eq!(params.hash_range(), 2);
        assert_abs_diff_eq!(params.p(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(params.q(), 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(params.p() + params.q(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn optimized_mode_tunes_hash_range() {
        let params = PrivacyParameters::calibrate(1.0, 4, 2, true).unwrap();
        assert_eq!(params.hash_range(), 4);
        assert_abs_diff_eq!(params.p(), 0.4754, epsilon = 1e-4);
        assert_abs_diff_eq!(params.q(), 0.1749, epsilon = 1e-4);
        assert_abs_diff_eq!(params.p() + 3.0 * params.q(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn optimized_mode_ignores_explicit_range() {
        let params = PrivacyParameters::calibrate(2.0, 4, 64, true).unwrap();
        // e^2 ~ 7.389
        assert_eq!(params.hash_range(), 8);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert_eq!(
            PrivacyParameters::calibrate(0.0, 4, 2, false),
            Err(ParameterError::InvalidEpsilon(0.0))
        );
        assert!(matches!(
            PrivacyParameters::calibrate(f64::NAN, 4, 2, false),
            Err(ParameterError::InvalidEpsilon(_))
        ));
        assert_eq!(
            PrivacyParameters::calibrate(1.0, 0, 2, false),
            Err(ParameterError::EmptyDomain)
        );
        assert_eq!(
            PrivacyParameters::calibrate(1.0, 4, 1, false),
            Err(ParameterError::InvalidHashRange(1))
        );
        assert!(matches!(
            PrivacyParameters::calibrate(800.0, 4, 2, false),
            Err(ParameterError::InvalidEpsilon(_))
        ));
        assert!(matches!(
            PrivacyParameters::calibrate(40.0, 4, 2, true),
            Err(ParameterError::HashRangeOverflow { .. })
        ));
    }

    #[test]
    fn small_range_is_accepted_when_optimized() {
        let params = PrivacyParameters::calibrate(0.2, 4, 0, true).unwrap();
        assert_eq!(params.hash_range(), 2);
    }

    #[test]
    fn recalibrate_keeps_unset_fields() {
        let base = PrivacyParameters::calibrate(1.0, 10, 3, false).unwrap();
        let next = base.recalibrate(Some(2.0), None, None, None).unwrap();
        assert_eq!(next.domain_size(), 10);
        assert_eq!(next.hash_range(), 3);
        assert!(!next.optimized());
        let e = 2f64.exp();
        assert_abs_diff_eq!(next.p(), e / (e + 2.0), epsilon = 1e-12);
    }

    #[test]
    fn recalibrate_into_optimized_overrides_previous_range() {
        let base = PrivacyParameters::calibrate(1.0, 10, 32, false).unwrap();
        let next = base.recalibrate(None, None, Some(64), Some(true)).unwrap();
        assert_eq!(next.hash_range(), 4);

        let plain = next.recalibrate(None, None, None, Some(false)).unwrap();
        assert_eq!(plain.hash_range(), 4);
    }
}
