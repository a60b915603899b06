use rand::Rng;

use crate::params::PrivacyParameters;

/// Randomized response over `[0, hash_range)`.
///
/// Keeps `encoded` when a uniform draw lands at or below `p - q`, otherwise
/// reports a uniform value from the whole range, `encoded` included. The
/// marginal is `P(y = x) = p` and `P(y = v) = q` for every `v != x`, the same
/// distribution as keeping with probability `p` and resampling among the other
/// `g - 1` values otherwise.
pub fn perturb<R: Rng + ?Sized>(
    encoded: u32,
    p: f64,
    q: f64,
    hash_range: u32,
    rng: &mut R,
) -> u32 {
    debug_assert!(hash_range >= 1, "hash range must be non-zero");
    debug_assert!((0.0..=1.0).contains(&p), "p outside [0, 1]: {p}");
    debug_assert!((0.0..=1.0).contains(&q), "q outside [0, 1]: {q}");
    let draw: f64 = rng.gen();
    if draw <= p - q {
        encoded
    } else {
        rng.gen_range(0..hash_range)
    }
}

/// [`perturb`] bound to one parameter snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Perturber {
    p: f64,
    q: f64,
    hash_range: u32,
}

impl Perturber {
    pub fn new(parameters: &PrivacyParameters) -> Self {
        Self {
            p: parameters.p(),
            q: parameters.q(),
            hash_range: parameters.hash_range(),
        }
    }

    pub fn perturb<R: Rng + ?Sized>(&self, encoded: u32, rng: &mut R) -> u32 {
        perturb(encoded, self.p, self.q, self.hash_range, rng)
    }
}
