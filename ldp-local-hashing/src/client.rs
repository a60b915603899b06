//! Client-side privatization session.
//!
//! # Example
//! ```
//! use ldp_local_hashing::{DomainIndex, FixedSeed, LocalHashingClient, ParameterUpdate};
//! use std::sync::Arc;
//!
//! let domain = DomainIndex::new(["a", "b", "c", "d"].map(String::from));
//! let client = LocalHashingClient::<str>::optimized(1.0, domain.len(), domain)
//!     .unwrap()
//!     .with_seed_source(Arc::new(FixedSeed(42)));
//! assert_eq!(client.parameters().hash_range(), 4);
//!
//! let report = client.privatize("b").unwrap();
//! assert_eq!(report.seed, 42);
//! assert!(report.perturbed < 4);
//!
//! client
//!     .update_parameters(ParameterUpdate::new().epsilon(2.0))
//!     .unwrap();
//! assert_eq!(client.parameters().hash_range(), 8);
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::LhConfig,
    encoding::HashEncoder,
    errors::LocalHashingResult,
    mapper::{IndexMapper, MappingError},
    params::{PrivacyParameters, BINARY_HASH_RANGE},
    perturb::Perturber,
    seed::{OsSeedSource, SeedSource},
};

/// One privatized report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrivatizationResult {
    /// Seed that keyed the hash for this report.
    pub seed: u32,
    /// Hash of the true value, `x`.
    pub encoded: u32,
    /// Reported value after randomized response, `y`.
    pub perturbed: u32,
}

/// Fields to change in [`LocalHashingClient::update_parameters`]; anything left
/// unset keeps its current value.
pub struct ParameterUpdate<T: ?Sized> {
    epsilon: Option<f64>,
    domain_size: Option<usize>,
    hash_range: Option<u32>,
    optimized: Option<bool>,
    index_mapper: Option<Arc<dyn IndexMapper<T>>>,
}

impl<T: ?Sized> Default for ParameterUpdate<T> {
    fn default() -> Self {
        Self {
            epsilon: None,
            domain_size: None,
            hash_range: None,
            optimized: None,
            index_mapper: None,
        }
    }
}

impl<T: ?Sized> ParameterUpdate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn domain_size(mut self, domain_size: usize) -> Self {
        self.domain_size = Some(domain_size);
        self
    }

    pub fn hash_range(mut self, hash_range: u32) -> Self {
        self.hash_range = Some(hash_range);
        self
    }

    pub fn optimized(mut self, optimized: bool) -> Self {
        self.optimized = Some(optimized);
        self
    }

    pub fn index_mapper(mut self, mapper: impl IndexMapper<T> + 'static) -> Self {
        self.index_mapper = Some(Arc::new(mapper));
        self
    }
}

struct ClientState<T: ?Sized> {
    parameters: PrivacyParameters,
    mapper: Arc<dyn IndexMapper<T>>,
}

/// Local hashing client: binary (`g = 2`) or optimized (`g = round(e^epsilon) + 1`).
///
/// Parameters and mapper live in one immutable snapshot. Updates swap in a new
/// snapshot; each privatization reads exactly one, so a report never mixes a
/// new `g` with stale `p`/`q`.
pub struct LocalHashingClient<T: ?Sized> {
    state: RwLock<Arc<ClientState<T>>>,
    seeds: Arc<dyn SeedSource>,
}

impl<T: ?Sized> LocalHashingClient<T> {
    pub fn new(
        epsilon: f64,
        domain_size: usize,
        hash_range: u32,
        optimized: bool,
        mapper: impl IndexMapper<T> + 'static,
    ) -> LocalHashingResult<Self> {
        let parameters =
            PrivacyParameters::calibrate(epsilon, domain_size, hash_range, optimized)?;
        Ok(Self {
            state: RwLock::new(Arc::new(ClientState {
                parameters,
                mapper: Arc::new(mapper),
            })),
            seeds: Arc::new(OsSeedSource),
        })
    }

    /// Binary local hashing client.
    pub fn binary(
        epsilon: f64,
        domain_size: usize,
        mapper: impl IndexMapper<T> + 'static,
    ) -> LocalHashingResult<Self> {
        Self::new(epsilon, domain_size, BINARY_HASH_RANGE, false, mapper)
    }

    /// Optimized local hashing client.
    pub fn optimized(
        epsilon: f64,
        domain_size: usize,
        mapper: impl IndexMapper<T> + 'static,
    ) -> LocalHashingResult<Self> {
        Self::new(epsilon, domain_size, BINARY_HASH_RANGE, true, mapper)
    }

    pub fn from_config(
        config: &LhConfig,
        mapper: impl IndexMapper<T> + 'static,
    ) -> LocalHashingResult<Self> {
        Self::new(
            config.epsilon,
            config.domain_size,
            config.hash_range,
            config.optimized,
            mapper,
        )
    }

    /// Replace the seed source (defaults to OS randomness).
    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Current parameter snapshot.
    pub fn parameters(&self) -> PrivacyParameters {
        self.state.read().parameters
    }

    pub fn epsilon(&self) -> f64 {
        self.parameters().epsilon()
    }

    pub fn domain_size(&self) -> usize {
        self.parameters().domain_size()
    }

    pub fn index_mapper(&self) -> Arc<dyn IndexMapper<T>> {
        Arc::clone(&self.state.read().mapper)
    }

    /// Merge `update` into the current state and recalibrate `p` and `q`.
    ///
    /// On error the previous snapshot stays in place.
    pub fn update_parameters(
        &self,
        update: ParameterUpdate<T>,
    ) -> LocalHashingResult<PrivacyParameters> {
        let mut state = self.state.write();
        let parameters = state.parameters.recalibrate(
            update.epsilon,
            update.domain_size,
            update.hash_range,
            update.optimized,
        )?;
        let mapper = update
            .index_mapper
            .unwrap_or_else(|| Arc::clone(&state.mapper));
        *state = Arc::new(ClientState { parameters, mapper });
        debug!(
            "local hashing parameters updated epsilon={} g={}",
            parameters.epsilon(),
            parameters.hash_range()
        );
        Ok(parameters)
    }

    /// Privatize `item` using the thread-local rng for perturbation.
    pub fn privatize(&self, item: &T) -> LocalHashingResult<PrivatizationResult> {
        self.privatize_with(item, &mut rand::thread_rng())
    }

    /// Privatize `item`, drawing the perturbation randomness from `rng`.
    pub fn privatize_with<R: Rng + ?Sized>(
        &self,
        item: &T,
        rng: &mut R,
    ) -> LocalHashingResult<PrivatizationResult> {
        let state = self.snapshot();
        let parameters = &state.parameters;
        let seed = self.seeds.next_seed()?;
        let index = state.mapper.map_index(item).ok_or_else(|| {
            warn!(
                "item outside local hashing domain domain_size={}",
                parameters.domain_size()
            );
            MappingError::Unmapped {
                domain_size: parameters.domain_size(),
            }
        })?;
        let encoded = HashEncoder::new(parameters).encode(index, seed)?;
        let perturbed = Perturber::new(parameters).perturb(encoded, rng);
        Ok(PrivatizationResult {
            seed,
            encoded,
            perturbed,
        })
    }

    fn snapshot(&self) -> Arc<ClientState<T>> {
        Arc::clone(&self.state.read())
    }
}
