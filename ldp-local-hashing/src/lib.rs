//! Local hashing for locally differentially private frequency reports.
//!
//! A client hashes its value into a small range `[0, g)` with a fresh seed and
//! reports the hash through randomized response, so an untrusted aggregator can
//! estimate value frequencies across many clients without learning any single
//! value. Binary local hashing fixes `g = 2`; optimized local hashing picks
//! `g = round(e^epsilon) + 1` to minimise estimation variance.
//!
//! The pipeline is: [`IndexMapper`] → [`HashEncoder`] → [`Perturber`], driven
//! by [`LocalHashingClient::privatize`]. Every report carries the seed used for
//! its hash so the aggregator can reproduce the encoding.

pub mod client;
pub mod config;
pub mod encoding;
pub mod errors;
pub mod mapper;
pub mod params;
pub mod perturb;
pub mod seed;

pub use client::{LocalHashingClient, ParameterUpdate, PrivatizationResult};
pub use config::LhConfig;
pub use encoding::{encode, EncodeError, HashEncoder};
pub use errors::{LocalHashingError, LocalHashingResult};
pub use mapper::{DomainIndex, IndexMapper, LookupIndex, MappingError};
pub use params::{optimized_hash_range, ParameterError, PrivacyParameters, BINARY_HASH_RANGE};
pub use perturb::{perturb, Perturber};
pub use seed::{ChaChaSeedSource, FixedSeed, OsSeedSource, SeedSource};
