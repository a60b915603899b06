//! Batch loop that privatizes every input value and collects the reports.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//!
//! use ldp_lh_cli::config::Config;
//! use ldp_lh_cli::service::BatchPrivatizer;
//! use ldp_local_hashing::FixedSeed;
//!
//! let cfg = Config::sample();
//! let privatizer = BatchPrivatizer::new(&cfg)
//!     .unwrap()
//!     .with_seed_source(Arc::new(FixedSeed(42)));
//! let batch = privatizer.run(["b", "d"], &mut rand::thread_rng()).unwrap();
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.seed_list, vec![42, 42]);
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use ldp_local_hashing::{
    DomainIndex, LocalHashingClient, LocalHashingError, PrivatizationResult, SeedSource,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("unable to read inputs {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("inputs {path} must be a JSON array of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("input #{position} could not be privatized: {source}")]
    Privatize {
        position: usize,
        #[source]
        source: LocalHashingError,
    },
}

/// Labeled record of one batch: parallel lists, one entry per input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivatizedBatch {
    pub encode_list: Vec<u32>,
    pub perturb_list: Vec<u32>,
    pub seed_list: Vec<u32>,
}

impl PrivatizedBatch {
    pub fn push(&mut self, report: PrivatizationResult) {
        self.encode_list.push(report.encoded);
        self.perturb_list.push(report.perturbed);
        self.seed_list.push(report.seed);
    }

    pub fn len(&self) -> usize {
        self.encode_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encode_list.is_empty()
    }
}

pub struct BatchPrivatizer {
    client: LocalHashingClient<str>,
}

impl BatchPrivatizer {
    pub fn new(config: &Config) -> Result<Self, LocalHashingError> {
        let domain = DomainIndex::new(config.domain.iter().cloned());
        let client = LocalHashingClient::from_config(&config.lh_config(), domain)?;
        Ok(Self { client })
    }

    pub fn with_seed_source(mut self, seeds: Arc<dyn SeedSource>) -> Self {
        self.client = self.client.with_seed_source(seeds);
        self
    }

    pub fn client(&self) -> &LocalHashingClient<str> {
        &self.client
    }

    /// Privatize `inputs` in order. The first value outside the domain aborts
    /// the batch; no partial record is returned.
    pub fn run<I, S, R>(&self, inputs: I, rng: &mut R) -> Result<PrivatizedBatch, RunError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut batch = PrivatizedBatch::default();
        for (position, input) in inputs.into_iter().enumerate() {
            let report = self
                .client
                .privatize_with(input.as_ref(), &mut *rng)
                .map_err(|source| RunError::Privatize { position, source })?;
            batch.push(report);
        }
        let params = self.client.parameters();
        info!(
            "privatized batch reports={} epsilon={} g={}",
            batch.len(),
            params.epsilon(),
            params.hash_range()
        );
        Ok(batch)
    }
}

/// Read a JSON array of input values.
pub fn read_inputs(path: &Path) -> Result<Vec<String>, RunError> {
    let contents = fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| RunError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use ldp_local_hashing::{encode, FixedSeed, MappingError};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn privatizer() -> BatchPrivatizer {
        BatchPrivatizer::new(&Config::sample())
            .unwrap()
            .with_seed_source(Arc::new(FixedSeed(42)))
    }

    #[test]
    fn run_collects_parallel_lists() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let batch = privatizer().run(["a", "b", "c", "b"], &mut rng).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.encode_list, vec![3, 0, 2, 0]);
        assert_eq!(batch.encode_list[1], encode(1, 42, 4));
        assert!(batch.perturb_list.iter().all(|value| *value < 4));
        assert_eq!(batch.seed_list, vec![42; 4]);
    }

    #[test]
    fn unknown_input_aborts_the_batch() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let err = privatizer().run(["a", "z", "b"], &mut rng).unwrap_err();
        match err {
            RunError::Privatize { position, source } => {
                assert_eq!(position, 1);
                assert!(matches!(
                    source,
                    LocalHashingError::IndexMapping(MappingError::Unmapped { domain_size: 4 })
                ));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        let batch = privatizer()
            .run(Vec::<String>::new(), &mut rand::thread_rng())
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(
            serde_json::to_string(&batch).unwrap(),
            r#"{"encode_list":[],"perturb_list":[],"seed_list":[]}"#
        );
    }

    #[test]
    fn client_uses_configured_mode() {
        assert_eq!(privatizer().client().parameters().hash_range(), 4);
    }
}
