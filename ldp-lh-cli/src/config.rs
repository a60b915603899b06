use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use ldp_local_hashing::{LhConfig, BINARY_HASH_RANGE};
use serde::Deserialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

/// Local hashing variant.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashingMode {
    /// Binary local hashing, `g` taken from `hash-range` (2 unless overridden).
    Blh,
    /// Optimized local hashing, `g = round(e^epsilon) + 1`.
    #[default]
    Olh,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config {path}: {details}")]
    Parse {
        path: PathBuf,
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub client: ClientSection,
    #[serde(default)]
    pub domain: Vec<String>,
    #[serde(default)]
    pub inputs: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClientSection {
    pub epsilon: f64,
    #[serde(default = "default_hash_range")]
    pub hash_range: u32,
    #[serde(default)]
    pub mode: HashingMode,
}

const fn default_hash_range() -> u32 {
    BINARY_HASH_RANGE
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let epsilon = self.client.epsilon;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "epsilon must be a positive number, got {epsilon}"
            )));
        }
        if self.domain.is_empty() {
            return Err(ConfigError::Validation(
                "at least one domain value must be defined".into(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.domain.len());
        if let Some(duplicate) = self.domain.iter().find(|value| !seen.insert(value.as_str())) {
            return Err(ConfigError::Validation(format!(
                "domain value {duplicate:?} is listed more than once"
            )));
        }
        if self.client.mode == HashingMode::Blh && self.client.hash_range < BINARY_HASH_RANGE {
            return Err(ConfigError::Validation(format!(
                "hash range must be at least {BINARY_HASH_RANGE}, got {}",
                self.client.hash_range
            )));
        }
        Ok(())
    }

    /// Client settings for the configured domain.
    pub fn lh_config(&self) -> LhConfig {
        LhConfig {
            epsilon: self.client.epsilon,
            domain_size: self.domain.len(),
            hash_range: self.client.hash_range,
            optimized: self.client.mode == HashingMode::Olh,
        }
    }

    pub fn sample() -> Self {
        Self {
            client: ClientSection {
                epsilon: 1.0,
                hash_range: default_hash_range(),
                mode: HashingMode::Olh,
            },
            domain: ["a", "b", "c", "d"].map(String::from).to_vec(),
            inputs: None,
        }
    }
}

/// Command-line values layered over an optional config file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub epsilon: Option<f64>,
    pub domain: Option<Vec<String>>,
    pub hash_range: Option<u32>,
    pub mode: Option<HashingMode>,
    pub inputs: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Overlay the set fields on `base` and validate the result. Without a
    /// base config `epsilon` and `domain` must be supplied here.
    pub fn apply(self, base: Option<Config>) -> Result<Config, ConfigError> {
        let mut config = match base {
            Some(config) => config,
            None => Config {
                client: ClientSection {
                    epsilon: self.epsilon.ok_or_else(|| {
                        ConfigError::Validation(
                            "epsilon is required when no config file is given".into(),
                        )
                    })?,
                    hash_range: default_hash_range(),
                    mode: HashingMode::default(),
                },
                domain: Vec::new(),
                inputs: None,
            },
        };
        if let Some(epsilon) = self.epsilon {
            config.client.epsilon = epsilon;
        }
        if let Some(domain) = self.domain {
            config.domain = domain;
        }
        if let Some(hash_range) = self.hash_range {
            config.client.hash_range = hash_range;
        }
        if let Some(mode) = self.mode {
            config.client.mode = mode;
        }
        if self.inputs.is_some() {
            config.inputs = self.inputs;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Parse a config file. Validation happens once overrides are applied, so a
/// file may leave out values that are passed on the command line.
///
/// A relative `inputs` path is taken relative to the directory holding the
/// config file.
pub fn load_config(path: &Path, format: ConfigFormat) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = resolve_format(path, format);
    let parse_error = |details: String| ConfigError::Parse {
        path: path.to_path_buf(),
        format,
        details,
    };
    let mut config: Config = match format {
        ConfigFormat::Toml => {
            toml::from_str(&contents).map_err(|err| parse_error(err.to_string()))?
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_str(&contents).map_err(|err| parse_error(err.to_string()))?
        }
        ConfigFormat::Auto => unreachable!("auto variant resolved earlier"),
    };
    if let (Some(inputs), Some(base)) = (config.inputs.as_mut(), path.parent()) {
        if inputs.is_relative() {
            *inputs = base.join(&*inputs);
        }
    }
    Ok(config)
}

fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}
