use std::{fs, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use ldp_lh_cli::config::{load_config, ConfigFormat, ConfigOverrides, HashingMode};
use ldp_lh_cli::service::{read_inputs, BatchPrivatizer};
use ldp_local_hashing::ChaChaSeedSource;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "ldp-lh",
    version,
    about = "Privatize a batch of values with local hashing and print the labeled record"
)]
struct Cli {
    /// Optional configuration file (TOML or YAML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Explicit configuration format override.
    #[arg(long, value_enum, default_value_t = ConfigFormat::Auto)]
    config_format: ConfigFormat,
    /// Privacy budget epsilon.
    #[arg(long)]
    epsilon: Option<f64>,
    /// Comma separated, ordered domain values.
    #[arg(long, value_delimiter = ',')]
    domain: Option<Vec<String>>,
    /// Hash range for binary mode; ignored by OLH.
    #[arg(long)]
    hash_range: Option<u32>,
    /// Local hashing variant (defaults to olh).
    #[arg(long, value_enum)]
    mode: Option<HashingMode>,
    /// JSON array of input values to privatize.
    #[arg(long)]
    inputs: Option<PathBuf>,
    /// Write the record to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seed hash seeds and perturbation for a replayable run.
    #[arg(long)]
    rng_seed: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ldp_local_hashing=warn,ldp_lh_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let base = cli
        .config
        .as_deref()
        .map(|path| load_config(path, cli.config_format))
        .transpose()?;
    let overrides = ConfigOverrides {
        epsilon: cli.epsilon,
        domain: cli.domain,
        hash_range: cli.hash_range,
        mode: cli.mode,
        inputs: cli.inputs,
    };
    let config = overrides.apply(base)?;
    let inputs_path = config
        .inputs
        .clone()
        .ok_or_else(|| eyre!("no inputs file: pass --inputs or set `inputs` in the config"))?;
    let inputs = read_inputs(&inputs_path)?;

    let mut privatizer = BatchPrivatizer::new(&config)?;
    let mut rng: Box<dyn RngCore> = match cli.rng_seed {
        Some(seed) => {
            privatizer = privatizer.with_seed_source(Arc::new(ChaChaSeedSource::new(seed)));
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            rng.set_stream(1);
            Box::new(rng)
        }
        None => Box::new(rand::thread_rng()),
    };
    let batch = privatizer.run(&inputs, &mut *rng)?;
    let record = serde_json::to_string(&batch)?;

    match &cli.output {
        Some(path) => fs::write(path, format!("{record}\n"))
            .wrap_err_with(|| format!("failed to write {}", path.display()))?,
        None => println!("{record}"),
    }
    Ok(())
}
