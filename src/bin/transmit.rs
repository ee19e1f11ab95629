//! Sends a file through the compress / encode / noise / decode pipeline and
//! reports what survived.

use anyhow::{Context, Result};
use clap::Parser;
use fano_cyclic::cs::transmission::{receive, send, TransmissionConfig};
use fano_cyclic::cs::RandomFlips;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "fano-cyclic", version, about)]
struct Cli {
    /// File to transmit
    input: PathBuf,

    /// TOML settings file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generator coefficients, lowest power first (e.g. 1100001)
    #[arg(short, long)]
    generator: Option<String>,

    /// Per-bit flip probability
    #[arg(short, long)]
    noise: Option<f64>,

    /// Seed for the channel noise
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long)]
    log_level: Option<String>,

    /// Where to write the recovered bytes
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the transmission envelope as JSON
    #[arg(long)]
    envelope: Option<PathBuf>,

    /// Print the transfer report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> Result<TransmissionConfig> {
        let mut config = match &self.config {
            Some(path) => TransmissionConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => TransmissionConfig::default(),
        };
        if let Some(generator) = &self.generator {
            config.generator = generator.clone();
        }
        if let Some(noise) = self.noise {
            config.flip_probability = noise;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("initializing logging")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    init_logging(&config.log_level)?;

    let data = fs::read(&cli.input).with_context(|| format!("reading {}", cli.input.display()))?;
    let generator = config.generator()?;
    let mut noise = RandomFlips::new(config.rng(), config.flip_probability)?;

    let envelope = send(&data, &generator, &mut noise)?;
    if let Some(path) = &cli.envelope {
        fs::write(path, envelope.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let reception = receive(&envelope)?;
    if let Some(path) = &cli.output {
        fs::write(path, &reception.data).with_context(|| format!("writing {}", path.display()))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reception.report)?);
    } else {
        println!("{}", reception.report);
    }
    Ok(())
}
