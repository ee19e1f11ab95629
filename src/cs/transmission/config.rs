//! Transfer settings, loaded from TOML.
//!
//! ```toml
//! generator = "1100001"
//! flip_probability = 0.01
//! seed = 42
//! log_level = "debug"
//! ```
//!
//! Every key is optional and falls back to [`TransmissionConfig::default`].

use crate::cs::channel::{validate_probability, BinarySymmetricChannel};
use crate::cs::ecc::Generator;
use crate::cs::error::{Error, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionConfig {
    /// Generator coefficients as a bit string, lowest power first
    pub generator: String,
    /// Probability that the channel flips any given bit
    pub flip_probability: f64,
    /// Seed for the channel's random generator; fresh entropy when absent
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            generator: Generator::default().to_string(),
            flip_probability: 0.0,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl TransmissionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.generator()?;
        validate_probability(self.flip_probability)
            .map_err(|e| Error::Config(format!("flip_probability: {}", e)))
    }

    pub fn generator(&self) -> Result<Generator> {
        self.generator
            .parse()
            .map_err(|e| Error::Config(format!("generator {:?}: {}", self.generator, e)))
    }

    pub fn channel(&self) -> Result<BinarySymmetricChannel> {
        BinarySymmetricChannel::new(self.flip_probability)
    }

    /// Channel random generator, seeded when a seed is configured
    pub fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}
