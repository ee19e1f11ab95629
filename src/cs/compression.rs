//! Statistical compression.
//!
//! This module provides the Shannon-Fano coder used to turn bytes into
//! fixed-width symbol codewords before channel coding:
//! - Symbol probability estimation
//! - Balanced recursive partitioning into codewords
//! - Padding to a common codeword width
//! - Best-effort decompression that skips unknown codewords
//!
//! # Examples
//!
//! ```rust
//! use fano_cyclic::cs::compression::{build_codebook, decompress};
//! use fano_cyclic::cs::ecc::polynomial::parse_bit_string;
//!
//! let codebook = build_codebook(b"abca").unwrap();
//! let messages: Vec<_> = b"cab"
//!     .iter()
//!     .map(|&b| parse_bit_string(codebook.get(b).unwrap()).unwrap())
//!     .collect();
//! assert_eq!(decompress(&messages, &codebook).data, b"cab");
//! ```

use crate::cs::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compressors understood by the transmission envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    ShannonFano,
}

impl CompressionAlgorithm {
    pub fn label(&self) -> &'static str {
        match self {
            CompressionAlgorithm::ShannonFano => "fano-shannon",
        }
    }
}

impl Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CompressionAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fano-shannon" => Ok(CompressionAlgorithm::ShannonFano),
            other => Err(Error::UnsupportedCompression(other.to_string())),
        }
    }
}

pub mod shannon_fano;
pub use shannon_fano::{
    build_code, build_codebook, compute_probabilities, decompress, partition, Codebook,
    DecompressStats, Decompressed, InverseCodebook, SymbolProbability,
};
