use thiserror::Error;

/// Errors produced by the compression, channel coding and transmission modules.
///
/// Uncorrectable codeword blocks and decompression lookup misses are not errors:
/// they are counted in [`DecodeOutcome`](crate::cs::ecc::DecodeOutcome) and
/// [`DecompressStats`](crate::cs::compression::DecompressStats) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input such as a non-binary coefficient or a bad hex payload
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two polynomials or blocks that must share a width do not
    #[error("length mismatch: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    /// A numeric parameter is outside its domain
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Decoding was requested for an encoding other than the cyclic scheme
    #[error("unsupported encoding: {0:?}")]
    UnsupportedEncoding(String),

    /// The envelope names a compressor this crate does not implement
    #[error("unsupported compression algorithm: {0:?}")]
    UnsupportedCompression(String),

    /// Division by the all-zero polynomial
    #[error("division by the zero polynomial")]
    DivisionByZero,

    /// A byte being encoded has no codeword in the codebook
    #[error("symbol {0:#04x} has no codeword")]
    UnknownSymbol(u8),

    /// Nothing to build a codebook from, or nothing to pack
    #[error("empty input")]
    EmptyInput,

    /// Configuration could not be parsed or failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// Envelope (de)serialization failed
    #[error("envelope error: {0}")]
    Envelope(#[from] serde_json::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
