//! Error correction codes.
//!
//! This module provides the channel coding half of the pipeline:
//! - GF(2) polynomial arithmetic on fixed-width coefficient vectors
//! - Cyclic codes built from a generator polynomial, with single-bit error correction
//! - Byte packing of fixed-width codeword blocks
//!
//! # Error Correction
//!
//! A cyclic code multiplies each k-bit message by a generator polynomial of
//! degree d, producing n = k + d bit blocks. Dividing a received block by the
//! generator leaves a remainder (the syndrome) that is zero for an intact block
//! and identifies the flipped bit when exactly one bit was corrupted.
//!
//! # Examples
//!
//! ```rust
//! use fano_cyclic::cs::compression::build_codebook;
//! use fano_cyclic::cs::ecc::{decode, derive_codewords, encode_file, pack_bits, split_blocks, unpack_bits, Generator};
//!
//! let data = b"hello";
//! let generator = Generator::default();
//! let codebook = build_codebook(data).unwrap();
//! let codewords = derive_codewords(&codebook, &generator).unwrap();
//!
//! let stream = encode_file(data, &codewords).unwrap();
//! let blocks = split_blocks(&stream, codewords.width()).unwrap();
//! let packed = pack_bits(&blocks).unwrap();
//!
//! let received = unpack_bits(&packed.bytes, packed.unit_byte_width, codewords.width()).unwrap();
//! let outcome = decode(&received, &generator, "cyclic").unwrap();
//! assert_eq!(outcome.messages.len(), data.len());
//! assert_eq!(outcome.detected, 0);
//! ```

use crate::cs::error::Error;

/// Result type for error correction operations
pub type Result<T> = std::result::Result<T, Error>;

pub mod cyclic;
pub mod packing;
pub mod polynomial;

pub use cyclic::{
    decode, decode_block, derive_codewords, encode_file, BlockStatus, CyclicCode, DecodeOutcome,
    DecodedBlock, Encoding, Generator, SymbolCodewords,
};
pub use packing::{pack_bits, split_blocks, unpack_bits, PackedBits};
pub use polynomial::{Bits, Polynomial};
