//! Byte-aligned storage for fixed-width codeword blocks.
//!
//! Each n-bit block occupies the smallest whole number of bytes that holds it
//! and is left-padded with zero bits, so a receiver that knows the unit byte
//! width and n can cut the byte stream back into blocks.

use crate::cs::ecc::polynomial::Bits;
use crate::cs::ecc::Result;
use crate::cs::error::Error;
use bitvec::prelude::*;
use log::warn;

/// Packed blocks together with the number of bytes per block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBits {
    pub bytes: Vec<u8>,
    /// Bytes used to store one n-bit block
    pub unit_byte_width: usize,
}

/// Splits a bit stream into consecutive `block_width`-bit blocks.
///
/// A trailing partial block is kept as a shorter final block.
pub fn split_blocks(bits: &BitSlice<u8, Msb0>, block_width: usize) -> Result<Vec<Bits>> {
    if block_width == 0 {
        return Err(Error::InvalidParameter(
            "block width must be positive".to_string(),
        ));
    }
    Ok(bits.chunks(block_width).map(BitSlice::to_bitvec).collect())
}

/// Packs equal-width blocks into bytes, MSB first, each left-padded to a byte boundary
pub fn pack_bits(blocks: &[Bits]) -> Result<PackedBits> {
    let width = blocks.first().ok_or(Error::EmptyInput)?.len();
    if width == 0 {
        return Err(Error::InvalidParameter(
            "cannot pack zero-width blocks".to_string(),
        ));
    }

    let unit_byte_width = width.div_ceil(8);
    let padding = unit_byte_width * 8 - width;

    let mut packed = Bits::with_capacity(blocks.len() * unit_byte_width * 8);
    for block in blocks {
        if block.len() != width {
            return Err(Error::LengthMismatch {
                left: block.len(),
                right: width,
            });
        }
        packed.resize(packed.len() + padding, false);
        packed.extend_from_bitslice(block.as_bitslice());
    }

    Ok(PackedBits {
        bytes: packed.into_vec(),
        unit_byte_width,
    })
}

/// Cuts `bytes` into `unit_byte_width`-byte units and keeps the low `block_width` bits of each.
///
/// Trailing bytes that do not fill a whole unit are dropped.
pub fn unpack_bits(bytes: &[u8], unit_byte_width: usize, block_width: usize) -> Result<Vec<Bits>> {
    if unit_byte_width == 0 || block_width == 0 {
        return Err(Error::InvalidParameter(
            "unit byte width and block width must be positive".to_string(),
        ));
    }
    let unit_bits = unit_byte_width.checked_mul(8).ok_or_else(|| {
        Error::InvalidParameter(format!("{}-byte units are too wide", unit_byte_width))
    })?;
    if block_width > unit_bits {
        return Err(Error::InvalidParameter(format!(
            "{}-bit blocks do not fit in {}-byte units",
            block_width, unit_byte_width
        )));
    }

    let padding = unit_bits - block_width;
    let units = bytes.chunks_exact(unit_byte_width);
    if !units.remainder().is_empty() {
        warn!(
            "dropping {} trailing bytes that do not fill a {}-byte unit",
            units.remainder().len(),
            unit_byte_width
        );
    }

    Ok(units
        .map(|unit| unit.view_bits::<Msb0>()[padding..].to_bitvec())
        .collect())
}
