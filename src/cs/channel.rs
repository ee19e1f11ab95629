//! Binary symmetric channel.
//!
//! Every transmitted bit is flipped independently with a fixed probability.
//! Which bits flip is decided by a [`FlipSource`]: [`RandomFlips`] draws from
//! any `rand` generator, while [`FixedFlips`] replays an explicit list of
//! positions so tests can place errors exactly.
//!
//! # Examples
//!
//! ```
//! use fano_cyclic::cs::channel::{apply_flips, FixedFlips};
//! use fano_cyclic::cs::ecc::polynomial::{parse_bit_string, to_bit_string};
//!
//! let bits = parse_bit_string("00000000").unwrap();
//! let noisy = apply_flips(&bits, 4, &mut FixedFlips::new([1, 6])).unwrap();
//! assert_eq!(noisy.flipped, 2);
//! assert_eq!(to_bit_string(&noisy.blocks[0]), "0100");
//! assert_eq!(to_bit_string(&noisy.blocks[1]), "0010");
//! ```

use crate::cs::ecc::packing::split_blocks;
use crate::cs::ecc::polynomial::Bits;
use crate::cs::error::{Error, Result};
use bitvec::prelude::*;
use log::info;
use rand::Rng;
use std::collections::BTreeSet;

/// Decides, bit by bit, whether the channel corrupts a transmitted bit
pub trait FlipSource {
    /// Whether the bit at `position` of the stream is flipped
    fn flips(&mut self, position: usize) -> bool;
}

/// Flips each bit with a fixed probability using a random generator
#[derive(Debug, Clone)]
pub struct RandomFlips<R> {
    rng: R,
    probability: f64,
}

impl<R: Rng> RandomFlips<R> {
    /// Creates a random flip source.
    ///
    /// # Arguments
    ///
    /// * `rng` - Random generator the flips are drawn from
    /// * `probability` - Chance that any single bit is flipped
    ///
    /// # Returns
    ///
    /// The flip source, or `InvalidParameter` if `probability` is outside `[0, 1]`
    pub fn new(rng: R, probability: f64) -> Result<Self> {
        validate_probability(probability)?;
        Ok(Self { rng, probability })
    }
}

impl<R: Rng> FlipSource for RandomFlips<R> {
    fn flips(&mut self, _position: usize) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Flips exactly the listed stream positions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedFlips {
    positions: BTreeSet<usize>,
}

impl FixedFlips {
    pub fn new(positions: impl IntoIterator<Item = usize>) -> Self {
        Self {
            positions: positions.into_iter().collect(),
        }
    }
}

impl FlipSource for FixedFlips {
    fn flips(&mut self, position: usize) -> bool {
        self.positions.contains(&position)
    }
}

/// A noiseless channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFlips;

impl FlipSource for NoFlips {
    fn flips(&mut self, _position: usize) -> bool {
        false
    }
}

/// Corrupted transmission, already cut into blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoisyTransmission {
    pub blocks: Vec<Bits>,
    /// Number of bits the channel flipped
    pub flipped: usize,
}

/// Checks that `probability` lies in `[0, 1]`
pub fn validate_probability(probability: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(Error::InvalidParameter(format!(
            "flip probability must be within [0, 1], got {}",
            probability
        )));
    }
    Ok(())
}

/// Flips the bits chosen by `source`, then cuts the stream into `block_width`-bit blocks
pub fn apply_flips<S: FlipSource + ?Sized>(
    bits: &BitSlice<u8, Msb0>,
    block_width: usize,
    source: &mut S,
) -> Result<NoisyTransmission> {
    if block_width == 0 {
        return Err(Error::InvalidParameter(
            "block width must be positive".to_string(),
        ));
    }

    let mut corrupted = bits.to_bitvec();
    let mut flipped = 0;
    for position in 0..corrupted.len() {
        if source.flips(position) {
            let bit = corrupted[position];
            corrupted.set(position, !bit);
            flipped += 1;
        }
    }

    if !corrupted.is_empty() {
        info!(
            "channel flipped {} of {} bits ({:.3}%)",
            flipped,
            corrupted.len(),
            flipped as f64 * 100.0 / corrupted.len() as f64
        );
    }

    Ok(NoisyTransmission {
        blocks: split_blocks(&corrupted, block_width)?,
        flipped,
    })
}

/// Flips every bit independently with `flip_probability`
pub fn apply_noise<R: Rng + ?Sized>(
    bits: &BitSlice<u8, Msb0>,
    block_width: usize,
    flip_probability: f64,
    rng: &mut R,
) -> Result<NoisyTransmission> {
    apply_flips(bits, block_width, &mut RandomFlips::new(rng, flip_probability)?)
}

/// Memoryless channel flipping each bit with a fixed probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinarySymmetricChannel {
    flip_probability: f64,
}

impl BinarySymmetricChannel {
    /// Creates a channel flipping each bit with `flip_probability`, which must lie in `[0, 1]`
    pub fn new(flip_probability: f64) -> Result<Self> {
        validate_probability(flip_probability)?;
        Ok(Self { flip_probability })
    }

    pub fn flip_probability(&self) -> f64 {
        self.flip_probability
    }

    /// Sends `bits` through the channel, returning `block_width`-bit blocks
    pub fn transmit<R: Rng + ?Sized>(
        &self,
        bits: &BitSlice<u8, Msb0>,
        block_width: usize,
        rng: &mut R,
    ) -> Result<NoisyTransmission> {
        apply_noise(bits, block_width, self.flip_probability, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::ecc::polynomial::parse_bit_string;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn stream(len: usize) -> Bits {
        (0..len).map(|i| i % 3 == 0).collect()
    }

    fn joined(blocks: &[Bits]) -> Bits {
        blocks.iter().flat_map(|b| b.iter().by_vals()).collect()
    }

    #[test]
    fn test_zero_probability_is_noiseless() {
        let bits = stream(70);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let noisy = apply_noise(&bits, 7, 0.0, &mut rng).unwrap();
        assert_eq!(noisy.flipped, 0);
        assert_eq!(noisy.blocks.len(), 10);
        assert_eq!(joined(&noisy.blocks), bits);
    }

    #[test]
    fn test_full_probability_flips_everything() {
        let bits = stream(70);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let noisy = apply_noise(&bits, 7, 1.0, &mut rng).unwrap();
        assert_eq!(noisy.flipped, 70);
        assert_eq!(joined(&noisy.blocks), !bits);
    }

    #[test]
    fn test_invalid_probability() {
        let bits = stream(8);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                apply_noise(&bits, 4, p, &mut rng),
                Err(Error::InvalidParameter(_))
            ));
        }
        assert!(BinarySymmetricChannel::new(2.0).is_err());
    }

    #[test]
    fn test_fixed_flips() {
        let bits = parse_bit_string("1111111000000").unwrap();
        let noisy = apply_flips(&bits, 7, &mut FixedFlips::new([1, 8, 40])).unwrap();
        assert_eq!(noisy.flipped, 2);
        assert_eq!(noisy.blocks, vec![
            parse_bit_string("1011111").unwrap(),
            parse_bit_string("010000").unwrap(),
        ]);
    }

    #[test]
    fn test_no_flips() {
        let bits = stream(20);
        let noisy = apply_flips(&bits, 5, &mut NoFlips).unwrap();
        assert_eq!(noisy.flipped, 0);
        assert_eq!(joined(&noisy.blocks), bits);
    }

    #[test]
    fn test_seeded_channel_is_reproducible() {
        let bits = stream(500);
        let channel = BinarySymmetricChannel::new(0.1).unwrap();
        let first = channel
            .transmit(&bits, 10, &mut ChaCha20Rng::seed_from_u64(42))
            .unwrap();
        let second = channel
            .transmit(&bits, 10, &mut ChaCha20Rng::seed_from_u64(42))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flip_rate_tracks_probability() {
        let bits = stream(20_000);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let noisy = apply_noise(&bits, 8, 0.25, &mut rng).unwrap();
        let rate = noisy.flipped as f64 / bits.len() as f64;
        assert!((rate - 0.25).abs() < 0.02, "flip rate {rate}");
    }

    #[test]
    fn test_zero_block_width() {
        let bits = stream(8);
        assert!(apply_flips(&bits, 0, &mut NoFlips).is_err());
    }
}
