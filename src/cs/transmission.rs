//! End-to-end transfer over a noisy channel.
//!
//! [`send`] compresses the input with a Shannon-Fano codebook, encodes every
//! symbol with a cyclic code, corrupts the stream and packs it into bytes.
//! The result is an [`Envelope`] carrying everything the receiving side needs.
//! [`receive`] reverses the pipeline and reports how much of the payload
//! survived the trip.
//!
//! # Examples
//!
//! ```rust
//! use fano_cyclic::cs::channel::FixedFlips;
//! use fano_cyclic::cs::ecc::Generator;
//! use fano_cyclic::cs::transmission::{receive, send, Envelope};
//!
//! let generator = Generator::default();
//! let envelope = send(b"attack at dawn", &generator, &mut FixedFlips::new([3])).unwrap();
//!
//! let json = envelope.to_json().unwrap();
//! let received = receive(&Envelope::from_json(&json).unwrap()).unwrap();
//! assert_eq!(received.data, b"attack at dawn");
//! assert_eq!(received.report.corrected, 1);
//! assert!(received.report.sha256_matches);
//! ```

pub mod config;
pub mod entropy;

pub use config::TransmissionConfig;
pub use entropy::{sha256_hex, shannon_entropy};

use crate::cs::channel::{apply_flips, BinarySymmetricChannel, FlipSource, RandomFlips};
use crate::cs::compression::{build_codebook, decompress, Codebook, CompressionAlgorithm};
use crate::cs::ecc::{
    decode, derive_codewords, encode_file, pack_bits, unpack_bits, Encoding, Generator,
};
use crate::cs::error::{Error, Result};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Everything the receiver needs to rebuild the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Packed codeword blocks, hex encoded
    pub payload: String,
    pub compression_algorithm: String,
    pub encoding: String,
    /// Generator coefficients, lowest power first
    pub generator: Vec<u8>,
    /// Bits per codeword block (n)
    pub codeword_width: usize,
    /// Bytes per packed block
    pub unit_byte_width: usize,
    pub codebook: Codebook,
    /// Bits flipped by the channel on the way out
    pub flipped_bits: usize,
    /// SHA-256 of the original data
    pub sha256: String,
    /// Shannon entropy of the original data, in bits per byte
    pub entropy: f64,
}

impl Envelope {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compresses, encodes, corrupts and packs `data`
pub fn send<S: FlipSource + ?Sized>(
    data: &[u8],
    generator: &Generator,
    noise: &mut S,
) -> Result<Envelope> {
    let codebook = build_codebook(data)?;
    let codewords = derive_codewords(&codebook, generator)?;
    let stream = encode_file(data, &codewords)?;
    let noisy = apply_flips(&stream, codewords.width(), noise)?;
    let packed = pack_bits(&noisy.blocks)?;

    info!(
        "sending {} bytes as {} blocks of {} bits ({} packed bytes)",
        data.len(),
        noisy.blocks.len(),
        codewords.width(),
        packed.bytes.len()
    );

    Ok(Envelope {
        payload: hex::encode(&packed.bytes),
        compression_algorithm: CompressionAlgorithm::ShannonFano.label().to_string(),
        encoding: Encoding::Cyclic.label().to_string(),
        generator: generator.coefficients(),
        codeword_width: codewords.width(),
        unit_byte_width: packed.unit_byte_width,
        codebook,
        flipped_bits: noisy.flipped,
        sha256: sha256_hex(data),
        entropy: shannon_entropy(data),
    })
}

/// [`send`] through a binary symmetric channel driven by `rng`
pub fn send_over<R: Rng + ?Sized>(
    data: &[u8],
    generator: &Generator,
    channel: &BinarySymmetricChannel,
    rng: &mut R,
) -> Result<Envelope> {
    send(
        data,
        generator,
        &mut RandomFlips::new(rng, channel.flip_probability())?,
    )
}

/// Receiver-side summary of a transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub bytes_received: usize,
    pub blocks: usize,
    pub flipped_bits: usize,
    /// Blocks with a non-zero syndrome
    pub detected: usize,
    /// Blocks repaired by the decoder
    pub corrected: usize,
    pub uncorrectable: usize,
    /// Blocks whose message matched no codeword
    pub dropped: usize,
    pub sent_sha256: String,
    pub received_sha256: String,
    pub sha256_matches: bool,
    pub sent_entropy: f64,
    pub received_entropy: f64,
}

impl Display for TransferReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "blocks:          {}", self.blocks)?;
        writeln!(f, "flipped bits:    {}", self.flipped_bits)?;
        writeln!(f, "detected:        {}", self.detected)?;
        writeln!(f, "corrected:       {}", self.corrected)?;
        writeln!(f, "uncorrectable:   {}", self.uncorrectable)?;
        writeln!(f, "dropped:         {}", self.dropped)?;
        writeln!(f, "bytes received:  {}", self.bytes_received)?;
        writeln!(f, "sent sha256:     {}", self.sent_sha256)?;
        writeln!(f, "received sha256: {}", self.received_sha256)?;
        writeln!(
            f,
            "entropy:         {:.4} -> {:.4} bits/byte",
            self.sent_entropy, self.received_entropy
        )?;
        write!(
            f,
            "integrity:       {}",
            if self.sha256_matches { "ok" } else { "MISMATCH" }
        )
    }
}

/// Recovered data and what it took to recover it
#[derive(Debug, Clone, PartialEq)]
pub struct Reception {
    pub data: Vec<u8>,
    pub report: TransferReport,
}

/// Unpacks, decodes and decompresses an envelope
pub fn receive(envelope: &Envelope) -> Result<Reception> {
    envelope
        .compression_algorithm
        .parse::<CompressionAlgorithm>()?;
    let generator = Generator::from_coefficients(&envelope.generator)?;

    let message_width = envelope.codebook.width();
    if envelope.codeword_width != message_width + generator.degree() {
        return Err(Error::LengthMismatch {
            left: envelope.codeword_width,
            right: message_width + generator.degree(),
        });
    }

    if envelope.unit_byte_width != envelope.codeword_width.div_ceil(8) {
        return Err(Error::InvalidParameter(format!(
            "{}-bit blocks are packed into {}-byte units, not {}",
            envelope.codeword_width,
            envelope.codeword_width.div_ceil(8),
            envelope.unit_byte_width
        )));
    }

    let bytes = hex::decode(&envelope.payload)
        .map_err(|e| Error::InvalidInput(format!("payload is not valid hex: {}", e)))?;
    let blocks = unpack_bits(&bytes, envelope.unit_byte_width, envelope.codeword_width)?;
    let outcome = decode(&blocks, &generator, &envelope.encoding)?;
    let decompressed = decompress(&outcome.messages, &envelope.codebook);

    let received_sha256 = sha256_hex(&decompressed.data);
    let sha256_matches = received_sha256 == envelope.sha256;
    if !sha256_matches {
        warn!(
            "integrity check failed: expected {}, got {}",
            envelope.sha256, received_sha256
        );
    }

    let report = TransferReport {
        bytes_received: decompressed.data.len(),
        blocks: blocks.len(),
        flipped_bits: envelope.flipped_bits,
        detected: outcome.detected,
        corrected: outcome.corrected,
        uncorrectable: outcome.uncorrectable.len(),
        dropped: decompressed.stats.dropped.len(),
        sent_sha256: envelope.sha256.clone(),
        received_sha256,
        sha256_matches,
        sent_entropy: envelope.entropy,
        received_entropy: shannon_entropy(&decompressed.data),
    };

    Ok(Reception {
        data: decompressed.data,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::channel::{FixedFlips, NoFlips};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const TEXT: &[u8] = b"the quick brown fox jumps over the lazy dog";

    #[test]
    fn test_noiseless_round_trip() {
        let envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        assert_eq!(envelope.flipped_bits, 0);
        assert_eq!(envelope.compression_algorithm, "fano-shannon");
        assert_eq!(envelope.encoding, "cyclic");

        let received = receive(&envelope).unwrap();
        assert_eq!(received.data, TEXT);
        assert_eq!(received.report.detected, 0);
        assert_eq!(received.report.blocks, TEXT.len());
        assert!(received.report.sha256_matches);
        assert!((received.report.sent_entropy - received.report.received_entropy).abs() < 1e-12);
    }

    #[test]
    fn test_one_flip_per_block_is_corrected() {
        let generator = Generator::default();
        let clean = send(TEXT, &generator, &mut NoFlips).unwrap();
        let n = clean.codeword_width;

        let positions = (0..TEXT.len()).map(|block| block * n + block % n);
        let envelope = send(TEXT, &generator, &mut FixedFlips::new(positions)).unwrap();
        assert_eq!(envelope.flipped_bits, TEXT.len());

        let received = receive(&envelope).unwrap();
        assert_eq!(received.data, TEXT);
        assert_eq!(received.report.detected, TEXT.len());
        assert_eq!(received.report.corrected, TEXT.len());
        assert!(received.report.sha256_matches);
    }

    #[test]
    fn test_single_symbol_input() {
        let envelope = send(b"zzzz", &Generator::default(), &mut NoFlips).unwrap();
        assert_eq!(envelope.codebook.width(), 1);
        assert_eq!(envelope.codeword_width, 7);
        assert_eq!(receive(&envelope).unwrap().data, b"zzzz");
    }

    #[test]
    fn test_json_round_trip() {
        let envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        let mut restored = Envelope::from_json(&envelope.to_json().unwrap()).unwrap();
        assert!((restored.entropy - envelope.entropy).abs() < 1e-12);
        restored.entropy = envelope.entropy;
        assert_eq!(restored, envelope);
    }

    #[test]
    fn test_heavy_noise_is_reported() {
        let channel = BinarySymmetricChannel::new(0.2).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let envelope = send_over(TEXT, &Generator::default(), &channel, &mut rng).unwrap();
        assert!(envelope.flipped_bits > 0);

        let report = receive(&envelope).unwrap().report;
        assert!(report.detected > 0);
        assert!(report.detected >= report.corrected);
        assert!(report.bytes_received <= TEXT.len());
    }

    #[test]
    fn test_rejects_unknown_labels() {
        let mut envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        envelope.encoding = "hamming".to_string();
        assert!(matches!(
            receive(&envelope),
            Err(Error::UnsupportedEncoding(_))
        ));

        envelope.encoding = "cyclic".to_string();
        envelope.compression_algorithm = "lzw".to_string();
        assert!(matches!(
            receive(&envelope),
            Err(Error::UnsupportedCompression(_))
        ));
    }

    #[test]
    fn test_rejects_bad_payload() {
        let mut envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        envelope.payload.push('z');
        assert!(matches!(receive(&envelope), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_inconsistent_widths() {
        let mut envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        envelope.codeword_width += 1;
        assert!(matches!(
            receive(&envelope),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_unit_width() {
        let mut envelope = send(TEXT, &Generator::default(), &mut NoFlips).unwrap();
        for unit_byte_width in [0, 3, usize::MAX / 4, usize::MAX] {
            envelope.unit_byte_width = unit_byte_width;
            assert!(matches!(
                receive(&envelope),
                Err(Error::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            send(b"", &Generator::default(), &mut NoFlips),
            Err(Error::EmptyInput)
        ));
    }
}
