//! Cyclic code over GF(2) built from a generator polynomial.
//!
//! A k-bit message m(x) is encoded as the codeword c(x) = m(x)g(x), where g(x)
//! is the generator of degree d, giving n = k + d bit blocks. The receiver sees
//! r(x) = c(x) + e(x) and divides by g(x): for an error-free block the quotient
//! is m(x) and the remainder (the syndrome) is zero.
//!
//! A non-zero syndrome means the block was corrupted. Every single-bit error
//! pattern x^j has the syndrome x^j mod g(x); those syndromes are tabulated when
//! the code is built, so a received syndrome found in the table names the bit to
//! flip. A syndrome that is a single term x^j with j < d always resolves to bit j.
//! Syndromes missing from the table come from two or more errors; such blocks
//! are counted and their quotient is passed on as-is.
//!
//! # Examples
//!
//! ```
//! use fano_cyclic::cs::ecc::{BlockStatus, CyclicCode, Generator};
//! use fano_cyclic::cs::ecc::polynomial::parse_bit_string;
//!
//! let generator: Generator = "1011".parse().unwrap();
//! let code = CyclicCode::new(generator, 4).unwrap();
//!
//! let message = parse_bit_string("1101").unwrap();
//! let mut block = code.encode_message(&message).unwrap();
//! assert_eq!(block.len(), 7);
//!
//! let bit = block[2];
//! block.set(2, !bit);
//! let decoded = code.decode_block(&block).unwrap();
//! assert_eq!(decoded.message, message);
//! assert_eq!(decoded.status, BlockStatus::Corrected { position: 2 });
//! ```

use crate::cs::compression::Codebook;
use crate::cs::ecc::polynomial::{parse_bit_string, to_bit_string, Bits, Polynomial};
use crate::cs::ecc::Result;
use crate::cs::error::Error;
use bitvec::prelude::*;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 1 + x + x^6
const DEFAULT_GENERATOR: [u8; 7] = [1, 1, 0, 0, 0, 0, 1];

/// Channel codes understood by [`decode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Generator-polynomial cyclic code
    Cyclic,
}

impl Encoding {
    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Cyclic => "cyclic",
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cyclic" => Ok(Encoding::Cyclic),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Generator polynomial of a cyclic code.
///
/// Stored trimmed to `degree + 1` coefficients and never modified; callers get
/// zero-padded copies through [`Generator::padded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    polynomial: Polynomial,
}

impl Generator {
    /// Creates a generator from any non-zero polynomial.
    ///
    /// # Arguments
    ///
    /// * `polynomial` - Coefficients of g(x); high zero coefficients are dropped
    ///
    /// # Returns
    ///
    /// The trimmed generator, or `InvalidParameter` for the zero polynomial
    pub fn new(polynomial: &Polynomial) -> Result<Self> {
        let degree = polynomial.leading_degree().ok_or_else(|| {
            Error::InvalidParameter("generator polynomial must be non-zero".to_string())
        })?;
        Ok(Self {
            polynomial: polynomial.resized(degree + 1),
        })
    }

    /// Creates a generator from 0/1 coefficients, x^0 first
    pub fn from_coefficients(coefficients: &[u8]) -> Result<Self> {
        Self::new(&Polynomial::from_coefficients(coefficients)?)
    }

    pub fn degree(&self) -> usize {
        self.polynomial.degree()
    }

    pub fn coefficients(&self) -> Vec<u8> {
        self.polynomial.coefficients()
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// A copy zero-padded to `width` coefficients
    pub fn padded(&self, width: usize) -> Result<Polynomial> {
        if width < self.polynomial.width() {
            return Err(Error::LengthMismatch {
                left: self.polynomial.width(),
                right: width,
            });
        }
        Ok(self.polynomial.resized(width))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            polynomial: Polynomial::from_bits(DEFAULT_GENERATOR.iter().map(|&c| c == 1).collect()),
        }
    }
}

impl Display for Generator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.polynomial, f)
    }
}

impl FromStr for Generator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(&s.parse()?)
    }
}

/// How a single block was decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Zero syndrome
    Clean,
    /// Single-bit error at `position` of the received block, flipped back
    Corrected { position: usize },
    /// Syndrome matches no single-bit error; the message may be wrong
    Uncorrectable,
}

/// Message recovered from one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    /// The k-bit message
    pub message: Bits,
    pub status: BlockStatus,
}

/// Result of decoding a whole transmission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOutcome {
    /// One k-bit message per block, in block order
    pub messages: Vec<Bits>,
    /// Blocks with a non-zero syndrome (corrected or not)
    pub detected: usize,
    /// Blocks repaired by flipping a single bit
    pub corrected: usize,
    /// Indices of blocks whose syndrome could not be resolved
    pub uncorrectable: Vec<usize>,
}

/// Fixed-width codeword for every symbol of a codebook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCodewords {
    codewords: BTreeMap<u8, Bits>,
    width: usize,
}

impl SymbolCodewords {
    /// Codeword width n
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codewords.get(&symbol).map(|codeword| codeword.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> {
        self.codewords
            .iter()
            .map(|(&symbol, codeword)| (symbol, codeword.as_bitslice()))
    }
}

/// A cyclic code with fixed message width k and codeword width n = k + deg(g)
#[derive(Debug, Clone)]
pub struct CyclicCode {
    generator: Generator,
    /// Generator zero-padded to the codeword width
    padded_generator: Polynomial,
    message_width: usize,
    codeword_width: usize,
    /// Syndrome (as set positions) to the lowest single-bit error position producing it
    syndromes: HashMap<Vec<usize>, usize>,
}

impl CyclicCode {
    /// Creates a code carrying `message_width` bits per block.
    ///
    /// # Arguments
    ///
    /// * `generator` - Generator polynomial g(x) of degree d
    /// * `message_width` - Message bits k per block; blocks are k + d bits wide
    ///
    /// # Returns
    ///
    /// The code with its single-error syndrome table built, or an error if
    /// `message_width` is zero
    pub fn new(generator: Generator, message_width: usize) -> Result<Self> {
        if message_width == 0 {
            return Err(Error::InvalidParameter(
                "message width must be positive".to_string(),
            ));
        }

        let codeword_width = message_width + generator.degree();
        let padded_generator = generator.padded(codeword_width)?;
        let syndromes = build_syndrome_table(&padded_generator)?;

        debug!(
            "cyclic code n = {}, k = {}, deg(g) = {}, {} distinct single-error syndromes",
            codeword_width,
            message_width,
            generator.degree(),
            syndromes.len()
        );

        Ok(Self {
            generator,
            padded_generator,
            message_width,
            codeword_width,
            syndromes,
        })
    }

    /// Creates the code whose blocks are `block_width` bits wide
    pub fn for_block_width(generator: Generator, block_width: usize) -> Result<Self> {
        if block_width <= generator.degree() {
            return Err(Error::InvalidParameter(format!(
                "block width {} must exceed the generator degree {}",
                block_width,
                generator.degree()
            )));
        }
        let message_width = block_width - generator.degree();
        Self::new(generator, message_width)
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Message width k
    pub fn message_width(&self) -> usize {
        self.message_width
    }

    /// Codeword width n
    pub fn codeword_width(&self) -> usize {
        self.codeword_width
    }

    /// Encodes one k-bit message as the n-bit product m(x)g(x)
    pub fn encode_message(&self, message: &BitSlice<u8, Msb0>) -> Result<Bits> {
        if message.len() != self.message_width {
            return Err(Error::LengthMismatch {
                left: message.len(),
                right: self.message_width,
            });
        }
        let message = Polynomial::from_bitslice(message).resized(self.codeword_width);
        Ok(message.cyclic_product(&self.padded_generator)?.into_bits())
    }

    /// Derives the codeword of every symbol in `codebook`
    pub fn derive_codewords(&self, codebook: &Codebook) -> Result<SymbolCodewords> {
        if codebook.width() != self.message_width {
            return Err(Error::LengthMismatch {
                left: codebook.width(),
                right: self.message_width,
            });
        }

        let codewords = codebook
            .codes()
            .par_iter()
            .map(|(&symbol, code)| {
                let codeword = self.encode_message(&parse_bit_string(code)?)?;
                Ok((symbol, codeword))
            })
            .collect::<Result<BTreeMap<u8, Bits>>>()?;

        if log::log_enabled!(log::Level::Debug) {
            for (symbol, codeword) in &codewords {
                debug!(
                    "symbol {:#04x}: {} -> {}",
                    symbol,
                    codebook.get(*symbol).unwrap_or_default(),
                    to_bit_string(codeword)
                );
            }
        }
        info!(
            "derived {} cyclic codewords of width {}",
            codewords.len(),
            self.codeword_width
        );

        Ok(SymbolCodewords {
            codewords,
            width: self.codeword_width,
        })
    }

    /// Divides one received block by the generator and repairs a single-bit error
    pub fn decode_block(&self, block: &BitSlice<u8, Msb0>) -> Result<DecodedBlock> {
        if block.len() != self.codeword_width {
            return Err(Error::LengthMismatch {
                left: block.len(),
                right: self.codeword_width,
            });
        }

        let received = Polynomial::from_bitslice(block);
        let (quotient, syndrome) = received.divide(&self.padded_generator)?;

        let (quotient, status) = if syndrome.is_zero() {
            (quotient, BlockStatus::Clean)
        } else {
            match self.syndromes.get(&syndrome_key(&syndrome)) {
                Some(&position) => {
                    let error = Polynomial::monomial(position, self.codeword_width)?;
                    let (repaired, _) = received.xor(&error)?.divide(&self.padded_generator)?;
                    (repaired, BlockStatus::Corrected { position })
                }
                None => (quotient, BlockStatus::Uncorrectable),
            }
        };

        let mut message = quotient.into_bits();
        message.truncate(self.message_width);
        Ok(DecodedBlock { message, status })
    }

    /// Decodes every block, keeping block order
    pub fn decode_blocks(&self, blocks: &[Bits]) -> Result<DecodeOutcome> {
        let decoded = blocks
            .par_iter()
            .map(|block| self.decode_block(block))
            .collect::<Result<Vec<_>>>()?;

        let mut outcome = DecodeOutcome {
            messages: Vec::with_capacity(decoded.len()),
            ..DecodeOutcome::default()
        };
        for (index, block) in decoded.into_iter().enumerate() {
            match block.status {
                BlockStatus::Clean => {}
                BlockStatus::Corrected { position } => {
                    debug!("block {}: corrected bit {}", index, position);
                    outcome.detected += 1;
                    outcome.corrected += 1;
                }
                BlockStatus::Uncorrectable => {
                    warn!("block {}: uncorrectable syndrome", index);
                    outcome.detected += 1;
                    outcome.uncorrectable.push(index);
                }
            }
            outcome.messages.push(block.message);
        }

        info!(
            "decoded {} blocks: {} with errors, {} corrected",
            outcome.messages.len(),
            outcome.detected,
            outcome.corrected
        );
        Ok(outcome)
    }
}

/// Tabulates the syndrome of x^j for every position j of the codeword.
///
/// Positions sharing a syndrome cannot be told apart; the lowest one is kept.
fn build_syndrome_table(generator: &Polynomial) -> Result<HashMap<Vec<usize>, usize>> {
    let width = generator.width();
    let mut table = HashMap::with_capacity(width);
    let mut shared = 0;
    for position in 0..width {
        let (_, syndrome) = Polynomial::monomial(position, width)?.divide(generator)?;
        if syndrome.is_zero() {
            continue;
        }
        if table.contains_key(&syndrome_key(&syndrome)) {
            shared += 1;
        } else {
            table.insert(syndrome_key(&syndrome), position);
        }
    }
    if shared > 0 {
        warn!(
            "{} error positions share a syndrome with a lower position at width {}",
            shared, width
        );
    }
    Ok(table)
}

fn syndrome_key(syndrome: &Polynomial) -> Vec<usize> {
    syndrome.bits().iter_ones().collect()
}

/// Derives the cyclic codeword of every codebook symbol, returning them with width n
pub fn derive_codewords(codebook: &Codebook, generator: &Generator) -> Result<SymbolCodewords> {
    CyclicCode::new(generator.clone(), codebook.width())?.derive_codewords(codebook)
}

/// Concatenates, in input order, the codeword of every byte
pub fn encode_file(data: &[u8], codewords: &SymbolCodewords) -> Result<Bits> {
    let mut stream = Bits::with_capacity(data.len() * codewords.width());
    for &byte in data {
        let codeword = codewords.get(byte).ok_or(Error::UnknownSymbol(byte))?;
        stream.extend_from_bitslice(codeword);
    }
    info!(
        "encoded {} bytes into {} bits ({} bits per symbol)",
        data.len(),
        stream.len(),
        codewords.width()
    );
    Ok(stream)
}

/// Decodes a single block against `generator`; the block width fixes n
pub fn decode_block(block: &BitSlice<u8, Msb0>, generator: &Generator) -> Result<DecodedBlock> {
    CyclicCode::for_block_width(generator.clone(), block.len())?.decode_block(block)
}

/// Decodes a sequence of equal-width blocks.
///
/// `encoding` must name the cyclic scheme; the width of the first block fixes n.
pub fn decode(blocks: &[Bits], generator: &Generator, encoding: &str) -> Result<DecodeOutcome> {
    encoding.parse::<Encoding>()?;
    let Some(first) = blocks.first() else {
        return Ok(DecodeOutcome::default());
    };
    CyclicCode::for_block_width(generator.clone(), first.len())?.decode_blocks(blocks)
}
