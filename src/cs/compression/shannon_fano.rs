//! Shannon-Fano statistical coding.
//!
//! Symbols (byte values) are sorted by probability and split into two groups of
//! as close to equal total probability as possible. The left group's codewords
//! get a `0`, the right group's a `1`, and each group is split again until every
//! group holds a single symbol. A symbol's codeword length is the recursion depth
//! at which it ends up alone.
//!
//! The codewords are then right-padded with `0` to a common width so that every
//! symbol maps onto a fixed-width channel block. Decompression looks each
//! received block up in the inverse map and skips blocks that match nothing.
//!
//! # Examples
//!
//! ```
//! use fano_cyclic::cs::compression::build_codebook;
//!
//! let codebook = build_codebook(b"aabccc").unwrap();
//! assert_eq!(codebook.width(), 2);
//! assert_eq!(codebook.get(b'c'), Some("00"));
//! assert_eq!(codebook.get(b'a'), Some("10"));
//! assert_eq!(codebook.get(b'b'), Some("11"));
//! ```

use crate::cs::compression::Result;
use crate::cs::ecc::polynomial::{parse_bit_string, to_bit_string, Bits};
use crate::cs::error::Error;
use bitvec::prelude::*;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Occurrence statistics of one symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolProbability {
    pub symbol: u8,
    /// Number of occurrences
    pub count: usize,
    /// Relative frequency, `count / total`
    pub probability: f64,
}

/// Counts every distinct byte and returns the symbols by descending probability.
///
/// Symbols with equal counts are ordered by ascending byte value.
pub fn compute_probabilities(data: &[u8]) -> Vec<SymbolProbability> {
    let mut counts: HashMap<u8, usize> = HashMap::new();
    for &byte in data {
        *counts.entry(byte).or_insert(0) += 1;
    }

    let total = data.len() as f64;
    let mut probabilities: Vec<SymbolProbability> = counts
        .into_iter()
        .map(|(symbol, count)| SymbolProbability {
            symbol,
            count,
            probability: count as f64 / total,
        })
        .collect();
    probabilities.sort_by(|a, b| b.count.cmp(&a.count).then(a.symbol.cmp(&b.symbol)));
    probabilities
}

/// Splits a sorted symbol list where the two halves' probabilities are closest.
///
/// Every split index in `[0, len)` is considered and the leftmost one with the
/// smallest difference wins. Counts are compared instead of probabilities; they
/// are proportional, so the chosen index is the same.
pub fn partition(sorted: &[SymbolProbability]) -> (&[SymbolProbability], &[SymbolProbability]) {
    let total: usize = sorted.iter().map(|s| s.count).sum();

    let mut left: usize = 0;
    let mut best_difference = usize::MAX;
    let mut best_index = 0;
    for (index, symbol) in sorted.iter().enumerate() {
        let difference = left.abs_diff(total - left);
        if difference < best_difference {
            best_difference = difference;
            best_index = index;
        }
        left += symbol.count;
    }

    sorted.split_at(best_index)
}

/// Assigns codewords to every symbol of a partition by recursive halving.
///
/// A lone symbol (single-symbol input) is assigned `"0"`.
pub fn build_code(
    left: &[SymbolProbability],
    right: &[SymbolProbability],
) -> BTreeMap<u8, String> {
    let mut codes: BTreeMap<u8, String> = left
        .iter()
        .chain(right)
        .map(|s| (s.symbol, String::new()))
        .collect();

    if codes.len() == 1 {
        codes.values_mut().for_each(|code| code.push('0'));
        return codes;
    }

    assign_codes(left, right, &mut codes);
    codes
}

fn assign_codes(
    left: &[SymbolProbability],
    right: &[SymbolProbability],
    codes: &mut BTreeMap<u8, String>,
) {
    if left.is_empty() || right.is_empty() {
        return;
    }

    for s in left {
        codes.entry(s.symbol).or_default().push('0');
    }
    for s in right {
        codes.entry(s.symbol).or_default().push('1');
    }

    let (left_left, left_right) = partition(left);
    assign_codes(left_left, left_right, codes);
    let (right_left, right_right) = partition(right);
    assign_codes(right_left, right_right, codes);
}

/// Symbol to fixed-width codeword mapping.
///
/// All codewords have the same width. Distinct symbols may share a codeword;
/// see [`Codebook::inverse`] for how lookups treat that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u8, String>", into = "BTreeMap<u8, String>")]
pub struct Codebook {
    codes: BTreeMap<u8, String>,
    width: usize,
}

impl Codebook {
    /// Right-pads every codeword with `'0'` to the longest codeword's width.
    ///
    /// Padding an already padded codebook changes nothing.
    ///
    /// # Arguments
    ///
    /// * `codes` - Variable-length binary codewords keyed by symbol
    ///
    /// # Returns
    ///
    /// The fixed-width codebook, or an error if `codes` is empty or holds a
    /// non-binary codeword
    pub fn pad(mut codes: BTreeMap<u8, String>) -> Result<Self> {
        if codes.is_empty() {
            return Err(Error::EmptyInput);
        }
        for code in codes.values() {
            parse_bit_string(code)?;
        }

        let width = codes.values().map(String::len).max().unwrap_or(0);
        if width == 0 {
            return Err(Error::InvalidInput(
                "codebook has only empty codewords".to_string(),
            ));
        }
        for code in codes.values_mut() {
            let missing = width - code.len();
            code.extend(std::iter::repeat('0').take(missing));
        }

        Ok(Self { codes, width })
    }

    /// Codeword width k
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, symbol: u8) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    pub fn codes(&self) -> &BTreeMap<u8, String> {
        &self.codes
    }

    /// Builds the codeword to symbol lookup.
    ///
    /// When several symbols share a codeword the lowest symbol is kept and the
    /// others are reported as collisions; blocks carrying that codeword always
    /// decompress to the kept symbol.
    pub fn inverse(&self) -> InverseCodebook {
        let mut symbols = HashMap::with_capacity(self.codes.len());
        let mut collisions = Vec::new();
        for (&symbol, code) in &self.codes {
            match symbols.entry(code.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(symbol);
                }
                Entry::Occupied(entry) => {
                    warn!(
                        "symbols {:#04x} and {:#04x} share codeword {}",
                        entry.get(),
                        symbol,
                        code
                    );
                    collisions.push((*entry.get(), symbol));
                }
            }
        }
        InverseCodebook {
            symbols,
            collisions,
        }
    }
}

impl TryFrom<BTreeMap<u8, String>> for Codebook {
    type Error = Error;

    /// Accepts only non-empty, binary, equal-width codewords
    fn try_from(codes: BTreeMap<u8, String>) -> Result<Self> {
        let width = codes.values().next().map(String::len).unwrap_or(0);
        if codes.values().any(|code| code.len() != width) {
            return Err(Error::InvalidInput(
                "codebook codewords must share one width".to_string(),
            ));
        }
        Self::pad(codes)
    }
}

impl From<Codebook> for BTreeMap<u8, String> {
    fn from(codebook: Codebook) -> Self {
        codebook.codes
    }
}

/// Codeword to symbol lookup built by [`Codebook::inverse`]
#[derive(Debug, Clone)]
pub struct InverseCodebook {
    symbols: HashMap<String, u8>,
    /// `(kept, shadowed)` symbol pairs sharing a codeword
    collisions: Vec<(u8, u8)>,
}

impl InverseCodebook {
    pub fn lookup(&self, message: &BitSlice<u8, Msb0>) -> Option<u8> {
        self.symbols.get(&to_bit_string(message)).copied()
    }

    pub fn collisions(&self) -> &[(u8, u8)] {
        &self.collisions
    }
}

/// What happened to the blocks handed to [`decompress`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompressStats {
    /// Blocks received
    pub blocks: usize,
    /// Blocks that matched a codeword
    pub recovered: usize,
    /// Indices of blocks that matched no codeword
    pub dropped: Vec<usize>,
    /// Symbols unreachable because another symbol shares their codeword
    pub collisions: usize,
}

impl DecompressStats {
    /// Fraction of blocks dropped, 0 when nothing was received
    pub fn loss_rate(&self) -> f64 {
        if self.blocks == 0 {
            0.0
        } else {
            self.dropped.len() as f64 / self.blocks as f64
        }
    }
}

/// Output of [`decompress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub data: Vec<u8>,
    pub stats: DecompressStats,
}

/// Builds the codebook for `data`: probabilities, partition, recursive codes, padding
pub fn build_codebook(data: &[u8]) -> Result<Codebook> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }

    let probabilities = compute_probabilities(data);
    debug!(
        "{} distinct symbols over {} bytes",
        probabilities.len(),
        data.len()
    );

    let (left, right) = partition(&probabilities);
    let codebook = Codebook::pad(build_code(left, right))?;

    info!(
        "built Shannon-Fano codebook: {} symbols, {} bits per codeword",
        codebook.len(),
        codebook.width()
    );
    Ok(codebook)
}

/// Maps each received message back to its symbol, dropping messages that match nothing
pub fn decompress(messages: &[Bits], codebook: &Codebook) -> Decompressed {
    let inverse = codebook.inverse();

    let mut data = Vec::with_capacity(messages.len());
    let mut stats = DecompressStats {
        blocks: messages.len(),
        collisions: inverse.collisions().len(),
        ..DecompressStats::default()
    };
    for (index, message) in messages.iter().enumerate() {
        match inverse.lookup(message) {
            Some(symbol) => data.push(symbol),
            None => {
                debug!("block {}: no symbol for {}", index, to_bit_string(message));
                stats.dropped.push(index);
            }
        }
    }
    stats.recovered = data.len();

    if !stats.dropped.is_empty() {
        warn!(
            "dropped {} of {} blocks with no matching codeword",
            stats.dropped.len(),
            stats.blocks
        );
    }
    info!("decompressed {} bytes", data.len());

    Decompressed { data, stats }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probabilities(counts: &[(u8, usize)]) -> Vec<SymbolProbability> {
        let total: usize = counts.iter().map(|&(_, c)| c).sum();
        counts
            .iter()
            .map(|&(symbol, count)| SymbolProbability {
                symbol,
                count,
                probability: count as f64 / total as f64,
            })
            .collect()
    }

    fn codes(entries: &[(u8, &str)]) -> BTreeMap<u8, String> {
        entries
            .iter()
            .map(|&(symbol, code)| (symbol, code.to_string()))
            .collect()
    }

    #[test]
    fn test_compute_probabilities() {
        let probs = compute_probabilities(b"aabccc");
        let order: Vec<u8> = probs.iter().map(|p| p.symbol).collect();
        assert_eq!(order, vec![b'c', b'a', b'b']);
        assert!((probs[0].probability - 0.5).abs() < 1e-12);
        assert_eq!(probs[2].count, 1);

        let total: f64 = probs.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_counts_sorted_by_symbol() {
        let order: Vec<u8> = compute_probabilities(b"zyxzyx")
            .iter()
            .map(|p| p.symbol)
            .collect();
        assert_eq!(order, vec![b'x', b'y', b'z']);
    }

    #[test]
    fn test_partition_balances_halves() {
        let probs = probabilities(&[(1, 1), (2, 1), (3, 1), (4, 1)]);
        let (left, right) = partition(&probs);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn test_partition_prefers_leftmost_minimum() {
        // Splits at 1 and 2 both differ by one
        let probs = probabilities(&[(1, 1), (2, 1), (3, 1)]);
        for _ in 0..3 {
            let (left, right) = partition(&probs);
            assert_eq!(left.len(), 1);
            assert_eq!(right.len(), 2);
        }
    }

    #[test]
    fn test_partition_single_and_empty() {
        let probs = probabilities(&[(7, 5)]);
        let (left, right) = partition(&probs);
        assert!(left.is_empty());
        assert_eq!(right.len(), 1);

        let (left, right) = partition(&[]);
        assert!(left.is_empty() && right.is_empty());
    }

    #[test]
    fn test_build_code() {
        let probs = compute_probabilities(b"aabccc");
        let (left, right) = partition(&probs);
        let code = build_code(left, right);
        assert_eq!(code, codes(&[(b'a', "10"), (b'b', "11"), (b'c', "0")]));
    }

    #[test]
    fn test_single_symbol_gets_zero() {
        let codebook = build_codebook(b"aaaa").unwrap();
        assert_eq!(codebook.width(), 1);
        assert_eq!(codebook.get(b'a'), Some("0"));
    }

    #[test]
    fn test_pad_is_idempotent() {
        let padded = Codebook::pad(codes(&[(1, "0"), (2, "10"), (3, "11")])).unwrap();
        assert_eq!(padded.get(1), Some("00"));
        assert_eq!(padded.width(), 2);

        let again = Codebook::pad(padded.codes().clone()).unwrap();
        assert_eq!(again, padded);
    }

    #[test]
    fn test_pad_rejects_bad_codes() {
        assert!(matches!(
            Codebook::pad(BTreeMap::new()),
            Err(Error::EmptyInput)
        ));
        assert!(Codebook::pad(codes(&[(1, "0x")])).is_err());
        assert!(Codebook::pad(codes(&[(1, "")])).is_err());
    }

    #[test]
    fn test_build_codebook_empty_input() {
        assert!(matches!(build_codebook(&[]), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_decompress_recovers_symbols() {
        let data = b"mississippi river";
        let codebook = build_codebook(data).unwrap();
        let messages: Vec<Bits> = data
            .iter()
            .map(|&b| parse_bit_string(codebook.get(b).unwrap()).unwrap())
            .collect();

        let decompressed = decompress(&messages, &codebook);
        assert_eq!(decompressed.data, data.to_vec());
        assert_eq!(decompressed.stats.recovered, data.len());
        assert!(decompressed.stats.dropped.is_empty());
        assert_eq!(decompressed.stats.loss_rate(), 0.0);
    }

    #[test]
    fn test_decompress_drops_unknown_blocks() {
        let codebook = Codebook::pad(codes(&[(b'a', "00"), (b'b', "10"), (b'c', "11")])).unwrap();
        let messages: Vec<Bits> = ["00", "01", "11"]
            .iter()
            .map(|s| parse_bit_string(s).unwrap())
            .collect();

        let decompressed = decompress(&messages, &codebook);
        assert_eq!(decompressed.data, b"ac".to_vec());
        assert_eq!(decompressed.stats.dropped, vec![1]);
        assert_eq!(decompressed.stats.blocks, 3);
    }

    #[test]
    fn test_colliding_codewords_keep_lowest_symbol() {
        let codebook = Codebook::pad(codes(&[(9, "0"), (4, "00")])).unwrap();
        let inverse = codebook.inverse();
        assert_eq!(inverse.collisions(), &[(4, 9)]);
        assert_eq!(inverse.lookup(&parse_bit_string("00").unwrap()), Some(4));

        let decompressed = decompress(&[parse_bit_string("00").unwrap()], &codebook);
        assert_eq!(decompressed.stats.collisions, 1);
    }

    #[test]
    fn test_codebook_serde() {
        let codebook = build_codebook(b"hello world").unwrap();
        let json = serde_json::to_string(&codebook).unwrap();
        let restored: Codebook = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, codebook);

        let uneven = r#"{"97":"0","98":"10"}"#;
        assert!(serde_json::from_str::<Codebook>(uneven).is_err());
    }
}
