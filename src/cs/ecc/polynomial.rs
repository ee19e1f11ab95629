//! Polynomial arithmetic over GF(2) on fixed-width coefficient vectors.
//!
//! A polynomial is stored as a bit vector where index `i` holds the coefficient
//! of x^i. Every polynomial has an explicit width (the working codeword length);
//! operations that combine two polynomials require both to share that width, so
//! callers zero-pad shorter operands with [`Polynomial::resized`] first.
//!
//! Addition over GF(2) is XOR, so subtraction is XOR as well, and long division
//! reduces to repeatedly XOR-ing a shifted divisor into the remainder.
//!
//! # Examples
//!
//! ```
//! use fano_cyclic::cs::ecc::Polynomial;
//!
//! // 1 + x + x^3 divided by itself
//! let p: Polynomial = "1101".parse().unwrap();
//! let (quotient, remainder) = p.divide(&p).unwrap();
//! assert_eq!(quotient.to_string(), "1000");
//! assert!(remainder.is_zero());
//! ```

use crate::cs::ecc::Result;
use crate::cs::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Owned bit sequence used for codewords, blocks and bit streams
pub type Bits = BitVec<u8, Msb0>;

/// A GF(2) polynomial of fixed width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    /// Coefficient of x^i at index i
    coefficients: Bits,
}

impl Polynomial {
    /// The all-zero polynomial of the given width
    pub fn zero(width: usize) -> Self {
        Self {
            coefficients: bitvec![u8, Msb0; 0; width],
        }
    }

    /// The monomial x^power in a polynomial of the given width
    pub fn monomial(power: usize, width: usize) -> Result<Self> {
        if power >= width {
            return Err(Error::InvalidParameter(format!(
                "x^{} does not fit in width {}",
                power, width
            )));
        }
        let mut monomial = Self::zero(width);
        monomial.coefficients.set(power, true);
        Ok(monomial)
    }

    /// Wraps an owned bit vector, index 0 being the constant term
    pub fn from_bits(coefficients: Bits) -> Self {
        Self { coefficients }
    }

    /// Copies a bit slice, index 0 being the constant term
    pub fn from_bitslice(coefficients: &BitSlice<u8, Msb0>) -> Self {
        Self {
            coefficients: coefficients.to_bitvec(),
        }
    }

    /// Builds a polynomial from a list of 0/1 coefficients
    pub fn from_coefficients(coefficients: &[u8]) -> Result<Self> {
        let coefficients = coefficients
            .iter()
            .enumerate()
            .map(|(power, &coefficient)| match coefficient {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(Error::InvalidInput(format!(
                    "coefficient of x^{} must be 0 or 1, got {}",
                    power, other
                ))),
            })
            .collect::<Result<Bits>>()?;
        Ok(Self { coefficients })
    }

    /// Coefficients as a list of 0/1 values
    pub fn coefficients(&self) -> Vec<u8> {
        self.coefficients.iter().by_vals().map(u8::from).collect()
    }

    /// Number of coefficients, including zero padding
    pub fn width(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient of x^power; positions beyond the width read as zero
    pub fn coefficient(&self, power: usize) -> bool {
        self.coefficients.get(power).map_or(false, |bit| *bit)
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.coefficients
    }

    pub fn into_bits(self) -> Bits {
        self.coefficients
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.not_any()
    }

    /// Number of non-zero coefficients
    pub fn weight(&self) -> usize {
        self.coefficients.count_ones()
    }

    /// Highest power with a non-zero coefficient, or `None` for the zero polynomial
    pub fn leading_degree(&self) -> Option<usize> {
        self.coefficients.iter().by_vals().rposition(|bit| bit)
    }

    /// Highest power with a non-zero coefficient.
    ///
    /// The zero polynomial reports degree 0, the same as a non-zero constant.
    /// Use [`Polynomial::leading_degree`] or [`Polynomial::is_zero`] when the two
    /// must be told apart.
    pub fn degree(&self) -> usize {
        self.leading_degree().unwrap_or(0)
    }

    /// Zero-pads (or truncates) to the given width
    pub fn resized(&self, width: usize) -> Self {
        let mut coefficients = self.coefficients.clone();
        coefficients.resize(width, false);
        Self { coefficients }
    }

    /// Rotates the coefficients `shift` places towards higher powers, wrapping
    /// x^(width-1) around to x^0.
    ///
    /// A negative shift leaves the polynomial unchanged.
    pub fn cyclic_shift(&self, shift: isize) -> Self {
        let width = self.width();
        if shift < 0 || width == 0 {
            return self.clone();
        }
        let amount = shift as usize % width;
        if amount == 0 {
            return self.clone();
        }
        let mut coefficients = self.coefficients.clone();
        coefficients.rotate_right(amount);
        Self { coefficients }
    }

    /// Coefficient-wise XOR (addition over GF(2))
    pub fn xor(&self, other: &Self) -> Result<Self> {
        self.ensure_same_width(other)?;
        let coefficients = self
            .coefficients
            .iter()
            .by_vals()
            .zip(other.coefficients.iter().by_vals())
            .map(|(a, b)| a ^ b)
            .collect();
        Ok(Self { coefficients })
    }

    /// Product modulo x^width - 1, computed by shift-and-XOR.
    ///
    /// When the degrees of both factors sum to less than the width nothing wraps
    /// and this is the ordinary polynomial product.
    pub fn cyclic_product(&self, other: &Self) -> Result<Self> {
        self.ensure_same_width(other)?;
        let mut product = Self::zero(self.width());
        for power in self.coefficients.iter_ones() {
            product = product.xor(&other.cyclic_shift(power as isize))?;
        }
        Ok(product)
    }

    /// Long division, returning `(quotient, remainder)` at this polynomial's width.
    ///
    /// Terminates once the remainder is zero or its degree drops below the
    /// divisor's, so a constant divisor (degree 0) reduces the remainder to zero.
    pub fn divide(&self, divisor: &Self) -> Result<(Self, Self)> {
        self.ensure_same_width(divisor)?;
        let divisor_degree = divisor.leading_degree().ok_or(Error::DivisionByZero)?;

        let mut quotient = Self::zero(self.width());
        let mut remainder = self.clone();
        while let Some(remainder_degree) = remainder.leading_degree() {
            if remainder_degree < divisor_degree {
                break;
            }
            let shift = remainder_degree - divisor_degree;
            quotient.coefficients.set(shift, true);
            remainder = remainder.xor(&divisor.cyclic_shift(shift as isize))?;
        }

        Ok((quotient, remainder))
    }

    fn ensure_same_width(&self, other: &Self) -> Result<()> {
        if self.width() != other.width() {
            return Err(Error::LengthMismatch {
                left: self.width(),
                right: other.width(),
            });
        }
        Ok(())
    }
}

impl Display for Polynomial {
    /// Coefficients from x^0 upwards, e.g. `1011` for 1 + x^2 + x^3
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&to_bit_string(&self.coefficients))
    }
}

impl FromStr for Polynomial {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_bit_string(s).map(Self::from_bits)
    }
}

/// Renders bits as a string of `'0'`/`'1'` characters, index 0 first
pub fn to_bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

/// Parses a string of `'0'`/`'1'` characters, index 0 first
pub fn parse_bit_string(s: &str) -> Result<Bits> {
    s.chars()
        .enumerate()
        .map(|(i, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(Error::InvalidInput(format!(
                "expected '0' or '1' at position {}, got {:?}",
                i, other
            ))),
        })
        .collect()
}
