//! Packed, arbitrary-width 4-state logic values.
//!
//! [`LogicValue`] is the runtime value carried by every signal: a fixed-width
//! vector of [`LogicBit`]s packed two bits per slot, with arithmetic, bitwise,
//! shift, relational, and slicing operations that follow 4-state x-propagation
//! rules throughout.

use crate::bit::LogicBit;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Not, Rem, Shl, Shr, Sub};
use thiserror::Error;

/// Number of logic values packed per `u64` word.
const VALUES_PER_WORD: u32 = 32;

/// Errors raised while constructing or operating on [`LogicValue`]s.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Two operands had incompatible widths for an operation that requires
    /// equal widths.
    #[error("width mismatch: expected {expected}, found {found}")]
    WidthMismatch {
        /// The expected width.
        expected: u32,
        /// The width actually found.
        found: u32,
    },

    /// An operation was invoked in a context where it is not defined
    /// (e.g. signed interpretation of a value containing `X`/`Z`).
    #[error("invalid operation on logic value: {0}")]
    InvalidOperation(String),

    /// A [`LogicValue`] could not be constructed from the given input.
    #[error("could not construct logic value: {0}")]
    Construction(String),

    /// [`LogicValue::replicate`] was called with a non-positive multiplier.
    #[error("invalid replication multiplier: {0}")]
    InvalidMultiplier(i64),
}

/// A fixed-width, packed vector of 4-state [`LogicBit`]s.
///
/// Bit 0 is the least-significant bit. Each value occupies 2 bits of packed
/// storage, 32 values per `u64` word, mirroring how simulators keep signal
/// state compact without sacrificing O(1) bit access.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicValue {
    width: u32,
    data: Vec<u64>,
}

fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

impl LogicValue {
    /// Creates a value of the given width, initialized to all `X`.
    ///
    /// Matches hardware reset semantics: an unconnected or freshly allocated
    /// signal reads as unknown until something drives it.
    pub fn new(width: u32) -> Self {
        Self::fill(width, LogicBit::X)
    }

    /// Creates a value of the given width with every bit set to `bit`.
    pub fn fill(width: u32, bit: LogicBit) -> Self {
        let mut v = Self {
            width,
            data: vec![0; word_count(width)],
        };
        if bit != LogicBit::Zero {
            for i in 0..width {
                v.set(i, bit);
            }
        }
        v
    }

    /// Creates a value with all bits `Zero`.
    pub fn zero(width: u32) -> Self {
        Self::fill(width, LogicBit::Zero)
    }

    /// Creates a value with all bits `X`.
    pub fn x(width: u32) -> Self {
        Self::fill(width, LogicBit::X)
    }

    /// Creates a value with all bits `Z`.
    pub fn z(width: u32) -> Self {
        Self::fill(width, LogicBit::Z)
    }

    /// Returns the number of bits in this value.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the bit at `index` (0 = LSB).
    ///
    /// # Panics
    ///
    /// Panics if `index >= width()`.
    pub fn get(&self, index: u32) -> LogicBit {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = (index / VALUES_PER_WORD) as usize;
        let offset = (index % VALUES_PER_WORD) * 2;
        match (self.data[word] >> offset) & 0b11 {
            0 => LogicBit::Zero,
            1 => LogicBit::One,
            2 => LogicBit::X,
            3 => LogicBit::Z,
            _ => unreachable!(),
        }
    }

    /// Sets the bit at `index` (0 = LSB).
    ///
    /// # Panics
    ///
    /// Panics if `index >= width()`.
    pub fn set(&mut self, index: u32, bit: LogicBit) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = (index / VALUES_PER_WORD) as usize;
        let offset = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << offset);
        self.data[word] = (self.data[word] & mask) | ((bit as u64) << offset);
    }

    /// Returns `true` if every bit is `Zero` or `One`.
    pub fn is_valid(&self) -> bool {
        (0..self.width).all(|i| self.get(i).is_valid())
    }

    /// Returns `true` if every bit is `X`.
    pub fn is_all_x(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == LogicBit::X)
    }

    /// Returns `true` if every bit is `Z`.
    pub fn is_all_z(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == LogicBit::Z)
    }

    /// Returns `true` if every bit is `Zero`.
    pub fn is_zero(&self) -> bool {
        (0..self.width).all(|i| self.get(i) == LogicBit::Zero)
    }

    // ---- Construction ----------------------------------------------------

    /// Creates a value from a `u64`, truncated or zero-extended to `width`.
    pub fn from_u64(raw: u64, width: u32) -> Self {
        let mut v = Self::zero(width);
        for i in 0..width.min(64) {
            if (raw >> i) & 1 != 0 {
                v.set(i, LogicBit::One);
            }
        }
        v
    }

    /// Creates a value from an unbounded non-negative integer.
    ///
    /// The integer is truncated if it does not fit in `width` bits, and
    /// zero-extended otherwise.
    pub fn from_biguint(raw: &BigUint, width: u32) -> Self {
        let mut v = Self::zero(width);
        for i in 0..width {
            if raw.bit(i as u64) {
                v.set(i, LogicBit::One);
            }
        }
        v
    }

    /// Parses a value from a string of `0`/`1`/`x`/`X`/`z`/`Z` characters.
    ///
    /// The leftmost character is the most-significant bit. Underscores are
    /// accepted as visual separators and ignored, mirroring numeric literal
    /// syntax in mainstream HDLs.
    pub fn from_str_bits(s: &str) -> Result<Self, ValueError> {
        let cleaned: String = s.chars().filter(|&c| c != '_').collect();
        if cleaned.is_empty() {
            return Err(ValueError::Construction(
                "empty logic value literal".to_string(),
            ));
        }
        let width = cleaned.len() as u32;
        let mut v = Self::zero(width);
        for (i, c) in cleaned.chars().rev().enumerate() {
            let bit = LogicBit::from_char(c).ok_or_else(|| {
                ValueError::Construction(format!("invalid logic character '{c}'"))
            })?;
            v.set(i as u32, bit);
        }
        Ok(v)
    }

    /// Builds a value from an iterable of bits, index 0 being the LSB.
    pub fn from_bits<I: IntoIterator<Item = LogicBit>>(bits: I) -> Self {
        let bits: Vec<LogicBit> = bits.into_iter().collect();
        let mut v = Self::zero(bits.len() as u32);
        for (i, b) in bits.into_iter().enumerate() {
            v.set(i as u32, b);
        }
        v
    }

    // ---- Conversions -------------------------------------------------

    /// Converts to a `u64` if every bit is valid (`0`/`1`) and width <= 64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut out = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                LogicBit::Zero => {}
                LogicBit::One => out |= 1 << i,
                LogicBit::X | LogicBit::Z => return None,
            }
        }
        Some(out)
    }

    /// Converts to an unbounded non-negative integer if every bit is valid.
    pub fn to_biguint(&self) -> Option<BigUint> {
        if !self.is_valid() {
            return None;
        }
        let mut out = BigUint::from(0u32);
        for i in (0..self.width).rev() {
            out <<= 1u32;
            if self.get(i) == LogicBit::One {
                out |= BigUint::from(1u32);
            }
        }
        Some(out)
    }

    /// Converts to a two's-complement signed `i64`, if every bit is valid
    /// and the value fits.
    pub fn to_signed(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        if self.width == 0 || self.width > 64 {
            return None;
        }
        if self.width == 64 {
            return Some(raw as i64);
        }
        let sign_bit = 1u64 << (self.width - 1);
        if raw & sign_bit != 0 {
            Some((raw as i64) - (1i64 << self.width))
        } else {
            Some(raw as i64)
        }
    }

    /// Renders as a width-annotated binary string, e.g. `8'b0011_XZ01`.
    pub fn to_bin_string(&self) -> String {
        let mut s = String::new();
        for i in (0..self.width).rev() {
            s.push_str(&self.get(i).to_string());
        }
        format!("{}'b{}", self.width, s)
    }

    /// Renders as a width-annotated hex string, e.g. `8'hA5`.
    ///
    /// Falls back to `x`/`z` nibble markers if a nibble is not fully valid
    /// but uniformly `X` or uniformly `Z`; otherwise panics-free best effort
    /// renders `?` for a mixed nibble.
    pub fn to_hex_string(&self) -> String {
        let nibbles = self.width.div_ceil(4);
        let mut s = String::new();
        for n in (0..nibbles).rev() {
            let mut all_x = true;
            let mut all_z = true;
            let mut value = 0u8;
            for b in 0..4 {
                let idx = n * 4 + b;
                if idx >= self.width {
                    continue;
                }
                match self.get(idx) {
                    LogicBit::X => all_z = false,
                    LogicBit::Z => all_x = false,
                    bit => {
                        all_x = false;
                        all_z = false;
                        if bit == LogicBit::One {
                            value |= 1 << b;
                        }
                    }
                }
            }
            if all_x {
                s.push('x');
            } else if all_z {
                s.push('z');
            } else {
                s.push(std::char::from_digit(value as u32, 16).unwrap_or('?'));
            }
        }
        format!("{}'h{s}", self.width)
    }

    // ---- Bitwise -------------------------------------------------------

    fn check_width(&self, other: &Self) -> Result<(), ValueError> {
        if self.width != other.width {
            Err(ValueError::WidthMismatch {
                expected: self.width,
                found: other.width,
            })
        } else {
            Ok(())
        }
    }

    /// Bitwise AND reduction: folds all bits with `&`, yielding a 1-bit value.
    pub fn reduce_and(&self) -> LogicBit {
        (0..self.width).fold(LogicBit::One, |acc, i| acc & self.get(i))
    }

    /// Bitwise OR reduction: folds all bits with `|`, yielding a 1-bit value.
    pub fn reduce_or(&self) -> LogicBit {
        (0..self.width).fold(LogicBit::Zero, |acc, i| acc | self.get(i))
    }

    /// Bitwise XOR reduction: folds all bits with `^`, yielding a 1-bit value.
    pub fn reduce_xor(&self) -> LogicBit {
        (0..self.width).fold(LogicBit::Zero, |acc, i| acc ^ self.get(i))
    }

    // ---- Shifting --------------------------------------------------------

    /// Logical left shift by `amount`, shifting in `Zero`.
    ///
    /// If `amount` is itself invalid (contains `X`/`Z`) or would shift the
    /// whole value out, the result is all-`X`.
    pub fn shl_amount(&self, amount: &Self) -> Self {
        match amount.to_u64() {
            Some(n) if n < self.width as u64 => {
                let n = n as u32;
                let mut out = Self::zero(self.width);
                for i in n..self.width {
                    out.set(i, self.get(i - n));
                }
                out
            }
            Some(_) => Self::zero(self.width),
            None => Self::x(self.width),
        }
    }

    /// Logical right shift by `amount`, shifting in `Zero`.
    pub fn shr_amount(&self, amount: &Self) -> Self {
        match amount.to_u64() {
            Some(n) if n < self.width as u64 => {
                let n = n as u32;
                let mut out = Self::zero(self.width);
                for i in 0..(self.width - n) {
                    out.set(i, self.get(i + n));
                }
                out
            }
            Some(_) => Self::zero(self.width),
            None => Self::x(self.width),
        }
    }

    /// Arithmetic right shift by `amount`, sign-extending the top bit.
    pub fn ashr_amount(&self, amount: &Self) -> Self {
        let sign = if self.width == 0 {
            LogicBit::Zero
        } else {
            self.get(self.width - 1)
        };
        match amount.to_u64() {
            Some(n) if n < self.width as u64 => {
                let n = n as u32;
                let mut out = Self::fill(self.width, sign);
                for i in 0..(self.width - n) {
                    out.set(i, self.get(i + n));
                }
                out
            }
            Some(_) => Self::fill(self.width, sign),
            None => Self::x(self.width),
        }
    }

    // ---- Relational ------------------------------------------------------

    /// 4-state equality: `1` if definitely equal, `0` if definitely unequal,
    /// `X` if either side carries an unknown/high-Z bit. Width-0 values are
    /// always equal.
    pub fn logic_eq(&self, other: &Self) -> Result<LogicBit, ValueError> {
        self.check_width(other)?;
        if self.width == 0 {
            return Ok(LogicBit::One);
        }
        if !self.is_valid() || !other.is_valid() {
            return Ok(LogicBit::X);
        }
        Ok(LogicBit::from_bool(self == other))
    }

    /// Inverse of [`Self::logic_eq`].
    pub fn logic_ne(&self, other: &Self) -> Result<LogicBit, ValueError> {
        Ok(!self.logic_eq(other)?)
    }

    /// Unsigned `<` comparison; `X` if either side is invalid.
    pub fn logic_lt(&self, other: &Self) -> Result<LogicBit, ValueError> {
        self.relational(other, |a, b| a < b)
    }

    /// Unsigned `<=` comparison; `X` if either side is invalid.
    pub fn logic_le(&self, other: &Self) -> Result<LogicBit, ValueError> {
        self.relational(other, |a, b| a <= b)
    }

    /// Unsigned `>` comparison; `X` if either side is invalid.
    pub fn logic_gt(&self, other: &Self) -> Result<LogicBit, ValueError> {
        self.relational(other, |a, b| a > b)
    }

    /// Unsigned `>=` comparison; `X` if either side is invalid.
    pub fn logic_ge(&self, other: &Self) -> Result<LogicBit, ValueError> {
        self.relational(other, |a, b| a >= b)
    }

    fn relational(
        &self,
        other: &Self,
        cmp: impl Fn(&BigUint, &BigUint) -> bool,
    ) -> Result<LogicBit, ValueError> {
        self.check_width(other)?;
        match (self.to_biguint(), other.to_biguint()) {
            (Some(a), Some(b)) => Ok(LogicBit::from_bool(cmp(&a, &b))),
            _ => Ok(LogicBit::X),
        }
    }

    // ---- Slicing & extension ---------------------------------------------

    /// Extracts bits `[lo, hi]` inclusive (0 = LSB), reversed if `hi < lo`.
    ///
    /// Negative indices count from the top: `-1` is bit `width - 1`.
    pub fn slice(&self, hi: i64, lo: i64) -> Self {
        let resolve = |i: i64| -> u32 {
            if i < 0 {
                (self.width as i64 + i) as u32
            } else {
                i as u32
            }
        };
        let (hi, lo) = (resolve(hi), resolve(lo));
        if hi >= lo {
            let width = hi - lo + 1;
            let mut out = Self::zero(width);
            for i in 0..width {
                out.set(i, self.get(lo + i));
            }
            out
        } else {
            let width = lo - hi + 1;
            let mut out = Self::zero(width);
            for i in 0..width {
                out.set(i, self.get(lo - i));
            }
            out
        }
    }

    /// Extracts a half-open range `[start, end)`, defaulting `end` to
    /// `width()` when `None`.
    pub fn get_range(&self, start: u32, end: Option<u32>) -> Self {
        let end = end.unwrap_or(self.width);
        let width = end.saturating_sub(start);
        let mut out = Self::zero(width);
        for i in 0..width {
            out.set(i, self.get(start + i));
        }
        out
    }

    /// Returns a copy with the bits at `[index, index + replacement.width())`
    /// replaced by `replacement`.
    pub fn with_set(&self, index: u32, replacement: &Self) -> Result<Self, ValueError> {
        let end = index
            .checked_add(replacement.width())
            .ok_or_else(|| ValueError::InvalidOperation(format!("index {index} overflows with replacement width {}", replacement.width())))?;
        if end > self.width {
            return Err(ValueError::InvalidOperation(format!(
                "with_set range [{index}, {end}) out of bounds for width {}",
                self.width
            )));
        }
        let mut out = self.clone();
        for i in 0..replacement.width() {
            out.set(index + i, replacement.get(i));
        }
        Ok(out)
    }

    /// Zero-extends (or truncates) to `new_width`.
    pub fn zero_extend(&self, new_width: u32) -> Self {
        let mut out = Self::zero(new_width);
        for i in 0..self.width.min(new_width) {
            out.set(i, self.get(i));
        }
        out
    }

    /// Sign-extends (or truncates) to `new_width`, replicating the top bit.
    pub fn sign_extend(&self, new_width: u32) -> Self {
        let sign = if self.width == 0 {
            LogicBit::Zero
        } else {
            self.get(self.width - 1)
        };
        let mut out = Self::fill(new_width, sign);
        for i in 0..self.width.min(new_width) {
            out.set(i, self.get(i));
        }
        out
    }

    /// Concatenates values; the first argument ends up in the
    /// least-significant position, matching swizzle order where index 0 is
    /// the LSB slot.
    pub fn concat(parts: &[Self]) -> Self {
        let total_width: u32 = parts.iter().map(Self::width).sum();
        let mut out = Self::zero(total_width);
        let mut offset = 0u32;
        for part in parts {
            for i in 0..part.width() {
                out.set(offset + i, part.get(i));
            }
            offset += part.width();
        }
        out
    }

    /// Repeats this value `n` times, concatenated MSB-first.
    pub fn replicate(&self, n: i64) -> Result<Self, ValueError> {
        if n <= 0 {
            return Err(ValueError::InvalidMultiplier(n));
        }
        let parts: Vec<Self> = (0..n).map(|_| self.clone()).collect();
        Ok(Self::concat(&parts))
    }

    // ---- Arithmetic --------------------------------------------------------

    fn binary_arith(
        &self,
        other: &Self,
        op: impl Fn(&BigUint, &BigUint) -> Option<BigUint>,
    ) -> Result<Self, ValueError> {
        self.check_width(other)?;
        match (self.to_biguint(), other.to_biguint()) {
            (Some(a), Some(b)) => match op(&a, &b) {
                Some(r) => Ok(Self::from_biguint(&r, self.width)),
                None => Ok(Self::x(self.width)),
            },
            _ => Ok(Self::x(self.width)),
        }
    }

    /// Width-preserving addition with unknown propagation.
    pub fn add(&self, other: &Self) -> Result<Self, ValueError> {
        self.binary_arith(other, |a, b| Some(a + b))
    }

    /// Width-preserving subtraction, saturating at zero on underflow
    /// (two's-complement wraparound is recovered by truncation to width).
    pub fn sub(&self, other: &Self) -> Result<Self, ValueError> {
        self.check_width(other)?;
        match (self.to_biguint(), other.to_biguint()) {
            (Some(a), Some(b)) => {
                let modulus = BigUint::from(1u32) << self.width;
                let wrapped = (&modulus + a - b) % modulus;
                Ok(Self::from_biguint(&wrapped, self.width))
            }
            _ => Ok(Self::x(self.width)),
        }
    }

    /// Width-preserving multiplication with unknown propagation.
    pub fn mul(&self, other: &Self) -> Result<Self, ValueError> {
        self.binary_arith(other, |a, b| Some(a * b))
    }

    /// Unsigned division; division by zero yields all-`X` rather than an
    /// error, matching hardware division-by-zero semantics.
    pub fn div(&self, other: &Self) -> Result<Self, ValueError> {
        self.binary_arith(other, |a, b| {
            if b == &BigUint::from(0u32) {
                None
            } else {
                Some(a / b)
            }
        })
    }

    /// Unsigned remainder; modulus by zero yields all-`X`.
    pub fn rem(&self, other: &Self) -> Result<Self, ValueError> {
        self.binary_arith(other, |a, b| {
            if b == &BigUint::from(0u32) {
                None
            } else {
                Some(a % b)
            }
        })
    }
}

impl fmt::Display for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicValue({self})")
    }
}

impl BitAnd for &LogicValue {
    type Output = LogicValue;

    fn bitand(self, rhs: Self) -> LogicValue {
        assert_eq!(self.width, rhs.width, "LogicValue width mismatch in AND");
        let mut out = LogicValue::zero(self.width);
        for i in 0..self.width {
            out.set(i, self.get(i) & rhs.get(i));
        }
        out
    }
}

impl BitOr for &LogicValue {
    type Output = LogicValue;

    fn bitor(self, rhs: Self) -> LogicValue {
        assert_eq!(self.width, rhs.width, "LogicValue width mismatch in OR");
        let mut out = LogicValue::zero(self.width);
        for i in 0..self.width {
            out.set(i, self.get(i) | rhs.get(i));
        }
        out
    }
}

impl BitXor for &LogicValue {
    type Output = LogicValue;

    fn bitxor(self, rhs: Self) -> LogicValue {
        assert_eq!(self.width, rhs.width, "LogicValue width mismatch in XOR");
        let mut out = LogicValue::zero(self.width);
        for i in 0..self.width {
            out.set(i, self.get(i) ^ rhs.get(i));
        }
        out
    }
}

impl Not for &LogicValue {
    type Output = LogicValue;

    fn not(self) -> LogicValue {
        let mut out = LogicValue::zero(self.width);
        for i in 0..self.width {
            out.set(i, !self.get(i));
        }
        out
    }
}

macro_rules! panicking_binop {
    ($trait:ident, $method:ident, $inner:ident) => {
        impl $trait for &LogicValue {
            type Output = LogicValue;

            fn $method(self, rhs: Self) -> LogicValue {
                self.$inner(rhs)
                    .unwrap_or_else(|e| panic!("LogicValue::{}: {e}", stringify!($method)))
            }
        }
    };
}

panicking_binop!(Add, add, add);
panicking_binop!(Sub, sub, sub);
panicking_binop!(Mul, mul, mul);
panicking_binop!(Div, div, div);
panicking_binop!(Rem, rem, rem);

impl Shl<&LogicValue> for &LogicValue {
    type Output = LogicValue;

    fn shl(self, amount: &LogicValue) -> LogicValue {
        self.shl_amount(amount)
    }
}

impl Shr<&LogicValue> for &LogicValue {
    type Output = LogicValue;

    fn shr(self, amount: &LogicValue) -> LogicValue {
        self.shr_amount(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_all_x() {
        let v = LogicValue::new(4);
        assert!(v.is_all_x());
    }

    #[test]
    fn set_get_roundtrip() {
        let mut v = LogicValue::zero(4);
        v.set(0, LogicBit::One);
        v.set(1, LogicBit::X);
        v.set(2, LogicBit::Z);
        assert_eq!(v.get(0), LogicBit::One);
        assert_eq!(v.get(1), LogicBit::X);
        assert_eq!(v.get(2), LogicBit::Z);
        assert_eq!(v.get(3), LogicBit::Zero);
    }

    #[test]
    fn from_u64_truncates() {
        let v = LogicValue::from_u64(0xFF, 4);
        assert_eq!(v.to_u64(), Some(0xF));
    }

    #[test]
    fn from_str_bits_ignores_underscores() {
        let v = LogicValue::from_str_bits("1010_0101").unwrap();
        assert_eq!(v.width(), 8);
        assert_eq!(v.to_u64(), Some(0xA5));
    }

    #[test]
    fn from_str_bits_rejects_garbage() {
        assert!(LogicValue::from_str_bits("102").is_err());
    }

    #[test]
    fn to_biguint_roundtrip() {
        let big = BigUint::from(12345u32);
        let v = LogicValue::from_biguint(&big, 32);
        assert_eq!(v.to_biguint(), Some(big));
    }

    #[test]
    fn to_signed_handles_negative() {
        let v = LogicValue::from_u64(0b1111_1110, 8);
        assert_eq!(v.to_signed(), Some(-2));
    }

    #[test]
    fn arithmetic_propagates_x() {
        let a = LogicValue::x(8);
        let b = LogicValue::from_u64(1, 8);
        let r = a.add(&b).unwrap();
        assert!(r.is_all_x());
    }

    #[test]
    fn addition_wraps_in_width() {
        let a = LogicValue::from_u64(0xFF, 8);
        let b = LogicValue::from_u64(1, 8);
        let r = a.add(&b).unwrap();
        assert_eq!(r.to_u64(), Some(0));
    }

    #[test]
    fn division_by_zero_is_x() {
        let a = LogicValue::from_u64(10, 8);
        let b = LogicValue::zero(8);
        let r = a.div(&b).unwrap();
        assert!(r.is_all_x());
    }

    #[test]
    fn width_mismatch_errors() {
        let a = LogicValue::zero(4);
        let b = LogicValue::zero(8);
        assert!(matches!(
            a.add(&b),
            Err(ValueError::WidthMismatch {
                expected: 4,
                found: 8
            })
        ));
    }

    #[test]
    fn bitwise_ops() {
        let a = LogicValue::from_str_bits("1100").unwrap();
        let b = LogicValue::from_str_bits("1010").unwrap();
        assert_eq!(format!("{}", &a & &b), "1000");
        assert_eq!(format!("{}", &a | &b), "1110");
        assert_eq!(format!("{}", &a ^ &b), "0110");
        assert_eq!(format!("{}", !&a), "0011");
    }

    #[test]
    fn reductions() {
        let all_one = LogicValue::fill(4, LogicBit::One);
        assert_eq!(all_one.reduce_and(), LogicBit::One);
        let mixed = LogicValue::from_str_bits("1000").unwrap();
        assert_eq!(mixed.reduce_and(), LogicBit::Zero);
        assert_eq!(mixed.reduce_or(), LogicBit::One);
        assert_eq!(mixed.reduce_xor(), LogicBit::One);
    }

    #[test]
    fn shift_left_shifts_in_zero() {
        let v = LogicValue::from_str_bits("0001").unwrap();
        let amt = LogicValue::from_u64(2, 4);
        let r = v.shl_amount(&amt);
        assert_eq!(format!("{r}"), "0100");
    }

    #[test]
    fn shift_by_unknown_is_x() {
        let v = LogicValue::from_u64(1, 4);
        let amt = LogicValue::x(4);
        assert!(v.shl_amount(&amt).is_all_x());
    }

    #[test]
    fn arithmetic_shift_right_sign_extends() {
        let v = LogicValue::from_u64(0b1000_0000, 8);
        let amt = LogicValue::from_u64(4, 8);
        let r = v.ashr_amount(&amt);
        assert_eq!(format!("{r}"), "11111000");
    }

    #[test]
    fn relational_ops() {
        let a = LogicValue::from_u64(3, 8);
        let b = LogicValue::from_u64(5, 8);
        assert_eq!(a.logic_lt(&b).unwrap(), LogicBit::One);
        assert_eq!(a.logic_ge(&b).unwrap(), LogicBit::Zero);
        assert_eq!(a.logic_eq(&a).unwrap(), LogicBit::One);
    }

    #[test]
    fn relational_with_unknown_is_x() {
        let a = LogicValue::x(8);
        let b = LogicValue::from_u64(5, 8);
        assert_eq!(a.logic_lt(&b).unwrap(), LogicBit::X);
    }

    #[test]
    fn width_zero_equality_is_true() {
        let a = LogicValue::zero(0);
        let b = LogicValue::zero(0);
        assert_eq!(a.logic_eq(&b).unwrap(), LogicBit::One);
    }

    #[test]
    fn slice_forward_and_reversed() {
        let v = LogicValue::from_str_bits("11001010").unwrap();
        let fwd = v.slice(3, 0);
        assert_eq!(format!("{fwd}"), "1010");
        let rev = v.slice(0, 3);
        assert_eq!(format!("{rev}"), "0101");
    }

    #[test]
    fn slice_negative_index() {
        let v = LogicValue::from_str_bits("11001010").unwrap();
        let top = v.slice(-1, -4);
        assert_eq!(format!("{top}"), "1100");
    }

    #[test]
    fn get_range_default_end() {
        let v = LogicValue::from_str_bits("1010").unwrap();
        let r = v.get_range(1, None);
        assert_eq!(format!("{r}"), "101");
    }

    #[test]
    fn with_set_replaces_bits() {
        let v = LogicValue::from_str_bits("0000").unwrap();
        let patch = LogicValue::from_str_bits("11").unwrap();
        let r = v.with_set(1, &patch).unwrap();
        assert_eq!(format!("{r}"), "0110");
    }

    #[test]
    fn with_set_out_of_range_errors() {
        let v = LogicValue::from_str_bits("0000").unwrap();
        let patch = LogicValue::from_str_bits("11").unwrap();
        assert!(matches!(v.with_set(3, &patch), Err(ValueError::InvalidOperation(_))));
    }

    #[test]
    fn zero_extend_and_sign_extend() {
        let v = LogicValue::from_u64(0b1010, 4);
        assert_eq!(v.zero_extend(8).to_u64(), Some(0b1010));
        let neg = LogicValue::from_u64(0b1000, 4);
        assert_eq!(neg.sign_extend(8).to_u64(), Some(0b1111_1000));
    }

    #[test]
    fn concat_lsb_first() {
        let a = LogicValue::from_str_bits("1111").unwrap();
        let b = LogicValue::from_str_bits("0000").unwrap();
        let r = LogicValue::concat(&[a, b]);
        assert_eq!(format!("{r}"), "00001111");
    }

    #[test]
    fn replicate_builds_repeats() {
        let v = LogicValue::from_str_bits("10").unwrap();
        let r = v.replicate(3).unwrap();
        assert_eq!(format!("{r}"), "101010");
    }

    #[test]
    fn replicate_rejects_non_positive() {
        let v = LogicValue::from_str_bits("10").unwrap();
        assert!(matches!(
            v.replicate(0),
            Err(ValueError::InvalidMultiplier(0))
        ));
    }

    #[test]
    fn hex_string_marks_unknown_nibbles() {
        let v = LogicValue::x(8);
        assert_eq!(v.to_hex_string(), "8'hxx");
    }

    #[test]
    fn hex_string_renders_value() {
        let v = LogicValue::from_u64(0xA5, 8);
        assert_eq!(v.to_hex_string(), "8'hA5");
    }

    #[test]
    fn bin_string_is_width_annotated() {
        let v = LogicValue::from_u64(0b101, 3);
        assert_eq!(v.to_bin_string(), "3'b101");
    }

    #[test]
    fn serde_roundtrip() {
        let v = LogicValue::from_str_bits("10XZ1010").unwrap();
        let json = serde_json::to_string(&v).unwrap();
        let back: LogicValue = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
