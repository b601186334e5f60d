//! IEEE 1164 four-state logic values with truth-table-based operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single 4-state logic value following the IEEE 1164 standard.
///
/// The four states represent:
/// - `Zero` — driven low
/// - `One` — driven high
/// - `X` — unknown or uninitialized
/// - `Z` — high-impedance (not driven)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogicBit {
    /// Logic low (0).
    Zero = 0,
    /// Logic high (1).
    One = 1,
    /// Unknown or uninitialized.
    X = 2,
    /// High-impedance (tri-state).
    Z = 3,
}

impl LogicBit {
    /// Converts a character to a [`LogicBit`].
    ///
    /// Accepts '0', '1', 'x'/'X', and 'z'/'Z'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(LogicBit::Zero),
            '1' => Some(LogicBit::One),
            'x' | 'X' => Some(LogicBit::X),
            'z' | 'Z' => Some(LogicBit::Z),
            _ => None,
        }
    }

    /// Creates a bit from a boolean (`true` → `One`, `false` → `Zero`).
    pub fn from_bool(b: bool) -> Self {
        if b { LogicBit::One } else { LogicBit::Zero }
    }

    /// Returns `true` for `Zero` or `One`, `false` for `X`/`Z`.
    pub fn is_valid(self) -> bool {
        matches!(self, LogicBit::Zero | LogicBit::One)
    }

    /// Returns the boolean interpretation, if this bit is valid.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            LogicBit::Zero => Some(false),
            LogicBit::One => Some(true),
            LogicBit::X | LogicBit::Z => None,
        }
    }
}

impl fmt::Display for LogicBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicBit::Zero => write!(f, "0"),
            LogicBit::One => write!(f, "1"),
            LogicBit::X => write!(f, "X"),
            LogicBit::Z => write!(f, "Z"),
        }
    }
}

/// IEEE 1164 AND truth table:
/// ```text
///     0  1  X  Z
/// 0 | 0  0  0  0
/// 1 | 0  1  X  X
/// X | 0  X  X  X
/// Z | 0  X  X  X
/// ```
impl BitAnd for LogicBit {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        use LogicBit::*;
        match (self, rhs) {
            (Zero, _) | (_, Zero) => Zero,
            (One, One) => One,
            _ => X,
        }
    }
}

/// IEEE 1164 OR truth table:
/// ```text
///     0  1  X  Z
/// 0 | 0  1  X  X
/// 1 | 1  1  1  1
/// X | X  1  X  X
/// Z | X  1  X  X
/// ```
impl BitOr for LogicBit {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        use LogicBit::*;
        match (self, rhs) {
            (One, _) | (_, One) => One,
            (Zero, Zero) => Zero,
            _ => X,
        }
    }
}

/// IEEE 1164 XOR truth table. `X`/`Z` on either side always yields `X`.
impl BitXor for LogicBit {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        use LogicBit::*;
        match (self, rhs) {
            (Zero, Zero) | (One, One) => Zero,
            (Zero, One) | (One, Zero) => One,
            _ => X,
        }
    }
}

/// IEEE 1164 NOT: `!0 = 1`, `!1 = 0`, `!X = X`, `!Z = X`.
impl Not for LogicBit {
    type Output = Self;

    fn not(self) -> Self {
        use LogicBit::*;
        match self {
            Zero => One,
            One => Zero,
            X | Z => X,
        }
    }
}
