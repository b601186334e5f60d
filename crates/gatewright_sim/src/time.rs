//! Simulation time representation with femtosecond precision and delta cycles.
//!
//! [`SimTime`] tracks both wall-clock simulation time (in femtoseconds) and
//! the delta cycle index within a single time step, enabling correct ordering
//! of events in the simulation kernel.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;

/// A simulation time point with femtosecond resolution and delta cycle tracking.
///
/// Events are ordered first by femtosecond timestamp, then by delta cycle index.
/// Delta cycles represent instantaneous signal propagation steps within a single
/// time step, following IEEE 1364/1800 simulation semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimTime {
    /// Wall-clock simulation time in femtoseconds.
    pub fs: u64,
    /// Delta cycle index within the current time step.
    pub delta: u32,
}

impl SimTime {
    /// Creates a time point at time zero, delta zero.
    pub fn zero() -> Self {
        Self { fs: 0, delta: 0 }
    }

    /// Creates a time from a nanosecond value with delta 0.
    pub fn from_ns(ns: u64) -> Self {
        Self {
            fs: ns * FS_PER_NS,
            delta: 0,
        }
    }

    /// Creates a time from a picosecond value with delta 0.
    pub fn from_ps(ps: u64) -> Self {
        Self {
            fs: ps * FS_PER_PS,
            delta: 0,
        }
    }

    /// Creates a time from a femtosecond value with delta 0.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs, delta: 0 }
    }

    /// Returns the next delta cycle at the same wall-clock time.
    pub fn next_delta(&self) -> Self {
        Self {
            fs: self.fs,
            delta: self.delta + 1,
        }
    }

    /// Advances to a new wall-clock time, resetting the delta counter.
    pub fn advance_to(&self, new_fs: u64) -> Self {
        debug_assert!(
            new_fs >= self.fs,
            "cannot advance backwards: {} -> {}",
            self.fs,
            new_fs
        );
        Self {
            fs: new_fs,
            delta: 0,
        }
    }

    /// Converts the femtosecond timestamp to nanoseconds (truncated).
    pub fn to_ns(&self) -> u64 {
        self.fs / FS_PER_NS
    }
}

impl Default for SimTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for SimTime {
    type Output = SimTime;
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime::from_fs(self.fs + rhs.fs)
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fs.cmp(&other.fs).then(self.delta.cmp(&other.delta))
    }
}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")?;
        } else if fs >= FS_PER_MS && fs.is_multiple_of(FS_PER_MS) {
            write!(f, "{} ms", fs / FS_PER_MS)?;
        } else if fs >= FS_PER_US && fs.is_multiple_of(FS_PER_US) {
            write!(f, "{} us", fs / FS_PER_US)?;
        } else if fs >= FS_PER_NS && fs.is_multiple_of(FS_PER_NS) {
            write!(f, "{} ns", fs / FS_PER_NS)?;
        } else if fs >= FS_PER_PS && fs.is_multiple_of(FS_PER_PS) {
            write!(f, "{} ps", fs / FS_PER_PS)?;
        } else {
            write!(f, "{fs} fs")?;
        }
        if self.delta > 0 {
            write!(f, "+d{}", self.delta)?;
        }
        Ok(())
    }
}
