//! Shared foundational types used across the gatewright hardware framework.
//!
//! This crate provides the 4-state logic bit, packed 4-state logic values
//! with arbitrary width, and frequency values used to describe clocks.

#![warn(missing_docs)]

pub mod bit;
pub mod frequency;
pub mod value;

pub use bit::LogicBit;
pub use frequency::{Frequency, ParseFrequencyError};
pub use value::{LogicValue, ValueError};
