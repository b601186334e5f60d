//! gatewright_synth — SystemVerilog emission for the gatewright hardware
//! construction framework.
//!
//! Given a built module hierarchy, produces structurally faithful
//! SystemVerilog text: hierarchy discovery, name uniquification, inlining of
//! trivial expressions, and one-to-one structural emission. Not a synthesis-
//! to-gates tool: no technology mapping, no place-and-route, no bitstream.

#![warn(missing_docs)]

mod emit;
mod error;
mod keywords;

pub use emit::{generate_definitions, generate_synth, DefinitionOutput};
pub use error::SynthError;
pub use keywords::{Uniquifier, RESERVED_WORDS};
