//! Synthesis error types.

use thiserror::Error;

/// Errors raised while emitting SystemVerilog from a built module hierarchy.
#[derive(Debug, Error)]
pub enum SynthError {
    /// A structural anomaly was found while walking the module hierarchy.
    #[error("synthesis error in module '{module}', signal '{signal}': {reason}")]
    Structural {
        /// The offending module.
        module: String,
        /// The offending signal (empty if not signal-specific).
        signal: String,
        /// A human-readable description of the anomaly.
        reason: String,
    },

    /// A module was synthesised before being built.
    #[error("module '{module}' must be built before synthesis")]
    NotBuilt {
        /// The unbuilt module.
        module: String,
    },
}
