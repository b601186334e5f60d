//! Error types for the signal graph and module hierarchy.

use thiserror::Error;

/// Errors raised while building or connecting the signal graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two signals of different widths were connected or bound to a port.
    #[error("width mismatch: {context}: expected {expected}, found {found}")]
    WidthMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// The expected width.
        expected: u32,
        /// The width actually found.
        found: u32,
    },

    /// A non-net signal was given a second driver.
    #[error("signal '{name}' is driven more than once")]
    SignalRedriven {
        /// The name of the redriven signal.
        name: String,
    },

    /// A signal crossed a module boundary without going through a port.
    #[error("port rules violation: signal '{signal}' crosses module '{module}' boundary outside a port (path: {trace})")]
    PortRulesViolation {
        /// The offending signal's name.
        signal: String,
        /// The module whose boundary was crossed.
        module: String,
        /// A human-readable trace of the discovery path.
        trace: String,
    },

    /// A reserved name was already in use and could not be honoured.
    #[error("reserved name '{name}' is unavailable")]
    UnavailableReservedName {
        /// The name that could not be reserved.
        name: String,
    },

    /// An API requiring a built module was called before `build()`.
    #[error("module '{module}' has not been built")]
    ModuleNotBuilt {
        /// The module that was used before being built.
        module: String,
    },

    /// A module was found to be its own ancestor in the instance hierarchy.
    #[error("invalid hierarchy: module '{module}' is its own ancestor")]
    InvalidHierarchy {
        /// The offending module.
        module: String,
    },

    /// A requested port does not exist on a module.
    #[error("port '{name}' does not exist on module '{module}'")]
    PortDoesNotExist {
        /// The requested port name.
        name: String,
        /// The module that was queried.
        module: String,
    },

    /// A signal was connected to itself.
    #[error("signal '{name}' cannot be connected to itself")]
    SelfConnection {
        /// The name of the signal.
        name: String,
    },

    /// A `put`/connection was attempted on a signal marked unassignable.
    #[error("signal '{name}' is unassignable")]
    Unassignable {
        /// The name of the unassignable signal.
        name: String,
    },
}

impl GraphError {
    /// Builds a [`GraphError::WidthMismatch`] for a connection between two signal IDs.
    pub fn width_mismatch(context: impl Into<String>, expected: u32, found: u32) -> Self {
        GraphError::WidthMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

/// A result alias used throughout the graph crate.
pub type GraphResult<T> = Result<T, GraphError>;
