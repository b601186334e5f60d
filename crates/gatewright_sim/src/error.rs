//! Simulation error types for the event-driven HDL simulator.

use gatewright_graph::GraphError;
use thiserror::Error;

/// Errors that can occur during simulation construction or execution.
#[derive(Debug, Error)]
pub enum SimError {
    /// A topology/port-discipline error surfaced from the signal graph.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A `Combinational` block wrote a signal it had already read in the
    /// same evaluation pass.
    #[error("write-after-read on signal '{signal}' in block '{block}'")]
    WriteAfterRead {
        /// The offending signal's name.
        signal: String,
        /// The name of the block that triggered the hazard.
        block: String,
    },

    /// A `Combinational.ssa` block read an SSA-tracked signal before it was
    /// written within the same pass.
    #[error("uninitialised SSA read of '{signal}' in block '{block}'")]
    UninitialisedSsaRead {
        /// The offending signal's name.
        signal: String,
        /// The name of the block that triggered the hazard.
        block: String,
    },

    /// An action was registered at a time at or before the simulator's
    /// current time.
    #[error("cannot register action at {requested} fs: simulator is already at {current} fs")]
    ActionInPast {
        /// The requested action time, in femtoseconds.
        requested: u64,
        /// The simulator's current time, in femtoseconds.
        current: u64,
    },

    /// `run`/`tick` was called while the simulator was already advancing
    /// time (re-entrance).
    #[error("simulator is already advancing time")]
    Reentrant,

    /// A conversion requiring a fully-valid (no `x`/`z`) value was attempted
    /// on a value that is not valid.
    #[error("value is not valid for this operation: {reason}")]
    ValueInvalidForOp {
        /// Description of the invalid-value condition.
        reason: String,
    },

    /// Simulation was terminated by an explicit `endSimulation`/`$finish`-style call.
    #[error("simulation finished at {time_fs} fs")]
    Finished {
        /// Time in femtoseconds when the simulation ended.
        time_fs: u64,
    },

    /// An assertion failed during simulation.
    #[error("assertion failed at {time_fs} fs: {message}")]
    AssertionFailed {
        /// Time in femtoseconds when the assertion failed.
        time_fs: u64,
        /// The assertion failure message.
        message: String,
    },

    /// The simulation exceeded the configured time limit.
    #[error("time limit exceeded: {limit_fs} fs")]
    TimeLimitExceeded {
        /// The time limit in femtoseconds.
        limit_fs: u64,
    },

    /// Too many delta cycles at a single time step, indicating a combinational loop.
    #[error("delta cycle limit exceeded at {fs} fs (max {max_deltas} deltas)")]
    DeltaCycleLimit {
        /// The time in femtoseconds where the limit was hit.
        fs: u64,
        /// The maximum number of delta cycles allowed.
        max_deltas: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_after_read_display() {
        let e = SimError::WriteAfterRead {
            signal: "q".into(),
            block: "counter_comb".into(),
        };
        assert_eq!(e.to_string(), "write-after-read on signal 'q' in block 'counter_comb'");
    }

    #[test]
    fn uninitialised_ssa_read_display() {
        let e = SimError::UninitialisedSsaRead {
            signal: "acc".into(),
            block: "mac".into(),
        };
        assert!(e.to_string().contains("uninitialised SSA read"));
    }

    #[test]
    fn action_in_past_display() {
        let e = SimError::ActionInPast {
            requested: 5,
            current: 10,
        };
        assert_eq!(
            e.to_string(),
            "cannot register action at 5 fs: simulator is already at 10 fs"
        );
    }

    #[test]
    fn reentrant_display() {
        assert_eq!(SimError::Reentrant.to_string(), "simulator is already advancing time");
    }

    #[test]
    fn finished_display() {
        let e = SimError::Finished { time_fs: 1000 };
        assert_eq!(e.to_string(), "simulation finished at 1000 fs");
    }

    #[test]
    fn assertion_failed_display() {
        let e = SimError::AssertionFailed {
            time_fs: 500,
            message: "count != 3".into(),
        };
        assert_eq!(e.to_string(), "assertion failed at 500 fs: count != 3");
    }

    #[test]
    fn time_limit_exceeded_display() {
        let e = SimError::TimeLimitExceeded { limit_fs: 1_000_000 };
        assert_eq!(e.to_string(), "time limit exceeded: 1000000 fs");
    }

    #[test]
    fn delta_cycle_limit_display() {
        let e = SimError::DeltaCycleLimit {
            fs: 100,
            max_deltas: 10000,
        };
        assert_eq!(
            e.to_string(),
            "delta cycle limit exceeded at 100 fs (max 10000 deltas)"
        );
    }

    #[test]
    fn graph_error_converts() {
        let ge = GraphError::Unassignable { name: "c".into() };
        let se: SimError = ge.into();
        assert!(se.to_string().contains("unassignable"));
    }
}
