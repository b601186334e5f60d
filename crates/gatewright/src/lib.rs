//! gatewright — a hardware construction framework embedded in Rust.
//!
//! A user program builds a connectivity graph of [`Logic`] signals and
//! [`Module`]s; the same graph can then be (a) driven by the built-in
//! event-driven [`Simulator`] over four-valued logic, and (b) emitted as
//! structurally faithful SystemVerilog via [`generate_synth`].
//!
//! This crate is a thin facade: it re-exports the public surface of
//! `gatewright_common`, `gatewright_graph`, `gatewright_sim`, and
//! `gatewright_synth`, and adds the small amount of ergonomic surface glue
//! (signal-list swizzling, JSON introspection, named interfaces) that spans
//! more than one of those crates.

#![warn(missing_docs)]

mod interface;
mod introspect;
mod swizzle;

pub use gatewright_common::{Frequency, LogicBit, LogicValue, ParseFrequencyError, ValueError};
pub use gatewright_graph::{
    case_matches, BinaryOp, BlockDecl, BlockKind, CaseItem, CaseType, ClockEdge, Conditional, Driver, Expr,
    ExternalModuleStub, Graph, GraphError, GraphResult, IfArm, Listener, Logic, LogicNet, Module, ModuleBase,
    ModuleId, NetDriver, Port, PortDirection, PortId, SignalId, UnaryOp,
};
pub use gatewright_sim::{
    subscribe, ChangeRecord, ClockGenerator, Combinational, CombinationalSsa, Edge, Sequential, SimError, SimTime,
    Simulator, State, StateMachine, WaveformSink,
};
pub use gatewright_synth::{generate_definitions, generate_synth, DefinitionOutput, SynthError, Uniquifier};

pub use interface::Interface;
pub use introspect::{introspect, introspect_json, ModuleInfo, PortInfo};
pub use swizzle::{rswizzle, swizzle};
