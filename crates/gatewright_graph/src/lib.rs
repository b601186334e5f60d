//! gatewright_graph — the live signal graph and module hierarchy underlying
//! the gatewright hardware construction framework.
//!
//! This crate defines the core types that back a running hardware
//! description: [`Logic`]/[`LogicNet`] signal handles, the shared [`Graph`]
//! arena that stores their values and wires adoption/propagation, the
//! [`Conditional`]/[`Expr`] behavioral assignment AST, and the [`Module`]
//! trait with its port discipline.

#![warn(missing_docs)]

pub mod cond;
pub mod error;
pub mod expr;
pub mod graph;
pub mod ids;
pub mod logic;
pub mod module;
pub mod port;

pub use cond::{case_matches, CaseItem, CaseType, Conditional, IfArm};
pub use error::{GraphError, GraphResult};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use graph::{Driver, Graph, Listener};
pub use ids::{ModuleId, PortId, SignalId};
pub use logic::{Logic, LogicNet, NetDriver};
pub use module::{BlockDecl, BlockKind, ClockEdge, ExternalModuleStub, Module, ModuleBase};
pub use port::{Port, PortDirection};
