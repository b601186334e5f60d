//! Module hierarchy: port discipline and the `build()` freezing phase.
//!
//! Rust has no implementation inheritance, so "subclassing `Module`" is
//! modeled the idiomatic way: a [`Module`] trait for user-defined hardware
//! blocks, backed by composition over a [`ModuleBase`] that holds the common
//! port/signal bookkeeping every module needs.

use crate::cond::Conditional;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::ids::PortId;
use crate::logic::Logic;
use crate::port::{Port, PortDirection};
use gatewright_common::LogicValue;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// The evaluation discipline of a declared block, for static structural
/// bookkeeping (synthesis, introspection). The live simulation wiring for
/// each kind lives in `gatewright_sim::block`; `gatewright_graph` has no
/// dependency on the simulator crate, so a module records its blocks here in
/// purely structural form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// Re-evaluates on any sensitivity change; write-after-read is a hazard.
    Combinational,
    /// Re-evaluates on any sensitivity change; writes to declared SSA-tracked
    /// signals may occur more than once per pass.
    CombinationalSsa,
    /// Re-evaluates on the declared clock's active edge(s).
    Sequential,
}

/// The clock edge(s) a [`BlockKind::Sequential`] block is declared sensitive
/// to. Mirrors `gatewright_sim::block::Edge`; kept as a separate type here so
/// this crate never depends on the simulator crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEdge {
    /// Triggers on a `0 -> 1` transition.
    Posedge,
    /// Triggers on a `1 -> 0` transition.
    Negedge,
    /// Triggers on either transition.
    Both,
}

/// The static structure of one `Combinational`/`Sequential` block, as
/// declared on a [`ModuleBase`].
#[derive(Clone)]
pub struct BlockDecl {
    /// The block's name.
    pub name: String,
    /// The block's evaluation discipline.
    pub kind: BlockKind,
    /// The block's statement list.
    pub conditionals: Vec<Conditional>,
    /// The clock signal, for `Sequential` blocks.
    pub clock: Option<Logic>,
    /// The clock edge(s), for `Sequential` blocks.
    pub edge: Option<ClockEdge>,
    /// The asynchronous reset signal, if any, for `Sequential` blocks.
    pub reset: Option<Logic>,
}

/// Common state shared by every module instance: its ports, internally
/// declared signals, sub-module instances, and build state.
///
/// Discovery of a module's contents is, in this implementation, driven by an
/// explicit registry (populated by `add_input`/`add_output`/`add_inout`,
/// `add_signal`, and `add_submodule`) rather than by blind backward/forward
/// pointer-chasing over the live signal graph: Rust's ownership model makes
/// arbitrary reachability analysis over `dyn Module` trait objects far more
/// expensive to do safely than in a garbage-collected host. The port-rules
/// invariant itself — no signal crosses a module boundary outside a
/// port — is still enforced, via [`ModuleBase::check_reads`].
pub struct ModuleBase {
    name: String,
    graph: Rc<RefCell<Graph>>,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    inouts: Vec<Port>,
    internal_signals: Vec<(Logic, bool)>,
    submodules: Vec<Box<dyn Module>>,
    blocks: Vec<BlockDecl>,
    built: bool,
}

impl ModuleBase {
    /// Creates a new, unbuilt module base sharing the given signal graph.
    pub fn new(graph: &Rc<RefCell<Graph>>, name: impl Into<String>) -> Self {
        ModuleBase {
            name: name.into(),
            graph: graph.clone(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            inouts: Vec::new(),
            internal_signals: Vec::new(),
            submodules: Vec::new(),
            blocks: Vec::new(),
            built: false,
        }
    }

    /// The module's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` once [`ModuleBase::build`] has completed.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// A clone of the shared signal graph handle.
    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        self.graph.clone()
    }

    /// Declares an input port bound to `source` (the caller's existing
    /// signal); returns the internal-side `Logic` the module body reads.
    pub fn add_input(&mut self, name: impl Into<String>, source: &Logic, width: u32) -> GraphResult<Logic> {
        let name = name.into();
        if source.width() != width {
            return Err(GraphError::width_mismatch(
                format!("input port '{name}'"),
                width,
                source.width(),
            ));
        }
        let internal = Logic::new(&self.graph, format!("{name}_in"), width);
        internal.connect(source)?;
        let id = PortId::from_raw(self.inputs.len() as u32);
        self.inputs.push(Port {
            id,
            name,
            direction: PortDirection::Input,
            internal: internal.clone(),
            external: source.clone(),
            reserved: false,
        });
        Ok(internal)
    }

    /// Declares an output port; returns the internal-side `Logic` the module
    /// body drives. The external-side `Logic` is reachable via
    /// [`ModuleBase::output`].
    pub fn add_output(&mut self, name: impl Into<String>, width: u32) -> Logic {
        let name = name.into();
        let internal = Logic::new(&self.graph, format!("{name}_out_int"), width);
        let external = Logic::new(&self.graph, name.clone(), width);
        external.connect(&internal).expect("matching widths by construction");
        let id = PortId::from_raw((self.inputs.len() + self.outputs.len()) as u32);
        self.outputs.push(Port {
            id,
            name,
            direction: PortDirection::Output,
            internal: internal.clone(),
            external,
            reserved: false,
        });
        internal
    }

    /// Declares a bidirectional port; returns the internal-side `Logic`.
    pub fn add_inout(&mut self, name: impl Into<String>, source: &Logic, width: u32) -> GraphResult<Logic> {
        let name = name.into();
        if source.width() != width {
            return Err(GraphError::width_mismatch(
                format!("inout port '{name}'"),
                width,
                source.width(),
            ));
        }
        let internal = Logic::new(&self.graph, format!("{name}_io"), width);
        internal.connect(source)?;
        let id = PortId::from_raw((self.inputs.len() + self.outputs.len() + self.inouts.len()) as u32);
        self.inouts.push(Port {
            id,
            name,
            direction: PortDirection::InOut,
            internal: internal.clone(),
            external: source.clone(),
            reserved: false,
        });
        Ok(internal)
    }

    /// Marks the most recently added port as holding a user-reserved name.
    pub fn reserve_last_port(&mut self) {
        if let Some(p) = self.inouts.last_mut() {
            p.reserved = true;
        } else if let Some(p) = self.outputs.last_mut() {
            p.reserved = true;
        } else if let Some(p) = self.inputs.last_mut() {
            p.reserved = true;
        }
    }

    /// Returns the named output port's external-side signal, for the parent
    /// module to connect onward.
    pub fn output(&self, name: &str) -> GraphResult<Logic> {
        self.outputs
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.external.clone())
            .ok_or_else(|| GraphError::PortDoesNotExist {
                name: name.to_string(),
                module: self.name.clone(),
            })
    }

    /// Declares an internal signal, registering it for the port-rules check.
    pub fn add_signal(&mut self, name: impl Into<String>, width: u32) -> Logic {
        let sig = Logic::new(&self.graph, name, width);
        self.internal_signals.push((sig.clone(), false));
        sig
    }

    /// Declares an internal constant signal.
    pub fn add_constant(&mut self, value: LogicValue) -> Logic {
        let sig = Logic::constant(&self.graph, value);
        self.internal_signals.push((sig.clone(), false));
        sig
    }

    /// Marks the most recently declared internal signal as reserved.
    pub fn reserve_last_signal(&mut self) {
        if let Some((_, reserved)) = self.internal_signals.last_mut() {
            *reserved = true;
        }
    }

    /// Registers a sub-module instance; it is recursively built during this
    /// module's [`ModuleBase::build`].
    pub fn add_submodule(&mut self, submodule: Box<dyn Module>) {
        self.submodules.push(submodule);
    }

    /// Records a block's static structure, for synthesis and introspection.
    /// Does not itself wire any simulation behaviour — call the matching
    /// `gatewright_sim::block` constructor separately to do that.
    pub fn add_block(&mut self, decl: BlockDecl) {
        self.blocks.push(decl);
    }

    /// Returns every block declared on this module.
    pub fn blocks(&self) -> &[BlockDecl] {
        &self.blocks
    }

    /// Returns every sub-module instance.
    pub fn submodules(&self) -> &[Box<dyn Module>] {
        &self.submodules
    }

    /// Returns every internal signal declared on this module (not including
    /// ports), with its reserved flag.
    pub fn internal_signals(&self) -> &[(Logic, bool)] {
        &self.internal_signals
    }

    /// Returns every port-internal and submodule-external `Logic` visible to
    /// this module's own body logic.
    fn visible_signals(&self) -> Vec<Logic> {
        let mut out = Vec::new();
        for p in self.inputs.iter().chain(&self.outputs).chain(&self.inouts) {
            out.push(p.internal.clone());
        }
        for (sig, _) in &self.internal_signals {
            out.push(sig.clone());
        }
        for sub in &self.submodules {
            for p in sub.base().all_ports() {
                out.push(p.external.clone());
            }
        }
        out
    }

    /// Returns every declared port, in input/output/inout order.
    pub fn all_ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(&self.outputs).chain(&self.inouts)
    }

    /// Checks that every signal in `reads` is legally visible to this
    /// module's body (a declared internal signal, a port's internal side, or
    /// a sub-module's external port) — the enforcement of the "no signal
    /// crosses a module boundary outside a port" invariant.
    pub fn check_reads(&self, reads: &[Logic]) -> GraphResult<()> {
        let visible = self.visible_signals();
        'outer: for r in reads {
            for v in &visible {
                if r.same_cell(v) {
                    continue 'outer;
                }
            }
            return Err(GraphError::PortRulesViolation {
                signal: r.name(),
                module: self.name.clone(),
                trace: format!("'{}' is not a port or declared signal of '{}'", r.name(), self.name),
            });
        }
        Ok(())
    }

    /// Freezes the module's topology: recursively builds sub-modules and
    /// uniquifies instance/signal names. Idempotent.
    pub fn build(&mut self) -> GraphResult<()> {
        if self.built {
            return Ok(());
        }
        let mut seen: HashSet<String> = HashSet::new();
        for (sig, reserved) in &self.internal_signals {
            let name = sig.name();
            if *reserved {
                if !seen.insert(name.clone()) {
                    return Err(GraphError::UnavailableReservedName { name });
                }
            } else {
                let mut candidate = name.clone();
                let mut n = 1u32;
                while seen.contains(&candidate) {
                    candidate = format!("{name}_{n}");
                    n += 1;
                }
                seen.insert(candidate);
            }
        }
        for sub in &mut self.submodules {
            sub.build()?;
        }
        for block in &self.blocks {
            let mut reads = Vec::new();
            for c in &block.conditionals {
                c.collect_reads(&mut reads);
            }
            if let Some(clock) = &block.clock {
                reads.push(clock.clone());
            }
            if let Some(reset) = &block.reset {
                reads.push(reset.clone());
            }
            self.check_reads(&reads)?;
        }
        self.built = true;
        Ok(())
    }
}

/// A hardware module: a named container with explicit input/output/inout
/// port lists.
///
/// Implementors compose a [`ModuleBase`] (there is no inheritance in Rust)
/// and build their internal logic inside their constructor, registering
/// ports, signals, and sub-modules on that base.
pub trait Module {
    /// Returns a reference to this module's shared bookkeeping.
    fn base(&self) -> &ModuleBase;

    /// Returns a mutable reference to this module's shared bookkeeping.
    fn base_mut(&mut self) -> &mut ModuleBase;

    /// Freezes this module's topology; default implementation delegates to
    /// [`ModuleBase::build`].
    fn build(&mut self) -> GraphResult<()> {
        self.base_mut().build()
    }

    /// `true` once this module has been built.
    fn is_built(&self) -> bool {
        self.base().is_built()
    }

    /// The name of this module's *definition*, shared by every instance of
    /// the same Rust type. Synthesis deduplicates on this, emitting one
    /// `module` declaration per distinct definition and an instantiation at
    /// every use site. Defaults to the instance name, which is only correct
    /// for modules with exactly one instance; multiply-instantiated modules
    /// should override this with a name stable across instances.
    fn definition_name(&self) -> String {
        self.base().name().to_string()
    }
}

/// A sub-type of [`Module`] whose body is never elaborated: synthesis emits
/// only an instance of the user-specified definition name with the declared
/// ports, and no simulation behaviour is provided by the core. Used at
/// co-simulation boundaries.
pub struct ExternalModuleStub {
    base: ModuleBase,
    /// The externally defined module name to instantiate in emitted output.
    pub definition_name: String,
}

impl ExternalModuleStub {
    /// Creates a stub instance named `instance_name`, instantiating the
    /// externally-defined module `definition_name`.
    pub fn new(
        graph: &Rc<RefCell<Graph>>,
        instance_name: impl Into<String>,
        definition_name: impl Into<String>,
    ) -> Self {
        ExternalModuleStub {
            base: ModuleBase::new(graph, instance_name),
            definition_name: definition_name.into(),
        }
    }
}

impl Module for ExternalModuleStub {
    fn base(&self) -> &ModuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModuleBase {
        &mut self.base
    }

    fn definition_name(&self) -> String {
        self.definition_name.clone()
    }
}
