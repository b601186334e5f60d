//! Public signal handles: [`Logic`] (single-driver) and [`LogicNet`]
//! (multi-driver, tri-state resolved).

use crate::error::{GraphError, GraphResult};
use crate::graph::{Driver, Graph, Listener};
use crate::ids::SignalId;
use gatewright_common::LogicValue;
use std::cell::RefCell;
use std::rc::Rc;

/// A named, mutable reference to a storage cell ("wire") of fixed width.
///
/// Cloning a `Logic` is cheap and yields another handle to the *same*
/// underlying cell; connecting two independently created `Logic`s merges
/// their cells ("adoption") so that both names observe identical behaviour
/// from then on.
#[derive(Clone)]
pub struct Logic {
    id: SignalId,
    graph: Rc<RefCell<Graph>>,
}

impl Logic {
    /// Creates a new signal of the given width, initialized to all-`X`.
    pub fn new(graph: &Rc<RefCell<Graph>>, name: impl Into<String>, width: u32) -> Self {
        let id = graph.borrow().alloc(name, width, false);
        Logic {
            id,
            graph: graph.clone(),
        }
    }

    /// Creates an unassignable constant signal holding `value`.
    pub fn constant(graph: &Rc<RefCell<Graph>>, value: LogicValue) -> Self {
        let width = value.width();
        let id = graph.borrow().alloc("const", width, false);
        graph.borrow().put(id, value);
        graph.borrow().set_unassignable(id);
        Logic {
            id,
            graph: graph.clone(),
        }
    }

    /// The signal's declared width.
    pub fn width(&self) -> u32 {
        self.graph.borrow().width(self.id)
    }

    /// The signal's declared name (pre-adoption identity; two adopted
    /// signals keep their own names even though they share a cell).
    pub fn name(&self) -> String {
        self.graph.borrow().name(self.id)
    }

    /// The signal's current value.
    pub fn value(&self) -> LogicValue {
        self.graph.borrow().value(self.id)
    }

    /// Returns `true` if two handles currently observe the same cell
    /// (either because they were created as clones, or because they have
    /// been connected and adopted).
    pub fn same_cell(&self, other: &Logic) -> bool {
        let g = self.graph.borrow();
        g.find(self.id).as_raw() == g.find(other.id).as_raw()
    }

    /// Deposits `value` synchronously; downstream listeners observe the
    /// change immediately, before this call returns.
    pub fn put(&self, value: LogicValue) -> GraphResult<()> {
        if self.graph.borrow().is_unassignable(self.id) {
            return Err(GraphError::Unassignable { name: self.name() });
        }
        if value.width() != self.width() {
            return Err(GraphError::width_mismatch(
                format!("put on '{}'", self.name()),
                self.width(),
                value.width(),
            ));
        }
        self.graph.borrow().put(self.id, value);
        Ok(())
    }

    /// Connects this signal to `source` ("adoption"): their storage cells
    /// merge, and `source`'s value (if any) is visible from `self` from then
    /// on. Equivalent to the `<=` wire-connection operator.
    pub fn connect(&self, source: &Logic) -> GraphResult<()> {
        if self.width() != source.width() {
            return Err(GraphError::width_mismatch(
                format!("connect '{}' <= '{}'", self.name(), source.name()),
                self.width(),
                source.width(),
            ));
        }
        if Rc::ptr_eq(&self.graph, &source.graph) && self.same_cell(source) {
            return Err(GraphError::SelfConnection { name: self.name() });
        }
        let graph = self.graph.borrow();
        graph.union(self.id, source.id);
        Ok(())
    }

    /// Registers a change listener, called with `(previous, next)` on every
    /// value change of this signal (after adoption, of the shared cell).
    pub fn on_change(&self, listener: impl FnMut(&LogicValue, &LogicValue) + 'static) {
        self.graph.borrow().listen(self.id, Box::new(listener) as Listener);
    }

    /// Sets this signal's driver to a computed expression, without merging
    /// storage cells. Used by arithmetic/bitwise driver expressions and by
    /// `Conditional` block targets.
    pub fn drive_computed(
        &self,
        recompute: impl Fn(&Graph) -> LogicValue + 'static,
    ) -> GraphResult<()> {
        let graph = self.graph.borrow();
        graph
            .set_driver(self.id, Driver::Computed(Rc::new(recompute)))
            .map_err(|_| GraphError::SignalRedriven { name: self.name() })
    }

    /// Marks this signal's driver as owned by execution block `block_id`
    /// (an opaque handle from the simulator crate), for redriven detection.
    pub fn drive_block(&self, block_id: u64) -> GraphResult<()> {
        let graph = self.graph.borrow();
        graph
            .set_driver(self.id, Driver::Block(block_id))
            .map_err(|_| GraphError::SignalRedriven { name: self.name() })
    }

    /// Returns the raw signal ID (for use by the simulator/synthesizer
    /// crates, which hold their own references into the same graph).
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Returns a clone of the shared graph handle.
    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        self.graph.clone()
    }
}

/// A signal that relaxes the single-driver rule: multiple drivers are
/// resolved per-bit under tri-state semantics.
#[derive(Clone)]
pub struct LogicNet {
    id: SignalId,
    graph: Rc<RefCell<Graph>>,
}

/// One driver slot of a [`LogicNet`].
pub struct NetDriver {
    net: SignalId,
    slot: usize,
    graph: Rc<RefCell<Graph>>,
    width: u32,
}

impl LogicNet {
    /// Creates a new net of the given width; reads as all-`z` until driven.
    pub fn new(graph: &Rc<RefCell<Graph>>, name: impl Into<String>, width: u32) -> Self {
        let id = graph.borrow().alloc(name, width, true);
        LogicNet {
            id,
            graph: graph.clone(),
        }
    }

    /// The net's declared width.
    pub fn width(&self) -> u32 {
        self.graph.borrow().width(self.id)
    }

    /// The net's current resolved value.
    pub fn value(&self) -> LogicValue {
        self.graph.borrow().value(self.id)
    }

    /// Allocates a new driver slot for this net.
    pub fn add_driver(&self) -> NetDriver {
        let slot = self.graph.borrow().net_add_driver(self.id);
        NetDriver {
            net: self.id,
            slot,
            graph: self.graph.clone(),
            width: self.width(),
        }
    }

    /// Registers a change listener on the net's resolved value.
    pub fn on_change(&self, listener: impl FnMut(&LogicValue, &LogicValue) + 'static) {
        self.graph.borrow().listen(self.id, Box::new(listener) as Listener);
    }
}

impl NetDriver {
    /// Drives this slot's contribution to the net; bits set to `Z` yield to
    /// other drivers.
    pub fn put(&self, value: LogicValue) -> GraphResult<()> {
        if value.width() != self.width {
            return Err(GraphError::width_mismatch("net driver", self.width, value.width()));
        }
        self.graph.borrow().net_drive(self.net, self.slot, value);
        Ok(())
    }
}
