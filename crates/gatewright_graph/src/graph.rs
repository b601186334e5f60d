//! The shared signal graph: storage cells, drivers, listeners, and adoption.
//!
//! Every [`crate::logic::Logic`] is a thin handle into a [`Graph`]. Connecting
//! two signals ("adoption") unions their storage cells so that every existing
//! and future handle observes the same value, without requiring the handles
//! themselves to share a pointer. This mirrors the generic `Arena<I, T>`
//! pattern from the surrounding toolchain, extended with a union-find parent
//! array per the design note on cyclic signal graphs.

use crate::ids::SignalId;
use gatewright_common::LogicValue;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// A listener callback invoked with `(previous, next)` on every value change.
pub type Listener = Box<dyn FnMut(&LogicValue, &LogicValue)>;

/// The driver of a non-net signal.
#[derive(Clone)]
pub enum Driver {
    /// Directly driven by another signal's current cell.
    Signal(SignalId),
    /// Driven by a computed expression (see `crate::expr::DriverExpr`), stored
    /// as an opaque recomputation closure to avoid a dependency cycle between
    /// `expr` and `graph`.
    Computed(Rc<dyn Fn(&Graph) -> LogicValue>),
    /// Driven by an execution block (`Combinational`/`Sequential`) living in
    /// the simulator crate; tracked here only for redriven-signal detection.
    Block(u64),
}

struct Cell_ {
    parent: SignalId,
    rank: u32,
    name: String,
    width: u32,
    unassignable: bool,
    is_net: bool,
    value: LogicValue,
    driver: Option<Driver>,
    net_drivers: Vec<LogicValue>,
    listeners: Vec<Listener>,
}

/// The shared arena backing every [`Logic`](crate::logic::Logic) and
/// [`LogicNet`](crate::logic::LogicNet) handle in one design.
///
/// Cloning a `Graph` handle (it is always held behind `Rc<RefCell<_>>`)
/// shares the same underlying storage; `Logic` handles carry a clone of that
/// `Rc` plus their own [`SignalId`].
pub struct Graph {
    cells: RefCell<Vec<Cell_>>,
    propagating: Cell<bool>,
    queue: RefCell<VecDeque<(SignalId, LogicValue)>>,
}

impl Graph {
    /// Creates a new, empty graph.
    pub fn new() -> Rc<RefCell<Graph>> {
        Rc::new(RefCell::new(Graph {
            cells: RefCell::new(Vec::new()),
            propagating: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        }))
    }

    /// Allocates a fresh signal cell, initialized to all-`X`.
    pub fn alloc(&self, name: impl Into<String>, width: u32, is_net: bool) -> SignalId {
        let mut cells = self.cells.borrow_mut();
        let id = SignalId::from_raw(cells.len() as u32);
        cells.push(Cell_ {
            parent: id,
            rank: 0,
            name: name.into(),
            width,
            unassignable: false,
            is_net,
            value: LogicValue::x(width),
            driver: None,
            net_drivers: Vec::new(),
            listeners: Vec::new(),
        });
        id
    }

    /// Finds the representative (root) cell for `id`, with path compression.
    pub fn find(&self, id: SignalId) -> SignalId {
        let mut cells = self.cells.borrow_mut();
        let mut cur = id;
        loop {
            let parent = cells[cur.as_raw() as usize].parent;
            if parent.as_raw() == cur.as_raw() {
                break;
            }
            cur = parent;
        }
        // Path compression.
        let root = cur;
        let mut cur = id;
        loop {
            let parent = cells[cur.as_raw() as usize].parent;
            if parent.as_raw() == cur.as_raw() {
                break;
            }
            cells[cur.as_raw() as usize].parent = root;
            cur = parent;
        }
        root
    }

    /// Merges the storage cells of `a` and `b` ("adoption"). Widths must
    /// already have been checked equal by the caller. Returns the surviving
    /// root ID.
    pub fn union(&self, a: SignalId, b: SignalId) -> SignalId {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra.as_raw() == rb.as_raw() {
            return ra;
        }
        let mut cells = self.cells.borrow_mut();
        let (survivor, absorbed) = {
            let rank_a = cells[ra.as_raw() as usize].rank;
            let rank_b = cells[rb.as_raw() as usize].rank;
            if rank_a >= rank_b {
                (ra, rb)
            } else {
                (rb, ra)
            }
        };
        if cells[ra.as_raw() as usize].rank == cells[rb.as_raw() as usize].rank {
            cells[survivor.as_raw() as usize].rank += 1;
        }
        let mut absorbed_listeners = std::mem::take(&mut cells[absorbed.as_raw() as usize].listeners);
        let absorbed_driver = cells[absorbed.as_raw() as usize].driver.take();
        let absorbed_value = cells[absorbed.as_raw() as usize].value.clone();
        cells[absorbed.as_raw() as usize].parent = survivor;
        cells[survivor.as_raw() as usize].listeners.append(&mut absorbed_listeners);
        if cells[survivor.as_raw() as usize].driver.is_none() {
            cells[survivor.as_raw() as usize].driver = absorbed_driver;
            cells[survivor.as_raw() as usize].value = absorbed_value;
        }
        survivor
    }

    /// Returns the name the signal was declared with (pre-adoption identity).
    pub fn name(&self, id: SignalId) -> String {
        self.cells.borrow()[id.as_raw() as usize].name.clone()
    }

    /// Returns the bit width of the signal (stable across adoption, since
    /// adoption requires equal widths).
    pub fn width(&self, id: SignalId) -> u32 {
        let root = self.find(id);
        self.cells.borrow()[root.as_raw() as usize].width
    }

    /// Returns `true` if this signal is a net (multi-driver, tri-state).
    pub fn is_net(&self, id: SignalId) -> bool {
        let root = self.find(id);
        self.cells.borrow()[root.as_raw() as usize].is_net
    }

    /// Marks the signal as unassignable (e.g. a constant).
    pub fn set_unassignable(&self, id: SignalId) {
        let root = self.find(id);
        self.cells.borrow_mut()[root.as_raw() as usize].unassignable = true;
    }

    /// Returns `true` if the signal has been marked unassignable.
    pub fn is_unassignable(&self, id: SignalId) -> bool {
        let root = self.find(id);
        self.cells.borrow()[root.as_raw() as usize].unassignable
    }

    /// Reads the current value of the signal.
    pub fn value(&self, id: SignalId) -> LogicValue {
        let root = self.find(id);
        self.cells.borrow()[root.as_raw() as usize].value.clone()
    }

    /// Sets the driver of a non-net signal, returning an error if one is
    /// already present (caller decides whether this is fatal).
    pub fn set_driver(&self, id: SignalId, driver: Driver) -> Result<(), ()> {
        let root = self.find(id);
        let mut cells = self.cells.borrow_mut();
        if cells[root.as_raw() as usize].driver.is_some() {
            return Err(());
        }
        cells[root.as_raw() as usize].driver = Some(driver);
        Ok(())
    }

    /// Registers a change listener on the signal's current root cell.
    pub fn listen(&self, id: SignalId, listener: Listener) {
        let root = self.find(id);
        self.cells.borrow_mut()[root.as_raw() as usize]
            .listeners
            .push(listener);
    }

    /// Deposits `value` at `id`, propagating to listeners without going
    /// through a recursive call stack: the outermost `put` drains a work
    /// queue until quiescent, and any `put` issued from inside a listener
    /// (re-entrant emission) simply enqueues and returns.
    pub fn put(&self, id: SignalId, value: LogicValue) {
        let root = self.find(id);
        let old = {
            let mut cells = self.cells.borrow_mut();
            let cell = &mut cells[root.as_raw() as usize];
            if cell.value == value {
                None
            } else {
                let old = std::mem::replace(&mut cell.value, value.clone());
                Some(old)
            }
        };
        if let Some(old) = old {
            self.queue.borrow_mut().push_back((root, old));
        }
        if self.propagating.get() {
            return;
        }
        self.propagating.set(true);
        while let Some((id, old)) = self.queue.borrow_mut().pop_front() {
            self.fire_listeners(id, old);
        }
        self.propagating.set(false);
    }

    fn fire_listeners(&self, id: SignalId, old: LogicValue) {
        // Snapshot the current value and take the listener closures out so
        // that a listener calling back into `put`/`listen` cannot deadlock
        // the RefCell.
        let (new, mut listeners) = {
            let mut cells = self.cells.borrow_mut();
            let cell = &mut cells[id.as_raw() as usize];
            let listeners = std::mem::take(&mut cell.listeners);
            (cell.value.clone(), listeners)
        };
        for listener in listeners.iter_mut() {
            listener(&old, &new);
        }
        self.cells.borrow_mut()[id.as_raw() as usize]
            .listeners
            .append(&mut listeners);
    }

    /// Adds a driver slot to a net signal and returns its index.
    pub fn net_add_driver(&self, id: SignalId) -> usize {
        let root = self.find(id);
        let mut cells = self.cells.borrow_mut();
        let width = cells[root.as_raw() as usize].width;
        cells[root.as_raw() as usize]
            .net_drivers
            .push(LogicValue::z(width));
        cells[root.as_raw() as usize].net_drivers.len() - 1
    }

    /// Updates one driver slot of a net and recomputes the resolved value.
    pub fn net_drive(&self, id: SignalId, slot: usize, value: LogicValue) {
        let root = self.find(id);
        {
            let mut cells = self.cells.borrow_mut();
            cells[root.as_raw() as usize].net_drivers[slot] = value;
        }
        let resolved = self.net_resolve(root);
        self.put(root, resolved);
    }

    fn net_resolve(&self, root: SignalId) -> LogicValue {
        use gatewright_common::LogicBit;
        let cells = self.cells.borrow();
        let cell = &cells[root.as_raw() as usize];
        let width = cell.width;
        let mut out = LogicValue::z(width);
        for bit in 0..width {
            let mut resolved = LogicBit::Z;
            for driver in &cell.net_drivers {
                let b = driver.get(bit);
                if b == LogicBit::Z {
                    continue;
                }
                resolved = match resolved {
                    LogicBit::Z => b,
                    other if other == b => other,
                    _ => LogicBit::X,
                };
            }
            out.set(bit, resolved);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_read_default_x() {
        let g = Graph::new();
        let id = g.borrow().alloc("a", 4, false);
        assert!(g.borrow().value(id).is_all_x());
    }

    #[test]
    fn put_updates_value() {
        let g = Graph::new();
        let id = g.borrow().alloc("a", 4, false);
        g.borrow().put(id, LogicValue::from_u64(5, 4));
        assert_eq!(g.borrow().value(id).to_u64(), Some(5));
    }

    #[test]
    fn union_shares_value() {
        let g = Graph::new();
        let a = g.borrow().alloc("a", 4, false);
        let b = g.borrow().alloc("b", 4, false);
        g.borrow().put(a, LogicValue::from_u64(3, 4));
        g.borrow().union(a, b);
        assert_eq!(g.borrow().value(b).to_u64(), Some(3));
        g.borrow().put(b, LogicValue::from_u64(9, 4));
        assert_eq!(g.borrow().value(a).to_u64(), Some(9));
    }

    #[test]
    fn chained_union_propagates() {
        let g = Graph::new();
        let a = g.borrow().alloc("a", 4, false);
        let b = g.borrow().alloc("b", 4, false);
        let c = g.borrow().alloc("c", 4, false);
        g.borrow().union(a, b);
        g.borrow().union(b, c);
        g.borrow().put(a, LogicValue::from_u64(1, 4));
        assert_eq!(g.borrow().value(b).to_u64(), Some(1));
        assert_eq!(g.borrow().value(c).to_u64(), Some(1));
    }

    #[test]
    fn listener_fires_on_change() {
        let g = Graph::new();
        let id = g.borrow().alloc("a", 1, false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        g.borrow().listen(
            id,
            Box::new(move |_old, new| {
                seen_clone.borrow_mut().push(new.to_u64());
            }),
        );
        g.borrow().put(id, LogicValue::from_u64(1, 1));
        assert_eq!(*seen.borrow(), vec![Some(1)]);
    }

    #[test]
    fn net_resolves_single_driver() {
        let g = Graph::new();
        let net = g.borrow().alloc("n", 8, true);
        let slot_a = g.borrow().net_add_driver(net);
        let slot_b = g.borrow().net_add_driver(net);
        g.borrow()
            .net_drive(net, slot_a, LogicValue::from_u64(0x0F, 8));
        g.borrow().net_drive(net, slot_b, LogicValue::z(8));
        assert_eq!(g.borrow().value(net).to_u64(), Some(0x0F));
    }

    #[test]
    fn net_conflict_is_x() {
        let g = Graph::new();
        let net = g.borrow().alloc("n", 1, true);
        let a = g.borrow().net_add_driver(net);
        let b = g.borrow().net_add_driver(net);
        g.borrow().net_drive(net, a, LogicValue::from_u64(0, 1));
        g.borrow().net_drive(net, b, LogicValue::from_u64(1, 1));
        assert!(g.borrow().value(net).is_all_x());
    }

    #[test]
    fn net_all_z_reads_z() {
        let g = Graph::new();
        let net = g.borrow().alloc("n", 4, true);
        let a = g.borrow().net_add_driver(net);
        g.borrow().net_drive(net, a, LogicValue::z(4));
        assert!(g.borrow().value(net).is_all_z());
    }
}
