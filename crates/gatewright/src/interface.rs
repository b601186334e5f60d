//! Named bundles of signals ("interfaces"), a convenience grouping over a
//! module's ports with no behaviour of its own.

use gatewright_graph::Logic;
use std::collections::HashMap;

/// A named group of signals, addressed by a short label rather than by
/// position — useful for bundling a protocol's wires (e.g. `valid`/`ready`/
/// `data`) under one handle passed between module constructors.
#[derive(Clone, Default)]
pub struct Interface {
    signals: HashMap<String, Logic>,
}

impl Interface {
    /// Creates an empty interface.
    pub fn new() -> Self {
        Interface {
            signals: HashMap::new(),
        }
    }

    /// Adds `signal` to the interface under `name`, returning the previous
    /// signal registered under that name, if any.
    pub fn add(&mut self, name: impl Into<String>, signal: Logic) -> Option<Logic> {
        self.signals.insert(name.into(), signal)
    }

    /// Looks up a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Logic> {
        self.signals.get(name)
    }

    /// The names of every signal in the interface, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewright_graph::Graph;

    #[test]
    fn add_and_lookup() {
        let g = Graph::new();
        let mut iface = Interface::new();
        let valid = Logic::new(&g, "valid", 1);
        iface.add("valid", valid.clone());
        assert!(iface.signal("valid").unwrap().same_cell(&valid));
        assert!(iface.signal("ready").is_none());
    }
}
