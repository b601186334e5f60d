//! Port definitions for module interfaces.

use crate::ids::PortId;
use crate::logic::Logic;
use serde::{Deserialize, Serialize};

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// An input port (data flows into the module).
    Input,
    /// An output port (data flows out of the module).
    Output,
    /// A bidirectional port (data flows both ways).
    InOut,
}

/// A port in a module's external interface.
///
/// A port is really two [`Logic`] handles connected at the boundary: the
/// internal-side signal that module-body code reads/writes, and the
/// external-side signal that the parent (or simulation harness) reads/writes.
#[derive(Clone)]
pub struct Port {
    /// The unique ID of this port within its module.
    pub id: PortId,
    /// The port name.
    pub name: String,
    /// The direction of data flow.
    pub direction: PortDirection,
    /// The internal-side signal, consumed by the module's own logic.
    pub internal: Logic,
    /// The external-side signal, consumed by the parent/caller.
    pub external: Logic,
    /// `true` if this port's name was explicitly reserved by the user and
    /// must not be renamed during uniquification.
    pub reserved: bool,
}

impl Port {
    /// The port's bit width.
    pub fn width(&self) -> u32 {
        self.internal.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn port_directions_distinct() {
        assert_ne!(PortDirection::Input, PortDirection::Output);
        assert_ne!(PortDirection::Output, PortDirection::InOut);
    }

    #[test]
    fn port_width_matches_internal() {
        let g = Graph::new();
        let internal = Logic::new(&g, "clk_in", 1);
        let external = Logic::new(&g, "clk_ext", 1);
        let p = Port {
            id: PortId::from_raw(0),
            name: "clk".to_string(),
            direction: PortDirection::Input,
            internal,
            external,
            reserved: false,
        };
        assert_eq!(p.width(), 1);
    }
}
