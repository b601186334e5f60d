//! JSON introspection of a built module hierarchy, for external inspectors.

use gatewright_graph::{Module, Port, PortDirection};
use serde::Serialize;

/// One port's current state, as reported to an external inspector.
#[derive(Debug, Clone, Serialize)]
pub struct PortInfo {
    /// The port's name.
    pub name: String,
    /// The port's direction (`"input"`, `"output"`, or `"inout"`).
    pub direction: String,
    /// The port's current value, rendered as a width-annotated binary
    /// string (e.g. `"4'b1x0z"`).
    pub value: String,
    /// The port's bit width.
    pub width: u32,
}

/// A module's reported state: its ports and the same information,
/// recursively, for every sub-module instance.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInfo {
    /// The module's instance name.
    pub name: String,
    /// Input ports.
    pub inputs: Vec<PortInfo>,
    /// Output ports.
    pub outputs: Vec<PortInfo>,
    /// Bidirectional ports.
    pub inouts: Vec<PortInfo>,
    /// Sub-module instances, in declaration order.
    #[serde(rename = "subModules")]
    pub sub_modules: Vec<ModuleInfo>,
}

fn port_info(p: &Port) -> PortInfo {
    PortInfo {
        name: p.name.clone(),
        direction: direction_str(p.direction).to_string(),
        value: p.internal.value().to_bin_string(),
        width: p.width(),
    }
}

fn direction_str(d: PortDirection) -> &'static str {
    match d {
        PortDirection::Input => "input",
        PortDirection::Output => "output",
        PortDirection::InOut => "inout",
    }
}

/// Walks `m` and its sub-modules into a [`ModuleInfo`] tree.
pub fn introspect(m: &dyn Module) -> ModuleInfo {
    let base = m.base();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut inouts = Vec::new();
    for p in base.all_ports() {
        match p.direction {
            PortDirection::Input => inputs.push(port_info(p)),
            PortDirection::Output => outputs.push(port_info(p)),
            PortDirection::InOut => inouts.push(port_info(p)),
        }
    }
    let sub_modules = base.submodules().iter().map(|s| introspect(s.as_ref())).collect();
    ModuleInfo {
        name: base.name().to_string(),
        inputs,
        outputs,
        inouts,
        sub_modules,
    }
}

/// Renders `m`'s introspection tree as a JSON string.
pub fn introspect_json(m: &dyn Module) -> serde_json::Result<String> {
    serde_json::to_string(&introspect(m))
}
