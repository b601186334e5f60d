//! SystemVerilog text emission.
//!
//! Walks a built module hierarchy once per distinct module *definition*
//! (grounded on `aion_synth::lower`'s per-definition-identity dedup) and
//! prints structurally faithful SystemVerilog: one `module` per definition,
//! instances at every use site, `always_comb`/`always_ff` for declared
//! blocks, and expressions emitted inline.
//!
//! Unlike `aion_synth::lower_expr`'s use-count-based inlining over an
//! elaborated netlist arena, `Expr` nodes here have no separate identity of
//! their own (they are plain trees built directly over named `Logic`
//! leaves), so every operator node is inline by construction; only an actual
//! declared `Logic` ever gets a wire declaration.

use crate::error::SynthError;
use crate::keywords::Uniquifier;
use gatewright_common::LogicValue;
use gatewright_graph::{
    BinaryOp, BlockDecl, BlockKind, CaseItem, CaseType, ClockEdge, Conditional, Expr, IfArm, Logic, Module,
    PortDirection, UnaryOp,
};
use std::collections::HashSet;

/// One synthesised module definition.
#[derive(Debug, Clone)]
pub struct DefinitionOutput {
    /// The definition's name (shared by every instance).
    pub definition_name: String,
    /// The emitted SystemVerilog source for this definition alone.
    pub source: String,
}

/// Synthesises `top` and every definition reachable from it, returning one
/// [`DefinitionOutput`] per distinct definition (bottom of the hierarchy
/// first, so a textual concatenation is valid SystemVerilog without forward
/// declarations).
pub fn generate_definitions(top: &dyn Module) -> Result<Vec<DefinitionOutput>, SynthError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    walk(top, &mut seen, &mut out)?;
    tracing::debug!(definitions = out.len(), top = %top.base().name(), "synthesis walk complete");
    Ok(out)
}

/// Synthesises `top` and everything beneath it into a single SystemVerilog
/// string, one definition after another.
pub fn generate_synth(top: &dyn Module) -> Result<String, SynthError> {
    let defs = generate_definitions(top)?;
    Ok(defs
        .into_iter()
        .map(|d| d.source)
        .collect::<Vec<_>>()
        .join("\n\n"))
}

fn walk(
    m: &dyn Module,
    seen: &mut HashSet<String>,
    out: &mut Vec<DefinitionOutput>,
) -> Result<(), SynthError> {
    if !m.is_built() {
        return Err(SynthError::NotBuilt {
            module: m.base().name().to_string(),
        });
    }
    for sub in m.base().submodules() {
        walk(sub.as_ref(), seen, out)?;
    }
    let definition_name = m.definition_name();
    if seen.insert(definition_name.clone()) {
        tracing::trace!(definition = %definition_name, "emitting module definition");
        let source = emit_definition(m, &definition_name)?;
        out.push(DefinitionOutput {
            definition_name,
            source,
        });
    }
    Ok(())
}

/// A `(Logic, name)` registry resolved by storage-cell identity rather than
/// raw signal ID, since adoption can give two handles to the same cell
/// distinct IDs.
struct NameTable(Vec<(Logic, String)>);

impl NameTable {
    fn resolve(&self, sig: &Logic) -> Option<String> {
        self.0.iter().find(|(s, _)| s.same_cell(sig)).map(|(_, n)| n.clone())
    }

    fn register(&mut self, sig: Logic, name: String) {
        self.0.push((sig, name));
    }
}

fn emit_definition(m: &dyn Module, definition_name: &str) -> Result<String, SynthError> {
    let base = m.base();
    let module_name = base.name().to_string();
    let mut uniq = Uniquifier::new();
    let mut names = NameTable(Vec::new());
    let mut extra_wires: Vec<(String, u32)> = Vec::new();

    let mut port_decls = Vec::new();
    for port in base.all_ports() {
        let name = uniq.unique(&port.name, true).map_err(|reason| SynthError::Structural {
            module: module_name.clone(),
            signal: port.name.clone(),
            reason,
        })?;
        names.register(port.internal.clone(), name.clone());
        port_decls.push(format!(
            "{} {}{}",
            port_direction_keyword(port.direction),
            type_decl(port.width()),
            name
        ));
    }

    for (sig, reserved) in base.internal_signals() {
        let name = uniq.unique(&sig.name(), *reserved).map_err(|reason| SynthError::Structural {
            module: module_name.clone(),
            signal: sig.name(),
            reason,
        })?;
        extra_wires.push((name.clone(), sig.width()));
        names.register(sig.clone(), name);
    }

    let mut instance_lines = Vec::new();
    for sub in base.submodules() {
        let sub_base = sub.base();
        let instance_name = uniq.unique(sub_base.name(), false).map_err(|reason| SynthError::Structural {
            module: module_name.clone(),
            signal: String::new(),
            reason,
        })?;
        let mut connections = Vec::new();
        for port in sub_base.all_ports() {
            let name = match names.resolve(&port.external) {
                Some(n) => n,
                None => {
                    let fresh = uniq
                        .unique(&port.external.name(), false)
                        .map_err(|reason| SynthError::Structural {
                            module: module_name.clone(),
                            signal: port.external.name(),
                            reason,
                        })?;
                    extra_wires.push((fresh.clone(), port.external.width()));
                    names.register(port.external.clone(), fresh.clone());
                    fresh
                }
            };
            connections.push(format!(".{}({})", port.name, name));
        }
        instance_lines.push(format!(
            "  {} {} ({});",
            sub.definition_name(),
            instance_name,
            connections.join(", ")
        ));
    }

    let mut block_lines = Vec::new();
    for decl in base.blocks() {
        block_lines.push(emit_block(&module_name, decl, &names)?);
    }

    let mut lines = Vec::new();
    lines.push(format!("module {}(", definition_name));
    lines.push(
        port_decls
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i + 1 == port_decls.len() {
                    format!("  {p}")
                } else {
                    format!("  {p},")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    );
    lines.push(");".to_string());
    lines.push(String::new());
    for (name, width) in &extra_wires {
        if *width == 0 {
            continue;
        }
        lines.push(format!("  {}{};", type_decl(*width), name));
    }
    if !extra_wires.is_empty() {
        lines.push(String::new());
    }
    if !instance_lines.is_empty() {
        lines.extend(instance_lines);
        lines.push(String::new());
    }
    for block in block_lines {
        lines.push(block);
        lines.push(String::new());
    }
    lines.push("endmodule".to_string());
    Ok(lines.join("\n"))
}

fn port_direction_keyword(dir: PortDirection) -> &'static str {
    match dir {
        PortDirection::Input => "input ",
        PortDirection::Output => "output",
        PortDirection::InOut => "inout ",
    }
}

fn type_decl(width: u32) -> String {
    if width <= 1 {
        "logic ".to_string()
    } else {
        format!("logic [{}:0] ", width - 1)
    }
}

fn emit_block(module_name: &str, decl: &BlockDecl, names: &NameTable) -> Result<String, SynthError> {
    let body = emit_conditionals(module_name, &decl.conditionals, names, decl.kind == BlockKind::Sequential, 2)?;
    match decl.kind {
        BlockKind::Combinational | BlockKind::CombinationalSsa => Ok(format!(
            "  // {}\n  always_comb begin\n{}\n  end",
            decl.name, body
        )),
        BlockKind::Sequential => {
            let clock = decl.clock.as_ref().ok_or_else(|| SynthError::Structural {
                module: module_name.to_string(),
                signal: String::new(),
                reason: format!("sequential block '{}' has no declared clock", decl.name),
            })?;
            let clock_name = names.resolve(clock).ok_or_else(|| SynthError::Structural {
                module: module_name.to_string(),
                signal: clock.name(),
                reason: "clock signal is not visible in this module's scope".to_string(),
            })?;
            let edge_kw = match decl.edge.unwrap_or(ClockEdge::Posedge) {
                ClockEdge::Posedge => format!("posedge {clock_name}"),
                ClockEdge::Negedge => format!("negedge {clock_name}"),
                ClockEdge::Both => format!("posedge {clock_name} or negedge {clock_name}"),
            };
            let sensitivity = match &decl.reset {
                Some(reset) => {
                    let reset_name = names.resolve(reset).ok_or_else(|| SynthError::Structural {
                        module: module_name.to_string(),
                        signal: reset.name(),
                        reason: "reset signal is not visible in this module's scope".to_string(),
                    })?;
                    format!("{edge_kw} or posedge {reset_name}")
                }
                None => edge_kw,
            };
            Ok(format!(
                "  // {}\n  always_ff @({}) begin\n{}\n  end",
                decl.name, sensitivity, body
            ))
        }
    }
}

fn emit_conditionals(
    module_name: &str,
    conds: &[Conditional],
    names: &NameTable,
    nonblocking: bool,
    indent: usize,
) -> Result<String, SynthError> {
    let mut lines = Vec::new();
    for c in conds {
        lines.push(emit_conditional(module_name, c, names, nonblocking, indent)?);
    }
    Ok(lines.join("\n"))
}

fn emit_conditional(
    module_name: &str,
    c: &Conditional,
    names: &NameTable,
    nonblocking: bool,
    indent: usize,
) -> Result<String, SynthError> {
    let pad = "  ".repeat(indent);
    let op = if nonblocking { "<=" } else { "=" };
    match c {
        Conditional::Assign { target, source } => {
            let target_name = names.resolve(target).ok_or_else(|| SynthError::Structural {
                module: module_name.to_string(),
                signal: target.name(),
                reason: "assignment target is not visible in this module's scope".to_string(),
            })?;
            let src = emit_expr(module_name, source, names)?;
            Ok(format!("{pad}{target_name} {op} {src};"))
        }
        Conditional::If {
            condition,
            then_body,
            else_body,
        } => {
            let cond = emit_expr(module_name, condition, names)?;
            let then = emit_conditionals(module_name, then_body, names, nonblocking, indent + 1)?;
            if else_body.is_empty() {
                Ok(format!("{pad}if ({cond}) begin\n{then}\n{pad}end"))
            } else {
                let els = emit_conditionals(module_name, else_body, names, nonblocking, indent + 1)?;
                Ok(format!(
                    "{pad}if ({cond}) begin\n{then}\n{pad}end else begin\n{els}\n{pad}end"
                ))
            }
        }
        Conditional::IfBlock(arms) => emit_if_chain(module_name, arms, names, nonblocking, indent),
        Conditional::Case {
            subject,
            items,
            default,
            case_type,
        } => emit_case(module_name, subject, items, default, *case_type, false, names, nonblocking, indent),
        Conditional::CaseZ {
            subject,
            items,
            default,
            case_type,
        } => emit_case(module_name, subject, items, default, *case_type, true, names, nonblocking, indent),
    }
}

fn emit_if_chain(
    module_name: &str,
    arms: &[IfArm],
    names: &NameTable,
    nonblocking: bool,
    indent: usize,
) -> Result<String, SynthError> {
    let pad = "  ".repeat(indent);
    let mut out = String::new();
    for (i, arm) in arms.iter().enumerate() {
        let body = emit_conditionals(module_name, &arm.body, names, nonblocking, indent + 1)?;
        match &arm.condition {
            Some(cond) => {
                let cond_s = emit_expr(module_name, cond, names)?;
                let keyword = if i == 0 { "if" } else { "end else if" };
                out.push_str(&format!("{pad}{keyword} ({cond_s}) begin\n{body}\n"));
            }
            None => {
                out.push_str(&format!("{pad}end else begin\n{body}\n"));
            }
        }
    }
    out.push_str(&format!("{pad}end"));
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn emit_case(
    module_name: &str,
    subject: &Expr,
    items: &[CaseItem],
    default: &Option<Vec<Conditional>>,
    case_type: CaseType,
    wildcards: bool,
    names: &NameTable,
    nonblocking: bool,
    indent: usize,
) -> Result<String, SynthError> {
    let pad = "  ".repeat(indent);
    let keyword = if wildcards { "casez" } else { "case" };
    let prefix = match case_type {
        CaseType::None => "",
        CaseType::Unique => "unique ",
        CaseType::Priority => "priority ",
    };
    let subj = emit_expr(module_name, subject, names)?;
    let mut out = format!("{pad}{prefix}{keyword} ({subj})\n");
    for item in items {
        let pats = item
            .matches
            .iter()
            .map(|v| v.to_bin_string())
            .collect::<Vec<_>>()
            .join(", ");
        let body = emit_conditionals(module_name, &item.body, names, nonblocking, indent + 2)?;
        out.push_str(&format!("{pad}  {pats}: begin\n{body}\n{pad}  end\n"));
    }
    if let Some(default) = default {
        let body = emit_conditionals(module_name, default, names, nonblocking, indent + 2)?;
        out.push_str(&format!("{pad}  default: begin\n{body}\n{pad}  end\n"));
    }
    out.push_str(&format!("{pad}endcase"));
    Ok(out)
}

fn emit_expr(module_name: &str, expr: &Expr, names: &NameTable) -> Result<String, SynthError> {
    match expr {
        Expr::Signal(sig) => {
            names.resolve(sig).ok_or_else(|| SynthError::Structural {
                module: module_name.to_string(),
                signal: sig.name(),
                reason: "signal read is not visible in this module's scope".to_string(),
            })
        }
        Expr::Literal(v) => Ok(emit_literal(v)),
        Expr::Unary(op, a) => {
            let av = emit_expr(module_name, a, names)?;
            Ok(match op {
                UnaryOp::Not => format!("(~{av})"),
                UnaryOp::RedAnd => format!("(&{av})"),
                UnaryOp::RedOr => format!("(|{av})"),
                UnaryOp::RedXor => format!("(^{av})"),
            })
        }
        Expr::Binary(op, a, b) => {
            let av = emit_expr(module_name, a, names)?;
            let bv = emit_expr(module_name, b, names)?;
            let sym = match op {
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Mul => "*",
                BinaryOp::Div => "/",
                BinaryOp::Mod => "%",
                BinaryOp::And => "&",
                BinaryOp::Or => "|",
                BinaryOp::Xor => "^",
                BinaryOp::Shl => "<<",
                BinaryOp::Shr => ">>",
                BinaryOp::AShr => ">>>",
                BinaryOp::Eq => "==",
                BinaryOp::Ne => "!=",
                BinaryOp::Lt => "<",
                BinaryOp::Le => "<=",
                BinaryOp::Gt => ">",
                BinaryOp::Ge => ">=",
            };
            Ok(format!("({av} {sym} {bv})"))
        }
        Expr::Ternary(cond, t, f) => {
            let c = emit_expr(module_name, cond, names)?;
            let tv = emit_expr(module_name, t, names)?;
            let fv = emit_expr(module_name, f, names)?;
            Ok(format!("({c} ? {tv} : {fv})"))
        }
        Expr::Concat(parts) => {
            let mut rendered = Vec::with_capacity(parts.len());
            for p in parts {
                rendered.push(emit_expr(module_name, p, names)?);
            }
            rendered.reverse();
            Ok(format!("{{{}}}", rendered.join(", ")))
        }
        Expr::Replicate(e, n) => {
            let ev = emit_expr(module_name, e, names)?;
            Ok(format!("{{{n}{{{ev}}}}}"))
        }
        Expr::Slice(e, hi, lo) => {
            let width = e.eval().width();
            let ev = emit_expr(module_name, e, names)?;
            if width <= 1 {
                Ok(ev)
            } else if hi == lo {
                Ok(format!("{ev}[{hi}]"))
            } else {
                Ok(format!("{ev}[{hi}:{lo}]"))
            }
        }
    }
}

fn emit_literal(v: &LogicValue) -> String {
    if v.width() == 0 {
        String::new()
    } else {
        v.to_hex_string()
    }
}
