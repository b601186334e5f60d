//! The `Conditional` AST: assignment statements evaluated inside
//! `Combinational`/`Sequential` blocks.
//!
//! Replaces the "virtual dispatch over Conditional subclasses" design found
//! in object-oriented hosts with a single tagged enum over the closed set
//! `{ConditionalAssign, If, IfBlock, Case, CaseZ}`; one interpreter handles
//! all variants (see `gatewright_sim::block`).

use crate::expr::Expr;
use crate::logic::Logic;
use gatewright_common::{LogicBit, LogicValue};

/// How a `Case` treats the number of matching arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseType {
    /// No special checking; first match wins, same as `priority`.
    None,
    /// At most one arm may match; more than one match yields all-`x` outputs.
    Unique,
    /// Arms are evaluated in order; the first match wins.
    Priority,
}

/// One arm of a `Case`/`CaseZ`.
#[derive(Clone)]
pub struct CaseItem {
    /// The value(s) this arm matches against the case subject.
    pub matches: Vec<LogicValue>,
    /// The statements to run when this arm is selected.
    pub body: Vec<Conditional>,
}

/// One `if`/`else if` arm of an [`Conditional::IfBlock`].
#[derive(Clone)]
pub struct IfArm {
    /// The arm's condition (`None` marks the trailing `else`).
    pub condition: Option<Expr>,
    /// The statements to run when this arm is selected.
    pub body: Vec<Conditional>,
}

/// A node of the behavioral assignment AST.
#[derive(Clone)]
pub enum Conditional {
    /// `target < source` — a conditional assignment, legal only inside a
    /// `Combinational`/`Sequential` body (distinct from the `<=` wire
    /// connection operator, which performs adoption instead).
    Assign {
        /// The signal being assigned.
        target: Logic,
        /// The value expression.
        source: Expr,
    },
    /// A two-way `if`/`else`.
    If {
        /// The condition.
        condition: Expr,
        /// The body when the condition evaluates to `1`.
        then_body: Vec<Conditional>,
        /// The body when the condition evaluates to `0`.
        else_body: Vec<Conditional>,
    },
    /// A chained `if`/`else if`/`.../else`.
    IfBlock(Vec<IfArm>),
    /// A `case` statement; see [`CaseType`].
    Case {
        /// The subject expression.
        subject: Expr,
        /// The match arms.
        items: Vec<CaseItem>,
        /// The default arm, if any.
        default: Option<Vec<Conditional>>,
        /// The case-matching discipline.
        case_type: CaseType,
    },
    /// A `casez` statement: `z` bits in arm match values are wildcards.
    CaseZ {
        /// The subject expression.
        subject: Expr,
        /// The match arms (match values may contain `z` wildcard bits).
        items: Vec<CaseItem>,
        /// The default arm, if any.
        default: Option<Vec<Conditional>>,
        /// The case-matching discipline.
        case_type: CaseType,
    },
}

impl Conditional {
    /// Collects every signal read by this node and its descendants (not
    /// including assignment targets) into `out`.
    pub fn collect_reads(&self, out: &mut Vec<Logic>) {
        match self {
            Conditional::Assign { source, .. } => source.reads(out),
            Conditional::If {
                condition,
                then_body,
                else_body,
            } => {
                condition.reads(out);
                then_body.iter().for_each(|c| c.collect_reads(out));
                else_body.iter().for_each(|c| c.collect_reads(out));
            }
            Conditional::IfBlock(arms) => {
                for arm in arms {
                    if let Some(cond) = &arm.condition {
                        cond.reads(out);
                    }
                    arm.body.iter().for_each(|c| c.collect_reads(out));
                }
            }
            Conditional::Case {
                subject,
                items,
                default,
                ..
            }
            | Conditional::CaseZ {
                subject,
                items,
                default,
                ..
            } => {
                subject.reads(out);
                for item in items {
                    item.body.iter().for_each(|c| c.collect_reads(out));
                }
                if let Some(default) = default {
                    default.iter().for_each(|c| c.collect_reads(out));
                }
            }
        }
    }

    /// Collects every signal assigned by this node and its descendants.
    pub fn collect_writes(&self, out: &mut Vec<Logic>) {
        match self {
            Conditional::Assign { target, .. } => out.push(target.clone()),
            Conditional::If {
                then_body,
                else_body,
                ..
            } => {
                then_body.iter().for_each(|c| c.collect_writes(out));
                else_body.iter().for_each(|c| c.collect_writes(out));
            }
            Conditional::IfBlock(arms) => {
                for arm in arms {
                    arm.body.iter().for_each(|c| c.collect_writes(out));
                }
            }
            Conditional::Case { items, default, .. } | Conditional::CaseZ { items, default, .. } => {
                for item in items {
                    item.body.iter().for_each(|c| c.collect_writes(out));
                }
                if let Some(default) = default {
                    default.iter().for_each(|c| c.collect_writes(out));
                }
            }
        }
    }
}

/// Compares `subject` against `matches`, treating `z` bits in `matches` as
/// wildcards when `wildcards` is `true` (i.e. for `CaseZ`).
pub fn case_matches(subject: &LogicValue, pattern: &LogicValue, wildcards: bool) -> bool {
    if subject.width() != pattern.width() {
        return false;
    }
    for i in 0..subject.width() {
        let s = subject.get(i);
        let p = pattern.get(i);
        if wildcards && p == LogicBit::Z {
            continue;
        }
        if s != p {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn case_matches_exact() {
        let subj = LogicValue::from_str_bits("01").unwrap();
        let pat = LogicValue::from_str_bits("01").unwrap();
        assert!(case_matches(&subj, &pat, false));
    }

    #[test]
    fn casez_wildcard_matches() {
        let subj = LogicValue::from_str_bits("11").unwrap();
        let pat = LogicValue::from_str_bits("1z").unwrap();
        assert!(case_matches(&subj, &pat, true));
        assert!(!case_matches(&subj, &pat, false));
    }

    #[test]
    fn collect_reads_and_writes() {
        let g = Graph::new();
        let a = Logic::new(&g, "a", 4);
        let y = Logic::new(&g, "y", 4);
        let cond = Conditional::Assign {
            target: y.clone(),
            source: Expr::Signal(a.clone()),
        };
        let mut reads = Vec::new();
        let mut writes = Vec::new();
        cond.collect_reads(&mut reads);
        cond.collect_writes(&mut writes);
        assert_eq!(reads.len(), 1);
        assert_eq!(writes.len(), 1);
    }

    #[test]
    fn case_type_variants_distinct() {
        assert_ne!(CaseType::None, CaseType::Unique);
        assert_ne!(CaseType::Unique, CaseType::Priority);
    }
}
