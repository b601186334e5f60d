//! Expression trees used inside `Conditional` bodies and continuous
//! assignments.
//!
//! Unlike a parsed-language IR, these expressions are built directly by host
//! code (operator overloads on [`Logic`] construct them) and evaluated
//! against the live signal graph rather than against an elaborated design.

use crate::logic::Logic;
use gatewright_common::LogicValue;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Bitwise NOT (`~`).
    Not,
    /// Reduction AND.
    RedAnd,
    /// Reduction OR.
    RedOr,
    /// Reduction XOR.
    RedXor,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Logical left shift.
    Shl,
    /// Logical right shift.
    Shr,
    /// Arithmetic right shift.
    AShr,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Unsigned less-than.
    Lt,
    /// Unsigned less-or-equal.
    Le,
    /// Unsigned greater-than.
    Gt,
    /// Unsigned greater-or-equal.
    Ge,
}

/// A behavioral expression evaluated against the live signal graph.
#[derive(Clone)]
pub enum Expr {
    /// A reference to a signal's current value.
    Signal(Logic),
    /// A literal constant.
    Literal(LogicValue),
    /// A unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// A binary operation.
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// A ternary/mux expression (`cond ? a : b`); `cond` must be 1-bit.
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    /// A concatenation, first element least-significant.
    Concat(Vec<Expr>),
    /// Replication (`{n{expr}}`).
    Replicate(Box<Expr>, i64),
    /// A bit slice `[hi:lo]` of a sub-expression.
    Slice(Box<Expr>, i64, i64),
}

impl Expr {
    /// Evaluates this expression against the current signal graph state.
    ///
    /// Invalid operand widths only arise from a construction bug (this crate
    /// builds expressions with matching widths); such mismatches surface as
    /// a width-annotated all-`x` result rather than a panic, matching the
    /// value algebra's general x-propagation policy.
    pub fn eval(&self) -> LogicValue {
        match self {
            Expr::Signal(sig) => sig.value(),
            Expr::Literal(v) => v.clone(),
            Expr::Unary(op, a) => {
                let av = a.eval();
                match op {
                    UnaryOp::Not => (&!&av.clone()).clone(),
                    UnaryOp::RedAnd => LogicValue::from_bits([av.reduce_and()]),
                    UnaryOp::RedOr => LogicValue::from_bits([av.reduce_or()]),
                    UnaryOp::RedXor => LogicValue::from_bits([av.reduce_xor()]),
                }
            }
            Expr::Binary(op, a, b) => {
                let av = a.eval();
                let bv = b.eval();
                match op {
                    BinaryOp::Add => av.add(&bv).unwrap_or_else(|_| LogicValue::x(av.width())),
                    BinaryOp::Sub => av.sub(&bv).unwrap_or_else(|_| LogicValue::x(av.width())),
                    BinaryOp::Mul => av.mul(&bv).unwrap_or_else(|_| LogicValue::x(av.width())),
                    BinaryOp::Div => av.div(&bv).unwrap_or_else(|_| LogicValue::x(av.width())),
                    BinaryOp::Mod => av.rem(&bv).unwrap_or_else(|_| LogicValue::x(av.width())),
                    BinaryOp::And => &av & &bv,
                    BinaryOp::Or => &av | &bv,
                    BinaryOp::Xor => &av ^ &bv,
                    BinaryOp::Shl => av.shl_amount(&bv),
                    BinaryOp::Shr => av.shr_amount(&bv),
                    BinaryOp::AShr => av.ashr_amount(&bv),
                    BinaryOp::Eq => LogicValue::from_bits([av.logic_eq(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                    BinaryOp::Ne => LogicValue::from_bits([av.logic_ne(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                    BinaryOp::Lt => LogicValue::from_bits([av.logic_lt(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                    BinaryOp::Le => LogicValue::from_bits([av.logic_le(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                    BinaryOp::Gt => LogicValue::from_bits([av.logic_gt(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                    BinaryOp::Ge => LogicValue::from_bits([av.logic_ge(&bv).unwrap_or(gatewright_common::LogicBit::X)]),
                }
            }
            Expr::Ternary(cond, t, f) => {
                let c = cond.eval();
                match c.get(0) {
                    gatewright_common::LogicBit::One if c.width() == 1 => t.eval(),
                    gatewright_common::LogicBit::Zero if c.width() == 1 => f.eval(),
                    _ => {
                        let tv = t.eval();
                        LogicValue::x(tv.width())
                    }
                }
            }
            Expr::Concat(parts) => {
                let vals: Vec<LogicValue> = parts.iter().map(Expr::eval).collect();
                LogicValue::concat(&vals)
            }
            Expr::Replicate(e, n) => e
                .eval()
                .replicate(*n)
                .unwrap_or_else(|_| LogicValue::x(0)),
            Expr::Slice(e, hi, lo) => e.eval().slice(*hi, *lo),
        }
    }

    /// Collects every [`Logic`] signal read (directly or transitively) by
    /// this expression, for sensitivity-list construction.
    pub fn reads(&self, out: &mut Vec<Logic>) {
        match self {
            Expr::Signal(sig) => out.push(sig.clone()),
            Expr::Literal(_) => {}
            Expr::Unary(_, a) => a.reads(out),
            Expr::Binary(_, a, b) => {
                a.reads(out);
                b.reads(out);
            }
            Expr::Ternary(c, a, b) => {
                c.reads(out);
                a.reads(out);
                b.reads(out);
            }
            Expr::Concat(parts) => parts.iter().for_each(|p| p.reads(out)),
            Expr::Replicate(e, _) => e.reads(out),
            Expr::Slice(e, _, _) => e.reads(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn literal_eval() {
        let e = Expr::Literal(LogicValue::from_u64(5, 8));
        assert_eq!(e.eval().to_u64(), Some(5));
    }

    #[test]
    fn signal_eval_tracks_live_value() {
        let g = Graph::new();
        let a = Logic::new(&g, "a", 8);
        a.put(LogicValue::from_u64(10, 8)).unwrap();
        let e = Expr::Signal(a.clone());
        assert_eq!(e.eval().to_u64(), Some(10));
        a.put(LogicValue::from_u64(20, 8)).unwrap();
        assert_eq!(e.eval().to_u64(), Some(20));
    }

    #[test]
    fn binary_add() {
        let e = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Literal(LogicValue::from_u64(2, 8))),
            Box::new(Expr::Literal(LogicValue::from_u64(3, 8))),
        );
        assert_eq!(e.eval().to_u64(), Some(5));
    }

    #[test]
    fn ternary_selects_branch() {
        let cond_true = Expr::Ternary(
            Box::new(Expr::Literal(LogicValue::from_u64(1, 1))),
            Box::new(Expr::Literal(LogicValue::from_u64(1, 4))),
            Box::new(Expr::Literal(LogicValue::from_u64(2, 4))),
        );
        assert_eq!(cond_true.eval().to_u64(), Some(1));
    }

    #[test]
    fn reads_collects_signals() {
        let g = Graph::new();
        let a = Logic::new(&g, "a", 4);
        let b = Logic::new(&g, "b", 4);
        let e = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Signal(a.clone())),
            Box::new(Expr::Signal(b.clone())),
        );
        let mut reads = Vec::new();
        e.reads(&mut reads);
        assert_eq!(reads.len(), 2);
    }

    #[test]
    fn concat_and_replicate() {
        let e = Expr::Replicate(Box::new(Expr::Literal(LogicValue::from_str_bits("10").unwrap())), 2);
        assert_eq!(format!("{}", e.eval()), "1010");
    }
}
