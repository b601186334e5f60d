//! Signal-list concatenation helpers.
//!
//! `swizzle` treats index 0 of the input list as the most significant slice;
//! `rswizzle` treats index 0 as the least significant slice (the same
//! convention [`Expr::Concat`](gatewright_graph::Expr::Concat) already uses
//! internally, so `rswizzle` is a thin wrapper and `swizzle` reverses first).

use gatewright_graph::{Expr, Logic};

/// Concatenates `signals` MSB-first: `signals[0]` becomes the most
/// significant slice of the result.
pub fn swizzle(signals: &[Logic]) -> Expr {
    let parts: Vec<Expr> = signals.iter().rev().cloned().map(Expr::Signal).collect();
    Expr::Concat(parts)
}

/// Concatenates `signals` LSB-first: `signals[0]` becomes the least
/// significant slice of the result.
pub fn rswizzle(signals: &[Logic]) -> Expr {
    Expr::Concat(signals.iter().cloned().map(Expr::Signal).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewright_common::LogicValue;
    use gatewright_graph::Graph;

    #[test]
    fn swizzle_places_first_element_at_msb() {
        let g = Graph::new();
        let hi = Logic::new(&g, "hi", 4);
        let lo = Logic::new(&g, "lo", 4);
        hi.put(LogicValue::from_u64(0xA, 4)).unwrap();
        lo.put(LogicValue::from_u64(0x5, 4)).unwrap();
        let e = swizzle(&[hi.clone(), lo.clone()]);
        assert_eq!(e.eval().to_u64(), Some(0xA5));
    }

    #[test]
    fn rswizzle_places_first_element_at_lsb() {
        let g = Graph::new();
        let hi = Logic::new(&g, "hi", 4);
        let lo = Logic::new(&g, "lo", 4);
        hi.put(LogicValue::from_u64(0xA, 4)).unwrap();
        lo.put(LogicValue::from_u64(0x5, 4)).unwrap();
        let e = rswizzle(&[lo.clone(), hi.clone()]);
        assert_eq!(e.eval().to_u64(), Some(0xA5));
    }

    #[test]
    fn rswizzle_of_swizzle_reverses_order() {
        let g = Graph::new();
        let a = Logic::new(&g, "a", 4);
        let b = Logic::new(&g, "b", 4);
        a.put(LogicValue::from_u64(0x1, 4)).unwrap();
        b.put(LogicValue::from_u64(0x2, 4)).unwrap();
        let swizzled = swizzle(&[a.clone(), b.clone()]).eval().to_u64();
        let reversed_rswizzled = rswizzle(&[b.clone(), a.clone()]).eval().to_u64();
        assert_eq!(swizzled, reversed_rswizzled);
    }
}
