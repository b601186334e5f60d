//! `StateMachine`: a declarative finite-state-machine builder that lowers to
//! two registers and a `Combinational`/`Sequential` pair.

use gatewright_common::LogicValue;
use gatewright_graph::{CaseItem, CaseType, Conditional, Expr, Graph, Logic};
use std::cell::RefCell;
use std::rc::Rc;

use crate::block::{Combinational, Edge, Sequential};

/// One state of a [`StateMachine`].
pub struct State<ID> {
    /// The state's identifier.
    pub identifier: ID,
    /// Ordered `(condition, next state)` transitions; the first whose
    /// condition evaluates true is taken. A `None` condition is an
    /// unconditional fallback and should be listed last.
    pub events: Vec<(Option<Expr>, ID)>,
    /// Actions (combinational assignments) performed while in this state.
    pub actions: Vec<Conditional>,
}

/// A finite state machine over states identified by `ID`, lowered to two
/// registers (`current`, `next`), a `Combinational` block computing `next`
/// and the state's actions via a `Case` on `current`, and a `Sequential`
/// block clocking `current <- reset ? resetId : next`.
pub struct StateMachine<ID> {
    current: Logic,
    next: Logic,
    _comb: Rc<RefCell<Combinational>>,
    _seq: Rc<RefCell<Sequential>>,
    _ids: Vec<ID>,
}

impl<ID> StateMachine<ID>
where
    ID: Copy + Eq + Into<u64>,
{
    /// Builds the state machine: `width` must be wide enough to hold every
    /// state's encoded identifier.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &Rc<RefCell<Graph>>,
        name: impl Into<String>,
        width: u32,
        states: Vec<State<ID>>,
        clock: &Logic,
        reset: &Logic,
        reset_id: ID,
    ) -> Self {
        let name = name.into();
        let current = Logic::new(graph, format!("{name}_current"), width);
        let next = Logic::new(graph, format!("{name}_next"), width);
        current
            .put(LogicValue::from_u64(reset_id.into(), width))
            .expect("reset id fits in width");

        let mut items = Vec::new();
        let mut ids = Vec::new();
        for state in &states {
            ids.push(state.identifier);
            let pattern = LogicValue::from_u64(state.identifier.into(), width);
            let mut body: Vec<Conditional> = state.actions.clone();
            let mut arms = Vec::new();
            for (cond, target) in &state.events {
                arms.push(gatewright_graph::IfArm {
                    condition: cond.clone(),
                    body: vec![Conditional::Assign {
                        target: next.clone(),
                        source: Expr::Literal(LogicValue::from_u64((*target).into(), width)),
                    }],
                });
            }
            if arms.is_empty() || arms.iter().all(|a| a.condition.is_some()) {
                arms.push(gatewright_graph::IfArm {
                    condition: None,
                    body: vec![Conditional::Assign {
                        target: next.clone(),
                        source: Expr::Signal(current.clone()),
                    }],
                });
            }
            body.push(Conditional::IfBlock(arms));
            items.push(CaseItem {
                matches: vec![pattern],
                body,
            });
        }

        let comb = Combinational::new(
            graph,
            format!("{name}_comb"),
            vec![Conditional::Case {
                subject: Expr::Signal(current.clone()),
                items,
                default: Some(vec![Conditional::Assign {
                    target: next.clone(),
                    source: Expr::Literal(LogicValue::from_u64(reset_id.into(), width)),
                }]),
                case_type: CaseType::Priority,
            }],
        );

        let seq = Sequential::new(
            clock,
            Edge::Posedge,
            format!("{name}_seq"),
            vec![Conditional::Assign {
                target: current.clone(),
                source: Expr::Signal(next.clone()),
            }],
            Some(reset.clone()),
            vec![(current.clone(), LogicValue::from_u64(reset_id.into(), width))],
        );

        StateMachine {
            current,
            next,
            _comb: comb,
            _seq: seq,
            _ids: ids,
        }
    }

    /// The current-state register (read-only from outside the machine).
    pub fn current(&self) -> &Logic {
        &self.current
    }

    /// The computed next-state signal, for introspection/testing.
    pub fn next(&self) -> &Logic {
        &self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewright_graph::BinaryOp;

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Oven {
        Off,
        Heating,
        Ready,
    }

    impl From<Oven> for u64 {
        fn from(o: Oven) -> u64 {
            match o {
                Oven::Off => 0,
                Oven::Heating => 1,
                Oven::Ready => 2,
            }
        }
    }

    #[test]
    fn oven_fsm_transitions_on_clock() {
        let g = Graph::new();
        let clk = Logic::new(&g, "clk", 1);
        clk.put(LogicValue::from_u64(0, 1)).unwrap();
        let reset = Logic::new(&g, "reset", 1);
        reset.put(LogicValue::from_u64(0, 1)).unwrap();
        let start = Logic::new(&g, "start", 1);
        start.put(LogicValue::from_u64(0, 1)).unwrap();
        let temp_ok = Logic::new(&g, "temp_ok", 1);
        temp_ok.put(LogicValue::from_u64(0, 1)).unwrap();

        let states = vec![
            State {
                identifier: Oven::Off,
                events: vec![(Some(Expr::Signal(start.clone())), Oven::Heating)],
                actions: vec![],
            },
            State {
                identifier: Oven::Heating,
                events: vec![(Some(Expr::Signal(temp_ok.clone())), Oven::Ready)],
                actions: vec![],
            },
            State {
                identifier: Oven::Ready,
                events: vec![],
                actions: vec![],
            },
        ];
        let fsm = StateMachine::new(&g, "oven", 2, states, &clk, &reset, Oven::Off);
        assert_eq!(fsm.current().value().to_u64(), Some(0));

        start.put(LogicValue::from_u64(1, 1)).unwrap();
        clk.put(LogicValue::from_u64(1, 1)).unwrap();
        assert_eq!(fsm.current().value().to_u64(), Some(1));

        clk.put(LogicValue::from_u64(0, 1)).unwrap();
        start.put(LogicValue::from_u64(0, 1)).unwrap();
        temp_ok.put(LogicValue::from_u64(1, 1)).unwrap();
        clk.put(LogicValue::from_u64(1, 1)).unwrap();
        assert_eq!(fsm.current().value().to_u64(), Some(2));

        let _ = BinaryOp::Add;
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let g = Graph::new();
        let clk = Logic::new(&g, "clk", 1);
        clk.put(LogicValue::from_u64(0, 1)).unwrap();
        let reset = Logic::new(&g, "reset", 1);
        reset.put(LogicValue::from_u64(0, 1)).unwrap();
        let start = Logic::new(&g, "start", 1);
        start.put(LogicValue::from_u64(1, 1)).unwrap();

        let states = vec![
            State {
                identifier: Oven::Off,
                events: vec![(Some(Expr::Signal(start.clone())), Oven::Heating)],
                actions: vec![],
            },
            State {
                identifier: Oven::Heating,
                events: vec![],
                actions: vec![],
            },
            State {
                identifier: Oven::Ready,
                events: vec![],
                actions: vec![],
            },
        ];
        let fsm = StateMachine::new(&g, "oven2", 2, states, &clk, &reset, Oven::Off);
        clk.put(LogicValue::from_u64(1, 1)).unwrap();
        assert_eq!(fsm.current().value().to_u64(), Some(1));
        reset.put(LogicValue::from_u64(1, 1)).unwrap();
        assert_eq!(fsm.current().value().to_u64(), Some(0));
    }
}
