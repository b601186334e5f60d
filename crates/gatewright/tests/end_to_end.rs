//! End-to-end scenarios exercising the signal graph, the simulator, and the
//! declarative state-machine builder together.

use gatewright::{
    case_matches, BinaryOp, CaseItem, CaseType, Combinational, Conditional, Edge, Expr, Graph, Logic, LogicNet,
    LogicValue, Sequential, SimTime, Simulator, State, StateMachine,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn counter_increments_on_posedge_once_enabled() {
    let g = Graph::new();
    let clk = Logic::new(&g, "clk", 1);
    clk.put(LogicValue::zero(1)).unwrap();
    let reset = Logic::new(&g, "reset", 1);
    reset.put(LogicValue::from_u64(1, 1)).unwrap();
    let en = Logic::new(&g, "en", 1);
    en.put(LogicValue::zero(1)).unwrap();
    let val = Logic::new(&g, "val", 4);
    val.put(LogicValue::zero(4)).unwrap();

    let _counter = Sequential::new(
        &clk,
        Edge::Posedge,
        "counter",
        vec![Conditional::If {
            condition: Expr::Signal(reset.clone()),
            then_body: vec![Conditional::Assign {
                target: val.clone(),
                source: Expr::Literal(LogicValue::zero(4)),
            }],
            else_body: vec![Conditional::If {
                condition: Expr::Signal(en.clone()),
                then_body: vec![Conditional::Assign {
                    target: val.clone(),
                    source: Expr::Binary(
                        BinaryOp::Add,
                        Box::new(Expr::Signal(val.clone())),
                        Box::new(Expr::Literal(LogicValue::from_u64(1, 4))),
                    ),
                }],
                else_body: vec![],
            }],
        }],
        None,
        Vec::new(),
    );

    let mut sim = Simulator::new(g);
    let reset2 = reset.clone();
    sim.register_action(SimTime::from_ns(25), move || {
        let reset2 = reset2.clone();
        async move { reset2.put(LogicValue::zero(1)).unwrap() }
    })
    .unwrap();
    let en2 = en.clone();
    sim.register_action(SimTime::from_ns(45), move || {
        let en2 = en2.clone();
        async move { en2.put(LogicValue::from_u64(1, 1)).unwrap() }
    })
    .unwrap();
    for i in 0..4u64 {
        let rise = SimTime::from_ns(50 + i * 10);
        let fall = SimTime::from_ns(55 + i * 10);
        let clk_up = clk.clone();
        sim.register_action(rise, move || {
            let clk_up = clk_up.clone();
            async move { clk_up.put(LogicValue::from_u64(1, 1)).unwrap() }
        })
        .unwrap();
        let clk_down = clk.clone();
        sim.register_action(fall, move || {
            let clk_down = clk_down.clone();
            async move { clk_down.put(LogicValue::zero(1)).unwrap() }
        })
        .unwrap();
    }
    sim.set_max_sim_time(SimTime::from_ns(95));
    sim.run().unwrap();

    assert_eq!(val.value().to_u64(), Some(4), "four posedges after t=45 should leave val at 4");
}

#[test]
fn ripple_adder_width_8_computes_sum_and_carry_out() {
    let g = Graph::new();
    let a = Logic::new(&g, "a", 8);
    let b = Logic::new(&g, "b", 8);
    let cin = Logic::new(&g, "cin", 1);
    let sum = Logic::new(&g, "sum", 8);
    let cout = Logic::new(&g, "cout", 1);

    let zext = |sig: &Logic| Expr::Concat(vec![Expr::Signal(sig.clone()), Expr::Literal(LogicValue::zero(1))]);
    let total = Expr::Binary(
        BinaryOp::Add,
        Box::new(Expr::Binary(BinaryOp::Add, Box::new(zext(&a)), Box::new(zext(&b)))),
        Box::new(Expr::Concat(vec![Expr::Signal(cin.clone()), Expr::Literal(LogicValue::zero(8))])),
    );

    let _adder = Combinational::new(
        &g,
        "ripple_adder",
        vec![
            Conditional::Assign {
                target: sum.clone(),
                source: Expr::Slice(Box::new(total.clone()), 7, 0),
            },
            Conditional::Assign {
                target: cout.clone(),
                source: Expr::Slice(Box::new(total), 8, 8),
            },
        ],
    );

    a.put(LogicValue::from_u64(0x7F, 8)).unwrap();
    b.put(LogicValue::from_u64(0x80, 8)).unwrap();
    cin.put(LogicValue::zero(1)).unwrap();
    assert_eq!(sum.value().to_u64(), Some(0xFF));
    assert_eq!(cout.value().to_u64(), Some(0));

    a.put(LogicValue::from_u64(0xFF, 8)).unwrap();
    b.put(LogicValue::from_u64(0x01, 8)).unwrap();
    assert_eq!(sum.value().to_u64(), Some(0x00));
    assert_eq!(cout.value().to_u64(), Some(1));
}

#[test]
fn case_with_invalid_select_produces_all_x() {
    let g = Graph::new();
    let sel = Logic::new(&g, "sel", 2);
    let out = Logic::new(&g, "out", 4);

    let _mux = Combinational::new(
        &g,
        "selector",
        vec![Conditional::Case {
            subject: Expr::Signal(sel.clone()),
            items: vec![
                CaseItem {
                    matches: vec![LogicValue::from_str_bits("01").unwrap()],
                    body: vec![Conditional::Assign {
                        target: out.clone(),
                        source: Expr::Literal(LogicValue::from_u64(1, 4)),
                    }],
                },
                CaseItem {
                    matches: vec![LogicValue::from_str_bits("10").unwrap()],
                    body: vec![Conditional::Assign {
                        target: out.clone(),
                        source: Expr::Literal(LogicValue::from_u64(2, 4)),
                    }],
                },
            ],
            default: Some(vec![Conditional::Assign {
                target: out.clone(),
                source: Expr::Literal(LogicValue::zero(4)),
            }]),
            case_type: CaseType::Priority,
        }],
    );

    sel.put(LogicValue::from_str_bits("01").unwrap()).unwrap();
    assert_eq!(out.value().to_u64(), Some(1));
    sel.put(LogicValue::from_str_bits("10").unwrap()).unwrap();
    assert_eq!(out.value().to_u64(), Some(2));
    sel.put(LogicValue::from_str_bits("11").unwrap()).unwrap();
    assert_eq!(out.value().to_u64(), Some(0));
    sel.put(LogicValue::from_str_bits("1x").unwrap()).unwrap();
    assert!(out.value().is_all_x(), "no case arm or default matches an x-bearing select");
}

#[test]
fn case_matches_helper_agrees_with_the_wired_mux() {
    let sel = LogicValue::from_str_bits("01").unwrap();
    assert!(case_matches(&sel, &LogicValue::from_str_bits("01").unwrap(), false));
    assert!(!case_matches(&sel, &LogicValue::from_str_bits("10").unwrap(), false));
}

#[test]
fn tri_state_net_resolves_per_driver_combination() {
    let g = Graph::new();
    let net = LogicNet::new(&g, "bus", 8);
    let a = net.add_driver();
    let b = net.add_driver();

    a.put(LogicValue::z(8)).unwrap();
    b.put(LogicValue::z(8)).unwrap();
    assert!(net.value().is_all_z(), "neither driver enabled leaves the net floating");

    a.put(LogicValue::from_str_bits("00001111").unwrap()).unwrap();
    assert_eq!(net.value().to_u64(), Some(0b0000_1111));

    b.put(LogicValue::from_str_bits("11110000").unwrap()).unwrap();
    assert!(net.value().is_all_x(), "two live drivers with conflicting bits contend to x");

    a.put(LogicValue::z(8)).unwrap();
    assert_eq!(net.value().to_u64(), Some(0b1111_0000), "only B left driving");
}

#[test]
fn sequential_with_reset_ignores_mid_cycle_changes_to_d() {
    let g = Graph::new();
    let clk = Logic::new(&g, "clk", 1);
    clk.put(LogicValue::zero(1)).unwrap();
    let reset = Logic::new(&g, "reset", 1);
    reset.put(LogicValue::zero(1)).unwrap();
    let d = Logic::new(&g, "d", 4);
    let q = Logic::new(&g, "q", 4);

    let _reg = Sequential::new(
        &clk,
        Edge::Posedge,
        "reg",
        vec![Conditional::If {
            condition: Expr::Signal(reset.clone()),
            then_body: vec![Conditional::Assign {
                target: q.clone(),
                source: Expr::Literal(LogicValue::zero(4)),
            }],
            else_body: vec![Conditional::Assign {
                target: q.clone(),
                source: Expr::Signal(d.clone()),
            }],
        }],
        None,
        Vec::new(),
    );

    reset.put(LogicValue::from_u64(1, 1)).unwrap();
    clk.put(LogicValue::from_u64(1, 1)).unwrap();
    assert_eq!(q.value().to_u64(), Some(0), "reset high at the edge clears q");

    clk.put(LogicValue::zero(1)).unwrap();
    reset.put(LogicValue::zero(1)).unwrap();
    d.put(LogicValue::from_u64(5, 4)).unwrap();
    clk.put(LogicValue::from_u64(1, 1)).unwrap();
    assert_eq!(q.value().to_u64(), Some(5));

    clk.put(LogicValue::zero(1)).unwrap();
    d.put(LogicValue::from_u64(9, 4)).unwrap();
    assert_eq!(q.value().to_u64(), Some(5), "d changing mid-cycle must not alter q before the next edge");
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OvenState {
    Standby,
    Cooking,
    Paused,
    Completed,
}

impl From<OvenState> for u64 {
    fn from(s: OvenState) -> u64 {
        match s {
            OvenState::Standby => 0,
            OvenState::Cooking => 1,
            OvenState::Paused => 2,
            OvenState::Completed => 3,
        }
    }
}

#[test]
fn oven_fsm_follows_start_pause_resume_timeline() {
    let g = Graph::new();
    let clk = Logic::new(&g, "clk", 1);
    clk.put(LogicValue::zero(1)).unwrap();
    let reset = Logic::new(&g, "reset", 1);
    reset.put(LogicValue::from_u64(1, 1)).unwrap();
    let start = Logic::new(&g, "start", 1);
    start.put(LogicValue::zero(1)).unwrap();
    let pause = Logic::new(&g, "pause", 1);
    pause.put(LogicValue::zero(1)).unwrap();
    let resume = Logic::new(&g, "resume", 1);
    resume.put(LogicValue::zero(1)).unwrap();

    let states = vec![
        State {
            identifier: OvenState::Standby,
            events: vec![(Some(Expr::Signal(start.clone())), OvenState::Cooking)],
            actions: vec![],
        },
        State {
            identifier: OvenState::Cooking,
            events: vec![(Some(Expr::Signal(pause.clone())), OvenState::Paused)],
            actions: vec![],
        },
        State {
            identifier: OvenState::Paused,
            events: vec![(Some(Expr::Signal(resume.clone())), OvenState::Cooking)],
            actions: vec![],
        },
        State {
            identifier: OvenState::Completed,
            events: vec![],
            actions: vec![],
        },
    ];
    let fsm = StateMachine::new(&g, "oven", 2, states, &clk, &reset, OvenState::Standby);
    let led = Rc::new(RefCell::new(0u64));
    {
        let led = led.clone();
        fsm.current().on_change(move |_old, new| {
            *led.borrow_mut() = new.to_u64().unwrap_or(0);
        });
    }

    let mut sim = Simulator::new(g);
    sim.inject_action(move || async move { reset.put(LogicValue::zero(1)).unwrap() }).unwrap();

    let start2 = start.clone();
    let clk2 = clk.clone();
    sim.register_action(SimTime::from_ns(25), move || {
        let start2 = start2.clone();
        let clk2 = clk2.clone();
        async move {
            start2.put(LogicValue::from_u64(1, 1)).unwrap();
            clk2.put(LogicValue::from_u64(1, 1)).unwrap();
        }
    })
    .unwrap();

    let pause2 = pause.clone();
    let start3 = start.clone();
    let clk3 = clk.clone();
    sim.register_action(SimTime::from_ns(50), move || {
        let pause2 = pause2.clone();
        let start3 = start3.clone();
        let clk3 = clk3.clone();
        async move {
            clk3.put(LogicValue::zero(1)).unwrap();
            start3.put(LogicValue::zero(1)).unwrap();
            pause2.put(LogicValue::from_u64(1, 1)).unwrap();
            clk3.put(LogicValue::from_u64(1, 1)).unwrap();
        }
    })
    .unwrap();

    let resume2 = resume.clone();
    let pause3 = pause.clone();
    let clk4 = clk.clone();
    sim.register_action(SimTime::from_ns(70), move || {
        let resume2 = resume2.clone();
        let pause3 = pause3.clone();
        let clk4 = clk4.clone();
        async move {
            clk4.put(LogicValue::zero(1)).unwrap();
            pause3.put(LogicValue::zero(1)).unwrap();
            resume2.put(LogicValue::from_u64(1, 1)).unwrap();
            clk4.put(LogicValue::from_u64(1, 1)).unwrap();
        }
    })
    .unwrap();

    sim.set_max_sim_time(SimTime::from_ns(90));
    sim.run().unwrap();

    assert_eq!(fsm.current().value().to_u64(), Some(OvenState::Cooking.into()));
    assert_eq!(*led.borrow(), u64::from(OvenState::Cooking), "LED output tracks the current-state register");
}
