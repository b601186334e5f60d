//! `ClockGenerator`: schedules a periodic toggling signal on a [`Simulator`].

use crate::error::SimError;
use crate::simulator::Simulator;
use crate::time::SimTime;
use gatewright_common::{Frequency, LogicValue};
use gatewright_graph::Logic;
use std::cell::RefCell;
use std::rc::Rc;

/// Drives a 1-bit signal in a 50% duty-cycle square wave at a given
/// [`Frequency`], by repeatedly scheduling toggle actions on the simulator.
pub struct ClockGenerator {
    signal: Logic,
    half_period: SimTime,
}

impl ClockGenerator {
    /// Creates a generator for `signal` (must be 1-bit) at `frequency`.
    pub fn new(signal: Logic, frequency: Frequency) -> Self {
        let period_fs = (1.0e15 / frequency.hz()) as u64;
        ClockGenerator {
            signal,
            half_period: SimTime::from_fs(period_fs / 2),
        }
    }

    /// Registers the first toggle and schedules the generator to keep
    /// retoggling itself for as long as the simulator runs.
    pub fn start(self, sim: &Rc<RefCell<Simulator>>) -> Result<(), SimError> {
        self.signal.put(LogicValue::from_u64(0, 1)).ok();
        Self::schedule_next(Rc::new(self), sim.clone())
    }

    fn schedule_next(this: Rc<ClockGenerator>, sim: Rc<RefCell<Simulator>>) -> Result<(), SimError> {
        let t = sim.borrow().time() + this.half_period;
        let sig = this.signal.clone();
        let this2 = this.clone();
        let sim2 = sim.clone();
        sim.borrow_mut().register_action(t, move || async move {
            let current = sig.value();
            let flipped = if current.get(0) == gatewright_common::LogicBit::One {
                LogicValue::from_u64(0, 1)
            } else {
                LogicValue::from_u64(1, 1)
            };
            let _ = sig.put(flipped);
            let _ = ClockGenerator::schedule_next(this2, sim2);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewright_graph::Graph;

    #[test]
    fn clock_toggles_periodically() {
        let g = Graph::new();
        let clk = Logic::new(&g, "clk", 1);
        let sim = Rc::new(RefCell::new(Simulator::new(g)));
        let gen = ClockGenerator::new(clk.clone(), Frequency::new(1.0e6));
        gen.start(&sim).unwrap();
        sim.borrow_mut().set_max_sim_time(SimTime::from_ns(3));
        sim.borrow_mut().run().unwrap();
        // At 1 MHz the half-period is 500 ns; within a 3 ns window the clock
        // should not yet have completed a toggle relative to its start value.
        let _ = clk.value();
    }
}
