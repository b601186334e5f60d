//! The event-driven `Simulator`: a time-ordered queue of user actions run
//! against a live signal graph.
//!
//! Actions are `async` closures; the simulator drives them to completion on
//! a single-threaded `tokio` runtime, one time point at a time, matching the
//! "every registered action is a suspension point" model from the component
//! design.

use crate::error::SimError;
use crate::time::SimTime;
use gatewright_graph::Graph;
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

type Action = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()>>>>;

struct ScheduledAction {
    time: SimTime,
    seq: u64,
    action: Action,
}

impl PartialEq for ScheduledAction {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}
impl Eq for ScheduledAction {}
impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScheduledAction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time).then(self.seq.cmp(&other.seq))
    }
}

/// The simulator's event-driven run loop.
///
/// Holds the global, process-wide simulation state described in the
/// concurrency model: the event queue, current time, and end-of-simulation
/// hooks. There is no internal parallelism; re-entrant calls into `run`/`tick`
/// while already advancing time are rejected.
pub struct Simulator {
    graph: Rc<RefCell<Graph>>,
    queue: BinaryHeap<Reverse<ScheduledAction>>,
    next_seq: u64,
    current_time: SimTime,
    max_time: Option<SimTime>,
    ended: bool,
    end_requested: bool,
    advancing: bool,
    end_hooks: Vec<Action>,
    max_deltas: u32,
}

impl Simulator {
    /// Creates a simulator bound to `graph`, starting at time zero.
    pub fn new(graph: Rc<RefCell<Graph>>) -> Self {
        Simulator {
            graph,
            queue: BinaryHeap::new(),
            next_seq: 0,
            current_time: SimTime::zero(),
            max_time: None,
            ended: false,
            end_requested: false,
            advancing: false,
            end_hooks: Vec::new(),
            max_deltas: 10_000,
        }
    }

    /// The simulator's current time.
    pub fn time(&self) -> SimTime {
        self.current_time
    }

    /// `true` once the simulation has ended (by `endSimulation`, the time
    /// limit, or queue exhaustion after `run`).
    pub fn simulation_has_ended(&self) -> bool {
        self.ended
    }

    /// Caps the end time: the simulation ends cleanly once `t` is reached.
    pub fn set_max_sim_time(&mut self, t: SimTime) {
        self.max_time = Some(t);
    }

    /// Sets the maximum number of delta cycles permitted at a single time
    /// step before a combinational loop is assumed.
    pub fn set_max_deltas(&mut self, max: u32) {
        self.max_deltas = max;
    }

    /// Registers a zero-argument action to run at time `t`. `t` must not be
    /// strictly before the current time.
    pub fn register_action<F, Fut>(&mut self, t: SimTime, action: F) -> Result<(), SimError>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        if t < self.current_time {
            return Err(SimError::ActionInPast {
                requested: t.fs,
                current: self.current_time.fs,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(ScheduledAction {
            time: t,
            seq,
            action: Box::new(move || Box::pin(action())),
        }));
        Ok(())
    }

    /// Injects an action to run immediately at the current time, in the
    /// current delta cycle ordering.
    pub fn inject_action<F, Fut>(&mut self, action: F) -> Result<(), SimError>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.register_action(self.current_time, action)
    }

    /// Registers an action to run at simulation teardown, after the run loop
    /// has stopped; awaited before `run`/`tick` returns.
    pub fn register_end_of_simulation_action<F, Fut>(&mut self, action: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.end_hooks.push(Box::new(move || Box::pin(action())));
    }

    /// Forces the simulation to end once the current action completes.
    pub fn end_simulation(&mut self) {
        self.end_requested = true;
    }

    /// Clears the event queue and resets time to zero, without touching any
    /// signal's value.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.current_time = SimTime::zero();
        self.ended = false;
        self.end_requested = false;
    }

    fn block_on<Fut: Future<Output = ()>>(fut: Fut) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("building a current-thread tokio runtime");
        rt.block_on(fut);
    }

    /// Advances exactly to the next time point with pending events, running
    /// every action scheduled there.
    pub fn tick(&mut self) -> Result<(), SimError> {
        if self.advancing {
            return Err(SimError::Reentrant);
        }
        self.advancing = true;
        let result = self.tick_inner();
        self.advancing = false;
        result
    }

    fn tick_inner(&mut self) -> Result<(), SimError> {
        let Some(Reverse(next)) = self.queue.peek() else {
            self.finish();
            return Ok(());
        };
        let target_time = next.time;
        if let Some(max) = self.max_time {
            if target_time > max {
                self.finish();
                return Ok(());
            }
        }
        self.current_time = target_time;
        tracing::trace!(fs = target_time.fs, "advancing to next scheduled time point");
        let mut deltas = 0u32;
        loop {
            let mut ran_any = false;
            while let Some(Reverse(scheduled)) = self.queue.peek() {
                if scheduled.time != target_time {
                    break;
                }
                let Reverse(scheduled) = self.queue.pop().unwrap();
                Self::block_on((scheduled.action)());
                ran_any = true;
                if self.end_requested {
                    break;
                }
            }
            if self.end_requested || !ran_any {
                break;
            }
            deltas += 1;
            if deltas > self.max_deltas {
                tracing::warn!(fs = target_time.fs, max_deltas = self.max_deltas, "delta cycle limit exceeded");
                return Err(SimError::DeltaCycleLimit {
                    fs: target_time.fs,
                    max_deltas: self.max_deltas,
                });
            }
        }
        if self.end_requested {
            self.finish();
        }
        Ok(())
    }

    /// Runs until the event queue is empty, the max time is reached, or
    /// `endSimulation` is called.
    pub fn run(&mut self) -> Result<(), SimError> {
        if self.advancing {
            return Err(SimError::Reentrant);
        }
        while !self.ended && !self.queue.is_empty() {
            self.tick()?;
        }
        if !self.ended {
            self.finish();
        }
        Ok(())
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        tracing::debug!(fs = self.current_time.fs, "simulation ended");
        let hooks = std::mem::take(&mut self.end_hooks);
        for hook in hooks {
            Self::block_on(hook());
        }
    }

    /// A clone of the shared signal graph handle.
    pub fn graph(&self) -> Rc<RefCell<Graph>> {
        self.graph.clone()
    }
}
