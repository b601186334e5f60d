//! Waveform subscription interface.
//!
//! The core does not write waveform files itself (VCD dumping is an external
//! collaborator per the scope note in `gatewright`'s top-level docs); it only
//! exposes the subscription surface an external waveform writer needs:
//! iterate the signal hierarchy post-`build()` and subscribe to each
//! signal's change emitter.

use gatewright_common::LogicValue;
use gatewright_graph::Logic;

/// One recorded value change, as delivered to a [`WaveformSink`].
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    /// The signal's declared name.
    pub name: String,
    /// The signal's bit width.
    pub width: u32,
    /// The value before the change.
    pub previous: LogicValue,
    /// The value after the change.
    pub next: LogicValue,
}

/// Implemented by external waveform writers (VCD, FST, or otherwise).
///
/// `gatewright_sim` does not call this itself; host code subscribes a sink
/// to the signals it cares about via [`subscribe`].
pub trait WaveformSink {
    /// Called once for every value change of a subscribed signal.
    fn on_change(&mut self, record: ChangeRecord);
}

/// Subscribes `sink` (shared via interior mutability, since `Logic::on_change`
/// listeners are `'static` closures, not borrowed references) to every
/// signal in `signals`.
pub fn subscribe<S>(signals: &[Logic], sink: std::rc::Rc<std::cell::RefCell<S>>)
where
    S: WaveformSink + 'static,
{
    for sig in signals {
        let name = sig.name();
        let width = sig.width();
        let sink = sink.clone();
        sig.on_change(move |old, new| {
            sink.borrow_mut().on_change(ChangeRecord {
                name: name.clone(),
                width,
                previous: old.clone(),
                next: new.clone(),
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewright_graph::Graph;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Collector(Vec<ChangeRecord>);
    impl WaveformSink for Collector {
        fn on_change(&mut self, record: ChangeRecord) {
            self.0.push(record);
        }
    }

    #[test]
    fn sink_receives_changes() {
        let g = Graph::new();
        let a = Logic::new(&g, "a", 4);
        let sink = Rc::new(RefCell::new(Collector(Vec::new())));
        subscribe(&[a.clone()], sink.clone());
        a.put(LogicValue::from_u64(3, 4)).unwrap();
        a.put(LogicValue::from_u64(7, 4)).unwrap();
        assert_eq!(sink.borrow().0.len(), 2);
        assert_eq!(sink.borrow().0[1].next.to_u64(), Some(7));
    }
}
