use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::{Item, Observe, RunReport};

/* ---------- */

/// One observed lifecycle event.
///
/// A channel-backed recorder gives tests a single, cross-thread ordering
/// of events that is consistent with what actually happened: an event sent
/// after another (in the happens-before sense) is received after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Produced { producer: usize, item: Item },
    Consumed { consumer: usize, item: Item },
    ProducerDone(usize),
    ConsumerDone(usize),
    Depth { depth: usize, capacity: usize },
    Finished,
}

/* ---------- */

pub(crate) struct Recorder(Sender<Event>);

/// Returns a recording observer and the receiving end of its event log.
pub(crate) fn recorder() -> (Recorder, Receiver<Event>) {
    let (sender, receiver) = unbounded();
    (Recorder(sender), receiver)
}

impl Observe for Recorder {
    fn item_produced(&self, producer: usize, item: Item) {
        let _ = self.0.send(Event::Produced { producer, item });
    }

    fn item_consumed(&self, consumer: usize, item: Item) {
        let _ = self.0.send(Event::Consumed { consumer, item });
    }

    fn producer_finished(&self, producer: usize) {
        let _ = self.0.send(Event::ProducerDone(producer));
    }

    fn consumer_finished(&self, consumer: usize) {
        let _ = self.0.send(Event::ConsumerDone(consumer));
    }

    fn depth_sampled(&self, depth: usize, capacity: usize) {
        let _ = self.0.send(Event::Depth { depth, capacity });
    }

    fn run_finished(&self, _report: &RunReport) {
        let _ = self.0.send(Event::Finished);
    }
}
