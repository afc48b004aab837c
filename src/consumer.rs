use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::producer::rng_from;
use crate::{BoundedBuffer, ControlFlow, Error, Item, Observe, Worker};

/* ---------- */

/// A worker that drains the shared buffer until nothing more can arrive.
///
/// Each update pops one item, blocking while the buffer is empty but still
/// open. A transient empty buffer never ends a consumer; only the
/// closed+drained signal ([`BoundedBuffer::pop`] returning `None`) does.
pub struct Consumer<'run, O> {
    id: usize,
    buffer: &'run BoundedBuffer<Item>,
    consumed: usize,
    pause: Option<Duration>,
    rng: StdRng,
    observer: &'run O,
}

impl<'run, O> Consumer<'run, O> {
    /// Returns a consumer draining `buffer`.
    ///
    /// With a `pause` bound, the consumer sleeps a random duration up to
    /// the bound after each consumed item.
    pub fn new(
        id: usize,
        buffer: &'run BoundedBuffer<Item>,
        pause: Option<Duration>,
        seed: Option<u64>,
        observer: &'run O,
    ) -> Self {
        Self {
            id,
            buffer,
            consumed: 0,
            pause,
            rng: rng_from(seed),
            observer,
        }
    }

    /// Returns how many items this consumer has popped so far.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl<O: Observe> Worker for Consumer<'_, O> {
    fn on_update(&mut self) -> Result<ControlFlow, Error> {
        let Some(item) = self.buffer.pop() else {
            self.observer.consumer_finished(self.id);
            return Ok(ControlFlow::Break);
        };

        self.consumed += 1;
        self.observer.item_consumed(self.id, item);

        if let Some(bound) = self.pause {
            std::thread::sleep(self.rng.gen_range(Duration::ZERO..bound));
        }

        Ok(ControlFlow::Continue)
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{recorder, Event};
    use crate::Shutdown;

    #[test]
    fn drains_everything_then_stops() {
        let buffer = BoundedBuffer::new(8);
        for i in 0..6 {
            buffer.push(i).expect("buffer is open");
        }
        buffer.close();

        let (observer, events) = recorder();
        let mut consumer = Consumer::new(0, &buffer, None, None, &observer);
        consumer
            .run(Shutdown::new())
            .expect("consumers don't fail");

        assert_eq!(consumer.consumed(), 6);
        assert!(buffer.is_empty());

        let events: Vec<_> = events.try_iter().collect();
        assert_eq!(events.len(), 7);
        assert!(matches!(events[6], Event::ConsumerDone(0)));
    }

    #[test]
    fn waits_through_a_transient_empty_buffer() {
        let buffer = BoundedBuffer::new(2);

        std::thread::scope(|scope| {
            let handle = scope.spawn(|| {
                let mut consumer = Consumer::new(0, &buffer, None, None, &());
                consumer.run(Shutdown::new()).expect("consumers don't fail");
                consumer.consumed()
            });

            // Feed the consumer in bursts with gaps in between; it must not
            // mistake the gaps for the end of the run.
            for burst in 0..3u32 {
                std::thread::sleep(Duration::from_millis(30));
                buffer.push(burst).expect("buffer is open");
                buffer.push(burst + 100).expect("buffer is open");
            }
            buffer.close();

            assert_eq!(handle.join().expect("consumer shouldn't panic"), 6);
        });
    }
}
