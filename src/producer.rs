use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{BoundedBuffer, ControlFlow, Error, Item, Observe, Worker};

/* ---------- */

// Matches the classic demo payload: a bounded random integer.
const ITEM_SPAN: Item = 1_000;

/// A worker that generates a fixed number of items into the shared buffer.
///
/// Each update draws one random item and pushes it, blocking while the
/// buffer is full. Once the count is exhausted the producer breaks out of
/// its loop; it never pushes again afterwards, so the only way to see a
/// push fail is a coordinator closing the buffer too early. That failure
/// is fatal and propagates.
pub struct Producer<'run, O> {
    id: usize,
    buffer: &'run BoundedBuffer<Item>,
    remaining: usize,
    produced: usize,
    pause: Option<Duration>,
    rng: StdRng,
    observer: &'run O,
}

impl<'run, O> Producer<'run, O> {
    /// Returns a producer that will push `count` items into `buffer`.
    ///
    /// With a `pause` bound, the producer sleeps a random duration up to
    /// the bound between two pushes. With a `seed`, the item stream is
    /// deterministic; otherwise it is seeded from entropy.
    pub fn new(
        id: usize,
        buffer: &'run BoundedBuffer<Item>,
        count: usize,
        pause: Option<Duration>,
        seed: Option<u64>,
        observer: &'run O,
    ) -> Self {
        Self {
            id,
            buffer,
            remaining: count,
            produced: 0,
            pause,
            rng: rng_from(seed),
            observer,
        }
    }

    /// Returns how many items this producer has pushed so far.
    #[inline]
    pub fn produced(&self) -> usize {
        self.produced
    }
}

impl<O: Observe> Worker for Producer<'_, O> {
    fn on_update(&mut self) -> Result<ControlFlow, Error> {
        if self.remaining == 0 {
            self.observer.producer_finished(self.id);
            return Ok(ControlFlow::Break);
        }

        let item = self.rng.gen_range(0..ITEM_SPAN);
        self.buffer.push(item)?;

        self.remaining -= 1;
        self.produced += 1;
        self.observer.item_produced(self.id, item);

        if let Some(bound) = self.pause {
            std::thread::sleep(self.rng.gen_range(Duration::ZERO..bound));
        }

        Ok(ControlFlow::Continue)
    }
}

/* ---------- */

pub(crate) fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/* ---------- */
