use crate::{Item, RunReport};

/* ---------- */

/// Receives every lifecycle event of a run.
///
/// The observer is pure observation: it is handed to the workers by the
/// coordinator, runs on their threads, and must never feed back into
/// control flow. Implementations get stale-by-construction data (a depth
/// sample may be outdated the instant it is taken) and should stay cheap,
/// since producers and consumers call them on the hot path.
///
/// Every method has a no-op default, so implementations only override what
/// they care about. The unit type `()` is the silent observer.
///
/// # Examples
///
/// An observer that counts consumed items:
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use conveyor::{Item, Observe};
///
/// #[derive(Default)]
/// struct Tally(AtomicUsize);
///
/// impl Observe for Tally {
///     fn item_consumed(&self, _consumer: usize, _item: Item) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Observe: Sync {
    /// A producer pushed `item` into the buffer.
    #[inline]
    fn item_produced(&self, producer: usize, item: Item) {
        let _ = (producer, item);
    }

    /// A consumer popped `item` from the buffer.
    #[inline]
    fn item_consumed(&self, consumer: usize, item: Item) {
        let _ = (consumer, item);
    }

    /// A producer pushed its last item and is about to return.
    #[inline]
    fn producer_finished(&self, producer: usize) {
        let _ = producer;
    }

    /// A consumer observed the closed+drained buffer and is about to return.
    #[inline]
    fn consumer_finished(&self, consumer: usize) {
        let _ = consumer;
    }

    /// The depth monitor sampled the buffer.
    ///
    /// Only emitted when a monitor period is configured (feature `timing`).
    #[inline]
    fn depth_sampled(&self, depth: usize, capacity: usize) {
        let _ = (depth, capacity);
    }

    /// The run completed; all workers have been joined.
    #[inline]
    fn run_finished(&self, report: &RunReport) {
        let _ = report;
    }
}

/// The silent observer.
impl Observe for () {}

/* ---------- */

/// An [`Observe`] implementation that forwards every event to [`tracing`].
///
/// Events come out at `info` level with the worker identity attached, so a
/// subscriber with timestamps (the usual `tracing_subscriber::fmt` setup)
/// reproduces the classic per-line producer/consumer log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observe for LogObserver {
    fn item_produced(&self, producer: usize, item: Item) {
        tracing::info!(producer, item, "produced");
    }

    fn item_consumed(&self, consumer: usize, item: Item) {
        tracing::info!(consumer, item, "consumed");
    }

    fn producer_finished(&self, producer: usize) {
        tracing::info!(producer, "producer finished");
    }

    fn consumer_finished(&self, consumer: usize) {
        tracing::info!(consumer, "consumer finished");
    }

    fn depth_sampled(&self, depth: usize, capacity: usize) {
        tracing::info!(depth, capacity, "buffer depth");
    }

    fn run_finished(&self, report: &RunReport) {
        tracing::info!(
            produced = report.produced,
            consumed = report.consumed,
            elapsed = ?report.elapsed,
            "run finished"
        );
    }
}
