//! Periodic, read-only sampling of the buffer depth.
//!
//! The monitor pairs a [`minuteurs`] timer with a sampling worker: the
//! timer ticks on its own thread, the monitor reports
//! [`len`]/[`capacity`] to the observer whenever its watcher has ticked.
//! Samples are best-effort snapshots and never feed back into the run.
//!
//! Requires the `timing` feature.
//!
//! [`minuteurs`]: <https://docs.rs/minuteurs/latest/minuteurs/>
//! [`len`]: crate::BoundedBuffer::len
//! [`capacity`]: crate::BoundedBuffer::capacity

use std::time::Duration;

use minuteurs::{Timer, Watcher};

use crate::{BoundedBuffer, ControlFlow, Error, Observe, Worker};

/* ---------- */

// Cadence at which the watcher flag is polled between two ticks.
const POLL: Duration = Duration::from_millis(5);

/// A worker that samples the buffer depth on every timer tick.
///
/// Spawned by the coordinator when a monitor period is configured, and
/// stopped through the run's [`Shutdown`] flag once the consumers are
/// done.
///
/// [`Shutdown`]: crate::Shutdown
pub struct DepthMonitor<'run, T, O> {
    watcher: Watcher,
    buffer: &'run BoundedBuffer<T>,
    observer: &'run O,
}

impl<'run, T, O> DepthMonitor<'run, T, O> {
    /// Returns a monitor reporting the depth of `buffer` to `observer`
    /// whenever `watcher` ticks.
    pub fn new(watcher: Watcher, buffer: &'run BoundedBuffer<T>, observer: &'run O) -> Self {
        Self {
            watcher,
            buffer,
            observer,
        }
    }
}

impl<T: Send, O: Observe> Worker for DepthMonitor<'_, T, O> {
    fn on_update(&mut self) -> Result<ControlFlow, Error> {
        if self.watcher.has_ticked() {
            self.observer
                .depth_sampled(self.buffer.len(), self.buffer.capacity());
        }

        std::thread::sleep(POLL);
        Ok(ControlFlow::Continue)
    }
}

/* ---------- */

impl Worker for Timer {
    #[inline]
    fn on_update(&mut self) -> Result<ControlFlow, Error> {
        self.tick();
        Ok(ControlFlow::Continue)
    }
}

/* ---------- */
