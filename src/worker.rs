use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::Error;

/* ---------- */

/// A worker is one independent unit of a run: it owns its thread for the
/// duration of the run and talks to the rest of the system only through the
/// shared [`BoundedBuffer`].
///
/// Workers are defined by one main method, [`Worker::run`], which drives the
/// actual loop. The default implementation first calls [`Worker::on_start`]
/// once, then calls [`Worker::on_update`] until it returns
/// [`ControlFlow::Break`], an error bubbles up, or the run's [`Shutdown`]
/// flag flips.
///
/// Unlike a plain thread loop, an update is fallible: a producer hitting a
/// closed buffer is a coordination bug that must reach the coordinator, not
/// die inside the thread.
///
/// [`BoundedBuffer`]: crate::BoundedBuffer
///
/// # Examples
///
/// A worker that counts to 10 and stops:
///
/// ```
/// use conveyor::{ControlFlow, Error, Shutdown, Worker};
///
/// #[derive(Default)]
/// struct Counter {
///     count: usize,
/// }
///
/// impl Worker for Counter {
///     fn on_update(&mut self) -> Result<ControlFlow, Error> {
///         self.count += 1;
///
///         if self.count == 10 {
///             return Ok(ControlFlow::Break);
///         }
///
///         Ok(ControlFlow::Continue)
///     }
/// }
///
/// let mut counter = Counter::default();
/// counter.run(Shutdown::new()).unwrap();
/// assert_eq!(counter.count, 10);
/// ```
pub trait Worker: Send {
    /// Convenient place to print or set things up before the loop starts.
    ///
    /// By default, this does nothing.
    #[inline]
    fn on_start(&mut self) {}

    /// Does one unit of work.
    ///
    /// Called in a loop by the default [`Worker::run`] until it returns
    /// [`ControlFlow::Break`] or an error.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the worker and propagates to whoever joins its
    /// thread.
    fn on_update(&mut self) -> Result<ControlFlow, Error>;

    /// Main worker loop, spawned in a dedicated thread by the coordinator.
    ///
    /// The `shutdown` flag only preempts the loop *between* updates; a
    /// worker in the middle of an update always finishes it.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by [`Worker::on_update`].
    fn run(&mut self, shutdown: Shutdown) -> Result<(), Error> {
        self.on_start();

        while shutdown.is_running() {
            if let ControlFlow::Break = self.on_update()? {
                break;
            }
        }

        Ok(())
    }
}

/* ---------- */

/// Defines the control flow of [`Workers`](Worker).
#[derive(Debug, PartialEq, Eq)]
pub enum ControlFlow {
    /// Tells the worker loop to keep going.
    Continue,
    /// Tells the worker loop to stop, the worker is done.
    Break,
}

/* ---------- */

/// A shared flag telling instrumentation workers that the run is over.
///
/// Producers and consumers stop by themselves (work exhausted, buffer
/// drained); the flag exists for workers with no natural end, like the
/// depth monitor, and for unwinding cleanly when a spawn fails mid-setup.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    /// Returns a new flag in the running state.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn stop(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Returns whether the run this flag belongs to is still going.
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

/* ---------- */
