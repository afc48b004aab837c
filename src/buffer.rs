use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, LockResult, Mutex};

use crate::Error;

/* ---------- */

/// A fixed-capacity FIFO buffer shared between producers and consumers.
///
/// The buffer is the single synchronization point of a run: producers block
/// in [`push`] while it is full, consumers block in [`pop`] while it is
/// empty, and [`close`] broadcasts that no further item will ever arrive.
/// All cross-worker ordering goes through it; workers share no other
/// mutable state.
///
/// [`push`]: Self::push
/// [`pop`]: Self::pop
/// [`close`]: Self::close
///
/// # Examples
///
/// ```
/// use conveyor::BoundedBuffer;
///
/// let buffer = BoundedBuffer::new(2);
///
/// buffer.push('a').unwrap();
/// buffer.push('b').unwrap();
/// buffer.close();
///
/// // Queued items stay retrievable after the close...
/// assert_eq!(buffer.pop(), Some('a'));
/// assert_eq!(buffer.pop(), Some('b'));
///
/// // ... and a drained, closed buffer signals termination.
/// assert_eq!(buffer.pop(), None);
/// ```
#[derive(Debug)]
pub struct BoundedBuffer<T> {
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    // Mirror of the deque length, so monitoring never touches the lock.
    depth: AtomicUsize,
}

#[derive(Debug)]
struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedBuffer<T> {
    /// Returns a new open buffer holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. [`RunConfig`] validation rejects such
    /// a configuration before any buffer is built.
    ///
    /// [`RunConfig`]: crate::RunConfig
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            depth: AtomicUsize::new(0),
        }
    }

    /// Appends `item` to the tail, blocking while the buffer is full and
    /// still open.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Closed`] if the buffer is closed, whether on
    /// entry or while waiting for space. Items are never silently dropped:
    /// on error the caller knows `item` did not enter the buffer.
    pub fn push(&self, item: T) -> Result<(), Error> {
        let mut inner = recover(self.inner.lock());

        while inner.items.len() == self.capacity && !inner.closed {
            inner = recover(self.not_full.wait(inner));
        }

        if inner.closed {
            return Err(Error::Closed);
        }

        inner.items.push_back(item);
        self.depth.store(inner.items.len(), Ordering::Relaxed);
        drop(inner);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the head item, blocking while the buffer is empty and still
    /// open.
    ///
    /// Returns `None` exactly when the buffer is empty *and* closed. That
    /// is the sole termination signal for consumers; a transient empty
    /// state blocks instead. Once closed and drained, this never blocks.
    pub fn pop(&self) -> Option<T> {
        let mut inner = recover(self.inner.lock());

        loop {
            if let Some(item) = inner.items.pop_front() {
                self.depth.store(inner.items.len(), Ordering::Relaxed);
                drop(inner);

                self.not_full.notify_one();
                return Some(item);
            }

            if inner.closed {
                return None;
            }

            inner = recover(self.not_empty.wait(inner));
        }
    }

    /// Closes the buffer: no further push will ever succeed, items already
    /// queued remain retrievable until drained.
    ///
    /// Wakes every blocked worker so consumers re-check the empty+closed
    /// condition and producers fail instead of waiting forever. Closing an
    /// already closed buffer changes nothing.
    pub fn close(&self) {
        let mut inner = recover(self.inner.lock());
        inner.closed = true;
        drop(inner);

        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Returns the number of items currently buffered.
    ///
    /// This is a racy, best-effort snapshot meant for diagnostics; with
    /// workers running it may be stale by the time it is read. Never use it
    /// for control decisions.
    #[inline]
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Returns whether the buffer currently holds no item.
    ///
    /// Same best-effort caveat as [`len`](Self::len).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the capacity fixed at creation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/* ---------- */

// The lock only ever guards plain deque updates, never user code, so a
// poisoned guard still holds consistent state.
#[inline]
fn recover<G>(result: LockResult<G>) -> G {
    result.unwrap_or_else(std::sync::PoisonError::into_inner)
}

/* ---------- */
