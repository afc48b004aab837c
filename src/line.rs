use std::thread::{Builder, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

#[cfg(feature = "timing")]
use crate::monitor::DepthMonitor;
use crate::{
    BoundedBuffer, Consumer, Error, Item, LogObserver, Observe, Producer, RunConfig, Shutdown,
    Worker,
};

/* ---------- */

/// Joining a worker yields its error or the number of items it handled.
type WorkerHandle<'scope> = ScopedJoinHandle<'scope, Result<usize, Error>>;

/* ---------- */

/// The coordinator of producer/consumer runs.
///
/// A line owns a validated [`RunConfig`] and, for each call to [`run`],
/// a fresh [`BoundedBuffer`]: it spawns the configured producers and
/// consumers on named threads, waits for every producer to finish, closes
/// the buffer exactly once, then waits for the consumers to drain it.
/// Workers borrow the buffer for the duration of the call and can never
/// outlive it.
///
/// [`run`]: Self::run
///
/// # Examples
///
/// ```
/// use conveyor::{Line, RunConfig};
///
/// let line = Line::new(RunConfig::new(3, 2, 1, 5)).expect("config is valid");
/// let report = line.run().expect("the run completes");
///
/// assert_eq!(report.produced, 10);
/// assert_eq!(report.consumed, 10);
/// ```
#[derive(Debug)]
pub struct Line {
    config: RunConfig,
}

impl Line {
    /// Returns a line for `config`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if the configuration violates a run
    /// precondition; nothing is allocated and no worker is spawned in that
    /// case.
    pub fn new(config: RunConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Performs one full run, reporting lifecycle events to [`tracing`]
    /// via [`LogObserver`].
    ///
    /// # Errors
    ///
    /// See [`Line::run_with`].
    #[inline]
    pub fn run(&self) -> Result<RunReport, Error> {
        self.run_with(&LogObserver)
    }

    /// Performs one full run, reporting lifecycle events to `observer`.
    ///
    /// The run blocks the calling thread until every item generated by the
    /// producers has been consumed and every worker has been joined. Each
    /// call gets a fresh buffer; a line can be run any number of times.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ThreadStart`] when a worker thread cannot be
    /// spawned, [`Error::Closed`] when a producer hit a prematurely closed
    /// buffer (a coordination bug, surfaced rather than swallowed) and
    /// [`Error::Panicked`] when a worker thread panicked. On every failure
    /// path the buffer is closed and all spawned workers are joined before
    /// this returns.
    pub fn run_with<O: Observe>(&self, observer: &O) -> Result<RunReport, Error> {
        let buffer = BoundedBuffer::new(self.config.capacity);
        let shutdown = Shutdown::new();
        let started = Instant::now();

        tracing::debug!(
            capacity = self.config.capacity,
            producers = self.config.producers,
            consumers = self.config.consumers,
            items_per_producer = self.config.items_per_producer,
            "run starting"
        );

        let (produced, consumed) = std::thread::scope(|scope| {
            let outcome = self.drive(scope, &buffer, observer, &shutdown);

            // Instrumentation workers have no natural end; release them
            // before the scope joins every remaining thread.
            shutdown.stop();
            outcome
        })?;

        let report = RunReport {
            produced,
            consumed,
            elapsed: started.elapsed(),
        };

        observer.run_finished(&report);
        tracing::debug!(
            produced = report.produced,
            consumed = report.consumed,
            elapsed = ?report.elapsed,
            "run complete"
        );

        Ok(report)
    }

    /// Spawns every worker of the run, then sequences the shutdown
    /// protocol: join producers, close, join consumers.
    ///
    /// Whatever happens, the buffer is closed exactly once by the time this
    /// returns, so no thread is ever left parked on it.
    fn drive<'scope, 'env, O: Observe>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        buffer: &'env BoundedBuffer<Item>,
        observer: &'env O,
        shutdown: &'env Shutdown,
    ) -> Result<(usize, usize), Error> {
        #[cfg(feature = "timing")]
        self.spawn_monitor(scope, buffer, observer, shutdown)
            .inspect_err(|_| buffer.close())?;

        let consumers = self
            .spawn_consumers(scope, buffer, observer, shutdown)
            .inspect_err(|_| buffer.close())?;
        let producers = self
            .spawn_producers(scope, buffer, observer, shutdown)
            .inspect_err(|_| buffer.close())?;

        // Every producer must have returned before the buffer closes; a
        // premature close would drop items still waiting to be pushed.
        let mut produced = 0;
        let mut failure = None;
        for handle in producers {
            match handle.join() {
                Ok(Ok(count)) => produced += count,
                Ok(Err(err)) => failure = failure.or(Some(err)),
                Err(_) => failure = failure.or(Some(Error::Panicked)),
            }
        }

        // The one close of the run. From here on, consumers drain whatever
        // is left and stop on their own.
        buffer.close();
        if let Some(err) = failure {
            return Err(err);
        }

        let mut consumed = 0;
        for handle in consumers {
            match handle.join() {
                Ok(Ok(count)) => consumed += count,
                Ok(Err(err)) => return Err(err),
                Err(_) => return Err(Error::Panicked),
            }
        }

        Ok((produced, consumed))
    }

    fn spawn_producers<'scope, 'env, O: Observe>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        buffer: &'env BoundedBuffer<Item>,
        observer: &'env O,
        shutdown: &'env Shutdown,
    ) -> Result<Vec<WorkerHandle<'scope>>, Error> {
        let config = &self.config;

        (0..config.producers)
            .map(|id| {
                let mut worker = Producer::new(
                    id,
                    buffer,
                    config.items_per_producer,
                    config.produce_pause,
                    stream_seed(config.seed, id as u64),
                    observer,
                );
                let flag = shutdown.clone();

                Builder::new()
                    .name(format!("producer-{id}"))
                    .spawn_scoped(scope, move || {
                        worker.run(flag)?;
                        Ok(worker.produced())
                    })
                    .map_err(Error::from)
            })
            .collect()
    }

    fn spawn_consumers<'scope, 'env, O: Observe>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        buffer: &'env BoundedBuffer<Item>,
        observer: &'env O,
        shutdown: &'env Shutdown,
    ) -> Result<Vec<WorkerHandle<'scope>>, Error> {
        let config = &self.config;

        (0..config.consumers)
            .map(|id| {
                let mut worker = Consumer::new(
                    id,
                    buffer,
                    config.consume_pause,
                    stream_seed(config.seed, (config.producers + id) as u64),
                    observer,
                );
                let flag = shutdown.clone();

                Builder::new()
                    .name(format!("consumer-{id}"))
                    .spawn_scoped(scope, move || {
                        worker.run(flag)?;
                        Ok(worker.consumed())
                    })
                    .map_err(Error::from)
            })
            .collect()
    }

    #[cfg(feature = "timing")]
    fn spawn_monitor<'scope, 'env, O: Observe>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        buffer: &'env BoundedBuffer<Item>,
        observer: &'env O,
        shutdown: &'env Shutdown,
    ) -> Result<(), Error> {
        let Some(period) = self.config.monitor_period else {
            return Ok(());
        };

        let mut timer = minuteurs::Timer::new(period);
        let mut monitor = DepthMonitor::new(timer.watcher(), buffer, observer);

        let flag = shutdown.clone();
        Builder::new()
            .name("monitor".to_owned())
            .spawn_scoped(scope, move || {
                let _ = monitor.run(flag);
            })?;

        let flag = shutdown.clone();
        Builder::new()
            .name("ticker".to_owned())
            .spawn_scoped(scope, move || {
                let _ = timer.run(flag);
            })?;

        Ok(())
    }
}

/* ---------- */

/// Performs one run of `config` with the default [`LogObserver`].
///
/// Convenience for [`Line::new`] followed by [`Line::run`].
///
/// # Errors
///
/// See [`Line::new`] and [`Line::run_with`].
#[inline]
pub fn run_once(config: RunConfig) -> Result<RunReport, Error> {
    Line::new(config)?.run()
}

/* ---------- */

/// The summary of one completed run.
///
/// Nothing here feeds back into the core: the counts and the elapsed time
/// are advisory, for callers and observers.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Total number of items pushed by all producers.
    pub produced: usize,
    /// Total number of items popped by all consumers.
    pub consumed: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/* ---------- */

fn stream_seed(base: Option<u64>, stream: u64) -> Option<u64> {
    base.map(|seed| seed.wrapping_add(stream))
}

/* ---------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{recorder, Event};

    fn drain(events: crossbeam_channel::Receiver<Event>) -> Vec<Event> {
        events.try_iter().collect()
    }

    fn produced_items(events: &[Event]) -> Vec<Item> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Produced { item, .. } => Some(*item),
                _ => None,
            })
            .collect()
    }

    fn consumed_items(events: &[Event]) -> Vec<Item> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Consumed { item, .. } => Some(*item),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rejects_invalid_configs() {
        for config in [
            RunConfig::new(0, 1, 1, 5),
            RunConfig::new(3, 0, 1, 5),
            RunConfig::new(3, 2, 0, 5),
        ] {
            assert!(matches!(Line::new(config), Err(Error::Config(_))));
        }
    }

    #[test]
    fn single_pair_through_a_one_slot_buffer() {
        let (observer, events) = recorder();
        let line = Line::new(RunConfig::new(1, 1, 1, 5)).expect("config is valid");

        let report = line.run_with(&observer).expect("the run completes");
        assert_eq!(report.produced, 5);
        assert_eq!(report.consumed, 5);

        let events = drain(events);
        let produced = produced_items(&events);
        let consumed = consumed_items(&events);

        assert_eq!(produced.len(), 5);
        // Single producer, single consumer: strict FIFO end to end.
        assert_eq!(consumed, produced);

        // The consumer only finishes after the producer's last push.
        let last_push = events
            .iter()
            .rposition(|event| matches!(event, Event::Produced { .. }))
            .expect("five items were pushed");
        let finish = events
            .iter()
            .position(|event| matches!(event, Event::ConsumerDone(_)))
            .expect("the consumer finished");
        assert!(finish > last_push);
    }

    #[test]
    fn two_producers_share_one_consumer() {
        let (observer, events) = recorder();
        let line = Line::new(RunConfig::new(3, 2, 1, 5)).expect("config is valid");

        let report = line.run_with(&observer).expect("the run completes");
        assert_eq!(report.consumed, 10);

        let events = drain(events);
        assert_eq!(produced_items(&events).len(), 10);

        // No consumer observed the termination signal before the tenth push.
        let last_push = events
            .iter()
            .rposition(|event| matches!(event, Event::Produced { .. }))
            .expect("ten items were pushed");
        for (index, event) in events.iter().enumerate() {
            if matches!(event, Event::ConsumerDone(_)) {
                assert!(index > last_push);
            }
        }
    }

    #[test]
    fn conservation_across_many_workers() {
        let (observer, events) = recorder();
        let line = Line::new(RunConfig::new(8, 4, 3, 25)).expect("config is valid");

        let report = line.run_with(&observer).expect("the run completes");
        assert_eq!(report.produced, 100);
        assert_eq!(report.consumed, 100);

        let events = drain(events);
        let mut produced = produced_items(&events);
        let mut consumed = consumed_items(&events);
        produced.sort_unstable();
        consumed.sort_unstable();

        // Every generated item is consumed exactly once: no loss, no
        // duplication.
        assert_eq!(consumed, produced);
    }

    #[test]
    fn fifo_with_a_single_producer() {
        let (observer, events) = recorder();
        let line = Line::new(RunConfig::new(4, 1, 1, 50)).expect("config is valid");

        line.run_with(&observer).expect("the run completes");

        let events = drain(events);
        assert_eq!(consumed_items(&events), produced_items(&events));
    }

    #[test]
    fn an_empty_run_completes() {
        let (observer, events) = recorder();
        let line = Line::new(RunConfig::new(2, 3, 2, 0)).expect("config is valid");

        let report = line.run_with(&observer).expect("the run completes");
        assert_eq!(report.produced, 0);
        assert_eq!(report.consumed, 0);

        let events = drain(events);
        assert!(produced_items(&events).is_empty());
        assert!(matches!(events.last(), Some(Event::Finished)));
    }

    #[test]
    fn seeded_runs_reproduce() {
        let config = RunConfig::new(4, 1, 2, 30).seed(42);
        let line = Line::new(config).expect("config is valid");

        let (observer, events) = recorder();
        line.run_with(&observer).expect("the run completes");
        let first = produced_items(&drain(events));

        let (observer, events) = recorder();
        line.run_with(&observer).expect("the run completes");
        let second = produced_items(&drain(events));

        assert_eq!(first, second);
    }

    #[test]
    fn a_line_can_run_repeatedly() {
        let line = Line::new(RunConfig::new(2, 2, 2, 10)).expect("config is valid");

        for _ in 0..3 {
            let report = line.run_with(&()).expect("the run completes");
            assert_eq!(report.consumed, 20);
        }
    }

    #[test]
    fn run_once_reports_elapsed_time() {
        let config = RunConfig::new(3, 1, 1, 5).consume_pause(Duration::from_millis(5));
        let report = run_once(config).expect("the run completes");

        assert_eq!(report.consumed, 5);
        assert!(report.elapsed > Duration::ZERO);
    }
}
