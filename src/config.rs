use std::time::Duration;

use crate::Error;

/* ---------- */

/// The immutable input to one run.
///
/// A configuration is built from the four counts that define a run, then
/// optionally refined with pacing, seeding and monitoring settings, the way
/// [`std::process::Command`] chains its setters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use conveyor::RunConfig;
///
/// let config = RunConfig::new(3, 2, 1, 5)
///     .produce_pause(Duration::from_millis(200))
///     .consume_pause(Duration::from_millis(500))
///     .seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub(crate) capacity: usize,
    pub(crate) producers: usize,
    pub(crate) consumers: usize,
    pub(crate) items_per_producer: usize,
    pub(crate) produce_pause: Option<Duration>,
    pub(crate) consume_pause: Option<Duration>,
    pub(crate) seed: Option<u64>,
    #[cfg(feature = "timing")]
    pub(crate) monitor_period: Option<Duration>,
}

impl RunConfig {
    /// Returns a configuration with no pacing, no fixed seed and no
    /// monitoring: `producers` workers each pushing `items_per_producer`
    /// items through a buffer of `capacity` slots drained by `consumers`
    /// workers.
    pub fn new(
        capacity: usize,
        producers: usize,
        consumers: usize,
        items_per_producer: usize,
    ) -> Self {
        Self {
            capacity,
            producers,
            consumers,
            items_per_producer,
            produce_pause: None,
            consume_pause: None,
            seed: None,
            #[cfg(feature = "timing")]
            monitor_period: None,
        }
    }

    /// Makes every producer pause a random duration up to `bound` between
    /// two pushes, simulating a variable production rate.
    #[inline]
    pub fn produce_pause(mut self, bound: Duration) -> Self {
        self.produce_pause = Some(bound);
        self
    }

    /// Makes every consumer pause a random duration up to `bound` after
    /// each consumed item, simulating a variable consumption rate.
    #[inline]
    pub fn consume_pause(mut self, bound: Duration) -> Self {
        self.consume_pause = Some(bound);
        self
    }

    /// Fixes the base RNG seed for the run.
    ///
    /// Each worker derives its own stream from the base seed and its
    /// identity, so a seeded single-producer run reproduces the exact same
    /// item sequence. Without a seed, every worker seeds itself from
    /// entropy.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Samples the buffer depth every `period` during the run.
    #[cfg(feature = "timing")]
    #[inline]
    pub fn monitor_period(mut self, period: Duration) -> Self {
        self.monitor_period = Some(period);
        self
    }

    /// Checks the preconditions of a run.
    ///
    /// Called once by [`Line::new`] before any resource is allocated; a
    /// rejected configuration never spawns a worker.
    ///
    /// [`Line::new`]: crate::Line::new
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.capacity == 0 {
            return Err(Error::config("capacity must be at least 1"));
        }
        if self.producers == 0 {
            return Err(Error::config("at least one producer is required"));
        }
        if self.consumers == 0 {
            return Err(Error::config("at least one consumer is required"));
        }
        if self.produce_pause.is_some_and(|bound| bound.is_zero()) {
            return Err(Error::config("produce pause bound must be nonzero"));
        }
        if self.consume_pause.is_some_and(|bound| bound.is_zero()) {
            return Err(Error::config("consume pause bound must be nonzero"));
        }
        #[cfg(feature = "timing")]
        if self.monitor_period.is_some_and(|period| period.is_zero()) {
            return Err(Error::config("monitor period must be nonzero"));
        }

        Ok(())
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_minimal_config() {
        assert!(RunConfig::new(1, 1, 1, 1).validate().is_ok());
    }

    #[test]
    fn accepts_idle_producers() {
        // Producers configured with zero items finish immediately; the run
        // still closes and drains cleanly.
        assert!(RunConfig::new(1, 2, 2, 0).validate().is_ok());
    }

    #[test]
    fn rejects_zero_counts() {
        assert!(RunConfig::new(0, 1, 1, 5).validate().is_err());
        assert!(RunConfig::new(3, 0, 1, 5).validate().is_err());
        assert!(RunConfig::new(3, 1, 0, 5).validate().is_err());
    }

    #[cfg(feature = "timing")]
    #[test]
    fn rejects_a_zero_monitor_period() {
        let config = RunConfig::new(3, 1, 1, 5).monitor_period(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_pause_bounds() {
        let config = RunConfig::new(3, 1, 1, 5).produce_pause(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = RunConfig::new(3, 1, 1, 5).consume_pause(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
