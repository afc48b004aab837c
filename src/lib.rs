//! A small producer/consumer runtime built around a bounded blocking buffer.
//!
//! # Philosophy
//!
//! This crate models the classic bounded-buffer coordination problem as a
//! `line`: N producer workers generate items into a fixed-capacity shared
//! [`BoundedBuffer`], M consumer workers drain it, and the buffer is the
//! *only* state they share. Backpressure falls out of the capacity bound
//! (a full buffer blocks producers, an empty one blocks consumers) and
//! termination falls out of the buffer's closed flag: once the coordinator
//! has seen every producer finish, it closes the buffer, and each consumer
//! stops the moment it observes the buffer both closed and drained. No
//! polling, no sentinel items, no racy "is anyone still producing?"
//! checks.
//!
//! Workers run on their own OS threads for the duration of a run. They are
//! spawned as scoped threads borrowing the buffer, so a worker outliving
//! its run is not a bug to test for, it simply doesn't compile.
//!
//! # Usage
//!
//! Here's a run pushing 10 items from 2 producers through a 3-slot buffer
//! drained by a single consumer:
//!
//! ```
//! use conveyor::{Line, RunConfig};
//!
//! let line = Line::new(RunConfig::new(3, 2, 1, 5)).expect("config is valid");
//! let report = line.run().expect("the run completes");
//!
//! assert_eq!(report.consumed, 10);
//! ```
//!
//! # Observers
//!
//! Every lifecycle event of a run (item produced, item consumed, worker
//! finished, run finished) is reported to an injected [`Observe`]
//! implementation instead of a global logger. [`LogObserver`] forwards
//! events to [`tracing`]; `()` keeps the run silent; tests and dashboards
//! can plug in their own.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use conveyor::{Item, Line, Observe, RunConfig};
//!
//! #[derive(Default)]
//! struct Tally(AtomicUsize);
//!
//! impl Observe for Tally {
//!     fn item_consumed(&self, _consumer: usize, _item: Item) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let tally = Tally::default();
//! let line = Line::new(RunConfig::new(2, 1, 2, 8)).expect("config is valid");
//!
//! line.run_with(&tally).expect("the run completes");
//! assert_eq!(tally.0.into_inner(), 8);
//! ```
//!
//! # Monitoring
//!
//! With the `timing` feature enabled, a run can periodically sample the
//! buffer depth through a [`minuteurs`] timer and report it to the
//! observer; see [`RunConfig::monitor_period`] and [`DepthMonitor`].
//! Samples are racy snapshots meant for display, never for control.
//!
//! [`minuteurs`]: <https://docs.rs/minuteurs/latest/minuteurs/>
//! [`DepthMonitor`]: crate::monitor::DepthMonitor

#![warn(missing_docs)]

mod buffer;
mod config;
mod consumer;
mod error;
mod line;
#[cfg(feature = "timing")]
pub mod monitor;
mod observer;
mod producer;
#[cfg(test)]
mod test_utils;
mod worker;

pub use buffer::*;
pub use config::*;
pub use consumer::*;
pub use error::*;
pub use line::*;
pub use observer::*;
pub use producer::*;
pub use worker::*;

#[cfg(feature = "timing")]
pub use minuteurs;

/// The unit of work flowing through a run.
///
/// Items are opaque to the coordination core; the producers generate
/// bounded random integers, which is all the demo scenarios need.
pub type Item = u32;
