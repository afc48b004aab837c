//! The classic producer/consumer scenario table.
//!
//! Runs six configurations of the same line back to back, from a saturated
//! one-slot buffer to a high-volume stress case, logging every lifecycle
//! event with timestamps.
//!
//! Run with: cargo run --example scenarios --features timing

use std::time::Duration;

use anyhow::{Context, Result};
use conveyor::{Line, RunConfig};
use tracing_subscriber::EnvFilter;

/* ---------- */

const PRODUCE_PAUSE: Duration = Duration::from_millis(200);
const CONSUME_PAUSE: Duration = Duration::from_millis(500);
const MONITOR_PERIOD: Duration = Duration::from_millis(500);

/* ---------- */

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // (label, capacity, producers, consumers, items per producer)
    let cases = [
        // The buffer fills up fast and the lone consumer lags behind.
        ("fast producers, slow consumer", 3, 2, 1, 5),
        // The buffer stays near empty while consumers compete for items.
        ("slow producer, fast consumers", 5, 1, 3, 10),
        // Heavy contention: most producers wait for a slot most of the time.
        ("small buffer, many producers", 2, 4, 2, 4),
        // A roomy buffer and balanced rates; barely any blocking.
        ("large buffer, balanced workers", 20, 3, 3, 10),
        // Volume stress case, useful for watching the total elapsed time.
        ("high volume", 50, 10, 5, 100),
        // The minimal line: near-sequential, fully predictable.
        ("single pair, one slot", 1, 1, 1, 5),
    ];

    for (label, capacity, producers, consumers, items) in cases {
        tracing::info!("*** case: {label} ***");

        let config = RunConfig::new(capacity, producers, consumers, items)
            .produce_pause(PRODUCE_PAUSE)
            .consume_pause(CONSUME_PAUSE)
            .monitor_period(MONITOR_PERIOD);

        let report = Line::new(config)
            .and_then(|line| line.run())
            .with_context(|| format!("case {label:?} failed"))?;

        tracing::info!(
            produced = report.produced,
            consumed = report.consumed,
            elapsed = ?report.elapsed,
            "case complete"
        );
    }

    Ok(())
}
