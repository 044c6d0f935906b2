//! Runtime counters and structured logging setup for the simulation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const BIRTHS: &str = "births";
pub const EXPIRATIONS: &str = "expirations";
pub const DISPENSED: &str = "dispensed";
pub const ABORTED_SPAWNS: &str = "aborted_spawns";

const SUMMARY_INTERVAL: u64 = 1000;

/// Tick, population and event counters for one world.
pub struct Metrics {
    tick_count: AtomicU64,
    population: AtomicU64,
    unborn: AtomicU64,
    counters: Mutex<HashMap<String, AtomicU64>>,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("population", &self.population())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            unborn: AtomicU64::new(0),
            counters: Mutex::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, population: usize, unborn: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.population.store(population as u64, Ordering::Relaxed);
        self.unborn.store(unborn as u64, Ordering::Relaxed);

        if tick % SUMMARY_INTERVAL == 0 {
            tracing::info!(
                tick,
                population,
                unborn,
                births = self.counter(BIRTHS),
                expirations = self.counter(EXPIRATIONS),
                dispensed = self.counter(DISPENSED),
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn increment_counter(&self, name: &str) {
        self.add_to_counter(name, 1);
    }

    pub fn add_to_counter(&self, name: &str, amount: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(amount, Ordering::Relaxed);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map_or(0, |value| value.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn unborn(&self) -> u64 {
        self.unborn.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.counter(BIRTHS), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_millis(16), 100, 3);
        assert_eq!(metrics.tick_count(), 1);
        assert_eq!(metrics.population(), 100);
        assert_eq!(metrics.unborn(), 3);
    }

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.increment_counter(BIRTHS);
        metrics.add_to_counter(BIRTHS, 2);
        metrics.increment_counter(EXPIRATIONS);
        assert_eq!(metrics.counter(BIRTHS), 3);
        assert_eq!(metrics.counter(EXPIRATIONS), 1);
        assert_eq!(metrics.counter(ABORTED_SPAWNS), 0);
    }
}
