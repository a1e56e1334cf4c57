//! Core engine module - simulation state, clock and tick loop

mod engine;
mod scheduler;

pub use engine::{step_system, Simulation, StepOutcome};
pub use scheduler::Scheduler;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Source of simulation time in Unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, secs: f64) {
        *self.now.lock() += secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock()
    }
}

/// Engine-wide counters, updated from the tick loop and delivery tasks
#[derive(Debug, Default)]
pub struct EngineCounters {
    running: AtomicBool,
    ticks: AtomicU64,
    records_emitted: AtomicU64,
    deliveries_failed: AtomicU64,
    trips: AtomicU64,
    recoveries: AtomicU64,
    isolated_failures: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub(crate) fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn emitted(&self, count: u64) {
        self.records_emitted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn delivery_failed(&self) {
        self.deliveries_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn trip(&self) {
        self.trips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn recovery(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn isolated_failure(&self) {
        self.isolated_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Point-in-time engine statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub running: bool,
    pub ticks: u64,
    pub records_emitted: u64,
    pub deliveries_failed: u64,
    pub trips: u64,
    pub recoveries: u64,
    pub isolated_failures: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
}

impl EngineStats {
    pub(crate) fn capture(counters: &EngineCounters, started_at: DateTime<Utc>) -> Self {
        let uptime = (Utc::now() - started_at).num_seconds().max(0) as u64;
        Self {
            running: counters.running.load(Ordering::Relaxed),
            ticks: counters.ticks.load(Ordering::Relaxed),
            records_emitted: counters.records_emitted.load(Ordering::Relaxed),
            deliveries_failed: counters.deliveries_failed.load(Ordering::Relaxed),
            trips: counters.trips.load(Ordering::Relaxed),
            recoveries: counters.recoveries.load(Ordering::Relaxed),
            isolated_failures: counters.isolated_failures.load(Ordering::Relaxed),
            started_at,
            uptime_seconds: uptime,
        }
    }
}

/// Health summary reported by the control surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub service: String,
    pub environment: String,
    pub version: String,
    pub running: bool,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100.0);
        clock.advance(2.5);
        assert_eq!(clock.now(), 102.5);
        clock.set(0.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn test_system_clock_is_unix_seconds() {
        let now = SystemClock.now();
        // 2020-01-01 onward
        assert!(now > 1_577_836_800.0);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = EngineCounters::default();
        counters.set_running(true);
        counters.tick();
        counters.tick();
        counters.emitted(6);
        counters.delivery_failed();

        let stats = EngineStats::capture(&counters, Utc::now());
        assert!(stats.running);
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.records_emitted, 6);
        assert_eq!(stats.deliveries_failed, 1);
        assert_eq!(stats.trips, 0);
    }
}
