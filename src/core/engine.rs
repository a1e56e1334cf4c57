// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Simulation state container and the per-tick algorithm
//!
//! Every system sits behind its own mutex, held only while that system is
//! stepped or while one control write is applied. Control writes and ticks
//! are not ordered against each other: whichever lands last wins.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use super::{Clock, EngineCounters, EngineStats, ServiceHealth, SystemClock};
use crate::alert::AlertPolicy;
use crate::config::{Config, SharedConfig};
use crate::model::{default_fleet, NavalSystem, RelayState};
use crate::physics::{breaches_critical, next_value, recover, NoiseSource, RngNoise};
use crate::streaming::TelemetryRecord;

/// What a tick did to one system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Tripped and still inside the recovery window; nothing changed
    Frozen,
    /// Recovery window elapsed; relay back ON, sensors reset
    Recovered,
    /// Sensors evolved; `tripped` if a critical breach latched the relay
    Updated { tripped: bool },
}

/// Advance one system by one tick
pub fn step_system(system: &mut NavalSystem, now: f64, noise: &mut dyn NoiseSource) -> StepOutcome {
    if system.relay.is_tripped() {
        if system.relay.recovery_due(now) {
            recover(system);
            info!(system = %system.id, "Relay {} recovered", system.relay.id);
            return StepOutcome::Recovered;
        }
        return StepOutcome::Frozen;
    }

    let relay = system.relay.state;
    let mut tripped = false;

    for sensor in &mut system.sensors {
        let value = next_value(sensor, relay, now, noise);
        sensor.value = value;

        if relay == RelayState::On && breaches_critical(sensor, value) {
            warn!(
                system = %system.id,
                sensor = %sensor.id,
                value,
                "Critical limit breached, tripping relay"
            );
            tripped = true;
        }
    }

    // The peak stays visible: values are not pulled back to the critical band.
    if tripped {
        system.relay.trip(now);
    }

    StepOutcome::Updated { tripped }
}

/// The whole simulated ship
pub struct Simulation {
    systems: Vec<Mutex<NavalSystem>>,
    index: HashMap<String, usize>,
    alerts: Mutex<AlertPolicy>,
    noise: Mutex<Box<dyn NoiseSource>>,
    clock: Arc<dyn Clock>,
    config: SharedConfig,
    counters: Arc<EngineCounters>,
    app_name: String,
    environment: String,
    started_at: DateTime<Utc>,
}

impl Simulation {
    /// Simulation over the standard fleet, wall clock, noise seeded from config
    pub fn new(config: &Config, live: SharedConfig) -> Self {
        let noise: Box<dyn NoiseSource> = match config.simulation.seed {
            Some(seed) => {
                info!("Using fixed noise seed {}", seed);
                Box::new(RngNoise::seeded(seed))
            }
            None => Box::new(RngNoise::from_entropy()),
        };

        Self::with_parts(default_fleet(), live, noise, Arc::new(SystemClock))
            .with_service(&config.app_name, &config.environment)
    }

    pub fn with_parts(
        fleet: Vec<NavalSystem>,
        config: SharedConfig,
        noise: Box<dyn NoiseSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let index = fleet
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        Self {
            systems: fleet.into_iter().map(Mutex::new).collect(),
            index,
            alerts: Mutex::new(AlertPolicy::new()),
            noise: Mutex::new(noise),
            clock,
            config,
            counters: Arc::new(EngineCounters::default()),
            app_name: Config::default().app_name,
            environment: Config::default().environment,
            started_at: Utc::now(),
        }
    }

    pub fn with_service(mut self, app_name: &str, environment: &str) -> Self {
        self.app_name = app_name.to_string();
        self.environment = environment.to_string();
        self
    }

    /// Run one tick over every system and return the records to emit
    pub fn tick(&self) -> Vec<TelemetryRecord> {
        let now = self.clock.now();
        let log_interval = self.config.read().log_interval;

        let mut alerts = self.alerts.lock();
        let mut noise = self.noise.lock();
        let flush = alerts.begin_tick(now, log_interval);
        if flush {
            debug!("Periodic telemetry flush");
        }

        let mut records = Vec::new();

        for slot in &self.systems {
            let mut system = slot.lock();

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let outcome = step_system(&mut system, now, &mut **noise);
                let decision = alerts.evaluate(&system, flush);
                let record = decision.emit.map(|reason| {
                    let record = TelemetryRecord::new(&system, decision.severity, reason, now);
                    system.under_attack_ip = None;
                    record
                });
                (outcome, record)
            }));

            match result {
                Ok((outcome, record)) => {
                    match outcome {
                        StepOutcome::Updated { tripped: true } => self.counters.trip(),
                        StepOutcome::Recovered => self.counters.recovery(),
                        _ => {}
                    }
                    trace!(system = %system.id, ?outcome, "Stepped");
                    records.extend(record);
                }
                Err(_) => {
                    self.counters.isolated_failure();
                    error!(system = %system.id, "System update failed, skipping for this tick");
                }
            }
        }

        self.counters.tick();
        self.counters.emitted(records.len() as u64);
        records
    }

    /// Seconds until the next tick, as currently configured
    pub fn tick_period(&self) -> f64 {
        self.config.read().simulation_sleep
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn counters(&self) -> Arc<EngineCounters> {
        self.counters.clone()
    }

    /// Snapshot of every system, in catalog order
    pub fn systems(&self) -> Vec<NavalSystem> {
        self.systems.iter().map(|s| s.lock().clone()).collect()
    }

    pub fn system(&self, id: &str) -> Option<NavalSystem> {
        self.index.get(id).map(|&i| self.systems[i].lock().clone())
    }

    /// Run `f` against one system under its lock
    pub fn with_system<T>(&self, id: &str, f: impl FnOnce(&mut NavalSystem) -> T) -> Option<T> {
        let &i = self.index.get(id)?;
        let mut system = self.systems[i].lock();
        Some(f(&mut system))
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats::capture(&self.counters, self.started_at)
    }

    pub fn health(&self) -> ServiceHealth {
        let stats = self.stats();
        ServiceHealth {
            status: "ok".to_string(),
            service: self.app_name.clone(),
            environment: self.environment.clone(),
            version: crate::VERSION.to_string(),
            running: stats.running,
            uptime_seconds: stats.uptime_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{EmitReason, Severity};
    use crate::config::LiveConfig;
    use crate::core::ManualClock;
    use crate::physics::FixedNoise;

    fn simulation(start: f64) -> (Simulation, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let sim = Simulation::with_parts(
            default_fleet(),
            LiveConfig::default().shared(),
            Box::new(FixedNoise::neutral()),
            clock.clone(),
        );
        (sim, clock)
    }

    #[test]
    fn test_first_tick_flushes_every_system() {
        let (sim, _) = simulation(0.0);
        let records = sim.tick();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.reason == EmitReason::PeriodicFlush));
    }

    #[test]
    fn test_forced_off_temperature_decays() {
        let (sim, clock) = simulation(0.0);
        sim.with_system("sys_main_engine", |s| s.relay.command(RelayState::Off, 0.0))
            .unwrap()
            .unwrap();

        clock.advance(1.0);
        sim.tick();

        let engine = sim.system("sys_main_engine").unwrap();
        assert_eq!(engine.sensors[0].value, 72.0);
        assert_eq!(engine.sensors[1].value, 600.0);
    }

    #[test]
    fn test_trip_preserves_peak_and_freezes() {
        let (sim, clock) = simulation(0.0);
        sim.with_system("sys_radar", |s| s.sensors[0].value = 200.0);

        // 200 clamps to max_val 100, which is beyond critical_max 75
        clock.set(1.0);
        sim.tick();
        let radar = sim.system("sys_radar").unwrap();
        assert_eq!(radar.relay.state, RelayState::Tripped);
        assert_eq!(radar.relay.tripped_at, Some(1.0));
        let peak = radar.sensors[0].value;
        assert!(peak > radar.sensors[0].critical_max);

        clock.set(10.9);
        sim.tick();
        let frozen = sim.system("sys_radar").unwrap();
        assert_eq!(frozen.sensors[0].value, peak);
        assert_eq!(frozen.relay.state, RelayState::Tripped);
    }

    #[test]
    fn test_recovery_after_window() {
        let (sim, clock) = simulation(0.0);
        sim.with_system("sys_main_engine", |s| {
            s.relay.command(RelayState::Tripped, 0.0).unwrap();
            s.sensors[0].value = 120.0;
        });

        clock.set(9.9);
        sim.tick();
        let engine = sim.system("sys_main_engine").unwrap();
        assert_eq!(engine.relay.state, RelayState::Tripped);
        assert_eq!(engine.sensors[0].value, 120.0);

        clock.set(10.1);
        sim.tick();
        let engine = sim.system("sys_main_engine").unwrap();
        assert_eq!(engine.relay.state, RelayState::On);
        assert!(engine.relay.tripped_at.is_none());
        assert_eq!(engine.sensors[0].value, 67.5);
        assert_eq!(engine.sensors[1].value, 1150.0);
        assert_eq!(sim.stats().recoveries, 1);
    }

    #[test]
    fn test_trip_emits_critical_in_same_tick() {
        let (sim, clock) = simulation(0.0);
        sim.tick();

        sim.with_system("sys_steering", |s| s.sensors[0].value = 39.0);
        clock.advance(1.0);
        let records = sim.tick();

        let steering = records
            .iter()
            .find(|r| r.system.id == "sys_steering")
            .expect("steering record");
        assert_eq!(steering.severity, Severity::Critical);
        assert_eq!(steering.reason, EmitReason::Escalation);
        assert_eq!(steering.system.relay.state, RelayState::Tripped);
    }

    #[test]
    fn test_attack_marker_cleared_after_emission() {
        let (sim, clock) = simulation(0.0);
        sim.tick();

        sim.with_system("sys_fire", |s| s.under_attack_ip = Some("10.9.9.9".into()));
        clock.advance(1.0);
        let records = sim.tick();

        let fire: Vec<_> = records.iter().filter(|r| r.system.id == "sys_fire").collect();
        assert_eq!(fire.len(), 1);
        assert_eq!(fire[0].reason, EmitReason::UnauthorizedAccess);
        assert_eq!(fire[0].system.under_attack_ip.as_deref(), Some("10.9.9.9"));
        assert!(sim.system("sys_fire").unwrap().under_attack_ip.is_none());

        clock.advance(1.0);
        assert!(sim.tick().iter().all(|r| r.system.id != "sys_fire"));
    }

    #[test]
    fn test_values_respect_physical_limits_over_long_run() {
        let clock = Arc::new(ManualClock::new(1_700_000_000.0));
        let sim = Simulation::with_parts(
            default_fleet(),
            LiveConfig::default().shared(),
            Box::new(RngNoise::seeded(5)),
            clock.clone(),
        );

        for _ in 0..3_000 {
            clock.advance(1.0);
            sim.tick();
            for system in sim.systems() {
                for sensor in &system.sensors {
                    assert!(sensor.value >= sensor.min_val && sensor.value <= sensor.max_val);
                }
                assert_eq!(system.relay.is_tripped(), system.relay.tripped_at.is_some());
            }
        }
        assert_eq!(sim.stats().ticks, 3_000);
    }

    /// Panics on its first sample, then behaves like neutral noise
    struct PanicOnce {
        fired: bool,
    }

    impl NoiseSource for PanicOnce {
        fn uniform(&mut self, low: f64, high: f64) -> f64 {
            if !self.fired {
                self.fired = true;
                panic!("noise source failure");
            }
            FixedNoise::neutral().uniform(low, high)
        }
    }

    #[test]
    fn test_panicking_system_is_isolated() {
        let clock = Arc::new(ManualClock::new(0.0));
        let sim = Simulation::with_parts(
            default_fleet(),
            LiveConfig::default().shared(),
            Box::new(PanicOnce { fired: false }),
            clock.clone(),
        );

        // The main engine samples noise first and fails; the rest still flush
        let records = sim.tick();
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.system.id != "sys_main_engine"));
        assert_eq!(sim.stats().isolated_failures, 1);

        clock.advance(1.0);
        sim.tick();
        let stats = sim.stats();
        assert_eq!(stats.isolated_failures, 1);
        assert_eq!(stats.ticks, 2);
        assert_eq!(sim.system("sys_main_engine").unwrap().relay.state, RelayState::On);
    }

    #[test]
    fn test_unknown_system_lookup() {
        let (sim, _) = simulation(0.0);
        assert!(sim.system("sys_warp_core").is_none());
        assert!(sim.with_system("sys_warp_core", |_| ()).is_none());
    }
}
