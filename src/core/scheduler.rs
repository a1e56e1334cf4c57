// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Tick scheduler - drives the simulation at the configured period

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use super::Simulation;
use crate::streaming::TelemetryDispatcher;

const MIN_TICK_SECS: f64 = 0.01;
const MAX_TICK_SECS: f64 = 3600.0;

pub struct Scheduler {
    simulation: Arc<Simulation>,
    dispatcher: TelemetryDispatcher,
}

impl Scheduler {
    pub fn new(simulation: Arc<Simulation>, dispatcher: TelemetryDispatcher) -> Self {
        Self {
            simulation,
            dispatcher,
        }
    }

    /// Tick until a shutdown signal arrives.
    ///
    /// Each tick runs to completion before shutdown is looked at; the period
    /// is re-read from live configuration after every tick.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!("Starting simulation loop...");
        let counters = self.simulation.counters();
        counters.set_running(true);

        loop {
            let started = Instant::now();
            let records = self.simulation.tick();
            if !records.is_empty() {
                debug!("Emitting {} telemetry records", records.len());
            }
            self.dispatcher.dispatch(records);

            let deadline = next_deadline(started, self.simulation.tick_period());

            tokio::select! {
                _ = sleep_until(deadline) => {}
                _ = shutdown.recv() => {
                    info!("Simulation loop shutting down...");
                    break;
                }
            }
        }

        counters.set_running(false);
        info!("Simulation loop stopped");
        Ok(())
    }

    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(shutdown))
    }
}

/// Next tick boundary, measured from the start of the tick just run
fn next_deadline(started: Instant, period_secs: f64) -> Instant {
    let secs = period_secs.clamp(MIN_TICK_SECS, MAX_TICK_SECS);
    started + Duration::from_secs_f64(secs)
}
