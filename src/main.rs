// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! NavalSim - Shipboard Control Network Simulator
//!
//! Runs the simulated ship headless: ticks the physics, applies the relay
//! safety logic and ships telemetry to the collector until Ctrl+C.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use navalsim::control::ControlSurface;
use navalsim::core::{Scheduler, Simulation};
use navalsim::streaming::{HttpCollector, TelemetryDispatcher};
use navalsim::{build_info, Config, VERSION};

/// NavalSim - Shipboard Control Network Simulator
#[derive(Parser, Debug)]
#[command(name = "navalsim")]
#[command(author = "NavalSim Project")]
#[command(version = VERSION)]
#[command(about = "Simulated shipboard control network for security training")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Telemetry collector URL
    #[arg(long)]
    collector_url: Option<String>,

    /// Do not deliver telemetry over HTTP
    #[arg(long)]
    no_telemetry: bool,

    /// Seconds between ticks
    #[arg(long)]
    tick: Option<f64>,

    /// Fixed noise seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let config_path = args.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("⚓ {}", build_info());

    // Override with command line args
    if let Some(url) = args.collector_url {
        config.collector.url = url;
    }
    if args.no_telemetry {
        config.collector.enabled = false;
    }
    if let Some(tick) = args.tick {
        if !(tick.is_finite() && tick > 0.0) {
            anyhow::bail!("--tick must be a positive number of seconds");
        }
        config.simulation.tick_secs = tick;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Environment: {}", config.environment);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    use tokio::sync::broadcast;

    let live = config.live().shared();
    let simulation = Arc::new(Simulation::new(&config, live));
    info!("Simulation initialized with {} systems", simulation.systems().len());

    // Validates trusted subnets up front; a transport layer drives it from here
    let control = ControlSurface::new(simulation.clone(), &config.security)?;
    info!("Control surface ready ({} valid IPs)", control.live_config().valid_ips.len());

    let mut dispatcher = TelemetryDispatcher::new().with_counters(simulation.counters());
    if config.collector.enabled {
        dispatcher.add_sink(Arc::new(HttpCollector::new(&config.collector)?));
    } else {
        info!("HTTP telemetry disabled");
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = Scheduler::new(simulation.clone(), dispatcher).spawn(shutdown_rx);

    info!("🚢 {} running", config.app_name);
    info!("   Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, stopping simulation...");
    let _ = shutdown_tx.send(());
    handle.await??;

    let stats = control.stats();
    info!(
        "Shutdown complete: {} ticks, {} trips, {} recoveries, {} records ({} failed)",
        stats.ticks, stats.trips, stats.recoveries, stats.records_emitted, stats.deliveries_failed
    );

    Ok(())
}
