// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! NavalSim - Shipboard Control Network Simulator
//!
//! A simulated ship's control network for security training:
//! - Six onboard systems, each behind a protective relay with sensors
//! - Sensor physics: decay, ramp-up, oscillation and warning-band drift
//! - Latching trips on critical breaches with timed auto-recovery
//! - Alert policy with escalation, periodic flush and intrusion reporting
//! - Fire-and-forget telemetry to an HTTP collector
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     NavalSim Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌────────────┐  │
//! │  │Scheduler │→ │ Physics  │→ │   Alert   │→ │ Telemetry  │  │
//! │  │  (tick)  │  │ + Relays │  │  Policy   │  │ Dispatcher │  │
//! │  └──────────┘  └──────────┘  └───────────┘  └────────────┘  │
//! │       ↑             ↑                             ↓         │
//! │  ┌──────────┐  ┌──────────────────┐        ┌────────────┐   │
//! │  │   Live   │← │ Control Surface  │        │ HTTP / bus │   │
//! │  │  Config  │  │ (access policy)  │        │   sinks    │   │
//! │  └──────────┘  └──────────────────┘        └────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod alert;
pub mod config;
pub mod control;
pub mod core;
pub mod error;
pub mod model;
pub mod physics;
pub mod streaming;

// Re-exports for convenience
pub use alert::{EmitReason, Severity};
pub use config::{Config, LiveConfig};
pub use control::ControlSurface;
pub use self::core::{Scheduler, Simulation};
pub use error::ControlError;
pub use model::{NavalSystem, Relay, RelayState, Sensor, SensorType};
pub use streaming::{TelemetryDispatcher, TelemetryRecord};

/// NavalSim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NavalSim name
pub const NAME: &str = "NavalSim";

/// Build info
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION.to_string(),
        target: std::env::consts::ARCH.to_string(),
        os: std::env::consts::OS.to_string(),
    }
}

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version string
    pub version: String,
    /// Target architecture
    pub target: String,
    /// Operating system
    pub os: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} ({}-{})", NAME, self.version, self.target, self.os)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info() {
        let info = build_info();
        assert_eq!(info.version, VERSION);
        assert!(info.to_string().starts_with("NavalSim v"));
    }
}
