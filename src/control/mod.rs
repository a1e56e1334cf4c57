//! Control surface - operator and attacker writes into the simulation
//!
//! Transport-agnostic: an HTTP layer maps requests onto these calls and
//! [`ControlError::status_code`] onto responses. `origin` is the remote
//! address of the request, or `None` for in-process callers.

mod access;

pub use access::{AccessPolicy, Subnet};

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::{LiveConfig, SecurityConfig};
use crate::core::{EngineStats, ServiceHealth, Simulation};
use crate::error::ControlError;
use crate::model::{NavalSystem, RelayState};

pub struct ControlSurface {
    simulation: Arc<Simulation>,
    access: AccessPolicy,
}

impl ControlSurface {
    pub fn new(simulation: Arc<Simulation>, security: &SecurityConfig) -> Result<Self, ControlError> {
        Ok(Self {
            simulation,
            access: AccessPolicy::new(&security.trusted_subnets)?,
        })
    }

    pub fn list_systems(&self) -> Vec<NavalSystem> {
        self.simulation.systems()
    }

    pub fn get_system(&self, id: &str) -> Result<NavalSystem, ControlError> {
        self.simulation
            .system(id)
            .ok_or_else(|| ControlError::SystemNotFound(id.to_string()))
    }

    /// Force a relay position. OFF -> TRIPPED is refused.
    pub fn set_relay_state(
        &self,
        system_id: &str,
        state: RelayState,
        origin: Option<IpAddr>,
    ) -> Result<(), ControlError> {
        let now = self.simulation.now();
        let intruder = self.intruder(origin);

        self.simulation
            .with_system(system_id, |system| -> Result<(), ControlError> {
                mark_intrusion(system, intruder.as_deref());
                system.relay.command(state, now)?;
                info!(system = %system.id, "Relay {} set to {}", system.relay.id, state);
                Ok(())
            })
            .unwrap_or_else(|| Err(ControlError::SystemNotFound(system_id.to_string())))
            .map_err(|e| {
                warn!(system = system_id, "Relay command rejected: {}", e);
                e
            })
    }

    /// Force a sensor reading. Refused while the system is OFF.
    ///
    /// The next tick evolves from the forced value, so a value beyond the
    /// critical band trips the relay on that tick.
    pub fn set_sensor_value(
        &self,
        system_id: &str,
        sensor_id: &str,
        value: f64,
        origin: Option<IpAddr>,
    ) -> Result<(), ControlError> {
        let intruder = self.intruder(origin);

        self.simulation
            .with_system(system_id, |system| -> Result<(), ControlError> {
                mark_intrusion(system, intruder.as_deref());

                if !value.is_finite() {
                    return Err(ControlError::InvalidValue(value));
                }
                if system.relay.state == RelayState::Off {
                    return Err(ControlError::SystemOff(system.id.clone()));
                }

                let system_name = system.id.clone();
                let sensor = system.sensor_mut(sensor_id).ok_or_else(|| ControlError::SensorNotFound {
                    system: system_name.clone(),
                    sensor: sensor_id.to_string(),
                })?;
                sensor.value = value;
                info!(system = %system_name, sensor = sensor_id, value, "Sensor value forced");
                Ok(())
            })
            .unwrap_or_else(|| Err(ControlError::SystemNotFound(system_id.to_string())))
            .map_err(|e| {
                warn!(system = system_id, sensor = sensor_id, "Sensor write rejected: {}", e);
                e
            })
    }

    /// Patch the live configuration; returns the resulting values
    pub fn patch_config(&self, patch: &Value) -> Result<LiveConfig, ControlError> {
        let mut live = self.simulation.config().write();
        let applied = live.apply_patch(patch)?;
        if !applied.is_empty() {
            info!("Live configuration updated: {}", applied.join(", "));
        }
        Ok(live.clone())
    }

    pub fn live_config(&self) -> LiveConfig {
        self.simulation.config().read().clone()
    }

    pub fn health(&self) -> ServiceHealth {
        self.simulation.health()
    }

    pub fn stats(&self) -> EngineStats {
        self.simulation.stats()
    }

    /// The origin as a string when it is not authorized
    fn intruder(&self, origin: Option<IpAddr>) -> Option<String> {
        let addr = origin?;
        let valid_ips = self.simulation.config().read().valid_ips.clone();
        if self.access.is_authorized(&addr, &valid_ips) {
            None
        } else {
            Some(addr.to_string())
        }
    }
}

fn mark_intrusion(system: &mut NavalSystem, intruder: Option<&str>) {
    if let Some(ip) = intruder {
        warn!(system = %system.id, ip, "Unauthorized control write");
        system.under_attack_ip = Some(ip.to_string());
    }
}
