//! Entity model - naval systems, relays and sensors

mod catalog;

pub use catalog::default_fleet;

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Relay position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelayState {
    On,
    Off,
    Tripped,
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RelayState::On => "ON",
            RelayState::Off => "OFF",
            RelayState::Tripped => "TRIPPED",
        };
        f.write_str(s)
    }
}

/// Physical quantity measured by a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SensorType {
    Temperature, // ºC
    Voltage,     // V
    Current,     // A
    Rpm,         // rev/min
}

/// Power relay feeding a naval system.
///
/// `tripped_at` is `Some` exactly when `state == Tripped`; the state machine
/// in [`crate::physics::relay`] is the only code that touches either field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relay {
    pub id: String,
    pub state: RelayState,
    /// Unix seconds at which the relay tripped
    pub tripped_at: Option<f64>,
}

impl Relay {
    pub fn new(id: &str, state: RelayState) -> Self {
        Self {
            id: id.to_string(),
            state,
            tripped_at: None,
        }
    }
}

/// A single analogue sensor with its physical, safe and critical bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SensorRepr")]
pub struct Sensor {
    pub id: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub value: f64,
    pub unit: String,

    // Physical limits and noise scale
    pub min_val: f64,
    pub max_val: f64,
    pub drift: f64,

    // Safety thresholds
    pub safe_min: f64,
    pub safe_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,

    #[serde(skip)]
    phase: f64,
}

/// Wire form of [`Sensor`]; the phase is rebuilt from the id
#[derive(Deserialize)]
struct SensorRepr {
    id: String,
    #[serde(rename = "type")]
    sensor_type: SensorType,
    value: f64,
    unit: String,
    min_val: f64,
    max_val: f64,
    drift: f64,
    safe_min: f64,
    safe_max: f64,
    critical_min: f64,
    critical_max: f64,
}

impl From<SensorRepr> for Sensor {
    fn from(repr: SensorRepr) -> Self {
        Self {
            phase: phase_for(&repr.id),
            id: repr.id,
            sensor_type: repr.sensor_type,
            value: repr.value,
            unit: repr.unit,
            min_val: repr.min_val,
            max_val: repr.max_val,
            drift: repr.drift,
            safe_min: repr.safe_min,
            safe_max: repr.safe_max,
            critical_min: repr.critical_min,
            critical_max: repr.critical_max,
        }
    }
}

impl Sensor {
    pub fn new(id: &str, sensor_type: SensorType, value: f64, unit: &str) -> Self {
        Self {
            id: id.to_string(),
            sensor_type,
            value,
            unit: unit.to_string(),
            min_val: 0.0,
            max_val: 100.0,
            drift: 0.5,
            safe_min: 0.0,
            safe_max: 100.0,
            critical_min: -10.0,
            critical_max: 110.0,
            phase: phase_for(id),
        }
    }

    pub fn with_limits(mut self, min_val: f64, max_val: f64, drift: f64) -> Self {
        self.min_val = min_val;
        self.max_val = max_val;
        self.drift = drift;
        self
    }

    pub fn with_safe_band(mut self, safe_min: f64, safe_max: f64) -> Self {
        self.safe_min = safe_min;
        self.safe_max = safe_max;
        self
    }

    pub fn with_critical_band(mut self, critical_min: f64, critical_max: f64) -> Self {
        self.critical_min = critical_min;
        self.critical_max = critical_max;
        self
    }

    /// Waveform phase offset, fixed for the lifetime of the sensor
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn safe_midpoint(&self) -> f64 {
        (self.safe_min + self.safe_max) / 2.0
    }

    pub fn safe_span(&self) -> f64 {
        self.safe_max - self.safe_min
    }

    pub fn is_safe(&self) -> bool {
        self.value >= self.safe_min && self.value <= self.safe_max
    }

    /// Whether the configured bands are ordered
    /// `critical_min <= safe_min < safe_max <= critical_max` and `min_val <= max_val`.
    pub fn bands_consistent(&self) -> bool {
        self.min_val <= self.max_val
            && self.critical_min <= self.safe_min
            && self.safe_min < self.safe_max
            && self.safe_max <= self.critical_max
    }
}

/// A shipboard system: one relay and a fixed set of sensors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavalSystem {
    pub id: String,
    pub name: String,
    pub relay: Relay,
    pub sensors: Vec<Sensor>,
    /// Source address of the last unauthorized write, until reported
    pub under_attack_ip: Option<String>,
}

impl NavalSystem {
    pub fn new(id: &str, name: &str, relay: Relay, sensors: Vec<Sensor>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            relay,
            sensors,
            under_attack_ip: None,
        }
    }

    pub fn sensor(&self, sensor_id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|s| s.id == sensor_id)
    }

    pub fn sensor_mut(&mut self, sensor_id: &str) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|s| s.id == sensor_id)
    }
}

/// FNV-1a over the id bytes, mapped onto `[0, 2π)`.
///
/// Stable across runs and platforms, unlike a process-seeded hasher.
pub fn phase_for(id: &str) -> f64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = id
        .bytes()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME));

    (hash % 1_000_000) as f64 / 1_000_000.0 * TAU
}
