// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Sensor dynamics - per-tick value evolution
//!
//! Three regimes, selected by relay state and the current value:
//!
//! ```text
//!   relay OFF             -> exponential decay toward a baseline
//!   relay ON, v < safe_min -> cold-start ramp up to the safe band
//!   relay ON, otherwise    -> drifting sinusoidal target + noise
//! ```
//!
//! ON results then pass through warning-band escalation/correction. The
//! caller trips the relay when the final value breaches the critical band.

use crate::model::{RelayState, Sensor, SensorType};

use super::noise::NoiseSource;

/// Ambient temperature an unpowered system cools toward
pub const AMBIENT_TEMPERATURE: f64 = 20.0;

/// Chance that a value inside a warning band runs away toward critical
pub const ESCALATION_PROBABILITY: f64 = 0.02;

/// Width of each warning band as a fraction of the safe span
pub const WARNING_BAND_FRACTION: f64 = 0.1;

const TEMPERATURE_DECAY: f64 = 0.2;
const GENERIC_DECAY: f64 = 0.5;

/// Compute a sensor's next value.
///
/// `now` is in seconds and only feeds the waveforms; it must be the same
/// clock the relay uses so phases stay continuous between ticks. Callers
/// must not invoke this for a tripped system that is still latched.
pub fn next_value(
    sensor: &Sensor,
    relay: RelayState,
    now: f64,
    noise: &mut dyn NoiseSource,
) -> f64 {
    match relay {
        RelayState::On => {
            let candidate = if sensor.value < sensor.safe_min {
                ramp_up(sensor)
            } else {
                oscillate(sensor, now, noise)
            };
            let candidate = clamp_physical(sensor, candidate);
            clamp_physical(sensor, warning_adjust(sensor, candidate, noise))
        }
        // A latched relay is frozen upstream; if we get here treat it as unpowered.
        RelayState::Off | RelayState::Tripped => decay(sensor),
    }
}

/// Whether `value` lies outside the sensor's critical band
pub fn breaches_critical(sensor: &Sensor, value: f64) -> bool {
    value > sensor.critical_max || value < sensor.critical_min
}

/// Regime A: unpowered decay
fn decay(sensor: &Sensor) -> f64 {
    let v = sensor.value;
    let next = match sensor.sensor_type {
        SensorType::Temperature => v - (v - AMBIENT_TEMPERATURE) * TEMPERATURE_DECAY,
        _ => v * (1.0 - GENERIC_DECAY),
    };
    clamp_physical(sensor, round2(next))
}

/// Regime B: below the safe band with power applied
fn ramp_up(sensor: &Sensor) -> f64 {
    let gap = sensor.safe_min - sensor.value;
    let step = (0.2 * gap).max(0.05 * sensor.max_val);
    sensor.value + step
}

/// Regime C: steady-state oscillation around a drifting target
fn oscillate(sensor: &Sensor, now: f64, noise: &mut dyn NoiseSource) -> f64 {
    let v = sensor.value;
    let mid = sensor.safe_midpoint();
    let span = sensor.safe_span();
    let phase = sensor.phase();

    match sensor.sensor_type {
        SensorType::Temperature => {
            // High thermal inertia: slow wave, small steps
            let target = mid + (0.1 * now + phase).sin() * 0.3 * span;
            v + (target - v) * 0.05 + noise.jitter(0.2 * sensor.drift)
        }
        _ => {
            let amplitude = 0.2 * span;
            let medium = (0.5 * now + phase).sin() * amplitude;
            // Tension term can carry the target outside the safe band
            let tension = (0.01 * now + phase).sin() * amplitude * 1.5;
            let target = mid + medium + noise.jitter(sensor.drift) + tension;
            v + (target - v) * 0.2 + noise.jitter(0.1 * sensor.drift)
        }
    }
}

/// Warning-band handling: rare runaway toward the nearest critical bound,
/// otherwise a pull back toward the middle of the safe band.
fn warning_adjust(sensor: &Sensor, value: f64, noise: &mut dyn NoiseSource) -> f64 {
    let span = sensor.safe_span();
    let band = WARNING_BAND_FRACTION * span;

    let upper = value <= sensor.safe_max && value >= sensor.safe_max - band;
    let lower = value >= sensor.safe_min && value <= sensor.safe_min + band;
    if !upper && !lower {
        return value;
    }

    if noise.chance(ESCALATION_PROBABILITY) {
        let factor = noise.uniform(0.9, 1.2);
        if upper {
            value + (sensor.critical_max - value) * factor
        } else {
            value - (value - sensor.critical_min) * factor
        }
    } else {
        let target = noise.uniform(sensor.safe_min + 0.4 * span, sensor.safe_min + 0.6 * span);
        value + (target - value) * 0.3
    }
}

fn clamp_physical(sensor: &Sensor, value: f64) -> f64 {
    value.max(sensor.min_val).min(sensor.max_val)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::default_fleet;
    use crate::physics::noise::{FixedNoise, RngNoise};

    fn engine_temp() -> Sensor {
        Sensor::new("sens_eng_temp", SensorType::Temperature, 85.0, "ºC")
            .with_limits(20.0, 150.0, 1.5)
            .with_safe_band(40.0, 95.0)
            .with_critical_band(0.0, 110.0)
    }

    fn rpm() -> Sensor {
        Sensor::new("sens_eng_rpm", SensorType::Rpm, 100.0, "rpm")
            .with_limits(0.0, 2500.0, 15.0)
            .with_safe_band(500.0, 1800.0)
            .with_critical_band(0.0, 2200.0)
    }

    #[test]
    fn test_temperature_decays_toward_ambient() {
        let sensor = engine_temp();
        let mut noise = FixedNoise::neutral();
        let next = next_value(&sensor, RelayState::Off, 0.0, &mut noise);
        assert_eq!(next, 72.0);
    }

    #[test]
    fn test_generic_decay_halves() {
        let mut sensor = rpm();
        let mut noise = FixedNoise::neutral();

        sensor.value = next_value(&sensor, RelayState::Off, 0.0, &mut noise);
        assert_eq!(sensor.value, 50.0);
        sensor.value = next_value(&sensor, RelayState::Off, 1.0, &mut noise);
        assert_eq!(sensor.value, 25.0);
    }

    #[test]
    fn test_decay_rounds_and_clamps() {
        let mut sensor = rpm();
        sensor.value = 0.25;
        let next = next_value(&sensor, RelayState::Off, 0.0, &mut FixedNoise::neutral());
        assert_eq!(next, 0.13);

        // Engine temperature cannot cool below its physical floor
        let mut temp = engine_temp();
        temp.min_val = 30.0;
        temp.value = 31.0;
        let next = next_value(&temp, RelayState::Off, 0.0, &mut FixedNoise::neutral());
        assert_eq!(next, 30.0);
    }

    #[test]
    fn test_ramp_up_uses_proportional_step_for_large_gaps() {
        let mut sensor = engine_temp();
        sensor.value = 0.0;
        sensor.min_val = 0.0;
        // max(0.2 * 40, 0.05 * 150) = 8
        let next = next_value(&sensor, RelayState::On, 0.0, &mut FixedNoise::neutral());
        assert_eq!(next, 8.0);
    }

    #[test]
    fn test_ramp_up_guarantees_progress_for_small_gaps() {
        let mut sensor = engine_temp();
        sensor.value = 39.9;
        // max(0.02, 7.5) = 7.5, lands at 47.4 which is clear of the warning band
        let next = next_value(&sensor, RelayState::On, 0.0, &mut FixedNoise::neutral());
        assert!((next - 47.4).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_moves_five_percent_toward_target() {
        let mut sensor = engine_temp();
        sensor.value = 60.0;
        // Choose t so the slow wave sits at zero and the target is the midpoint
        let now = -sensor.phase() / 0.1;
        let next = next_value(&sensor, RelayState::On, now, &mut FixedNoise::neutral());
        assert!((next - (60.0 + (67.5 - 60.0) * 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_generic_moves_twenty_percent_toward_target() {
        // From the midpoint a 20% step stays within 10% of the span, clear
        // of both warning bands whatever the phase.
        let mut sensor = rpm();
        sensor.value = sensor.safe_midpoint();
        let start = sensor.value;
        let now = 10.0;
        let span = sensor.safe_span();
        let phase = sensor.phase();
        let target = sensor.safe_midpoint()
            + (0.5 * now + phase).sin() * 0.2 * span
            + (0.01 * now + phase).sin() * 0.2 * span * 1.5;
        let expected = start + (target - start) * 0.2;
        assert!((expected - start).abs() <= 0.1 * span + 1e-9);

        let next = next_value(&sensor, RelayState::On, now, &mut FixedNoise::neutral());
        assert!((next - expected).abs() < 1e-9);
    }

    #[test]
    fn test_escalation_runs_toward_critical_max() {
        let mut sensor = engine_temp();
        sensor.value = 94.0;
        // fraction 0 => escalation fires with factor 0.9
        let adjusted = warning_adjust(&sensor, 94.0, &mut FixedNoise::new(0.0));
        assert!((adjusted - (94.0 + 16.0 * 0.9)).abs() < 1e-9);
    }

    #[test]
    fn test_escalation_runs_toward_critical_min() {
        let sensor = engine_temp();
        let adjusted = warning_adjust(&sensor, 41.0, &mut FixedNoise::new(0.0));
        assert!((adjusted - (41.0 - 41.0 * 0.9)).abs() < 1e-9);
    }

    #[test]
    fn test_warning_band_statistics() {
        let sensor = engine_temp();
        let mut noise = RngNoise::seeded(2024);
        let trials = 20_000;
        let mut escalated = 0;
        let mut tripped = 0;

        for _ in 0..trials {
            let v = warning_adjust(&sensor, 94.0, &mut noise);
            if v > sensor.safe_max {
                escalated += 1;
                assert!(v >= 94.0 + 16.0 * 0.9 - 1e-9 && v <= 94.0 + 16.0 * 1.2 + 1e-9);
                if breaches_critical(&sensor, v) {
                    tripped += 1;
                }
            } else {
                // Corrected: 30% of the way toward [62, 73]
                assert!(v >= 94.0 - (94.0 - 62.0) * 0.3 - 1e-9);
                assert!(v <= 94.0 - (94.0 - 73.0) * 0.3 + 1e-9);
            }
        }

        let rate = escalated as f64 / trials as f64;
        assert!(rate > 0.01 && rate < 0.03, "escalation rate {}", rate);
        assert!(tripped > 0 && tripped <= escalated);
    }

    #[test]
    fn test_outside_warning_band_is_untouched() {
        let sensor = engine_temp();
        let mut noise = FixedNoise::new(0.0);
        assert_eq!(warning_adjust(&sensor, 67.5, &mut noise), 67.5);
        assert_eq!(warning_adjust(&sensor, 100.0, &mut noise), 100.0);
    }

    #[test]
    fn test_values_stay_within_physical_limits() {
        let mut noise = RngNoise::seeded(99);
        for system in default_fleet() {
            for mut sensor in system.sensors {
                for tick in 0..2_000 {
                    let relay = if tick % 300 < 250 { RelayState::On } else { RelayState::Off };
                    sensor.value = next_value(&sensor, relay, tick as f64, &mut noise);
                    assert!(
                        sensor.value >= sensor.min_val && sensor.value <= sensor.max_val,
                        "{} escaped limits: {}",
                        sensor.id,
                        sensor.value
                    );
                }
            }
        }
    }
}
