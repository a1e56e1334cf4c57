// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Startup catalog of the six shipboard systems

use super::{NavalSystem, Relay, RelayState, Sensor, SensorType};

/// Build the fleet every simulation starts from.
///
/// Each sensor row reads: id, type, initial value, unit,
/// (min_val, max_val, drift), (safe_min, safe_max), (critical_min, critical_max).
pub fn default_fleet() -> Vec<NavalSystem> {
    vec![
        NavalSystem::new(
            "sys_main_engine",
            "Main Engine",
            Relay::new("rel_engine", RelayState::On),
            vec![
                Sensor::new("sens_eng_temp", SensorType::Temperature, 85.0, "ºC")
                    .with_limits(20.0, 150.0, 1.5)
                    .with_safe_band(40.0, 95.0)
                    .with_critical_band(0.0, 110.0),
                Sensor::new("sens_eng_rpm", SensorType::Rpm, 1200.0, "rpm")
                    .with_limits(0.0, 2500.0, 15.0)
                    .with_safe_band(500.0, 1800.0)
                    .with_critical_band(0.0, 2200.0),
            ],
        ),
        NavalSystem::new(
            "sys_aux_gen",
            "Auxiliary Generator",
            Relay::new("rel_gen", RelayState::On),
            vec![
                Sensor::new("sens_gen_volt", SensorType::Voltage, 220.0, "V")
                    .with_limits(0.0, 300.0, 0.2)
                    .with_safe_band(210.0, 230.0)
                    .with_critical_band(190.0, 250.0),
                Sensor::new("sens_gen_curr", SensorType::Current, 45.0, "A")
                    .with_limits(0.0, 150.0, 2.0)
                    .with_safe_band(0.0, 100.0)
                    .with_critical_band(-1.0, 120.0),
            ],
        ),
        NavalSystem::new(
            "sys_bilge_pump",
            "Bilge Pump",
            Relay::new("rel_bilge", RelayState::Off),
            vec![
                Sensor::new("sens_bilge_curr", SensorType::Current, 0.0, "A")
                    .with_limits(0.0, 50.0, 0.0)
                    .with_safe_band(0.0, 25.0)
                    .with_critical_band(-1.0, 30.0),
            ],
        ),
        NavalSystem::new(
            "sys_radar",
            "X-Band Radar",
            Relay::new("rel_radar", RelayState::On),
            vec![
                Sensor::new("sens_radar_temp", SensorType::Temperature, 40.0, "ºC")
                    .with_limits(0.0, 100.0, 0.5)
                    .with_safe_band(10.0, 60.0)
                    .with_critical_band(0.0, 75.0),
            ],
        ),
        NavalSystem::new(
            "sys_steering",
            "Steering Gear",
            Relay::new("rel_steering", RelayState::On),
            vec![
                Sensor::new("sens_steer_volt", SensorType::Voltage, 24.0, "V")
                    .with_limits(0.0, 40.0, 0.1)
                    .with_safe_band(22.0, 28.0)
                    .with_critical_band(18.0, 32.0),
            ],
        ),
        NavalSystem::new(
            "sys_fire",
            "Fire Suppression",
            Relay::new("rel_fire", RelayState::On),
            vec![
                Sensor::new("sens_fire_temp", SensorType::Temperature, 22.0, "ºC")
                    .with_limits(0.0, 100.0, 0.2)
                    .with_safe_band(5.0, 40.0)
                    .with_critical_band(-5.0, 50.0),
            ],
        ),
    ]
}
