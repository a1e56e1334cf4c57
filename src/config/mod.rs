// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Configuration module
//!
//! [`Config`] is the on-disk TOML file read at startup. [`LiveConfig`] is the
//! small subset operators may patch while the simulation runs.

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ControlError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Deployment environment label
    pub environment: String,

    /// Log level
    pub log_level: String,

    /// Simulation configuration
    pub simulation: SimulationConfig,

    /// Telemetry collector configuration
    pub collector: CollectorConfig,

    /// Access control configuration
    pub security: SecurityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Naval System Simulator".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            collector: CollectorConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("navalsim"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Seed the live configuration from the file values
    pub fn live(&self) -> LiveConfig {
        LiveConfig {
            valid_ips: self.security.valid_ips.iter().cloned().collect(),
            log_interval: self.simulation.log_interval_secs,
            simulation_sleep: self.simulation.tick_secs,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds between ticks
    pub tick_secs: f64,

    /// Seconds between full telemetry flushes
    pub log_interval_secs: f64,

    /// Fixed noise seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_secs: 1.0,
            log_interval_secs: 20.0,
            seed: None,
        }
    }
}

/// Telemetry collector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Enable HTTP delivery
    pub enabled: bool,

    /// Collector endpoint receiving one JSON record per POST
    pub url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:8003/api/logs/".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Access control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Addresses allowed to issue control writes
    pub valid_ips: Vec<String>,

    /// Internal networks always trusted, in CIDR notation
    pub trusted_subnets: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            valid_ips: vec!["127.0.0.1".to_string()],
            trusted_subnets: vec!["172.16.0.0/12".to_string()],
        }
    }
}

/// Runtime-tunable settings shared by the scheduler and the control surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveConfig {
    pub valid_ips: BTreeSet<String>,
    /// Seconds between full telemetry flushes
    pub log_interval: f64,
    /// Seconds between ticks
    pub simulation_sleep: f64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Config::default().live()
    }
}

/// Process-wide handle to the live configuration
pub type SharedConfig = Arc<RwLock<LiveConfig>>;

impl LiveConfig {
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Apply a JSON object patch.
    ///
    /// Known keys are validated first and applied together; if any is
    /// malformed nothing changes. Unknown keys are ignored. Returns the keys
    /// that were applied.
    pub fn apply_patch(&mut self, patch: &Value) -> Result<Vec<&'static str>, ControlError> {
        let fields = patch
            .as_object()
            .ok_or_else(|| ControlError::InvalidConfig("patch must be a JSON object".into()))?;

        let mut next = self.clone();
        let mut applied = Vec::new();

        for (key, value) in fields {
            match key.as_str() {
                "valid_ips" => {
                    next.valid_ips = parse_ip_list(value)?;
                    applied.push("valid_ips");
                }
                "log_interval" => {
                    next.log_interval = parse_interval("log_interval", value)?;
                    applied.push("log_interval");
                }
                "simulation_sleep" => {
                    next.simulation_sleep = parse_interval("simulation_sleep", value)?;
                    applied.push("simulation_sleep");
                }
                other => debug!("Ignoring unknown config key '{}'", other),
            }
        }

        *self = next;
        Ok(applied)
    }
}

fn parse_ip_list(value: &Value) -> Result<BTreeSet<String>, ControlError> {
    let items = value
        .as_array()
        .ok_or_else(|| ControlError::InvalidConfig("valid_ips must be a list".into()))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| ControlError::InvalidConfig("valid_ips entries must be strings".into()))
        })
        .collect()
}

fn parse_interval(key: &str, value: &Value) -> Result<f64, ControlError> {
    match value.as_f64() {
        Some(secs) if secs.is_finite() && secs > 0.0 => Ok(secs),
        _ => Err(ControlError::InvalidConfig(format!(
            "{} must be a positive number of seconds",
            key
        ))),
    }
}
