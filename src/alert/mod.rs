// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Alert policy - per-system severity tracking and report gating
//!
//! Reporting is edge-triggered on escalation, level-triggered on the
//! periodic flush, and forced by an unauthorized-access marker.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{NavalSystem, RelayState};

/// Derived alert level of a system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn of(system: &NavalSystem) -> Self {
        if system.relay.state == RelayState::Tripped {
            Severity::Critical
        } else if system.sensors.iter().any(|s| !s.is_safe()) {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

/// Why a telemetry record was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitReason {
    UnauthorizedAccess,
    Escalation,
    PeriodicFlush,
}

/// Decision for one system on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    pub severity: Severity,
    pub emit: Option<EmitReason>,
}

/// Tracks the previous severity of every system and the flush clock
#[derive(Debug, Default)]
pub struct AlertPolicy {
    previous: HashMap<String, Severity>,
    last_flush: Option<f64>,
}

impl AlertPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tick. Returns whether this tick is a full flush.
    ///
    /// The first tick always flushes so collectors get an initial snapshot.
    pub fn begin_tick(&mut self, now: f64, log_interval: f64) -> bool {
        let due = match self.last_flush {
            None => true,
            Some(last) => now - last >= log_interval,
        };
        if due {
            self.last_flush = Some(now);
        }
        due
    }

    /// Evaluate one system, recording its severity for the next tick
    pub fn evaluate(&mut self, system: &NavalSystem, flush: bool) -> AlertDecision {
        let severity = Severity::of(system);
        let previous = self
            .previous
            .insert(system.id.clone(), severity)
            .unwrap_or(Severity::Normal);

        let escalated = severity != Severity::Normal && severity != previous;

        let emit = if system.under_attack_ip.is_some() {
            Some(EmitReason::UnauthorizedAccess)
        } else if escalated {
            Some(EmitReason::Escalation)
        } else if flush {
            Some(EmitReason::PeriodicFlush)
        } else {
            None
        };

        AlertDecision { severity, emit }
    }
}
