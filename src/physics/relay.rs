// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Relay safety state machine: ON / OFF / TRIPPED with timed recovery

use crate::error::ControlError;
use crate::model::{NavalSystem, Relay, RelayState};

/// Seconds a tripped relay stays latched before automatic recovery
pub const RECOVERY_WINDOW_SECS: f64 = 10.0;

impl Relay {
    /// Apply an operator command.
    ///
    /// ON and OFF are always accepted. TRIPPED is refused while the relay is
    /// OFF; otherwise it latches with `tripped_at = now`.
    pub fn command(&mut self, target: RelayState, now: f64) -> Result<(), ControlError> {
        match (self.state, target) {
            (RelayState::Off, RelayState::Tripped) => Err(ControlError::IllegalTransition {
                from: self.state,
                to: target,
            }),
            (_, RelayState::Tripped) => {
                self.trip(now);
                Ok(())
            }
            (_, state) => {
                self.state = state;
                self.tripped_at = None;
                Ok(())
            }
        }
    }

    /// Latch into TRIPPED. A relay that is already tripped keeps its
    /// original trip time.
    pub fn trip(&mut self, now: f64) {
        if self.state != RelayState::Tripped {
            self.state = RelayState::Tripped;
            self.tripped_at = Some(now);
        }
    }

    pub fn is_tripped(&self) -> bool {
        self.state == RelayState::Tripped
    }

    /// True once the recovery window has fully elapsed.
    ///
    /// A TRIPPED relay without a trip time is treated as due so it can never
    /// stay latched forever.
    pub fn recovery_due(&self, now: f64) -> bool {
        match (self.state, self.tripped_at) {
            (RelayState::Tripped, Some(at)) => now - at >= RECOVERY_WINDOW_SECS,
            (RelayState::Tripped, None) => true,
            _ => false,
        }
    }

    fn close(&mut self) {
        self.state = RelayState::On;
        self.tripped_at = None;
    }
}

/// TRIPPED -> ON, resetting every sensor to the middle of its safe band
pub fn recover(system: &mut NavalSystem) {
    system.relay.close();
    for sensor in &mut system.sensors {
        sensor.value = sensor.safe_midpoint();
    }
}
