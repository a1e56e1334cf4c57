//! Error types for the control boundary.

use thiserror::Error;

use crate::model::RelayState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("System not found: {0}")]
    SystemNotFound(String),

    #[error("Sensor {sensor} not found in system {system}")]
    SensorNotFound { system: String, sensor: String },

    #[error("Cannot move relay from {from} to {to}")]
    IllegalTransition { from: RelayState, to: RelayState },

    #[error("Cannot modify sensors while system {0} is OFF")]
    SystemOff(String),

    #[error("Invalid sensor value: {0}")]
    InvalidValue(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ControlError {
    /// HTTP status a control surface should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ControlError::SystemNotFound(_) | ControlError::SensorNotFound { .. } => 404,
            ControlError::IllegalTransition { .. }
            | ControlError::SystemOff(_)
            | ControlError::InvalidValue(_) => 400,
            ControlError::InvalidConfig(_) => 422,
        }
    }
}
