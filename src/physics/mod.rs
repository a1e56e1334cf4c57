//! Physics - relay safety state machine and sensor dynamics

pub mod dynamics;
pub mod noise;
pub mod relay;

pub use dynamics::{breaches_critical, next_value};
pub use noise::{FixedNoise, NoiseSource, RngNoise};
pub use relay::{recover, RECOVERY_WINDOW_SECS};
