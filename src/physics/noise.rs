// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/navalsim-rs

//! Noise sources for the sensor dynamics

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform randomness consumed by the dynamics engine
pub trait NoiseSource: Send {
    /// Sample uniformly from `[low, high]`. Returns `low` for an empty range.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Bernoulli trial with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.uniform(0.0, 1.0) < p
    }

    /// Symmetric noise in `[-scale, scale]`
    fn jitter(&mut self, scale: f64) -> f64 {
        let scale = scale.abs();
        self.uniform(-scale, scale)
    }
}

/// Adapter over any `rand` generator
pub struct RngNoise<R> {
    rng: R,
}

impl<R: Rng + Send> RngNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngNoise<ChaCha8Rng> {
    /// Reproducible noise stream
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng + Send> NoiseSource for RngNoise<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(high > low) {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Always returns the same fraction of the requested range.
///
/// A fraction of 0.5 makes every jitter zero and every `chance` fail for
/// small probabilities; 0.0 makes every `chance(p > 0)` succeed.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise {
    fraction: f64,
}

impl FixedNoise {
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    pub fn neutral() -> Self {
        Self::new(0.5)
    }
}

impl NoiseSource for FixedNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if !(high > low) {
            return low;
        }
        low + (high - low) * self.fraction
    }
}
