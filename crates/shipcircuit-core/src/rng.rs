//! Deterministic PRNG for simulation use (flicker choices, wet failures,
//! spark windows, smoke emission).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable for snapshots.

use serde::{Deserialize, Serialize};

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms — with a fixed seed, a lamp's flicker
/// sequence and a smoke emitter's emission times replay exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        // 24 high bits give full f32 mantissa coverage.
        (self.next_u64() >> 40) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Returns `true` with the given probability.
    ///
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: f32) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.unit() < probability
    }

    /// Uniform sample in `[low, high)`.
    pub fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.unit()
    }

    /// Uniform choice among `n` alternatives; returns a value in `[0, n)`.
    pub fn choose(&mut self, n: u32) -> u32 {
        assert!(n > 0);
        (self.next_u64() % n as u64) as u32
    }

    /// Exponentially distributed sample with the given mean (inter-arrival
    /// times of smoke emission).
    pub fn exponential(&mut self, mean: f32) -> f32 {
        // Inverse CDF; 1 - unit() avoids ln(0).
        -mean * (1.0 - self.unit()).ln()
    }

    /// Approximately standard-normal sample (Irwin-Hall with 12 uniforms).
    /// Good enough for wake-particle fan-out jitter.
    pub fn normal(&mut self) -> f32 {
        let mut acc = 0.0f32;
        for _ in 0..12 {
            acc += self.unit();
        }
        acc - 6.0
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
