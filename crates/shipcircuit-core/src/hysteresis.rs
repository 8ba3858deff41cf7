//! Asymmetric-watermark hysteresis helpers.
//!
//! Many element types gate their activity on ambient conditions with two
//! different thresholds: the condition to *stay* on is looser than the
//! condition to turn *back* on. The gap prevents oscillation right at a
//! boundary. The same pattern recurs for temperature and wetness with
//! different magic numbers per type, so it lives here once.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Operating temperature
// ---------------------------------------------------------------------------

/// Outer watermark: how far outside the nominal range a running element may
/// drift before it shuts off.
const OUTER_WATERMARK_OFFSET: f32 = 10.0;

/// Inner watermark: how far inside the nominal range temperature must return
/// before a stopped element restarts.
const INNER_WATERMARK_OFFSET: f32 = 10.0;

/// An element's nominal operating temperature range, with hysteresis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingTemperatureRange {
    pub min: f32,
    pub max: f32,
}

impl OperatingTemperatureRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether a running element stays within tolerance (range widened by
    /// the outer watermark).
    #[inline]
    pub fn is_in_range(&self, temperature: f32) -> bool {
        temperature >= self.min - OUTER_WATERMARK_OFFSET
            && temperature <= self.max + OUTER_WATERMARK_OFFSET
    }

    /// Whether a stopped element is allowed to restart (range narrowed by
    /// the inner watermark).
    #[inline]
    pub fn is_back_in_range(&self, temperature: f32) -> bool {
        temperature >= self.min + INNER_WATERMARK_OFFSET
            && temperature <= self.max - INNER_WATERMARK_OFFSET
    }
}

// ---------------------------------------------------------------------------
// Wetness
// ---------------------------------------------------------------------------

/// A high/low wetness watermark pair.
///
/// `high` is the water fraction at which a dry element becomes wet-disabled;
/// `low` is the fraction it must fall back under before re-enabling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WetnessWatermarks {
    pub high: f32,
    pub low: f32,
}

impl WetnessWatermarks {
    pub const fn new(high: f32, low: f32) -> Self {
        Self { high, low }
    }

    /// Whether a currently-on element is now too wet to keep running.
    #[inline]
    pub fn is_too_wet(&self, water: f32) -> bool {
        water > self.high
    }

    /// Whether a currently-off element has dried out enough to restart.
    #[inline]
    pub fn is_dry_enough(&self, water: f32) -> bool {
        water <= self.low
    }
}
