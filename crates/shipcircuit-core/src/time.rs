//! Wall-clock time for visual pacing.
//!
//! Simulation time is plain seconds (`f32`) threaded through update calls;
//! wall-clock time gets its own type so the two domains cannot be mixed up
//! by accident.

use serde::{Deserialize, Serialize};
use std::ops::Add;
use std::time::Duration;

/// A point on the monotonic wall clock, in seconds since an arbitrary epoch.
///
/// The surrounding game samples its clock once per frame and threads the
/// value through; the simulation never reads the system clock itself, which
/// keeps flicker schedules scriptable in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct WallClockTime(f64);

impl WallClockTime {
    /// The epoch. Deadlines default here, which is always in the past.
    pub const EPOCH: WallClockTime = WallClockTime(0.0);

    /// Construct from seconds since the epoch.
    #[inline]
    pub fn from_seconds(seconds: f64) -> Self {
        WallClockTime(seconds)
    }

    /// Seconds since the epoch.
    #[inline]
    pub fn as_seconds(self) -> f64 {
        self.0
    }
}

impl Add<Duration> for WallClockTime {
    type Output = WallClockTime;

    #[inline]
    fn add(self, rhs: Duration) -> WallClockTime {
        WallClockTime(self.0 + rhs.as_secs_f64())
    }
}
