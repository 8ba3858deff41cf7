//! The ocean surface, as seen by the electrical subsystem.
//!
//! The real surface is a waving heightfield owned by the world; the circuit
//! only queries depth and deposits two kinds of agitation: localized
//! displacement under a running engine, and a general disturbance while a
//! ship sound plays. Both are recorded here and drained by the world's
//! water pass.

use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A pending localized surface displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDisplacement {
    pub world_x: f32,
    pub amount: f32,
}

/// The ocean surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OceanSurface {
    sea_level: f32,
    displacements: Vec<SurfaceDisplacement>,
    disturbances: Vec<Duration>,
}

impl OceanSurface {
    pub fn new(sea_level: f32) -> Self {
        Self {
            sea_level,
            displacements: Vec::new(),
            disturbances: Vec::new(),
        }
    }

    /// Depth of a position below the surface; positive = underwater.
    #[inline]
    pub fn depth_at(&self, position: Vec2) -> f32 {
        self.sea_level - position.y
    }

    /// Displace the surface at the given world x by the given amount.
    pub fn displace_at(&mut self, world_x: f32, amount: f32) {
        self.displacements.push(SurfaceDisplacement { world_x, amount });
    }

    /// Agitate the whole surface for the given duration.
    pub fn disturb(&mut self, duration: Duration) {
        self.disturbances.push(duration);
    }

    /// Take all pending displacements, leaving the buffer empty.
    pub fn take_displacements(&mut self) -> Vec<SurfaceDisplacement> {
        std::mem::take(&mut self.displacements)
    }

    /// Take all pending disturbances, leaving the buffer empty.
    pub fn take_disturbances(&mut self) -> Vec<Duration> {
        std::mem::take(&mut self.disturbances)
    }
}
