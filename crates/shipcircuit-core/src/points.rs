//! The ship's mass particles, as seen by the electrical subsystem.
//!
//! The full mass-spring mechanics live elsewhere; this store exposes exactly
//! the surface the circuit consumes (position, temperature, water, cached
//! depth, connected springs) and the effects it produces (heat, static
//! forces, pump leak-source force, ephemeral particles, highlights).
//!
//! Effects accumulate in buffers drained by the owning simulation once per
//! frame; the electrical subsystem never holds a reference between calls.

use crate::id::{PointIndex, SpringIndex};
use crate::math::Vec2;
use crate::time::WallClockTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-point spring adjacency
// ---------------------------------------------------------------------------

/// One structural edge incident to a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedSpring {
    pub spring: SpringIndex,
    pub other_endpoint: PointIndex,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A short-lived particle spawned by an electrical element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EphemeralParticle {
    /// Light smoke from a powered smoke emitter.
    Smoke {
        position: Vec2,
        depth: f32,
        temperature: f32,
        spawned_at: f32,
    },
    /// A wake bubble trailing a running, submerged engine.
    WakeBubble {
        position: Vec2,
        velocity: Vec2,
        depth: f32,
        spawned_at: f32,
    },
}

/// The visual state a highlighted element flashes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightState {
    PowerOn,
    PowerOff,
    SwitchOn,
    SwitchOff,
    EngineOn,
    EngineOff,
    SoundOn,
    SoundOff,
    PumpOn,
    PumpOff,
    DoorOpen,
    DoorClosed,
}

/// A pending element highlight, to be rendered by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub point: PointIndex,
    pub state: HighlightState,
    pub started_at: WallClockTime,
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// Structure-of-arrays store of the ship's points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Points {
    positions: Vec<Vec2>,
    temperatures: Vec<f32>,
    water: Vec<f32>,
    // Cached depth below the ocean surface; positive = underwater.
    depths: Vec<f32>,
    is_hull: Vec<bool>,
    connected_springs: Vec<Vec<ConnectedSpring>>,

    // Accumulated effects, drained by the owning simulation.
    heat: Vec<f32>,
    static_forces: Vec<Vec2>,
    water_pump_forces: Vec<f32>,
    particles: Vec<EphemeralParticle>,
    highlights: Vec<Highlight>,
}

impl Points {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Returns its index.
    pub fn add(&mut self, position: Vec2, is_hull: bool) -> PointIndex {
        let index = PointIndex(self.positions.len() as u32);
        self.positions.push(position);
        self.temperatures.push(293.15);
        self.water.push(0.0);
        self.depths.push(0.0);
        self.is_hull.push(is_hull);
        self.connected_springs.push(Vec::new());
        self.heat.push(0.0);
        self.static_forces.push(Vec2::ZERO);
        self.water_pump_forces.push(0.0);
        index
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    // -- read surface ------------------------------------------------------

    pub fn position(&self, point: PointIndex) -> Vec2 {
        self.positions[point.index()]
    }

    pub fn temperature(&self, point: PointIndex) -> f32 {
        self.temperatures[point.index()]
    }

    pub fn water(&self, point: PointIndex) -> f32 {
        self.water[point.index()]
    }

    /// Whether the point carries more water than the given threshold.
    pub fn is_wet(&self, point: PointIndex, threshold: f32) -> bool {
        self.water[point.index()] > threshold
    }

    /// Depth below the ocean surface as cached by the last ocean pass;
    /// positive = underwater.
    pub fn cached_depth(&self, point: PointIndex) -> f32 {
        self.depths[point.index()]
    }

    pub fn is_cached_underwater(&self, point: PointIndex) -> bool {
        self.depths[point.index()] > 0.0
    }

    /// Whether the point's structural material is hull (watertight doors
    /// derive their default openness from this).
    pub fn is_hull(&self, point: PointIndex) -> bool {
        self.is_hull[point.index()]
    }

    pub fn connected_springs(&self, point: PointIndex) -> &[ConnectedSpring] {
        &self.connected_springs[point.index()]
    }

    pub(crate) fn register_spring(
        &mut self,
        point: PointIndex,
        spring: SpringIndex,
        other_endpoint: PointIndex,
    ) {
        self.connected_springs[point.index()].push(ConnectedSpring {
            spring,
            other_endpoint,
        });
    }

    // -- ambient mutators (driven by the surrounding simulation) ----------

    pub fn set_position(&mut self, point: PointIndex, position: Vec2) {
        self.positions[point.index()] = position;
    }

    pub fn set_temperature(&mut self, point: PointIndex, temperature: f32) {
        self.temperatures[point.index()] = temperature;
    }

    pub fn set_water(&mut self, point: PointIndex, water: f32) {
        self.water[point.index()] = water;
    }

    pub fn set_cached_depth(&mut self, point: PointIndex, depth: f32) {
        self.depths[point.index()] = depth;
    }

    // -- write surface (effects) ------------------------------------------

    /// Deposit heat at a point.
    pub fn add_heat(&mut self, point: PointIndex, heat: f32) {
        self.heat[point.index()] += heat;
    }

    /// Heat accumulated at a point since the last drain.
    pub fn heat(&self, point: PointIndex) -> f32 {
        self.heat[point.index()]
    }

    /// Add a static force, integrated by the next mechanics pass.
    pub fn add_static_force(&mut self, point: PointIndex, force: Vec2) {
        self.static_forces[point.index()] += force;
    }

    pub fn static_force(&self, point: PointIndex) -> Vec2 {
        self.static_forces[point.index()]
    }

    /// Write the water-pump force into the point's leak-source record.
    /// Positive pumps water out, negative pumps it in.
    pub fn set_water_pump_force(&mut self, point: PointIndex, force: f32) {
        self.water_pump_forces[point.index()] = force;
    }

    pub fn water_pump_force(&self, point: PointIndex) -> f32 {
        self.water_pump_forces[point.index()]
    }

    /// Spawn an ephemeral particle.
    pub fn spawn_particle(&mut self, particle: EphemeralParticle) {
        self.particles.push(particle);
    }

    /// Flash an element highlight at a point.
    pub fn start_highlight(
        &mut self,
        point: PointIndex,
        state: HighlightState,
        now: WallClockTime,
    ) {
        self.highlights.push(Highlight {
            point,
            state,
            started_at: now,
        });
    }

    // -- drains ------------------------------------------------------------

    /// Take all pending particles, leaving the buffer empty.
    pub fn take_particles(&mut self) -> Vec<EphemeralParticle> {
        std::mem::take(&mut self.particles)
    }

    /// Take all pending highlights, leaving the buffer empty.
    pub fn take_highlights(&mut self) -> Vec<Highlight> {
        std::mem::take(&mut self.highlights)
    }

    /// Reset accumulated heat and forces after the mechanics pass consumed
    /// them.
    pub fn clear_accumulated_effects(&mut self) {
        self.heat.iter_mut().for_each(|h| *h = 0.0);
        self.static_forces.iter_mut().for_each(|f| *f = Vec2::ZERO);
    }
}
