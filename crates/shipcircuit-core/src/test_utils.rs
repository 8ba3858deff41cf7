//! Shared test scaffolding, exported behind the `test-utils` feature for
//! downstream crates' tests.

use crate::id::{ElementIndex, PointIndex};
use crate::math::Vec2;
use crate::ocean::OceanSurface;
use crate::physics::ShipPhysicsHandler;
use crate::points::Points;
use crate::springs::Springs;

/// A recorded physics callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsCall {
    WatertightDoorUpdated { point: PointIndex, open: bool },
    ElementDestroyed(ElementIndex),
    ElementRestored(ElementIndex),
}

/// Physics handler that records every callback for later assertion.
#[derive(Debug, Default)]
pub struct RecordingShipPhysicsHandler {
    pub calls: Vec<PhysicsCall>,
}

impl RecordingShipPhysicsHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShipPhysicsHandler for RecordingShipPhysicsHandler {
    fn handle_watertight_door_updated(&mut self, point: PointIndex, open: bool) {
        self.calls.push(PhysicsCall::WatertightDoorUpdated { point, open });
    }

    fn handle_electrical_element_destroy(&mut self, element: ElementIndex) {
        self.calls.push(PhysicsCall::ElementDestroyed(element));
    }

    fn handle_electrical_element_restore(&mut self, element: ElementIndex) {
        self.calls.push(PhysicsCall::ElementRestored(element));
    }
}

/// A minimal ship structure for circuit tests: dry points above a sea level
/// of zero, one unit apart along +x, connected in a chain.
pub struct TestShip {
    pub points: Points,
    pub springs: Springs,
    pub ocean: OceanSurface,
    pub point_indices: Vec<PointIndex>,
}

impl TestShip {
    pub fn chain(point_count: usize) -> Self {
        let mut points = Points::new();
        let mut springs = Springs::new();
        let mut point_indices = Vec::with_capacity(point_count);
        for i in 0..point_count {
            point_indices.push(points.add(Vec2::new(i as f32, 1.0), false));
        }
        for pair in point_indices.windows(2) {
            springs.add(pair[0], pair[1], &mut points);
        }
        Self {
            points,
            springs,
            ocean: OceanSurface::new(0.0),
            point_indices,
        }
    }
}
