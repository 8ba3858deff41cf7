//! The ship's structural springs, as seen by the electrical subsystem.
//!
//! The circuit only needs endpoints and factory octants; the factory octant
//! of a spring at an endpoint is the discretized direction the spring left
//! that endpoint at when the ship was built, and it never changes afterwards
//! no matter how the hull deforms. Engines use it to recover their
//! as-designed thrust direction.

use crate::id::{PointIndex, SpringIndex};
use crate::math::Octant;
use crate::points::Points;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Endpoints {
    point_a: PointIndex,
    point_b: PointIndex,
    // Octant of b as seen from a, and of a as seen from b, at factory time.
    factory_octant_a: Octant,
    factory_octant_b: Octant,
}

/// Structure-of-arrays store of the ship's springs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Springs {
    endpoints: Vec<Endpoints>,
}

impl Springs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a spring between two existing points, computing factory
    /// octants from their current positions and registering the spring in
    /// both points' adjacency lists.
    pub fn add(
        &mut self,
        point_a: PointIndex,
        point_b: PointIndex,
        points: &mut Points,
    ) -> SpringIndex {
        let index = SpringIndex(self.endpoints.len() as u32);
        let a_to_b = points.position(point_b) - points.position(point_a);
        self.endpoints.push(Endpoints {
            point_a,
            point_b,
            factory_octant_a: Octant::from_direction(a_to_b),
            factory_octant_b: Octant::from_direction(-a_to_b),
        });
        points.register_spring(point_a, index, point_b);
        points.register_spring(point_b, index, point_a);
        index
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoint_a(&self, spring: SpringIndex) -> PointIndex {
        self.endpoints[spring.index()].point_a
    }

    pub fn endpoint_b(&self, spring: SpringIndex) -> PointIndex {
        self.endpoints[spring.index()].point_b
    }

    /// The factory octant of the spring as it leaves the given endpoint.
    pub fn factory_endpoint_octant(&self, spring: SpringIndex, endpoint: PointIndex) -> Octant {
        let e = &self.endpoints[spring.index()];
        if endpoint == e.point_a {
            e.factory_octant_a
        } else {
            assert_eq!(endpoint, e.point_b);
            e.factory_octant_b
        }
    }
}
