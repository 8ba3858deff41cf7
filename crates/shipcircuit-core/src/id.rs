use serde::{Deserialize, Serialize};

/// Identifies an electrical element within one ship. Cheap to copy and compare.
///
/// Element indices are dense and stable: elements are created once, in index
/// order, at ship load or repair, and are never reordered or reused. Deleted
/// elements keep their slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementIndex(pub u32);

impl ElementIndex {
    /// Convert to usize for buffer indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a point (mass particle) in the ship's physical structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointIndex(pub u32);

impl PointIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a spring (structural edge) in the ship's physical structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpringIndex(pub u32);

impl SpringIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a UI-addressable device instance on the ship's electrical panel.
///
/// Only instanced elements (switches, probes, controllers, pumps, doors)
/// carry one; cables and other anonymous elements use `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceIndex(pub u32);

/// Identifies an engine group: the connected component of engines,
/// controllers, and transmissions sharing one throttle signal.
///
/// Group 0 is the "unassigned" group for engines disconnected from every
/// controller.
pub type EngineGroupId = u32;
