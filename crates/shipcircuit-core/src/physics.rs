//! Callbacks into the ship's structural physics.
//!
//! The electrical subsystem needs to tell the structure about a handful of
//! events it cannot act on itself: a watertight door changing the local
//! hull permeability, and elements being destroyed or restored (which the
//! structure mirrors onto its own per-point bookkeeping). The trait keeps
//! the circuit testable without a full structural simulation behind it.

use crate::id::{ElementIndex, PointIndex};

/// Receiver for structural side effects of electrical activity.
pub trait ShipPhysicsHandler {
    /// A watertight door opened (`true`) or closed (`false`) at a point.
    fn handle_watertight_door_updated(&mut self, point: PointIndex, open: bool);

    /// An electrical element was destroyed.
    fn handle_electrical_element_destroy(&mut self, element: ElementIndex);

    /// A destroyed electrical element was restored.
    fn handle_electrical_element_restore(&mut self, element: ElementIndex);
}
