//! Visit sequence numbers.
//!
//! Both graph floods (engine-group analysis and source propagation) mark
//! visited elements by stamping them with the current step's sequence
//! number instead of keeping a visited set. A per-element "last visited"
//! field compared against the step's number gives O(1) duplicate checking
//! with no inter-step clearing.

use serde::{Deserialize, Serialize};

/// A monotonically increasing per-step visit marker.
///
/// The default value (`NONE`) never compares equal to any advanced value:
/// advancing wraps around zero, so a freshly created element is "never
/// visited" until the first flood reaches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    /// The "never visited" marker. Per-element buffers start here.
    pub const NONE: SequenceNumber = SequenceNumber(0);

    /// The successor of this sequence number, skipping `NONE` on wrap.
    #[inline]
    pub fn next(self) -> SequenceNumber {
        let v = self.0.wrapping_add(1);
        SequenceNumber(if v == 0 { 1 } else { v })
    }

    /// Advance in place and return the new value.
    #[inline]
    pub fn advance(&mut self) -> SequenceNumber {
        *self = self.next();
        *self
    }
}
