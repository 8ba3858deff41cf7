//! Transition events emitted by the electrical subsystem.
//!
//! Events are emitted only on state *transitions*, never per tick, and
//! accumulate in insertion order in an internal buffer drained by the
//! frontend via `ElectricalElements::take_events`. Announcement events
//! additionally describe the initial roster of instanced elements for
//! panel construction.

use crate::material::MaterialId;
use serde::{Deserialize, Serialize};
use shipcircuit_core::id::{ElementIndex, InstanceIndex};

// ---------------------------------------------------------------------------
// Event payload vocabulary
// ---------------------------------------------------------------------------

/// On/off, as seen by panels and probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectricalState {
    Off,
    On,
}

impl From<bool> for ElectricalState {
    fn from(on: bool) -> Self {
        if on { ElectricalState::On } else { ElectricalState::Off }
    }
}

/// How a switch announces itself on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchKind {
    InteractiveToggleSwitch,
    InteractivePushSwitch,
    AutomaticSwitch,
    ShipSoundSwitch,
}

/// What a power probe watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerProbeKind {
    Generator,
    PowerMonitor,
}

/// Length of a lamp flicker, for sound selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlickerDuration {
    Short,
    Long,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An electrical subsystem event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElectricalEvent {
    // -- Announcements --
    AnnouncementsBegin,
    AnnouncementsEnd,
    EngineMonitorCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
        thrust_magnitude: f32,
        rpm: f32,
    },
    EngineControllerCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
    },
    PowerProbeCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
        kind: PowerProbeKind,
        state: ElectricalState,
    },
    SwitchCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
        kind: SwitchKind,
        state: ElectricalState,
    },
    WaterPumpCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
        normalized_force: f32,
    },
    WatertightDoorCreated {
        element: ElementIndex,
        instance: Option<InstanceIndex>,
        material: MaterialId,
        is_open: bool,
    },

    // -- Switches & probes --
    SwitchToggled {
        element: ElementIndex,
        state: ElectricalState,
    },
    SwitchEnabled {
        element: ElementIndex,
        enabled: bool,
    },
    PowerProbeToggled {
        element: ElementIndex,
        state: ElectricalState,
    },

    // -- Engines --
    EngineMonitorUpdated {
        element: ElementIndex,
        thrust_magnitude: f32,
        rpm: f32,
    },
    EngineControllerUpdated {
        element: ElementIndex,
        telegraph_value: i32,
    },
    EngineControllerEnabled {
        element: ElementIndex,
        enabled: bool,
    },

    // -- Sounds & lights --
    ShipSoundUpdated {
        element: ElementIndex,
        material: MaterialId,
        is_playing: bool,
        is_underwater: bool,
    },
    LightFlicker {
        duration: FlickerDuration,
        is_underwater: bool,
    },

    // -- Pumps & doors --
    WaterPumpUpdated {
        element: ElementIndex,
        normalized_force: f32,
    },
    WaterPumpEnabled {
        element: ElementIndex,
        enabled: bool,
    },
    WatertightDoorUpdated {
        element: ElementIndex,
        is_open: bool,
    },
    WatertightDoorEnabled {
        element: ElementIndex,
        enabled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrical_state_from_bool() {
        assert_eq!(ElectricalState::from(true), ElectricalState::On);
        assert_eq!(ElectricalState::from(false), ElectricalState::Off);
    }
}
