//! Per-type mutable element state.
//!
//! Each element carries exactly one [`ElementState`] variant matching its
//! material kind, fixed for its lifetime. Hot material fields (engine
//! capacity, pump nominal force, lamp failure rate) are copied in at
//! construction so the update paths never consult the registry.
//!
//! Deadlines come in two time domains: wall-clock deadlines
//! ([`WallClockTime`]) pace visual effects such as lamp flicker, while
//! simulation-time deadlines (`f32` seconds) gate gameplay windows such as
//! spark disablement, so they freeze correctly when the simulation pauses.

use serde::{Deserialize, Serialize};
use shipcircuit_core::id::{EngineGroupId, PointIndex};
use shipcircuit_core::rng::SimRng;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::time::WallClockTime;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorState {
    pub is_producing_current: bool,
    /// Spark-disable window end, in simulation time.
    pub disabled_until: Option<f32>,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self {
            is_producing_current: true,
            disabled_until: None,
        }
    }
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Lamp
// ---------------------------------------------------------------------------

/// Where the lamp's flicker state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LampStateKind {
    Initial,
    LightOn,
    /// Short power-loss flicker: on-off-on-off.
    FlickerA,
    /// Longer flicker: on-off-on(long)-off-on-off.
    FlickerB,
    LightOff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampState {
    pub is_self_powered: bool,
    /// Probability of failing a once-per-second check while wet, derived
    /// from the material's failures-per-minute rate.
    pub wet_failure_rate_cdf: f32,
    pub state: LampStateKind,
    pub flicker_counter: u32,
    pub next_flicker_transition: WallClockTime,
    pub next_wet_failure_check: WallClockTime,
    /// Spark-disable window end, in simulation time.
    pub disabled_until: Option<f32>,
}

impl LampState {
    pub const FLICKER_START_INTERVAL: Duration = Duration::from_millis(100);
    pub const FLICKER_A_INTERVAL: Duration = Duration::from_millis(150);
    pub const FLICKER_B_INTERVAL: Duration = Duration::from_millis(100);

    /// `wet_failure_rate` is expected failures per minute while wet.
    pub fn new(is_self_powered: bool, wet_failure_rate: f32) -> Self {
        Self {
            is_self_powered,
            // CDF at one second of an exponential with the given per-minute rate.
            wet_failure_rate_cdf: 1.0 - (-wet_failure_rate / 60.0).exp(),
            state: LampStateKind::Initial,
            flicker_counter: 0,
            next_flicker_transition: WallClockTime::EPOCH,
            next_wet_failure_check: WallClockTime::EPOCH,
            disabled_until: None,
        }
    }

    /// Back to the initial state, keeping material-derived fields.
    pub fn reset(&mut self) {
        self.state = LampStateKind::Initial;
        self.flicker_counter = 0;
        self.next_flicker_transition = WallClockTime::EPOCH;
        self.next_wet_failure_check = WallClockTime::EPOCH;
        self.disabled_until = None;
    }

    /// Once-per-second wet failure check; samples the failure CDF when the
    /// check interval has elapsed.
    pub fn check_wet_failure(&mut self, now: WallClockTime, rng: &mut SimRng) -> bool {
        let mut is_failure = false;
        if now >= self.next_wet_failure_check {
            is_failure = rng.unit() < self.wet_failure_rate_cdf;
            self.next_wet_failure_check = now + Duration::from_secs(1);
        }
        is_failure
    }
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// Full-throttle thrust force, newtons (material HP converted at
    /// construction).
    pub thrust_capacity: f32,
    pub responsiveness: f32,
    /// As-designed thrust direction, CCW radians from +x.
    pub ccw_direction: f32,

    /// Engine group assigned by the last engine-group rebuild; 0 when not
    /// reachable from any controller.
    pub group: EngineGroupId,
    pub engine_visit_seq: SequenceNumber,

    /// The neighboring point the thrust frame is anchored to, with the
    /// cached rotation mapping the engine->reference direction onto the
    /// thrust direction.
    pub reference_point: Option<PointIndex>,
    pub reference_cw_angle_cos: f32,
    pub reference_cw_angle_sin: f32,

    pub current_rpm: f32,
    pub current_thrust_magnitude: f32,
    pub last_published_rpm: f32,
    pub last_published_thrust_magnitude: f32,
    pub last_highlighted_rpm: f32,
    /// Spark super-electrification window end, in simulation time.
    pub super_electrification_until: Option<f32>,
}

impl EngineState {
    pub fn new(thrust_capacity: f32, responsiveness: f32, ccw_direction: f32) -> Self {
        Self {
            thrust_capacity,
            responsiveness,
            ccw_direction,
            group: 0,
            engine_visit_seq: SequenceNumber::NONE,
            reference_point: None,
            reference_cw_angle_cos: 1.0,
            reference_cw_angle_sin: 0.0,
            current_rpm: 0.0,
            current_thrust_magnitude: 0.0,
            last_published_rpm: 0.0,
            last_published_thrust_magnitude: 0.0,
            last_highlighted_rpm: 0.0,
            super_electrification_until: None,
        }
    }

    /// Back to a stopped engine, keeping material-derived fields.
    pub fn reset(&mut self) {
        self.group = 0;
        self.engine_visit_seq = SequenceNumber::NONE;
        self.reference_point = None;
        self.reference_cw_angle_cos = 1.0;
        self.reference_cw_angle_sin = 0.0;
        self.current_rpm = 0.0;
        self.current_thrust_magnitude = 0.0;
        self.last_published_rpm = 0.0;
        self.last_published_thrust_magnitude = 0.0;
        self.last_highlighted_rpm = 0.0;
        self.super_electrification_until = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineControllerState {
    /// Telegraph notch in `[-dof/2, +dof/2]`; negative is astern.
    pub telegraph_value: i32,
    pub is_powered: bool,
    /// Telegraph positions of this controller's material.
    pub telegraph_degrees_of_freedom: u32,
    pub group: EngineGroupId,
    pub engine_visit_seq: SequenceNumber,
}

impl EngineControllerState {
    pub fn new(telegraph_degrees_of_freedom: u32) -> Self {
        Self {
            telegraph_value: 0,
            is_powered: false,
            telegraph_degrees_of_freedom,
            group: 0,
            engine_visit_seq: SequenceNumber::NONE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineTransmissionState {
    pub engine_visit_seq: SequenceNumber,
}

/// Per-group aggregate over powered controllers, rebuilt every sink pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineGroupState {
    /// Maximum over the group's controllers.
    pub group_rpm: f32,
    /// Sum over the group's controllers; opposing telegraphs cancel.
    pub group_thrust_magnitude: f32,
}

// ---------------------------------------------------------------------------
// Other sinks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherSinkState {
    pub is_powered: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerMonitorState {
    pub is_powered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipSoundState {
    pub is_self_powered: bool,
    pub is_playing: bool,
}

impl ShipSoundState {
    pub fn new(is_self_powered: bool) -> Self {
        Self {
            is_self_powered,
            is_playing: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmokeEmitterState {
    /// Mean particles per second, from the material.
    pub emission_rate: f32,
    pub is_operating: bool,
    /// Next emission, in simulation time; 0 = needs scheduling.
    pub next_emission_sim_time: f32,
}

impl SmokeEmitterState {
    pub fn new(emission_rate: f32) -> Self {
        Self {
            emission_rate,
            is_operating: false,
            next_emission_sim_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterPumpState {
    /// Full-throttle pumping force, from the material; positive pumps out.
    pub nominal_force: f32,
    pub target_normalized_force: f32,
    pub current_normalized_force: f32,
    pub last_published_normalized_force: f32,
}

impl WaterPumpState {
    pub fn new(nominal_force: f32) -> Self {
        Self {
            nominal_force,
            target_normalized_force: 0.0,
            current_normalized_force: 0.0,
            last_published_normalized_force: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterSensingSwitchState {
    /// No automatic toggles before this simulation time.
    pub grace_period_end_sim_time: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatertightDoorState {
    pub is_activated: bool,
    /// Openness when not activated, from the structural material (non-hull
    /// material means an open doorway).
    pub default_is_open: bool,
}

impl WatertightDoorState {
    pub fn new(default_is_open: bool) -> Self {
        Self {
            is_activated: false,
            default_is_open,
        }
    }

    /// Activation flips openness against the structural default.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.default_is_open != self.is_activated
    }
}

// ---------------------------------------------------------------------------
// ElementState
// ---------------------------------------------------------------------------

/// The per-type state payload of an element; the variant is fixed at
/// construction and matches the material kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementState {
    Cable,
    Engine(EngineState),
    EngineController(EngineControllerState),
    EngineTransmission(EngineTransmissionState),
    Generator(GeneratorState),
    InteractiveSwitch,
    Lamp(LampState),
    OtherSink(OtherSinkState),
    PowerMonitor(PowerMonitorState),
    ShipSound(ShipSoundState),
    SmokeEmitter(SmokeEmitterState),
    WaterPump(WaterPumpState),
    WaterSensingSwitch(WaterSensingSwitchState),
    WatertightDoor(WatertightDoorState),
}

// The accessors panic on a kind mismatch: reaching one with the wrong
// variant is a programming error, not a runtime condition.
impl ElementState {
    pub fn generator(&self) -> &GeneratorState {
        match self {
            ElementState::Generator(s) => s,
            _ => panic!("element is not a generator"),
        }
    }

    pub fn generator_mut(&mut self) -> &mut GeneratorState {
        match self {
            ElementState::Generator(s) => s,
            _ => panic!("element is not a generator"),
        }
    }

    pub fn lamp(&self) -> &LampState {
        match self {
            ElementState::Lamp(s) => s,
            _ => panic!("element is not a lamp"),
        }
    }

    pub fn lamp_mut(&mut self) -> &mut LampState {
        match self {
            ElementState::Lamp(s) => s,
            _ => panic!("element is not a lamp"),
        }
    }

    pub fn engine(&self) -> &EngineState {
        match self {
            ElementState::Engine(s) => s,
            _ => panic!("element is not an engine"),
        }
    }

    pub fn engine_mut(&mut self) -> &mut EngineState {
        match self {
            ElementState::Engine(s) => s,
            _ => panic!("element is not an engine"),
        }
    }

    pub fn engine_controller(&self) -> &EngineControllerState {
        match self {
            ElementState::EngineController(s) => s,
            _ => panic!("element is not an engine controller"),
        }
    }

    pub fn engine_controller_mut(&mut self) -> &mut EngineControllerState {
        match self {
            ElementState::EngineController(s) => s,
            _ => panic!("element is not an engine controller"),
        }
    }

    pub fn engine_transmission_mut(&mut self) -> &mut EngineTransmissionState {
        match self {
            ElementState::EngineTransmission(s) => s,
            _ => panic!("element is not an engine transmission"),
        }
    }

    pub fn other_sink_mut(&mut self) -> &mut OtherSinkState {
        match self {
            ElementState::OtherSink(s) => s,
            _ => panic!("element is not a generic sink"),
        }
    }

    pub fn power_monitor(&self) -> &PowerMonitorState {
        match self {
            ElementState::PowerMonitor(s) => s,
            _ => panic!("element is not a power monitor"),
        }
    }

    pub fn power_monitor_mut(&mut self) -> &mut PowerMonitorState {
        match self {
            ElementState::PowerMonitor(s) => s,
            _ => panic!("element is not a power monitor"),
        }
    }

    pub fn ship_sound(&self) -> &ShipSoundState {
        match self {
            ElementState::ShipSound(s) => s,
            _ => panic!("element is not a ship sound"),
        }
    }

    pub fn ship_sound_mut(&mut self) -> &mut ShipSoundState {
        match self {
            ElementState::ShipSound(s) => s,
            _ => panic!("element is not a ship sound"),
        }
    }

    pub fn smoke_emitter(&self) -> &SmokeEmitterState {
        match self {
            ElementState::SmokeEmitter(s) => s,
            _ => panic!("element is not a smoke emitter"),
        }
    }

    pub fn smoke_emitter_mut(&mut self) -> &mut SmokeEmitterState {
        match self {
            ElementState::SmokeEmitter(s) => s,
            _ => panic!("element is not a smoke emitter"),
        }
    }

    pub fn water_pump(&self) -> &WaterPumpState {
        match self {
            ElementState::WaterPump(s) => s,
            _ => panic!("element is not a water pump"),
        }
    }

    pub fn water_pump_mut(&mut self) -> &mut WaterPumpState {
        match self {
            ElementState::WaterPump(s) => s,
            _ => panic!("element is not a water pump"),
        }
    }

    pub fn water_sensing_switch_mut(&mut self) -> &mut WaterSensingSwitchState {
        match self {
            ElementState::WaterSensingSwitch(s) => s,
            _ => panic!("element is not a water-sensing switch"),
        }
    }

    pub fn watertight_door(&self) -> &WatertightDoorState {
        match self {
            ElementState::WatertightDoor(s) => s,
            _ => panic!("element is not a watertight door"),
        }
    }

    pub fn watertight_door_mut(&mut self) -> &mut WatertightDoorState {
        match self {
            ElementState::WatertightDoor(s) => s,
            _ => panic!("element is not a watertight door"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamp_failure_cdf_from_rate() {
        let lamp = LampState::new(false, 60.0);
        // One expected failure per second: CDF = 1 - 1/e.
        assert!((lamp.wet_failure_rate_cdf - (1.0 - (-1.0f32).exp())).abs() < 1e-6);

        let never = LampState::new(false, 0.0);
        assert_eq!(never.wet_failure_rate_cdf, 0.0);
    }

    #[test]
    fn lamp_wet_failure_checks_once_per_second() {
        let mut lamp = LampState::new(false, 0.0);
        let mut rng = SimRng::new(1);

        let t0 = WallClockTime::from_seconds(10.0);
        lamp.next_wet_failure_check = t0;

        // At the scheduled time: a check happens (rate 0 never fails) and
        // the next check moves one second out.
        assert!(!lamp.check_wet_failure(t0, &mut rng));
        assert_eq!(lamp.next_wet_failure_check, t0 + Duration::from_secs(1));

        // Before the next scheduled time: no sampling at all.
        let rng_state = rng.state();
        assert!(!lamp.check_wet_failure(t0 + Duration::from_millis(500), &mut rng));
        assert_eq!(rng.state(), rng_state);
    }

    #[test]
    fn lamp_certain_failure_fails() {
        let mut lamp = LampState::new(false, f32::INFINITY);
        assert_eq!(lamp.wet_failure_rate_cdf, 1.0);
        let mut rng = SimRng::new(7);
        assert!(lamp.check_wet_failure(WallClockTime::from_seconds(1.0), &mut rng));
    }

    #[test]
    fn door_openness_flips_against_default() {
        let mut doorway = WatertightDoorState::new(true);
        assert!(doorway.is_open());
        doorway.is_activated = true;
        assert!(!doorway.is_open());

        let mut bulkhead = WatertightDoorState::new(false);
        assert!(!bulkhead.is_open());
        bulkhead.is_activated = true;
        assert!(bulkhead.is_open());
    }

    #[test]
    fn engine_reset_keeps_material_fields() {
        let mut engine = EngineState::new(2000.0 * 746.0, 0.05, std::f32::consts::PI);
        engine.current_rpm = 0.8;
        engine.group = 3;
        engine.reset();
        assert_eq!(engine.current_rpm, 0.0);
        assert_eq!(engine.group, 0);
        assert_eq!(engine.thrust_capacity, 2000.0 * 746.0);
        assert_eq!(engine.responsiveness, 0.05);
    }

    #[test]
    #[should_panic(expected = "not a lamp")]
    fn mismatched_accessor_panics() {
        let state = ElementState::Cable;
        let _ = state.lamp();
    }
}
