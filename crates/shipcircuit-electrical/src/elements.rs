//! The electrical element store.
//!
//! Elements live in parallel structure-of-arrays buffers indexed by
//! [`ElementIndex`]; indices are dense, stable, and never reused. Deletion
//! is a flag: destroyed elements stay in place (some types run post-deletion
//! wind-down machines) and can be restored later.
//!
//! Two edge sets are kept per element: `connected` holds the factory-time
//! wiring and never changes except through
//! [`ElectricalElements::add_connection`]/[`ElectricalElements::remove_connection`];
//! `conducting_connected` is derived from it, restricted to edges whose both
//! endpoints currently conduct, and is maintained incrementally at the
//! single conductivity mutation point (see `circuit`).
//!
//! The per-tick driver is [`ElectricalElements::update`]; events accumulate
//! in insertion order and are drained with
//! [`ElectricalElements::take_events`].

use crate::event::{ElectricalEvent, ElectricalState, PowerProbeKind, SwitchKind};
use crate::material::{ElementKind, InteractiveSwitchKind, MaterialId, MaterialRegistry, ShipSoundKind};
use crate::params::{SimulationParameters, StormParameters};
use crate::state::{
    ElementState, EngineControllerState, EngineGroupState, EngineState, EngineTransmissionState,
    GeneratorState, LampState, OtherSinkState, PowerMonitorState, ShipSoundState,
    SmokeEmitterState, WaterPumpState, WaterSensingSwitchState, WatertightDoorState,
};
use serde::{Deserialize, Serialize};
use shipcircuit_core::hysteresis::OperatingTemperatureRange;
use shipcircuit_core::id::{ElementIndex, InstanceIndex, PointIndex};
use shipcircuit_core::ocean::OceanSurface;
use shipcircuit_core::physics::ShipPhysicsHandler;
use shipcircuit_core::points::{HighlightState, Points};
use shipcircuit_core::rng::SimRng;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::springs::Springs;
use shipcircuit_core::time::WallClockTime;

// ---------------------------------------------------------------------------
// Lamp photometry
// ---------------------------------------------------------------------------

fn calculate_lamp_light_spread_max_distance(
    material_light_spread: f32,
    light_spread_adjustment: f32,
) -> f32 {
    // The +0.5 ensures spread 0 still lights the lamp's own point.
    material_light_spread * light_spread_adjustment + 0.5
}

fn calculate_lamp_raw_distance_coefficient(
    material_luminiscence: f32,
    luminiscence_adjustment: f32,
    lamp_light_spread_max_distance: f32,
) -> f32 {
    // Pre-calculates part of lum * (spread - distance) / spread.
    material_luminiscence * luminiscence_adjustment / lamp_light_spread_max_distance
}

// ---------------------------------------------------------------------------
// ElectricalElements
// ---------------------------------------------------------------------------

/// The ship's electrical elements.
#[derive(Debug, Serialize, Deserialize)]
pub struct ElectricalElements {
    // Parallel per-element buffers
    is_deleted: Vec<bool>,
    point_indices: Vec<PointIndex>,
    material_ids: Vec<MaterialId>,
    kinds: Vec<ElementKind>,
    instance_indices: Vec<Option<InstanceIndex>>,
    pub(crate) conducts_electricity: Vec<bool>,
    pub(crate) material_conducts_electricity: Vec<bool>,
    heat_generated: Vec<f32>,
    pub(crate) operating_temperatures: Vec<OperatingTemperatureRange>,
    material_luminiscences: Vec<f32>,
    material_light_spreads: Vec<f32>,
    pub(crate) connected: Vec<Vec<ElementIndex>>,
    pub(crate) conducting_connected: Vec<Vec<ElementIndex>>,
    pub(crate) available_light: Vec<f32>,
    pub(crate) states: Vec<ElementState>,
    pub(crate) visit_sequence_numbers: Vec<SequenceNumber>,

    // Announcement metadata for interactive switches
    interactive_switch_kinds: Vec<Option<InteractiveSwitchKind>>,
    pub(crate) ship_sound_kinds: Vec<Option<ShipSoundKind>>,

    // Role indices
    pub(crate) sources: Vec<ElementIndex>,
    pub(crate) sinks: Vec<ElementIndex>,
    lamps: Vec<ElementIndex>,
    pub(crate) engines: Vec<ElementIndex>,
    pub(crate) engine_controllers: Vec<ElementIndex>,
    pub(crate) automatic_conductivity_toggling: Vec<ElementIndex>,

    // Lamp photometry, parallel to `lamps`
    lamp_raw_distance_coefficients: Vec<f32>,
    lamp_light_spread_max_distances: Vec<f32>,
    current_light_spread_adjustment: f32,
    current_luminiscence_adjustment: f32,

    // Engine groups; slot 0 is the "unassigned" group and stays zeroed
    pub(crate) engine_group_states: Vec<EngineGroupState>,

    // Per-step dirty flags
    pub(crate) structure_changed: bool,
    pub(crate) power_severed: bool,

    pub(crate) events: Vec<ElectricalEvent>,
}

impl ElectricalElements {
    pub fn new() -> Self {
        Self {
            is_deleted: Vec::new(),
            point_indices: Vec::new(),
            material_ids: Vec::new(),
            kinds: Vec::new(),
            instance_indices: Vec::new(),
            conducts_electricity: Vec::new(),
            material_conducts_electricity: Vec::new(),
            heat_generated: Vec::new(),
            operating_temperatures: Vec::new(),
            material_luminiscences: Vec::new(),
            material_light_spreads: Vec::new(),
            connected: Vec::new(),
            conducting_connected: Vec::new(),
            available_light: Vec::new(),
            states: Vec::new(),
            visit_sequence_numbers: Vec::new(),
            interactive_switch_kinds: Vec::new(),
            ship_sound_kinds: Vec::new(),
            sources: Vec::new(),
            sinks: Vec::new(),
            lamps: Vec::new(),
            engines: Vec::new(),
            engine_controllers: Vec::new(),
            automatic_conductivity_toggling: Vec::new(),
            lamp_raw_distance_coefficients: Vec::new(),
            lamp_light_spread_max_distances: Vec::new(),
            current_light_spread_adjustment: 1.0,
            current_luminiscence_adjustment: 1.0,
            engine_group_states: vec![EngineGroupState::default()],
            structure_changed: true,
            power_severed: false,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Append an element bound to a point. Hot material fields are copied
    /// into the element's own buffers; the registry is not consulted again
    /// on simulation paths.
    pub fn add(
        &mut self,
        point: PointIndex,
        instance: Option<InstanceIndex>,
        material_id: MaterialId,
        registry: &MaterialRegistry,
        points: &Points,
    ) -> ElementIndex {
        let material = registry
            .get(material_id)
            .expect("material id out of registry bounds");

        let element = ElementIndex(self.is_deleted.len() as u32);

        self.is_deleted.push(false);
        self.point_indices.push(point);
        self.material_ids.push(material_id);
        self.kinds.push(material.kind);
        self.instance_indices.push(instance);
        self.conducts_electricity.push(material.conducts_electricity);
        self.material_conducts_electricity.push(material.conducts_electricity);
        self.heat_generated.push(material.heat_generated);
        self.operating_temperatures.push(OperatingTemperatureRange::new(
            material.minimum_operating_temperature,
            material.maximum_operating_temperature,
        ));
        self.material_luminiscences.push(material.luminiscence);
        self.material_light_spreads.push(material.light_spread);
        self.connected.push(Vec::new());
        self.conducting_connected.push(Vec::new());
        self.available_light.push(0.0);
        self.visit_sequence_numbers.push(SequenceNumber::NONE);
        self.interactive_switch_kinds.push(
            (material.kind == ElementKind::InteractiveSwitch)
                .then_some(material.interactive_switch_kind),
        );
        self.ship_sound_kinds
            .push((material.kind == ElementKind::ShipSound).then_some(material.ship_sound_kind));

        // Per-type state and role registration
        let state = match material.kind {
            ElementKind::Cable => ElementState::Cable,

            ElementKind::Engine => {
                self.engines.push(element);
                ElementState::Engine(EngineState::new(
                    material.engine_power * 746.0, // HP => N
                    material.engine_responsiveness,
                    material.engine_ccw_direction,
                ))
            }

            ElementKind::EngineController => {
                self.sinks.push(element);
                self.engine_controllers.push(element);
                ElementState::EngineController(EngineControllerState::new(
                    material.telegraph_degrees_of_freedom,
                ))
            }

            ElementKind::EngineTransmission => {
                ElementState::EngineTransmission(EngineTransmissionState::default())
            }

            ElementKind::Generator => {
                self.sources.push(element);
                ElementState::Generator(GeneratorState::new())
            }

            ElementKind::InteractiveSwitch => ElementState::InteractiveSwitch,

            ElementKind::Lamp => {
                self.sinks.push(element);
                self.lamps.push(element);

                let max_distance = calculate_lamp_light_spread_max_distance(
                    material.light_spread,
                    self.current_light_spread_adjustment,
                );
                self.lamp_raw_distance_coefficients
                    .push(calculate_lamp_raw_distance_coefficient(
                        material.luminiscence,
                        self.current_luminiscence_adjustment,
                        max_distance,
                    ));
                self.lamp_light_spread_max_distances.push(max_distance);

                ElementState::Lamp(LampState::new(
                    material.is_self_powered,
                    material.wet_failure_rate,
                ))
            }

            ElementKind::OtherSink => {
                self.sinks.push(element);
                ElementState::OtherSink(OtherSinkState::default())
            }

            ElementKind::PowerMonitor => {
                self.sinks.push(element);
                ElementState::PowerMonitor(PowerMonitorState::default())
            }

            ElementKind::ShipSound => {
                self.sinks.push(element);
                ElementState::ShipSound(ShipSoundState::new(material.is_self_powered))
            }

            ElementKind::SmokeEmitter => {
                self.sinks.push(element);
                ElementState::SmokeEmitter(SmokeEmitterState::new(material.particle_emission_rate))
            }

            ElementKind::WaterPump => {
                self.sinks.push(element);
                ElementState::WaterPump(WaterPumpState::new(material.water_pump_nominal_force))
            }

            ElementKind::WaterSensingSwitch => {
                self.automatic_conductivity_toggling.push(element);
                ElementState::WaterSensingSwitch(WaterSensingSwitchState::default())
            }

            ElementKind::WatertightDoor => {
                self.sinks.push(element);
                // Doors in non-hull material default to open.
                ElementState::WatertightDoor(WatertightDoorState::new(!points.is_hull(point)))
            }
        };
        self.states.push(state);

        self.structure_changed = true;

        element
    }

    /// Symmetrically wire two elements; the conducting edge follows when
    /// both currently conduct.
    pub fn add_connection(&mut self, a: ElementIndex, b: ElementIndex) {
        debug_assert!(!self.connected[a.index()].contains(&b));
        self.connected[a.index()].push(b);
        self.connected[b.index()].push(a);

        if self.conducts_electricity[a.index()] && self.conducts_electricity[b.index()] {
            self.conducting_connected[a.index()].push(b);
            self.conducting_connected[b.index()].push(a);
        }

        self.structure_changed = true;
    }

    /// Symmetrically unwire two elements.
    pub fn remove_connection(&mut self, a: ElementIndex, b: ElementIndex) {
        remove_edge(&mut self.connected, a, b);

        if self.conducts_electricity[a.index()] && self.conducts_electricity[b.index()] {
            remove_edge(&mut self.conducting_connected, a, b);
        }

        self.structure_changed = true;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.is_deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_deleted.is_empty()
    }

    pub fn is_deleted(&self, element: ElementIndex) -> bool {
        self.is_deleted[element.index()]
    }

    pub fn point_index(&self, element: ElementIndex) -> PointIndex {
        self.point_indices[element.index()]
    }

    pub fn kind(&self, element: ElementIndex) -> ElementKind {
        self.kinds[element.index()]
    }

    pub fn material_id(&self, element: ElementIndex) -> MaterialId {
        self.material_ids[element.index()]
    }

    pub fn instance_index(&self, element: ElementIndex) -> Option<InstanceIndex> {
        self.instance_indices[element.index()]
    }

    pub fn conducts_electricity(&self, element: ElementIndex) -> bool {
        self.conducts_electricity[element.index()]
    }

    pub fn connected_elements(&self, element: ElementIndex) -> &[ElementIndex] {
        &self.connected[element.index()]
    }

    pub fn conducting_connected_elements(&self, element: ElementIndex) -> &[ElementIndex] {
        &self.conducting_connected[element.index()]
    }

    pub fn available_light(&self, element: ElementIndex) -> f32 {
        self.available_light[element.index()]
    }

    pub fn state(&self, element: ElementIndex) -> &ElementState {
        &self.states[element.index()]
    }

    /// Whether the element was reached by the given propagation pass.
    pub fn is_connected_to_power(&self, element: ElementIndex, visit_seq: SequenceNumber) -> bool {
        self.visit_sequence_numbers[element.index()] == visit_seq
    }

    /// Lamp elements, in creation order; photometry buffers are parallel to
    /// this list.
    pub fn lamps(&self) -> &[ElementIndex] {
        &self.lamps
    }

    pub fn lamp_raw_distance_coefficient(&self, lamp_ordinal: usize) -> f32 {
        self.lamp_raw_distance_coefficients[lamp_ordinal]
    }

    pub fn lamp_light_spread_max_distance(&self, lamp_ordinal: usize) -> f32 {
        self.lamp_light_spread_max_distances[lamp_ordinal]
    }

    /// Drain all events accumulated since the last call, in emission order.
    pub fn take_events(&mut self) -> Vec<ElectricalEvent> {
        std::mem::take(&mut self.events)
    }

    /// Diagnostic description of an element.
    pub fn query(&self, element: ElementIndex, registry: &MaterialRegistry) -> String {
        let name = registry
            .get(self.material_ids[element.index()])
            .map(|m| m.name.as_str())
            .unwrap_or("<unknown>");

        match self.kinds[element.index()] {
            ElementKind::Engine => format!(
                "ElectricalElement: {} ({name}) EngineGroup={}",
                element.0,
                self.states[element.index()].engine().group
            ),
            ElementKind::EngineController => format!(
                "ElectricalElement: {} ({name}) EngineGroup={}",
                element.0,
                self.states[element.index()].engine_controller().group
            ),
            _ => format!("ElectricalElement: {} ({name})", element.0),
        }
    }

    // -----------------------------------------------------------------------
    // Announcements
    // -----------------------------------------------------------------------

    /// Announce the element roster for panel construction, bracketed by
    /// `AnnouncementsBegin`/`AnnouncementsEnd`, in element-index order.
    pub fn announce_elements(&mut self) {
        self.events.push(ElectricalEvent::AnnouncementsBegin);

        for index in 0..self.len() {
            let element = ElementIndex(index as u32);
            let instance = self.instance_indices[index];
            let material = self.material_ids[index];

            match self.kinds[index] {
                ElementKind::Engine => {
                    // Engines announce as engine monitors
                    let engine = self.states[index].engine();
                    self.events.push(ElectricalEvent::EngineMonitorCreated {
                        element,
                        instance,
                        material,
                        thrust_magnitude: engine.current_thrust_magnitude,
                        rpm: engine.current_rpm,
                    });
                }

                ElementKind::EngineController => {
                    self.events.push(ElectricalEvent::EngineControllerCreated {
                        element,
                        instance,
                        material,
                    });
                }

                ElementKind::Generator => {
                    // Instanced generators announce as power probes
                    if instance.is_some() {
                        self.events.push(ElectricalEvent::PowerProbeCreated {
                            element,
                            instance,
                            material,
                            kind: PowerProbeKind::Generator,
                            state: self.states[index].generator().is_producing_current.into(),
                        });
                    }
                }

                ElementKind::InteractiveSwitch => {
                    let kind = match self.interactive_switch_kinds[index]
                        .expect("interactive switch without a switch kind")
                    {
                        InteractiveSwitchKind::Push => SwitchKind::InteractivePushSwitch,
                        InteractiveSwitchKind::Toggle => SwitchKind::InteractiveToggleSwitch,
                    };
                    self.events.push(ElectricalEvent::SwitchCreated {
                        element,
                        instance,
                        material,
                        kind,
                        state: self.conducts_electricity[index].into(),
                    });
                }

                ElementKind::PowerMonitor => {
                    self.events.push(ElectricalEvent::PowerProbeCreated {
                        element,
                        instance,
                        material,
                        kind: PowerProbeKind::PowerMonitor,
                        state: self.states[index].power_monitor().is_powered.into(),
                    });
                }

                ElementKind::ShipSound => {
                    // Ship sounds announce themselves as switches
                    self.events.push(ElectricalEvent::SwitchCreated {
                        element,
                        instance,
                        material,
                        kind: SwitchKind::ShipSoundSwitch,
                        state: self.conducts_electricity[index].into(),
                    });
                }

                ElementKind::WaterPump => {
                    self.events.push(ElectricalEvent::WaterPumpCreated {
                        element,
                        instance,
                        material,
                        normalized_force: self.states[index].water_pump().current_normalized_force,
                    });
                }

                ElementKind::WaterSensingSwitch => {
                    // Instanced water-sensing switches announce as switches
                    if instance.is_some() {
                        self.events.push(ElectricalEvent::SwitchCreated {
                            element,
                            instance,
                            material,
                            kind: SwitchKind::AutomaticSwitch,
                            state: self.conducts_electricity[index].into(),
                        });
                    }
                }

                ElementKind::WatertightDoor => {
                    let door = self.states[index].watertight_door();
                    assert!(!door.is_activated);
                    self.events.push(ElectricalEvent::WatertightDoorCreated {
                        element,
                        instance,
                        material,
                        is_open: door.default_is_open,
                    });
                }

                ElementKind::Cable
                | ElementKind::EngineTransmission
                | ElementKind::Lamp
                | ElementKind::OtherSink
                | ElementKind::SmokeEmitter => {
                    // Nothing to announce for these
                }
            }
        }

        self.events.push(ElectricalEvent::AnnouncementsEnd);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Destroy an element: final state-change events per type, physics
    /// callback, deleted flag. Connections are severed separately by the
    /// structural destroy path via [`ElectricalElements::remove_connection`].
    pub fn destroy(&mut self, element: ElementIndex, physics: &mut dyn ShipPhysicsHandler) {
        let index = element.index();
        assert!(!self.is_deleted[index]);

        self.available_light[index] = 0.0;

        match self.kinds[index] {
            ElementKind::Engine => {
                let engine = self.states[index].engine();
                if engine.last_published_rpm != 0.0
                    || engine.last_published_thrust_magnitude != 0.0
                {
                    self.events.push(ElectricalEvent::EngineMonitorUpdated {
                        element,
                        thrust_magnitude: 0.0,
                        rpm: 0.0,
                    });
                }
            }

            ElementKind::EngineController => {
                self.states[index].engine_controller_mut().is_powered = false;
                self.events.push(ElectricalEvent::EngineControllerEnabled {
                    element,
                    enabled: false,
                });
            }

            ElementKind::Generator => {
                let generator = self.states[index].generator_mut();
                if generator.is_producing_current {
                    generator.is_producing_current = false;
                    if self.instance_indices[index].is_some() {
                        self.events.push(ElectricalEvent::PowerProbeToggled {
                            element,
                            state: ElectricalState::Off,
                        });
                    }
                }
            }

            ElementKind::InteractiveSwitch => {
                self.events.push(ElectricalEvent::SwitchEnabled {
                    element,
                    enabled: false,
                });
            }

            ElementKind::PowerMonitor => {
                let monitor = self.states[index].power_monitor_mut();
                if monitor.is_powered {
                    monitor.is_powered = false;
                    self.events.push(ElectricalEvent::PowerProbeToggled {
                        element,
                        state: ElectricalState::Off,
                    });
                }
            }

            ElementKind::ShipSound => {
                let sound = self.states[index].ship_sound_mut();
                if sound.is_playing {
                    sound.is_playing = false;
                    self.events.push(ElectricalEvent::ShipSoundUpdated {
                        element,
                        material: self.material_ids[index],
                        is_playing: false,
                        is_underwater: false,
                    });
                }
                self.events.push(ElectricalEvent::SwitchEnabled {
                    element,
                    enabled: false,
                });
            }

            ElementKind::WaterPump => {
                // The sink pass winds the current force down towards the new
                // zero target and publishes along the way.
                self.states[index].water_pump_mut().target_normalized_force = 0.0;
                self.events.push(ElectricalEvent::WaterPumpEnabled {
                    element,
                    enabled: false,
                });
            }

            ElementKind::WaterSensingSwitch => {
                if self.instance_indices[index].is_some() {
                    self.events.push(ElectricalEvent::SwitchEnabled {
                        element,
                        enabled: false,
                    });
                }
            }

            ElementKind::WatertightDoor => {
                let door = self.states[index].watertight_door_mut();
                if door.is_activated {
                    door.is_activated = false;
                    let is_open = door.is_open();
                    physics.handle_watertight_door_updated(self.point_indices[index], is_open);
                    self.events
                        .push(ElectricalEvent::WatertightDoorUpdated { element, is_open });
                }
                self.events.push(ElectricalEvent::WatertightDoorEnabled {
                    element,
                    enabled: false,
                });
            }

            ElementKind::Cable
            | ElementKind::EngineTransmission
            | ElementKind::Lamp
            | ElementKind::OtherSink
            | ElementKind::SmokeEmitter => {}
        }

        physics.handle_electrical_element_destroy(element);

        self.structure_changed = true;
        self.power_severed = true;

        self.is_deleted[index] = true;
    }

    /// Restore a destroyed element: reset its state machine where one
    /// exists and re-enable its panel controls.
    pub fn restore(&mut self, element: ElementIndex, physics: &mut dyn ShipPhysicsHandler) {
        let index = element.index();
        assert!(self.is_deleted[index]);

        self.is_deleted[index] = false;

        match self.kinds[index] {
            ElementKind::Engine => {
                self.states[index].engine_mut().reset();
            }

            ElementKind::EngineController => {
                self.events.push(ElectricalEvent::EngineControllerEnabled {
                    element,
                    enabled: true,
                });
            }

            ElementKind::Generator => {
                // The next source pass that powers this generator announces
                // the transition itself.
                assert!(!self.states[index].generator().is_producing_current);
            }

            ElementKind::Lamp => {
                self.states[index].lamp_mut().reset();
            }

            ElementKind::InteractiveSwitch => {
                self.events.push(ElectricalEvent::SwitchEnabled {
                    element,
                    enabled: true,
                });
            }

            ElementKind::PowerMonitor => {
                assert!(!self.states[index].power_monitor().is_powered);
            }

            ElementKind::ShipSound => {
                self.events.push(ElectricalEvent::SwitchEnabled {
                    element,
                    enabled: true,
                });
                assert!(!self.states[index].ship_sound().is_playing);
            }

            ElementKind::WaterPump => {
                self.events.push(ElectricalEvent::WaterPumpEnabled {
                    element,
                    enabled: true,
                });
                assert_eq!(self.states[index].water_pump().target_normalized_force, 0.0);
            }

            ElementKind::WaterSensingSwitch => {
                if self.instance_indices[index].is_some() {
                    self.events.push(ElectricalEvent::SwitchEnabled {
                        element,
                        enabled: true,
                    });
                }
            }

            ElementKind::WatertightDoor => {
                self.events.push(ElectricalEvent::WatertightDoorEnabled {
                    element,
                    enabled: true,
                });
                assert!(!self.states[index].watertight_door().is_activated);
            }

            ElementKind::Cable | ElementKind::EngineTransmission | ElementKind::OtherSink
            | ElementKind::SmokeEmitter => {}
        }

        physics.handle_electrical_element_restore(element);

        self.structure_changed = true;
    }

    /// An electric spark hit the element: open a random disable (or, for
    /// engines, super-electrification) window.
    pub fn on_electric_spark(
        &mut self,
        element: ElementIndex,
        current_sim_time: f32,
        rng: &mut SimRng,
    ) {
        let index = element.index();
        match self.kinds[index] {
            ElementKind::Engine => {
                self.states[index].engine_mut().super_electrification_until =
                    Some(current_sim_time + rng.uniform(7.0, 15.0));
            }

            ElementKind::Generator => {
                self.states[index].generator_mut().disabled_until =
                    Some(current_sim_time + rng.uniform(15.0, 30.0));
            }

            ElementKind::Lamp => {
                self.states[index].lamp_mut().disabled_until =
                    Some(current_sim_time + rng.uniform(4.0, 8.0));
                self.power_severed = true;
            }

            _ => {
                // Everything else goes dark through its generators.
            }
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Move an engine controller's telegraph.
    pub fn set_engine_controller_state(&mut self, element: ElementIndex, telegraph_value: i32) {
        let controller = self.states[element.index()].engine_controller_mut();

        let half_dof = controller.telegraph_degrees_of_freedom as i32 / 2;
        assert!((-half_dof..=half_dof).contains(&telegraph_value));

        if telegraph_value != controller.telegraph_value {
            controller.telegraph_value = telegraph_value;
            self.events.push(ElectricalEvent::EngineControllerUpdated {
                element,
                telegraph_value,
            });
        }
    }

    /// Recompute parameter-derived lamp photometry; cheap no-op when the
    /// adjustments are unchanged.
    pub fn update_for_parameters(&mut self, params: &SimulationParameters) {
        if params.light_spread_adjustment != self.current_light_spread_adjustment
            || params.luminiscence_adjustment != self.current_luminiscence_adjustment
        {
            for (ordinal, &lamp) in self.lamps.iter().enumerate() {
                let max_distance = calculate_lamp_light_spread_max_distance(
                    self.material_light_spreads[lamp.index()],
                    params.light_spread_adjustment,
                );
                self.lamp_raw_distance_coefficients[ordinal] =
                    calculate_lamp_raw_distance_coefficient(
                        self.material_luminiscences[lamp.index()],
                        params.luminiscence_adjustment,
                        max_distance,
                    );
                self.lamp_light_spread_max_distances[ordinal] = max_distance;
            }

            self.current_light_spread_adjustment = params.light_spread_adjustment;
            self.current_luminiscence_adjustment = params.luminiscence_adjustment;
        }
    }

    // -----------------------------------------------------------------------
    // Per-tick driver
    // -----------------------------------------------------------------------

    /// Advance the whole subsystem by one step.
    ///
    /// `visit_seq` must be freshly advanced by the caller for this step;
    /// it is what distinguishes powered from unpowered elements until the
    /// next pass.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        current_wall_time: WallClockTime,
        current_sim_time: f32,
        visit_seq: SequenceNumber,
        points: &mut Points,
        springs: &Springs,
        ocean: &mut OceanSurface,
        physics: &mut dyn ShipPhysicsHandler,
        storm: &StormParameters,
        params: &SimulationParameters,
        rng: &mut SimRng,
    ) {
        // 1. Engine groups, only when the wiring changed
        if self.structure_changed {
            self.update_engine_conductivity(visit_seq, points, springs);
        }

        // 2. Automatic conductivity toggles (water-sensing switches)
        self.update_automatic_conductivity_toggles(
            current_sim_time,
            current_wall_time,
            points,
            params,
        );

        // 3. Sources and propagation flood. Run every step: elements change
        // state autonomously (generators get wet, switches toggle).
        self.update_sources_and_propagation(
            current_sim_time,
            current_wall_time,
            visit_seq,
            points,
            params,
        );

        // 4. Sinks; engines last so they read this step's group aggregates
        self.update_sinks(
            current_wall_time,
            current_sim_time,
            visit_seq,
            points,
            ocean,
            physics,
            storm,
            params,
            rng,
        );

        self.structure_changed = false;
    }

    // -----------------------------------------------------------------------
    // Highlights
    // -----------------------------------------------------------------------

    /// Flash the element's current state at its point.
    pub(crate) fn highlight_element(
        &mut self,
        element: ElementIndex,
        points: &mut Points,
        now: WallClockTime,
    ) {
        let index = element.index();
        let state = match self.kinds[index] {
            ElementKind::Engine => {
                if self.states[index].engine().last_highlighted_rpm != 0.0 {
                    HighlightState::EngineOn
                } else {
                    HighlightState::EngineOff
                }
            }
            ElementKind::Generator => {
                if self.states[index].generator().is_producing_current {
                    HighlightState::PowerOn
                } else {
                    HighlightState::PowerOff
                }
            }
            ElementKind::InteractiveSwitch | ElementKind::WaterSensingSwitch => {
                if self.conducts_electricity[index] {
                    HighlightState::SwitchOn
                } else {
                    HighlightState::SwitchOff
                }
            }
            ElementKind::PowerMonitor => {
                if self.states[index].power_monitor().is_powered {
                    HighlightState::PowerOn
                } else {
                    HighlightState::PowerOff
                }
            }
            ElementKind::ShipSound => {
                if self.states[index].ship_sound().is_playing {
                    HighlightState::SoundOn
                } else {
                    HighlightState::SoundOff
                }
            }
            ElementKind::WaterPump => {
                if self.states[index].water_pump().target_normalized_force != 0.0 {
                    HighlightState::PumpOn
                } else {
                    HighlightState::PumpOff
                }
            }
            ElementKind::WatertightDoor => {
                if self.states[index].watertight_door().is_open() {
                    HighlightState::DoorOpen
                } else {
                    HighlightState::DoorClosed
                }
            }
            kind => panic!("element kind {kind:?} is not highlightable"),
        };

        points.start_highlight(self.point_indices[index], state, now);
    }

    /// Heat deposited by an operating element over one step.
    pub(crate) fn operating_heat(&self, element: ElementIndex, params: &SimulationParameters) -> f32 {
        self.heat_generated[element.index()]
            * params.electrical_element_heat_produced_adjustment
            * crate::params::SIMULATION_STEP_SECONDS
    }
}

impl Default for ElectricalElements {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn remove_edge(adjacency: &mut [Vec<ElementIndex>], a: ElementIndex, b: ElementIndex) {
    let pos = adjacency[a.index()]
        .iter()
        .position(|&e| e == b)
        .expect("edge not present");
    adjacency[a.index()].remove(pos);

    let pos = adjacency[b.index()]
        .iter()
        .position(|&e| e == a)
        .expect("edge not present");
    adjacency[b.index()].remove(pos);
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ElectricalMaterial, MaterialRegistryBuilder};
    use shipcircuit_core::test_utils::{PhysicsCall, RecordingShipPhysicsHandler, TestShip};

    fn registry() -> MaterialRegistry {
        let mut builder = MaterialRegistryBuilder::new();
        builder.register(ElectricalMaterial::new("generator", ElementKind::Generator));
        builder.register(ElectricalMaterial::new("cable", ElementKind::Cable));
        builder.register(ElectricalMaterial::new("lamp", ElementKind::Lamp));
        let mut switch = ElectricalMaterial::new("switch", ElementKind::InteractiveSwitch);
        switch.conducts_electricity = false;
        builder.register(switch);
        builder.register(ElectricalMaterial::new("pump", ElementKind::WaterPump));
        builder.build().unwrap()
    }

    #[test]
    fn add_assigns_dense_indices_and_roles() {
        let registry = registry();
        let ship = TestShip::chain(3);
        let mut elements = ElectricalElements::new();

        let generator = elements.add(
            ship.point_indices[0],
            None,
            registry.material_id("generator").unwrap(),
            &registry,
            &ship.points,
        );
        let cable = elements.add(
            ship.point_indices[1],
            None,
            registry.material_id("cable").unwrap(),
            &registry,
            &ship.points,
        );
        let lamp = elements.add(
            ship.point_indices[2],
            None,
            registry.material_id("lamp").unwrap(),
            &registry,
            &ship.points,
        );

        assert_eq!(generator, ElementIndex(0));
        assert_eq!(cable, ElementIndex(1));
        assert_eq!(lamp, ElementIndex(2));
        assert_eq!(elements.len(), 3);
        assert_eq!(elements.kind(generator), ElementKind::Generator);
        assert_eq!(elements.lamps(), &[lamp]);
        assert!(!elements.is_deleted(cable));
    }

    #[test]
    fn connections_are_symmetric_and_follow_conductivity() {
        let registry = registry();
        let ship = TestShip::chain(3);
        let mut elements = ElectricalElements::new();

        let generator = elements.add(
            ship.point_indices[0],
            None,
            registry.material_id("generator").unwrap(),
            &registry,
            &ship.points,
        );
        let switch = elements.add(
            ship.point_indices[1],
            None,
            registry.material_id("switch").unwrap(),
            &registry,
            &ship.points,
        );
        let cable = elements.add(
            ship.point_indices[2],
            None,
            registry.material_id("cable").unwrap(),
            &registry,
            &ship.points,
        );

        elements.add_connection(generator, switch);
        elements.add_connection(generator, cable);

        // Both edges exist in the all-connected graph
        assert_eq!(elements.connected_elements(generator), &[switch, cable]);
        assert_eq!(elements.connected_elements(switch), &[generator]);

        // Only the edge whose both endpoints conduct is conducting
        assert_eq!(elements.conducting_connected_elements(generator), &[cable]);
        assert!(elements.conducting_connected_elements(switch).is_empty());

        elements.remove_connection(generator, cable);
        assert!(elements.conducting_connected_elements(generator).is_empty());
        assert_eq!(elements.connected_elements(generator), &[switch]);
    }

    #[test]
    fn announce_brackets_roster() {
        let registry = registry();
        let ship = TestShip::chain(3);
        let mut elements = ElectricalElements::new();

        elements.add(
            ship.point_indices[0],
            Some(InstanceIndex(7)),
            registry.material_id("generator").unwrap(),
            &registry,
            &ship.points,
        );
        elements.add(
            ship.point_indices[1],
            Some(InstanceIndex(8)),
            registry.material_id("switch").unwrap(),
            &registry,
            &ship.points,
        );
        // Non-instanced generators announce nothing
        elements.add(
            ship.point_indices[2],
            None,
            registry.material_id("generator").unwrap(),
            &registry,
            &ship.points,
        );

        elements.announce_elements();
        let events = elements.take_events();

        assert_eq!(events.first(), Some(&ElectricalEvent::AnnouncementsBegin));
        assert_eq!(events.last(), Some(&ElectricalEvent::AnnouncementsEnd));
        assert_eq!(events.len(), 4);

        assert!(matches!(
            events[1],
            ElectricalEvent::PowerProbeCreated {
                kind: PowerProbeKind::Generator,
                state: ElectricalState::On,
                instance: Some(InstanceIndex(7)),
                ..
            }
        ));
        assert!(matches!(
            events[2],
            ElectricalEvent::SwitchCreated {
                kind: SwitchKind::InteractiveToggleSwitch,
                state: ElectricalState::Off,
                ..
            }
        ));
    }

    #[test]
    fn destroy_and_restore_round_trip() {
        let registry = registry();
        let ship = TestShip::chain(2);
        let mut physics = RecordingShipPhysicsHandler::new();
        let mut elements = ElectricalElements::new();

        let pump = elements.add(
            ship.point_indices[0],
            Some(InstanceIndex(1)),
            registry.material_id("pump").unwrap(),
            &registry,
            &ship.points,
        );

        elements.destroy(pump, &mut physics);
        assert!(elements.is_deleted(pump));
        assert_eq!(physics.calls, vec![PhysicsCall::ElementDestroyed(pump)]);
        assert!(elements.take_events().contains(&ElectricalEvent::WaterPumpEnabled {
            element: pump,
            enabled: false
        }));

        elements.restore(pump, &mut physics);
        assert!(!elements.is_deleted(pump));
        assert_eq!(physics.calls.last(), Some(&PhysicsCall::ElementRestored(pump)));
        assert!(elements.take_events().contains(&ElectricalEvent::WaterPumpEnabled {
            element: pump,
            enabled: true
        }));
    }

    #[test]
    fn spark_windows_per_kind() {
        let registry = registry();
        let ship = TestShip::chain(2);
        let mut elements = ElectricalElements::new();
        let mut rng = SimRng::new(99);

        let generator = elements.add(
            ship.point_indices[0],
            None,
            registry.material_id("generator").unwrap(),
            &registry,
            &ship.points,
        );
        let lamp = elements.add(
            ship.point_indices[1],
            None,
            registry.material_id("lamp").unwrap(),
            &registry,
            &ship.points,
        );

        elements.on_electric_spark(generator, 100.0, &mut rng);
        let until = elements.state(generator).generator().disabled_until.unwrap();
        assert!((115.0..130.0).contains(&until));

        elements.on_electric_spark(lamp, 100.0, &mut rng);
        let until = elements.state(lamp).lamp().disabled_until.unwrap();
        assert!((104.0..108.0).contains(&until));
        assert!(elements.power_severed);
    }

    #[test]
    fn lamp_photometry_tracks_parameters() {
        let registry = registry();
        let ship = TestShip::chain(1);
        let mut elements = ElectricalElements::new();

        elements.add(
            ship.point_indices[0],
            None,
            registry.material_id("lamp").unwrap(),
            &registry,
            &ship.points,
        );

        // Material defaults: spread 2, luminiscence 1
        assert_eq!(elements.lamp_light_spread_max_distance(0), 2.5);
        assert_eq!(elements.lamp_raw_distance_coefficient(0), 1.0 / 2.5);

        let mut params = SimulationParameters::default();
        params.light_spread_adjustment = 2.0;
        params.luminiscence_adjustment = 3.0;
        elements.update_for_parameters(&params);

        assert_eq!(elements.lamp_light_spread_max_distance(0), 4.5);
        assert_eq!(elements.lamp_raw_distance_coefficient(0), 3.0 / 4.5);
    }

    #[test]
    fn query_names_material() {
        let registry = registry();
        let ship = TestShip::chain(1);
        let mut elements = ElectricalElements::new();

        let lamp = elements.add(
            ship.point_indices[0],
            None,
            registry.material_id("lamp").unwrap(),
            &registry,
            &ship.points,
        );

        assert_eq!(elements.query(lamp, &registry), "ElectricalElement: 0 (lamp)");
    }
}
