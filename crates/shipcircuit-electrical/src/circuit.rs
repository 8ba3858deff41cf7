//! Conductivity, engine groups, and power propagation.
//!
//! The conducting graph is never rebuilt: every conductivity change flows
//! through [`ElectricalElements::internal_change_conductivity`], which
//! patches the conducting adjacency incrementally so that a conducting edge
//! exists exactly when the factory edge exists and both endpoints conduct.
//!
//! Engine groups, by contrast, are rebuilt from scratch whenever the wiring
//! structure changes: every engine, controller, and transmission reachable
//! from a controller over factory edges (conducting or not, a seized engine
//! still hangs off its telegraph) lands in that controller's group.

use crate::elements::{remove_edge, ElectricalElements};
use crate::event::{ElectricalEvent, ElectricalState};
use crate::material::ElementKind;
use crate::params::SimulationParameters;
use shipcircuit_core::hysteresis::WetnessWatermarks;
use shipcircuit_core::id::{ElementIndex, EngineGroupId};
use shipcircuit_core::points::Points;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::springs::Springs;
use shipcircuit_core::time::WallClockTime;
use std::collections::VecDeque;
use std::f32::consts::PI;

// ---------------------------------------------------------------------------
// Watermarks
// ---------------------------------------------------------------------------

/// Water-sensing switches trip when their point floods and release when it
/// drains.
const WATER_SENSING_SWITCH_WATERMARKS: WetnessWatermarks = WetnessWatermarks::new(0.45, 0.05);

/// Quiet period after an automatic toggle, so a sloshing waterline does not
/// chatter the switch.
const WATER_SENSING_SWITCH_GRACE_SECONDS: f32 = 3.0;

/// Generators drown more easily than they recover.
const GENERATOR_WATERMARKS: WetnessWatermarks = WetnessWatermarks::new(0.55, 0.15);

impl ElectricalElements {
    // -----------------------------------------------------------------------
    // Switching
    // -----------------------------------------------------------------------

    /// Flip a switch from the outside (player interaction).
    pub fn set_switch_state(
        &mut self,
        element: ElementIndex,
        state: ElectricalState,
        points: &mut Points,
        params: &SimulationParameters,
        now: WallClockTime,
    ) {
        self.internal_set_switch_state(element, state, points, params, now);
    }

    pub(crate) fn internal_set_switch_state(
        &mut self,
        element: ElementIndex,
        state: ElectricalState,
        points: &mut Points,
        params: &SimulationParameters,
        now: WallClockTime,
    ) {
        let index = element.index();
        let value = state == ElectricalState::On;
        if value == self.conducts_electricity[index] {
            return;
        }

        self.internal_change_conductivity(element, value);

        if self.instance_index(element).is_some() {
            self.events
                .push(ElectricalEvent::SwitchToggled { element, state });
        }

        if params.show_electrical_notifications
            && matches!(
                self.kind(element),
                ElementKind::InteractiveSwitch | ElementKind::WaterSensingSwitch
            )
        {
            self.highlight_element(element, points, now);
        }
    }

    /// The single mutation point for element conductivity. Patches the
    /// conducting adjacency on both sides of every affected factory edge.
    pub(crate) fn internal_change_conductivity(&mut self, element: ElementIndex, value: bool) {
        let index = element.index();

        if !self.conducts_electricity[index] && value {
            // Gained conductivity: conducting edges appear towards every
            // conducting factory neighbor.
            for j in 0..self.connected[index].len() {
                let other = self.connected[index][j];
                if self.conducts_electricity[other.index()] {
                    self.conducting_connected[index].push(other);
                    self.conducting_connected[other.index()].push(element);
                }
            }
        } else if self.conducts_electricity[index] && !value {
            // Lost conductivity: those same edges disappear.
            for j in 0..self.connected[index].len() {
                let other = self.connected[index][j];
                if self.conducts_electricity[other.index()] {
                    remove_edge(&mut self.conducting_connected, element, other);
                }
            }
        }

        self.conducts_electricity[index] = value;
    }

    // -----------------------------------------------------------------------
    // Engine groups
    // -----------------------------------------------------------------------

    /// Rebuild engine groups from scratch. Each non-deleted controller not
    /// yet reached this step seeds a new group and floods it over factory
    /// edges through engines, controllers, and transmissions.
    ///
    /// When the flood first reaches an engine, the element it arrived from
    /// anchors the engine's thrust frame: the factory octant of the spring
    /// between the two points recovers the as-designed direction no matter
    /// how the hull has deformed since.
    pub(crate) fn update_engine_conductivity(
        &mut self,
        visit_seq: SequenceNumber,
        points: &Points,
        springs: &Springs,
    ) {
        for i in 0..self.engines.len() {
            let engine = self.engines[i];
            self.states[engine.index()].engine_mut().group = 0;
        }

        let mut next_group: EngineGroupId = 1;
        let mut queue: VecDeque<ElementIndex> = VecDeque::new();

        for i in 0..self.engine_controllers.len() {
            let controller = self.engine_controllers[i];
            if self.is_deleted(controller) {
                continue;
            }

            {
                let state = self.states[controller.index()].engine_controller_mut();
                if state.engine_visit_seq == visit_seq {
                    // Already absorbed into an earlier controller's group
                    continue;
                }
                state.engine_visit_seq = visit_seq;
                state.group = next_group;
            }
            let group = next_group;
            next_group += 1;

            queue.clear();
            queue.push_back(controller);
            while let Some(element) = queue.pop_front() {
                for j in 0..self.connected[element.index()].len() {
                    let other = self.connected[element.index()][j];
                    if self.is_deleted(other) {
                        continue;
                    }

                    match self.kind(other) {
                        ElementKind::Engine => {
                            if self.states[other.index()].engine().engine_visit_seq != visit_seq {
                                self.assign_engine_to_group(
                                    other, element, group, visit_seq, points, springs,
                                );
                                queue.push_back(other);
                            }
                        }

                        ElementKind::EngineController => {
                            let state = self.states[other.index()].engine_controller_mut();
                            if state.engine_visit_seq != visit_seq {
                                state.engine_visit_seq = visit_seq;
                                state.group = group;
                                queue.push_back(other);
                            }
                        }

                        ElementKind::EngineTransmission => {
                            let state = self.states[other.index()].engine_transmission_mut();
                            if state.engine_visit_seq != visit_seq {
                                state.engine_visit_seq = visit_seq;
                                queue.push_back(other);
                            }
                        }

                        _ => {}
                    }
                }
            }
        }

        self.engine_group_states
            .resize(next_group as usize, Default::default());
    }

    fn assign_engine_to_group(
        &mut self,
        engine: ElementIndex,
        incoming: ElementIndex,
        group: EngineGroupId,
        visit_seq: SequenceNumber,
        points: &Points,
        springs: &Springs,
    ) {
        let reference_point = self.point_index(incoming);
        let engine_point = self.point_index(engine);

        // The spring between the engine's point and the reference point, if
        // the two elements sit on structurally adjacent points.
        let spring = points
            .connected_springs(engine_point)
            .iter()
            .find(|cs| cs.other_endpoint == reference_point)
            .map(|cs| cs.spring);

        let state = self.states[engine.index()].engine_mut();
        state.engine_visit_seq = visit_seq;
        state.group = group;

        match spring {
            Some(spring) => {
                // Factory direction engine -> reference, as a clockwise
                // angle, offset by the material's as-designed direction.
                let incoming_octant = springs.factory_endpoint_octant(spring, reference_point);
                let mut cw_angle =
                    (2.0 * PI - state.ccw_direction) - incoming_octant.opposite().to_cw_angle();
                if cw_angle < 0.0 {
                    cw_angle += 2.0 * PI;
                }
                state.reference_point = Some(reference_point);
                state.reference_cw_angle_cos = cw_angle.cos();
                state.reference_cw_angle_sin = cw_angle.sin();
            }
            None => {
                // No structural edge to anchor the thrust frame to; the
                // engine idles directionless until the wiring changes.
                state.reference_point = None;
                state.reference_cw_angle_cos = 1.0;
                state.reference_cw_angle_sin = 0.0;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Automatic conductivity toggles
    // -----------------------------------------------------------------------

    /// Water-sensing switches flip away from their factory position when
    /// their point floods and back when it drains, with a grace period
    /// between toggles.
    pub(crate) fn update_automatic_conductivity_toggles(
        &mut self,
        current_sim_time: f32,
        current_wall_time: WallClockTime,
        points: &mut Points,
        params: &SimulationParameters,
    ) {
        for i in 0..self.automatic_conductivity_toggling.len() {
            let element = self.automatic_conductivity_toggling[i];
            let index = element.index();
            if self.is_deleted(element) {
                continue;
            }

            if current_sim_time
                < self.states[index]
                    .water_sensing_switch_mut()
                    .grace_period_end_sim_time
            {
                continue;
            }

            let water = points.water(self.point_index(element));
            let conducts = self.conducts_electricity[index];
            let material_conducts = self.material_conducts_electricity[index];

            if conducts == material_conducts && WATER_SENSING_SWITCH_WATERMARKS.is_too_wet(water) {
                self.internal_set_switch_state(
                    element,
                    (!material_conducts).into(),
                    points,
                    params,
                    current_wall_time,
                );
                self.states[index]
                    .water_sensing_switch_mut()
                    .grace_period_end_sim_time =
                    current_sim_time + WATER_SENSING_SWITCH_GRACE_SECONDS;
            } else if conducts != material_conducts
                && WATER_SENSING_SWITCH_WATERMARKS.is_dry_enough(water)
            {
                self.internal_set_switch_state(
                    element,
                    material_conducts.into(),
                    points,
                    params,
                    current_wall_time,
                );
                self.states[index]
                    .water_sensing_switch_mut()
                    .grace_period_end_sim_time =
                    current_sim_time + WATER_SENSING_SWITCH_GRACE_SECONDS;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Sources and propagation
    // -----------------------------------------------------------------------

    /// Run generator hysteresis and flood power from every producing
    /// generator over the conducting graph, stamping reached elements with
    /// this step's visit sequence number.
    pub(crate) fn update_sources_and_propagation(
        &mut self,
        current_sim_time: f32,
        current_wall_time: WallClockTime,
        visit_seq: SequenceNumber,
        points: &mut Points,
        params: &SimulationParameters,
    ) {
        let mut queue: VecDeque<ElementIndex> = VecDeque::new();

        for i in 0..self.sources.len() {
            let source = self.sources[i];
            let index = source.index();
            if self.is_deleted(source) {
                continue;
            }

            let point = self.point_index(source);
            let temperature = points.temperature(point);

            {
                let generator = self.states[index].generator_mut();
                if let Some(until) = generator.disabled_until {
                    if current_sim_time >= until {
                        generator.disabled_until = None;
                    }
                }
            }

            let generator = self.states[index].generator();
            let is_disabled = generator.disabled_until.is_some();
            let was_producing = generator.is_producing_current;

            let is_producing = if was_producing {
                !GENERATOR_WATERMARKS.is_too_wet(points.water(point))
                    && self.operating_temperatures[index].is_in_range(temperature)
                    && !is_disabled
            } else {
                GENERATOR_WATERMARKS.is_dry_enough(points.water(point))
                    && self.operating_temperatures[index].is_back_in_range(temperature)
                    && !is_disabled
            };

            if is_producing != was_producing {
                self.states[index].generator_mut().is_producing_current = is_producing;

                if self.instance_index(source).is_some() {
                    self.events.push(ElectricalEvent::PowerProbeToggled {
                        element: source,
                        state: is_producing.into(),
                    });
                }
                if params.show_electrical_notifications {
                    self.highlight_element(source, points, current_wall_time);
                }

                if !is_producing {
                    // Downstream lamps flicker rather than going dark cleanly
                    self.power_severed = true;
                }
            }

            if is_producing && self.visit_sequence_numbers[index] != visit_seq {
                self.visit_sequence_numbers[index] = visit_seq;
                queue.clear();
                queue.push_back(source);
                while let Some(element) = queue.pop_front() {
                    for j in 0..self.conducting_connected[element.index()].len() {
                        let other = self.conducting_connected[element.index()][j];
                        if self.visit_sequence_numbers[other.index()] != visit_seq {
                            self.visit_sequence_numbers[other.index()] = visit_seq;
                            queue.push_back(other);
                        }
                    }
                }

                points.add_heat(point, self.operating_heat(source, params));
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
