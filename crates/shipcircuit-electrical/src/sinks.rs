//! The per-step sink pass: everything that consumes power.
//!
//! Sinks run in creation order, each arm a small hysteresis machine keyed on
//! whether this step's propagation flood reached the element. Engines run
//! after all other sinks so they read the engine-group aggregates the
//! controllers finished writing this same step.

use crate::elements::ElectricalElements;
use crate::event::{ElectricalEvent, FlickerDuration};
use crate::material::ElementKind;
use crate::params::{SimulationParameters, StormParameters, SIMULATION_STEP_SECONDS};
use crate::state::{LampState, LampStateKind};
use shipcircuit_core::hysteresis::WetnessWatermarks;
use shipcircuit_core::id::ElementIndex;
use shipcircuit_core::math::{smooth_step, Vec2};
use shipcircuit_core::ocean::OceanSurface;
use shipcircuit_core::physics::ShipPhysicsHandler;
use shipcircuit_core::points::{EphemeralParticle, Points};
use shipcircuit_core::rng::SimRng;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::time::WallClockTime;
use std::f32::consts::PI;
use std::time::Duration;

/// Lamps fail while wet above the high watermark and may re-light once dry
/// below the low one.
const LAMP_WATERMARKS: WetnessWatermarks = WetnessWatermarks::new(0.1, 0.055);

/// Threshold on current rpm above which a running engine itself conducts.
const ENGINE_CONDUCTIVITY_RPM_THRESHOLD: f32 = 0.15;

impl ElectricalElements {
    /// Run every sink's state machine, then the engines.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update_sinks(
        &mut self,
        current_wall_time: WallClockTime,
        current_sim_time: f32,
        visit_seq: SequenceNumber,
        points: &mut Points,
        ocean: &mut OceanSurface,
        physics: &mut dyn ShipPhysicsHandler,
        storm: &StormParameters,
        params: &SimulationParameters,
        rng: &mut SimRng,
    ) {
        // Group aggregates are rebuilt from this step's controllers; slot 0
        // (unassigned) stays zero.
        for group_state in self.engine_group_states.iter_mut().skip(1) {
            *group_state = Default::default();
        }

        // Smoke needs to be warmer than the air it rises through.
        let effective_augmented_air_temperature =
            params.air_temperature + storm.air_temperature_delta + 200.0;

        for i in 0..self.sinks.len() {
            let sink = self.sinks[i];
            let index = sink.index();

            let is_connected_to_power = self.is_connected_to_power(sink, visit_seq);
            let mut is_producing_heat = false;

            match self.kind(sink) {
                ElementKind::EngineController => {
                    if !self.is_deleted(sink) {
                        let temperature = points.temperature(self.point_index(sink));

                        let controller = self.states[index].engine_controller();
                        let is_powered = is_connected_to_power
                            && if controller.is_powered {
                                self.operating_temperatures[index].is_in_range(temperature)
                            } else {
                                self.operating_temperatures[index].is_back_in_range(temperature)
                            };

                        if is_powered {
                            let controller = self.states[index].engine_controller();
                            assert_ne!(controller.group, 0);

                            // RPM per notch: 0, 1/N, 1/N -> 1
                            let coeff = 1.0
                                / (controller.telegraph_degrees_of_freedom / 2 - 1) as f32;

                            let abs_telegraph = controller.telegraph_value.unsigned_abs();
                            let controller_rpm = match abs_telegraph {
                                0 => 0.0,
                                1 => coeff,
                                v => (v - 1) as f32 * coeff,
                            };

                            // Thrust per notch: 0, 0, 1/N -> 1, signed
                            let controller_thrust = if controller.telegraph_value > 1 {
                                (controller.telegraph_value - 1) as f32 * coeff
                            } else if controller.telegraph_value < -1 {
                                (controller.telegraph_value + 1) as f32 * coeff
                            } else {
                                0.0
                            };

                            let group = controller.group as usize;
                            let group_state = &mut self.engine_group_states[group];
                            group_state.group_rpm = group_state.group_rpm.max(controller_rpm);
                            group_state.group_thrust_magnitude += controller_thrust;
                        }

                        self.states[index].engine_controller_mut().is_powered = is_powered;
                    }
                }

                ElementKind::Lamp => {
                    if !self.is_deleted(sink) {
                        self.run_lamp_state_machine(
                            is_connected_to_power,
                            sink,
                            current_wall_time,
                            current_sim_time,
                            points,
                            rng,
                        );

                        is_producing_heat = self.available_light[index] > 0.0;
                    }
                }

                ElementKind::OtherSink => {
                    if !self.is_deleted(sink) {
                        let temperature = points.temperature(self.point_index(sink));

                        let state = self.states[index].other_sink_mut();
                        if state.is_powered {
                            if !is_connected_to_power
                                || !self.operating_temperatures[index].is_in_range(temperature)
                            {
                                state.is_powered = false;
                            }
                        } else if is_connected_to_power
                            && self.operating_temperatures[index].is_back_in_range(temperature)
                        {
                            state.is_powered = true;
                        }

                        is_producing_heat = state.is_powered;
                    }
                }

                ElementKind::PowerMonitor => {
                    if !self.is_deleted(sink) {
                        let state = self.states[index].power_monitor_mut();
                        if state.is_powered != is_connected_to_power {
                            state.is_powered = is_connected_to_power;
                            self.events.push(ElectricalEvent::PowerProbeToggled {
                                element: sink,
                                state: is_connected_to_power.into(),
                            });
                            if params.show_electrical_notifications {
                                self.highlight_element(sink, points, current_wall_time);
                            }
                        }
                    }
                }

                ElementKind::ShipSound => {
                    if !self.is_deleted(sink) {
                        self.update_ship_sound(
                            sink,
                            is_connected_to_power,
                            points,
                            ocean,
                            params,
                            current_wall_time,
                        );
                    }
                }

                ElementKind::SmokeEmitter => {
                    if !self.is_deleted(sink) {
                        self.update_smoke_emitter(
                            sink,
                            is_connected_to_power,
                            current_sim_time,
                            effective_augmented_air_temperature,
                            points,
                            params,
                            rng,
                        );
                    }
                }

                ElementKind::WaterPump => {
                    is_producing_heat = self.update_water_pump(
                        sink,
                        is_connected_to_power,
                        points,
                        params,
                        current_wall_time,
                    );
                }

                ElementKind::WatertightDoor => {
                    if !self.is_deleted(sink) {
                        self.update_watertight_door(
                            sink,
                            is_connected_to_power,
                            points,
                            physics,
                            params,
                            current_wall_time,
                        );
                    }
                }

                kind => unreachable!("{kind:?} is not a sink"),
            }

            if is_producing_heat {
                let heat = self.operating_heat(sink, params);
                points.add_heat(self.point_index(sink), heat);
            }
        }

        self.update_engines(
            current_wall_time,
            current_sim_time,
            points,
            ocean,
            params,
            rng,
        );

        // Whatever severing happened this step, the lamps have now seen it
        self.power_severed = false;
    }

    // -----------------------------------------------------------------------
    // Ship sounds
    // -----------------------------------------------------------------------

    fn update_ship_sound(
        &mut self,
        sink: ElementIndex,
        is_connected_to_power: bool,
        points: &mut Points,
        ocean: &mut OceanSurface,
        params: &SimulationParameters,
        current_wall_time: WallClockTime,
    ) {
        let index = sink.index();
        let point = self.point_index(sink);
        let state = *self.states[index].ship_sound();

        if state.is_playing {
            if (!state.is_self_powered && !is_connected_to_power)
                || !self.conducts_electricity[index]
            {
                self.states[index].ship_sound_mut().is_playing = false;

                self.events.push(ElectricalEvent::ShipSoundUpdated {
                    element: sink,
                    material: self.material_id(sink),
                    is_playing: false,
                    is_underwater: false,
                });

                if params.show_electrical_notifications {
                    self.highlight_element(sink, points, current_wall_time);
                }
            }
        } else if (state.is_self_powered || is_connected_to_power)
            && self.conducts_electricity[index]
        {
            self.states[index].ship_sound_mut().is_playing = true;

            self.events.push(ElectricalEvent::ShipSoundUpdated {
                element: sink,
                material: self.material_id(sink),
                is_playing: true,
                is_underwater: points.is_cached_underwater(point),
            });

            // Loud sounds shake the water
            let sound_kind = self.ship_sound_kinds[index].expect("ship sound without a kind");
            if let Some(duration) = sound_kind.ocean_disturbance() {
                ocean.disturb(duration);
            }

            if params.show_electrical_notifications {
                self.highlight_element(sink, points, current_wall_time);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Smoke emitters
    // -----------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn update_smoke_emitter(
        &mut self,
        sink: ElementIndex,
        is_connected_to_power: bool,
        current_sim_time: f32,
        effective_augmented_air_temperature: f32,
        points: &mut Points,
        params: &SimulationParameters,
        rng: &mut SimRng,
    ) {
        let index = sink.index();
        let point = self.point_index(sink);
        let depth = points.cached_depth(point);

        {
            let state = self.states[index].smoke_emitter_mut();
            if state.is_operating {
                if !is_connected_to_power || depth > 0.0 {
                    state.is_operating = false;
                }
            } else if is_connected_to_power && depth <= 0.0 {
                state.is_operating = true;
                state.next_emission_sim_time = 0.0;
            }
        }

        let state = self.states[index].smoke_emitter_mut();
        if state.is_operating {
            if state.next_emission_sim_time == 0.0 {
                state.next_emission_sim_time = current_sim_time
                    + rng.exponential(
                        params.smoke_emission_density_adjustment / state.emission_rate,
                    );
            }

            if current_sim_time >= state.next_emission_sim_time {
                // Smoke must be at least as warm as the (augmented) air, or
                // it would sink right back into the funnel.
                let temperature = points
                    .temperature(point)
                    .max(effective_augmented_air_temperature);

                points.spawn_particle(EphemeralParticle::Smoke {
                    position: points.position(point),
                    depth,
                    temperature,
                    spawned_at: current_sim_time,
                });

                self.states[index].smoke_emitter_mut().next_emission_sim_time = 0.0;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Water pumps
    // -----------------------------------------------------------------------

    /// Returns whether the pump is producing heat this step.
    fn update_water_pump(
        &mut self,
        sink: ElementIndex,
        is_connected_to_power: bool,
        points: &mut Points,
        params: &SimulationParameters,
        current_wall_time: WallClockTime,
    ) -> bool {
        let index = sink.index();
        let point = self.point_index(sink);
        let mut is_producing_heat = false;

        // Target force hysteresis, skipped once deleted
        if !self.is_deleted(sink) {
            let temperature = points.temperature(point);
            let target = self.states[index].water_pump().target_normalized_force;

            if target != 0.0 {
                if !is_connected_to_power
                    || !self.operating_temperatures[index].is_in_range(temperature)
                {
                    self.states[index].water_pump_mut().target_normalized_force = 0.0;
                    if params.show_electrical_notifications {
                        self.highlight_element(sink, points, current_wall_time);
                    }
                } else {
                    is_producing_heat = true;
                }
            } else if is_connected_to_power
                && self.operating_temperatures[index].is_back_in_range(temperature)
            {
                self.states[index].water_pump_mut().target_normalized_force = 1.0;
                is_producing_heat = true;
                if params.show_electrical_notifications {
                    self.highlight_element(sink, points, current_wall_time);
                }
            }
        }

        // Force convergence runs even when deleted: winding down is part of
        // the state machine.
        let state = self.states[index].water_pump_mut();
        state.current_normalized_force +=
            (state.target_normalized_force - state.current_normalized_force) * 0.03;
        if (state.current_normalized_force - state.target_normalized_force).abs() < 0.001 {
            state.current_normalized_force = state.target_normalized_force;
        }

        let force = state.current_normalized_force * state.nominal_force;
        points.set_water_pump_force(point, force);

        if state.current_normalized_force != state.last_published_normalized_force {
            let normalized_force = state.current_normalized_force;
            state.last_published_normalized_force = normalized_force;
            self.events.push(ElectricalEvent::WaterPumpUpdated {
                element: sink,
                normalized_force,
            });
        }

        is_producing_heat
    }

    // -----------------------------------------------------------------------
    // Watertight doors
    // -----------------------------------------------------------------------

    fn update_watertight_door(
        &mut self,
        sink: ElementIndex,
        is_connected_to_power: bool,
        points: &mut Points,
        physics: &mut dyn ShipPhysicsHandler,
        params: &SimulationParameters,
        current_wall_time: WallClockTime,
    ) {
        let index = sink.index();
        let point = self.point_index(sink);
        let temperature = points.temperature(point);

        let state = self.states[index].watertight_door_mut();
        let mut has_state_changed = false;
        if state.is_activated {
            if !is_connected_to_power
                || !self.operating_temperatures[index].is_in_range(temperature)
            {
                state.is_activated = false;
                has_state_changed = true;
            }
        } else if is_connected_to_power
            && self.operating_temperatures[index].is_back_in_range(temperature)
        {
            state.is_activated = true;
            has_state_changed = true;
        }

        if has_state_changed {
            let is_open = state.is_open();

            // The structure reacts first (water starts or stops flowing),
            // then observers hear about it.
            physics.handle_watertight_door_updated(point, is_open);
            self.events
                .push(ElectricalEvent::WatertightDoorUpdated { element: sink, is_open });

            if params.show_electrical_notifications {
                self.highlight_element(sink, points, current_wall_time);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Engines
    // -----------------------------------------------------------------------

    fn update_engines(
        &mut self,
        current_wall_time: WallClockTime,
        current_sim_time: f32,
        points: &mut Points,
        ocean: &mut OceanSurface,
        params: &SimulationParameters,
        rng: &mut SimRng,
    ) {
        for i in 0..self.engines.len() {
            let engine = self.engines[i];
            let index = engine.index();
            if self.is_deleted(engine) {
                continue;
            }

            let point = self.point_index(engine);
            let position = points.position(point);

            {
                let state = self.states[index].engine_mut();
                if let Some(end) = state.super_electrification_until {
                    if current_sim_time >= end {
                        state.super_electrification_until = None;
                    }
                }
            }

            let state = self.states[index].engine().clone();

            // Thrust direction: the cached clockwise rotation applied to the
            // current engine->reference direction. With no reference point
            // the direction degenerates to zero and so does the thrust.
            let engine_to_reference = match state.reference_point {
                Some(reference) => (points.position(reference) - position).normalize(),
                None => Vec2::ZERO,
            };
            let thrust_dir = Vec2::new(
                state.reference_cw_angle_cos * engine_to_reference.x
                    + state.reference_cw_angle_sin * engine_to_reference.y,
                -state.reference_cw_angle_sin * engine_to_reference.x
                    + state.reference_cw_angle_cos * engine_to_reference.y,
            );

            // Power multiplier: super-electrification boosts, water chokes
            // with a logistic falloff
            let mut power_multiplier = if state.super_electrification_until.is_some() {
                4.0
            } else {
                1.0
            };
            let water = points.water(point);
            if water != 0.0 {
                let exp_coeff = (-water * 0.5 + 5.0).exp();
                power_multiplier *= exp_coeff / (5.0 + exp_coeff);
            }

            let group_state = self.engine_group_states[state.group as usize];
            let target_rpm = group_state.group_rpm;
            let target_thrust_magnitude = group_state.group_thrust_magnitude;

            // Converge towards the group targets via responsiveness
            let effective_target_rpm = target_rpm * power_multiplier;
            let mut current_rpm =
                state.current_rpm + (effective_target_rpm - state.current_rpm) * state.responsiveness;
            if (effective_target_rpm - current_rpm).abs() < 0.001 {
                current_rpm = effective_target_rpm;
            }

            let effective_target_thrust = target_thrust_magnitude * power_multiplier;
            let mut current_thrust_magnitude = state.current_thrust_magnitude
                + (effective_target_thrust - state.current_thrust_magnitude) * state.responsiveness;
            if (effective_target_thrust - current_thrust_magnitude).abs() < 0.001 {
                current_thrust_magnitude = effective_target_thrust;
            }

            let thrust_force = thrust_dir
                * current_thrust_magnitude
                * state.thrust_capacity
                * params.engine_thrust_adjustment;
            points.add_static_force(point, thrust_force);

            // Publish and store back
            let publish = current_thrust_magnitude != state.last_published_thrust_magnitude
                || current_rpm != state.last_published_rpm;
            {
                let state = self.states[index].engine_mut();
                state.current_rpm = current_rpm;
                state.current_thrust_magnitude = current_thrust_magnitude;
                if publish {
                    state.last_published_rpm = current_rpm;
                    state.last_published_thrust_magnitude = current_thrust_magnitude;
                }
            }
            if publish {
                self.events.push(ElectricalEvent::EngineMonitorUpdated {
                    element: engine,
                    thrust_magnitude: current_thrust_magnitude,
                    rpm: current_rpm,
                });
            }

            // Highlight only when the group target crosses zero, not on
            // every convergence step
            if params.show_electrical_notifications {
                let last_highlighted_rpm = self.states[index].engine().last_highlighted_rpm;
                if (target_rpm != 0.0 && last_highlighted_rpm == 0.0)
                    || (target_rpm == 0.0 && last_highlighted_rpm != 0.0)
                {
                    self.states[index].engine_mut().last_highlighted_rpm = target_rpm;
                    self.highlight_element(engine, points, current_wall_time);
                }
            }

            // Heat scales with how fast the engine is actually turning
            let heat = self.heat_for_engine(engine, current_rpm, params);
            points.add_heat(point, heat);

            // Wake and surface displacement while thrusting underwater
            let abs_thrust_magnitude = current_thrust_magnitude.abs();
            let depth = points.cached_depth(point);
            if abs_thrust_magnitude > 0.1 && depth > 0.0 {
                if params.generate_engine_wake_particles {
                    let half_fan_out_angle = PI / 14.0;
                    for _ in 0..(abs_thrust_magnitude * 4.0).round() as u32 {
                        let angle = (0.15 * rng.normal())
                            .clamp(-half_fan_out_angle, half_fan_out_angle);

                        let velocity = -thrust_dir.rotate(angle)
                            * (if current_thrust_magnitude < 0.0 { -1.0 } else { 1.0 })
                            * 20.0;

                        points.spawn_particle(EphemeralParticle::WakeBubble {
                            position,
                            velocity,
                            depth,
                            spawned_at: current_sim_time,
                        });
                    }
                }

                if params.displace_water {
                    // Displace where the thrust pushes the water, not at the
                    // engine itself
                    let offsetted_position = position
                        + -thrust_force * (SIMULATION_STEP_SECONDS * SIMULATION_STEP_SECONDS * 0.025);
                    let offsetted_depth = ocean.depth_at(offsetted_position);

                    // Keep the displacement oscillating so waves don't build up
                    let sine_perturbation = (current_sim_time * 2.5).sin();

                    let max_depth = 10.0;
                    let displacement_amount = 4.0
                        * abs_thrust_magnitude
                        * (1.0 + sine_perturbation)
                        / 2.0
                        * (1.0
                            - (2.0 * smooth_step(0.0, 2.0 * max_depth, offsetted_depth)).min(1.0));

                    ocean.displace_at(offsetted_position.x, displacement_amount);
                }
            }

            // A turning engine conducts through its own body
            self.internal_change_conductivity(
                engine,
                current_rpm > ENGINE_CONDUCTIVITY_RPM_THRESHOLD,
            );
        }
    }

    fn heat_for_engine(
        &self,
        engine: ElementIndex,
        current_rpm: f32,
        params: &SimulationParameters,
    ) -> f32 {
        self.operating_heat(engine, params) * current_rpm
    }

    // -----------------------------------------------------------------------
    // Lamps
    // -----------------------------------------------------------------------

    /// The lamp flicker state machine.
    ///
    /// A lamp that loses power in the same step some source stopped
    /// producing flickers out through one of two randomly chosen patterns;
    /// a lamp that merely finds itself unpowered goes dark immediately.
    pub(crate) fn run_lamp_state_machine(
        &mut self,
        is_connected_to_power: bool,
        lamp: ElementIndex,
        current_wall_time: WallClockTime,
        current_sim_time: f32,
        points: &Points,
        rng: &mut SimRng,
    ) {
        let index = lamp.index();
        let point = self.point_index(lamp);
        let temperature = points.temperature(point);

        {
            let state = self.states[index].lamp_mut();
            if let Some(end) = state.disabled_until {
                if current_sim_time >= end {
                    state.disabled_until = None;
                }
            }
        }

        match self.states[index].lamp().state {
            LampStateKind::Initial => {
                let state = self.states[index].lamp_mut();
                if (is_connected_to_power || state.is_self_powered)
                    && self.operating_temperatures[index].is_in_range(temperature)
                    && state.disabled_until.is_none()
                {
                    self.available_light[index] = 1.0;
                    state.state = LampStateKind::LightOn;
                    state.next_wet_failure_check = current_wall_time + Duration::from_secs(1);
                } else {
                    self.available_light[index] = 0.0;
                    state.state = LampStateKind::LightOff;
                }
            }

            LampStateKind::LightOn => {
                // Short-circuit order matters here: the wet-failure check
                // draws from the rng, and only runs for a lamp that still
                // has power and is actually wet.
                let is_self_powered = self.states[index].lamp().is_self_powered;
                let goes_dark = (!is_connected_to_power && !is_self_powered)
                    || (points.is_wet(point, LAMP_WATERMARKS.high)
                        && self.states[index]
                            .lamp_mut()
                            .check_wet_failure(current_wall_time, rng))
                    || !self.operating_temperatures[index].is_in_range(temperature)
                    || self.states[index].lamp().disabled_until.is_some();

                if goes_dark {
                    self.available_light[index] = 0.0;

                    let state = self.states[index].lamp_mut();
                    if self.power_severed {
                        // Power was cut somewhere this very step: flicker out
                        state.flicker_counter = 0;
                        state.next_flicker_transition =
                            current_wall_time + LampState::FLICKER_START_INTERVAL;
                        state.state = if rng.choose(2) == 0 {
                            LampStateKind::FlickerA
                        } else {
                            LampStateKind::FlickerB
                        };
                    } else {
                        state.state = LampStateKind::LightOff;
                    }
                }
            }

            LampStateKind::FlickerA => {
                // on-off-on-off, then dark
                if self.lamp_may_relight(lamp, is_connected_to_power, temperature, points) {
                    self.available_light[index] = 1.0;
                    self.states[index].lamp_mut().state = LampStateKind::LightOn;
                } else if current_wall_time
                    > self.states[index].lamp().next_flicker_transition
                {
                    let is_underwater = points.is_cached_underwater(point);
                    let state = self.states[index].lamp_mut();
                    state.flicker_counter += 1;
                    match state.flicker_counter {
                        1 | 3 => {
                            self.available_light[index] = 1.0;
                            state.next_flicker_transition =
                                current_wall_time + LampState::FLICKER_A_INTERVAL;
                            self.events.push(ElectricalEvent::LightFlicker {
                                duration: FlickerDuration::Short,
                                is_underwater,
                            });
                        }
                        2 => {
                            self.available_light[index] = 0.0;
                            state.next_flicker_transition =
                                current_wall_time + LampState::FLICKER_A_INTERVAL;
                        }
                        _ => {
                            debug_assert_eq!(state.flicker_counter, 4);
                            self.available_light[index] = 0.0;
                            state.state = LampStateKind::LightOff;
                        }
                    }
                }
            }

            LampStateKind::FlickerB => {
                // on-off-on(long)-off-on-off, then dark
                if self.lamp_may_relight(lamp, is_connected_to_power, temperature, points) {
                    self.available_light[index] = 1.0;
                    self.states[index].lamp_mut().state = LampStateKind::LightOn;
                } else if current_wall_time
                    > self.states[index].lamp().next_flicker_transition
                {
                    let is_underwater = points.is_cached_underwater(point);
                    let state = self.states[index].lamp_mut();
                    state.flicker_counter += 1;
                    match state.flicker_counter {
                        1 | 5 => {
                            self.available_light[index] = 1.0;
                            state.next_flicker_transition =
                                current_wall_time + LampState::FLICKER_B_INTERVAL;
                            self.events.push(ElectricalEvent::LightFlicker {
                                duration: FlickerDuration::Short,
                                is_underwater,
                            });
                        }
                        2 | 4 => {
                            self.available_light[index] = 0.0;
                            state.next_flicker_transition =
                                current_wall_time + LampState::FLICKER_B_INTERVAL;
                        }
                        3 => {
                            self.available_light[index] = 1.0;
                            state.next_flicker_transition =
                                current_wall_time + 2 * LampState::FLICKER_B_INTERVAL;
                            self.events.push(ElectricalEvent::LightFlicker {
                                duration: FlickerDuration::Long,
                                is_underwater,
                            });
                        }
                        _ => {
                            debug_assert_eq!(state.flicker_counter, 6);
                            self.available_light[index] = 0.0;
                            state.state = LampStateKind::LightOff;
                        }
                    }
                }
            }

            LampStateKind::LightOff => {
                debug_assert_eq!(self.available_light[index], 0.0);

                if self.lamp_may_relight(lamp, is_connected_to_power, temperature, points) {
                    self.available_light[index] = 1.0;

                    // Light-on sound
                    self.events.push(ElectricalEvent::LightFlicker {
                        duration: FlickerDuration::Short,
                        is_underwater: points.is_cached_underwater(point),
                    });

                    self.states[index].lamp_mut().state = LampStateKind::LightOn;
                }
            }
        }
    }

    fn lamp_may_relight(
        &self,
        lamp: ElementIndex,
        is_connected_to_power: bool,
        temperature: f32,
        points: &Points,
    ) -> bool {
        let index = lamp.index();
        let state = self.states[index].lamp();
        (is_connected_to_power || state.is_self_powered)
            && !points.is_wet(self.point_index(lamp), LAMP_WATERMARKS.low)
            && self.operating_temperatures[index].is_back_in_range(temperature)
            && state.disabled_until.is_none()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
