//! Integration test: a basic lighting circuit.
//!
//! A generator feeds a lamp through an interactive switch. Exercises the
//! panel announcement roster, power propagation through the conducting
//! graph, switch toggling, and the lamp's immediate-dark versus
//! flicker-out behavior depending on whether power was severed.

use shipcircuit_core::id::InstanceIndex;
use shipcircuit_core::rng::SimRng;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::test_utils::{RecordingShipPhysicsHandler, TestShip};
use shipcircuit_core::time::WallClockTime;
use shipcircuit_electrical::elements::ElectricalElements;
use shipcircuit_electrical::event::{ElectricalEvent, ElectricalState, SwitchKind};
use shipcircuit_electrical::material::{
    ElectricalMaterial, ElementKind, MaterialRegistry, MaterialRegistryBuilder,
};
use shipcircuit_electrical::params::{
    SimulationParameters, StormParameters, SIMULATION_STEP_SECONDS,
};
use std::time::Duration;

fn registry() -> MaterialRegistry {
    let mut builder = MaterialRegistryBuilder::new();
    builder.register(ElectricalMaterial::new("generator", ElementKind::Generator));
    builder.register(ElectricalMaterial::new(
        "switch",
        ElementKind::InteractiveSwitch,
    ));
    builder.register(ElectricalMaterial::new("lamp", ElementKind::Lamp));
    builder.build().unwrap()
}

struct Harness {
    ship: TestShip,
    elements: ElectricalElements,
    physics: RecordingShipPhysicsHandler,
    rng: SimRng,
    seq: SequenceNumber,
    sim_time: f32,
    wall_time: WallClockTime,
    params: SimulationParameters,
    storm: StormParameters,
}

impl Harness {
    fn new(point_count: usize) -> Self {
        Self {
            ship: TestShip::chain(point_count),
            elements: ElectricalElements::new(),
            physics: RecordingShipPhysicsHandler::new(),
            rng: SimRng::new(7),
            seq: SequenceNumber::NONE,
            sim_time: 0.0,
            wall_time: WallClockTime::EPOCH,
            params: SimulationParameters::default(),
            storm: StormParameters::default(),
        }
    }

    fn step(&mut self) {
        self.elements.update(
            self.wall_time,
            self.sim_time,
            self.seq.advance(),
            &mut self.ship.points,
            &self.ship.springs,
            &mut self.ship.ocean,
            &mut self.physics,
            &self.storm,
            &self.params,
            &mut self.rng,
        );
        self.sim_time += SIMULATION_STEP_SECONDS;
        self.wall_time = self.wall_time + Duration::from_millis(20);
    }
}

#[test]
fn generator_switch_lamp_end_to_end() {
    let registry = registry();
    let mut h = Harness::new(3);

    let generator = h.elements.add(
        h.ship.point_indices[0],
        Some(InstanceIndex(0)),
        registry.material_id("generator").unwrap(),
        &registry,
        &h.ship.points,
    );
    let switch = h.elements.add(
        h.ship.point_indices[1],
        Some(InstanceIndex(1)),
        registry.material_id("switch").unwrap(),
        &registry,
        &h.ship.points,
    );
    let lamp = h.elements.add(
        h.ship.point_indices[2],
        Some(InstanceIndex(2)),
        registry.material_id("lamp").unwrap(),
        &registry,
        &h.ship.points,
    );
    h.elements.add_connection(generator, switch);
    h.elements.add_connection(switch, lamp);

    // The roster announcement brackets the instanced elements.
    h.elements.announce_elements();
    let events = h.elements.take_events();
    assert_eq!(events.first(), Some(&ElectricalEvent::AnnouncementsBegin));
    assert_eq!(events.last(), Some(&ElectricalEvent::AnnouncementsEnd));
    assert!(events.iter().any(|e| matches!(
        e,
        ElectricalEvent::PowerProbeCreated { element, .. } if *element == generator
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        ElectricalEvent::SwitchCreated {
            element,
            kind: SwitchKind::InteractiveToggleSwitch,
            state: ElectricalState::On,
            ..
        } if *element == switch
    )));

    // First step: power reaches the lamp through the factory-on switch and
    // the lamp lights. The generator was already producing and the lamp's
    // first transition out of its initial state is silent, so no events.
    h.step();
    assert_eq!(h.elements.take_events(), vec![]);
    assert_eq!(h.elements.available_light(lamp), 1.0);

    // Switching off is a deliberate act, not a casualty: the lamp goes
    // dark immediately, with no flicker.
    h.elements.set_switch_state(
        switch,
        ElectricalState::Off,
        &mut h.ship.points,
        &h.params,
        h.wall_time,
    );
    assert_eq!(
        h.elements.take_events(),
        vec![ElectricalEvent::SwitchToggled {
            element: switch,
            state: ElectricalState::Off,
        }]
    );
    h.step();
    assert_eq!(h.elements.available_light(lamp), 0.0);
    assert_eq!(h.elements.take_events(), vec![]);

    // Back on: the lamp relights with the light-on flicker sound.
    h.elements.set_switch_state(
        switch,
        ElectricalState::On,
        &mut h.ship.points,
        &h.params,
        h.wall_time,
    );
    h.elements.take_events();
    h.step();
    assert_eq!(h.elements.available_light(lamp), 1.0);
    assert!(h
        .elements
        .take_events()
        .iter()
        .any(|e| matches!(e, ElectricalEvent::LightFlicker { .. })));
}

#[test]
fn drowned_generator_makes_the_lamp_flicker_out() {
    let registry = registry();
    let mut h = Harness::new(2);

    let generator = h.elements.add(
        h.ship.point_indices[0],
        Some(InstanceIndex(0)),
        registry.material_id("generator").unwrap(),
        &registry,
        &h.ship.points,
    );
    let lamp = h.elements.add(
        h.ship.point_indices[1],
        Some(InstanceIndex(1)),
        registry.material_id("lamp").unwrap(),
        &registry,
        &h.ship.points,
    );
    h.elements.add_connection(generator, lamp);

    h.step();
    assert_eq!(h.elements.available_light(lamp), 1.0);
    h.elements.take_events();

    // Flood the generator's point past its high watermark: power is
    // severed mid-circuit and the lamp dies theatrically.
    h.ship.points.set_water(h.ship.point_indices[0], 0.7);
    h.step();
    assert!(h.elements.take_events().contains(&ElectricalEvent::PowerProbeToggled {
        element: generator,
        state: ElectricalState::Off,
    }));

    let mut saw_flicker = false;
    let mut went_dark = false;
    for _ in 0..150 {
        h.step();
        let events = h.elements.take_events();
        saw_flicker |= events
            .iter()
            .any(|e| matches!(e, ElectricalEvent::LightFlicker { .. }));
        if h.elements.available_light(lamp) == 0.0 && saw_flicker {
            went_dark = true;
            break;
        }
    }
    assert!(saw_flicker, "lamp never flickered");
    assert!(went_dark, "lamp never settled dark");

    // Drain the point: the generator recovers below the low watermark and
    // the lamp relights.
    h.ship.points.set_water(h.ship.point_indices[0], 0.0);
    h.step();
    assert_eq!(h.elements.available_light(lamp), 1.0);
    assert!(h.elements.take_events().contains(&ElectricalEvent::PowerProbeToggled {
        element: generator,
        state: ElectricalState::On,
    }));
}

#[test]
fn two_sources_one_fails_lamp_stays_lit() {
    let registry = registry();
    let mut h = Harness::new(3);

    let generator_a = h.elements.add(
        h.ship.point_indices[0],
        Some(InstanceIndex(0)),
        registry.material_id("generator").unwrap(),
        &registry,
        &h.ship.points,
    );
    let lamp = h.elements.add(
        h.ship.point_indices[1],
        Some(InstanceIndex(1)),
        registry.material_id("lamp").unwrap(),
        &registry,
        &h.ship.points,
    );
    let generator_b = h.elements.add(
        h.ship.point_indices[2],
        Some(InstanceIndex(2)),
        registry.material_id("generator").unwrap(),
        &registry,
        &h.ship.points,
    );
    h.elements.add_connection(generator_a, lamp);
    h.elements.add_connection(lamp, generator_b);

    h.step();
    assert_eq!(h.elements.available_light(lamp), 1.0);

    // One generator drowns; the other keeps the circuit live. The lamp
    // may not even notice.
    h.ship.points.set_water(h.ship.point_indices[0], 0.7);
    for _ in 0..20 {
        h.step();
        assert_eq!(h.elements.available_light(lamp), 1.0);
    }
}
