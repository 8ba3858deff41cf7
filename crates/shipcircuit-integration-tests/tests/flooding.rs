//! Integration test: flooding and the automatic damage-control circuit.
//!
//! A water-sensing switch sits between the generator and a bilge pump and
//! a watertight door. Flooding the switch's point cuts the circuit; the
//! pump winds down and the door swings back to its default. Draining
//! restores everything, but only after the switch's grace period.

use shipcircuit_core::id::InstanceIndex;
use shipcircuit_core::rng::SimRng;
use shipcircuit_core::seq::SequenceNumber;
use shipcircuit_core::test_utils::{PhysicsCall, RecordingShipPhysicsHandler, TestShip};
use shipcircuit_core::time::WallClockTime;
use shipcircuit_electrical::elements::ElectricalElements;
use shipcircuit_electrical::event::{ElectricalEvent, ElectricalState};
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
        "float switch",
        ElementKind::WaterSensingSwitch,
    ));
    let mut pump = ElectricalMaterial::new("bilge pump", ElementKind::WaterPump);
    pump.water_pump_nominal_force = 80.0;
    builder.register(pump);
    builder.register(ElectricalMaterial::new(
        "bulkhead door",
        ElementKind::WatertightDoor,
    ));
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
            rng: SimRng::new(3),
            seq: SequenceNumber::NONE,
            sim_time: 0.0,
            wall_time: WallClockTime::EPOCH,
            params: SimulationParameters::default(),
            storm: StormParameters::default(),
        }
    }

    fn add(
        &mut self,
        registry: &MaterialRegistry,
        point: usize,
        material: &str,
    ) -> shipcircuit_core::id::ElementIndex {
        self.elements.add(
            self.ship.point_indices[point],
            Some(InstanceIndex(point as u32)),
            registry.material_id(material).unwrap(),
            registry,
            &self.ship.points,
        )
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
fn float_switch_cuts_the_circuit_when_flooded() {
    let registry = registry();
    let mut h = Harness::new(4);

    let generator = h.add(&registry, 0, "generator");
    let float_switch = h.add(&registry, 1, "float switch");
    let pump = h.add(&registry, 2, "bilge pump");
    let door = h.add(&registry, 3, "bulkhead door");
    h.elements.add_connection(generator, float_switch);
    h.elements.add_connection(float_switch, pump);
    h.elements.add_connection(pump, door);

    // Dry ship: pump spools up, door activates (and closes, being in
    // non-hull material).
    h.step();
    assert_eq!(
        h.elements.state(pump).water_pump().target_normalized_force,
        1.0
    );
    assert!(h.elements.state(door).watertight_door().is_activated);
    assert!(h.physics.calls.contains(&PhysicsCall::WatertightDoorUpdated {
        point: h.ship.point_indices[3],
        open: false,
    }));
    h.elements.take_events();

    // Flood the float switch past its high watermark: it toggles away
    // from its factory position the same step, so the pump and door lose
    // power immediately.
    h.ship.points.set_water(h.ship.point_indices[1], 0.5);
    h.step();
    assert!(!h.elements.conducts_electricity(float_switch));
    assert!(h.elements.take_events().contains(&ElectricalEvent::SwitchToggled {
        element: float_switch,
        state: ElectricalState::Off,
    }));
    assert_eq!(
        h.elements.state(pump).water_pump().target_normalized_force,
        0.0
    );
    assert!(!h.elements.state(door).watertight_door().is_activated);
    assert_eq!(
        h.physics.calls.last(),
        Some(&PhysicsCall::WatertightDoorUpdated {
            point: h.ship.point_indices[3],
            open: true,
        })
    );
}

#[test]
fn float_switch_honors_its_grace_period() {
    let registry = registry();
    let mut h = Harness::new(3);

    let generator = h.add(&registry, 0, "generator");
    let float_switch = h.add(&registry, 1, "float switch");
    let pump = h.add(&registry, 2, "bilge pump");
    h.elements.add_connection(generator, float_switch);
    h.elements.add_connection(float_switch, pump);

    h.step();
    h.ship.points.set_water(h.ship.point_indices[1], 0.5);
    h.step();
    assert!(!h.elements.conducts_electricity(float_switch));

    // Drain right away. The switch saw water seconds ago; it refuses to
    // flip back until its grace period has run out.
    h.ship.points.set_water(h.ship.point_indices[1], 0.0);
    let graceless_steps = (3.0 / SIMULATION_STEP_SECONDS) as usize - 10;
    for _ in 0..graceless_steps {
        h.step();
        assert!(!h.elements.conducts_electricity(float_switch));
    }

    // Past the grace period it flips back and the pump restarts.
    for _ in 0..30 {
        h.step();
    }
    assert!(h.elements.conducts_electricity(float_switch));
    assert_eq!(
        h.elements.state(pump).water_pump().target_normalized_force,
        1.0
    );
}

#[test]
fn pump_force_winds_down_after_power_loss() {
    let registry = registry();
    let mut h = Harness::new(3);

    let generator = h.add(&registry, 0, "generator");
    let float_switch = h.add(&registry, 1, "float switch");
    let pump = h.add(&registry, 2, "bilge pump");
    h.elements.add_connection(generator, float_switch);
    h.elements.add_connection(float_switch, pump);

    // Let the pump reach full force.
    for _ in 0..500 {
        h.step();
    }
    assert_eq!(
        h.ship.points.water_pump_force(h.ship.point_indices[2]),
        80.0
    );

    // Cut the circuit; the force decays smoothly rather than dropping.
    h.ship.points.set_water(h.ship.point_indices[1], 0.5);
    h.step();
    let early = h.ship.points.water_pump_force(h.ship.point_indices[2]);
    assert!(early > 0.0 && early < 80.0, "force was {early}");

    for _ in 0..500 {
        h.step();
    }
    assert_eq!(h.ship.points.water_pump_force(h.ship.point_indices[2]), 0.0);
}
