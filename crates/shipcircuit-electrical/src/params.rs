//! Tunable simulation parameters.

use serde::{Deserialize, Serialize};

/// Length of one simulation step, in seconds.
pub const SIMULATION_STEP_SECONDS: f32 = 0.02;

/// User-tunable knobs threaded through every update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Ambient air temperature, kelvin.
    pub air_temperature: f32,

    /// Multiplier on the heat electrical elements deposit at their points.
    pub electrical_element_heat_produced_adjustment: f32,

    /// Multiplier on engine thrust forces.
    pub engine_thrust_adjustment: f32,

    /// Multiplier on lamp light spread distances.
    pub light_spread_adjustment: f32,

    /// Multiplier on lamp luminiscence.
    pub luminiscence_adjustment: f32,

    /// Multiplier on the mean interval between smoke emissions.
    pub smoke_emission_density_adjustment: f32,

    /// Flash a highlight at elements when they change state.
    pub show_electrical_notifications: bool,

    /// Spawn wake bubbles behind running, submerged engines.
    pub generate_engine_wake_particles: bool,

    /// Let running engines displace the ocean surface.
    pub displace_water: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            air_temperature: 298.15,
            electrical_element_heat_produced_adjustment: 1.0,
            engine_thrust_adjustment: 1.0,
            light_spread_adjustment: 1.0,
            luminiscence_adjustment: 1.0,
            smoke_emission_density_adjustment: 1.0,
            show_electrical_notifications: true,
            generate_engine_wake_particles: true,
            displace_water: true,
        }
    }
}

/// The slice of storm state the electrical subsystem reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StormParameters {
    /// Offset applied to the ambient air temperature while a storm rages.
    pub air_temperature_delta: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_neutral() {
        let params = SimulationParameters::default();
        assert_eq!(params.engine_thrust_adjustment, 1.0);
        assert_eq!(params.light_spread_adjustment, 1.0);
        assert!(params.show_electrical_notifications);
        assert_eq!(StormParameters::default().air_temperature_delta, 0.0);
    }
}
