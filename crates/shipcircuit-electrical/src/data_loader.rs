//! JSON material-pack loading.
//!
//! A material pack is a JSON array of definitions. Each entry names its
//! material and kind and overrides only the fields that matter for that
//! kind; everything else takes the inert defaults from
//! [`ElectricalMaterial::new`].

use crate::material::{
    ElectricalMaterial, ElementKind, InteractiveSwitchKind, MaterialRegistry,
    MaterialRegistryBuilder, MaterialRegistryError, ShipSoundKind,
};
use serde::Deserialize;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a material pack.
#[derive(Debug, thiserror::Error)]
pub enum MaterialLoadError {
    /// The pack was not valid JSON, or did not match the schema.
    #[error("material pack parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The pack parsed but failed registry validation.
    #[error(transparent)]
    Registry(#[from] MaterialRegistryError),
}

// ===========================================================================
// Pack schema
// ===========================================================================

/// One material definition as written in a pack file.
///
/// Only `name` and `kind` are required; absent fields keep the kind's
/// defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MaterialDefinition {
    name: String,
    kind: ElementKind,

    conducts_electricity: Option<bool>,
    heat_generated: Option<f32>,
    minimum_operating_temperature: Option<f32>,
    maximum_operating_temperature: Option<f32>,
    luminiscence: Option<f32>,
    light_spread: Option<f32>,
    wet_failure_rate: Option<f32>,
    is_self_powered: Option<bool>,
    particle_emission_rate: Option<f32>,
    water_pump_nominal_force: Option<f32>,
    engine_power: Option<f32>,
    engine_responsiveness: Option<f32>,
    engine_ccw_direction: Option<f32>,
    telegraph_degrees_of_freedom: Option<u32>,
    interactive_switch_kind: Option<InteractiveSwitchKind>,
    ship_sound_kind: Option<ShipSoundKind>,
}

impl MaterialDefinition {
    fn into_material(self) -> ElectricalMaterial {
        let mut material = ElectricalMaterial::new(&self.name, self.kind);

        if let Some(v) = self.conducts_electricity {
            material.conducts_electricity = v;
        }
        if let Some(v) = self.heat_generated {
            material.heat_generated = v;
        }
        if let Some(v) = self.minimum_operating_temperature {
            material.minimum_operating_temperature = v;
        }
        if let Some(v) = self.maximum_operating_temperature {
            material.maximum_operating_temperature = v;
        }
        if let Some(v) = self.luminiscence {
            material.luminiscence = v;
        }
        if let Some(v) = self.light_spread {
            material.light_spread = v;
        }
        if let Some(v) = self.wet_failure_rate {
            material.wet_failure_rate = v;
        }
        if let Some(v) = self.is_self_powered {
            material.is_self_powered = v;
        }
        if let Some(v) = self.particle_emission_rate {
            material.particle_emission_rate = v;
        }
        if let Some(v) = self.water_pump_nominal_force {
            material.water_pump_nominal_force = v;
        }
        if let Some(v) = self.engine_power {
            material.engine_power = v;
        }
        if let Some(v) = self.engine_responsiveness {
            material.engine_responsiveness = v;
        }
        if let Some(v) = self.engine_ccw_direction {
            material.engine_ccw_direction = v;
        }
        if let Some(v) = self.telegraph_degrees_of_freedom {
            material.telegraph_degrees_of_freedom = v;
        }
        if let Some(v) = self.interactive_switch_kind {
            material.interactive_switch_kind = v;
        }
        if let Some(v) = self.ship_sound_kind {
            material.ship_sound_kind = v;
        }

        material
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Parse a JSON material pack into a frozen registry.
pub fn load_material_pack(json: &str) -> Result<MaterialRegistry, MaterialLoadError> {
    let definitions: Vec<MaterialDefinition> = serde_json::from_str(json)?;

    let mut builder = MaterialRegistryBuilder::new();
    for definition in definitions {
        builder.register(definition.into_material());
    }

    Ok(builder.build()?)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn minimal_pack_loads_with_defaults() {
        let registry = load_material_pack(
            r#"[
                { "name": "copper cable", "kind": "Cable" },
                { "name": "cargo light", "kind": "Lamp" }
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        let lamp = registry
            .get(registry.material_id("cargo light").unwrap())
            .unwrap();
        assert_eq!(lamp.kind, ElementKind::Lamp);
        assert!(lamp.conducts_electricity);
        assert_eq!(lamp.luminiscence, 1.0);
        assert_eq!(lamp.light_spread, 2.0);
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let registry = load_material_pack(
            r#"[
                {
                    "name": "diesel engine",
                    "kind": "Engine",
                    "engine_power": 3000.0,
                    "engine_responsiveness": 0.05,
                    "heat_generated": 820.0
                },
                {
                    "name": "horn",
                    "kind": "ShipSound",
                    "is_self_powered": true,
                    "ship_sound_kind": "QueenMaryHorn"
                }
            ]"#,
        )
        .unwrap();

        let engine = registry
            .get(registry.material_id("diesel engine").unwrap())
            .unwrap();
        assert_eq!(engine.engine_power, 3000.0);
        assert_eq!(engine.engine_responsiveness, 0.05);
        assert_eq!(engine.heat_generated, 820.0);
        // Untouched fields keep the kind defaults
        assert_eq!(engine.telegraph_degrees_of_freedom, 11);

        let horn = registry.get(registry.material_id("horn").unwrap()).unwrap();
        assert!(horn.is_self_powered);
        assert_eq!(horn.ship_sound_kind, ShipSoundKind::QueenMaryHorn);
    }

    #[test]
    fn empty_pack_is_an_empty_registry() {
        let registry = load_material_pack("[]").unwrap();
        assert!(registry.is_empty());
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = load_material_pack("not json {{{");
        assert!(matches!(result, Err(MaterialLoadError::Json(_))));
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let result = load_material_pack(
            r#"[{ "name": "lamp", "kind": "Lamp", "lumens": 800 }]"#,
        );
        assert!(matches!(result, Err(MaterialLoadError::Json(_))));
    }

    #[test]
    fn missing_kind_is_a_parse_error() {
        let result = load_material_pack(r#"[{ "name": "lamp" }]"#);
        assert!(matches!(result, Err(MaterialLoadError::Json(_))));
    }

    #[test]
    fn registry_validation_errors_pass_through() {
        let result = load_material_pack(
            r#"[
                { "name": "lamp", "kind": "Lamp" },
                { "name": "lamp", "kind": "Lamp" }
            ]"#,
        );
        assert!(matches!(
            result,
            Err(MaterialLoadError::Registry(
                MaterialRegistryError::DuplicateName(_)
            ))
        ));

        let result = load_material_pack(
            r#"[{ "name": "engine", "kind": "Engine", "engine_responsiveness": 0.0 }]"#,
        );
        assert!(matches!(
            result,
            Err(MaterialLoadError::Registry(
                MaterialRegistryError::InvalidResponsiveness(_)
            ))
        ));
    }

    #[test]
    fn error_display_messages() {
        let err = load_material_pack("[").unwrap_err();
        assert!(format!("{err}").contains("parse error"));

        let err = load_material_pack(
            r#"[
                { "name": "x", "kind": "Cable" },
                { "name": "x", "kind": "Cable" }
            ]"#,
        )
        .unwrap_err();
        assert!(format!("{err}").contains("duplicate material name"));
    }
}
