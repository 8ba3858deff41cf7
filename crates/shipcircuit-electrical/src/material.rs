//! Electrical material definitions and the frozen material registry.
//!
//! A material describes everything immutable about an element type: whether
//! it conducts, how much heat it dissipates, lamp photometry, engine power
//! curves. Materials are registered once at ship-load time through
//! [`MaterialRegistryBuilder`] and frozen into a [`MaterialRegistry`];
//! elements copy the hot fields into their own buffers at creation so the
//! per-tick paths never touch the registry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Element kinds
// ---------------------------------------------------------------------------

/// The electrical role of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Cable,
    Engine,
    EngineController,
    EngineTransmission,
    Generator,
    InteractiveSwitch,
    Lamp,
    OtherSink,
    PowerMonitor,
    ShipSound,
    SmokeEmitter,
    WaterPump,
    WaterSensingSwitch,
    WatertightDoor,
}

/// How an interactive switch behaves in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractiveSwitchKind {
    /// Stays in the position it was put in.
    Toggle,
    /// Springs back when released.
    Push,
}

/// The sound a ship-sound element plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipSoundKind {
    Bell1,
    Bell2,
    QueenMaryHorn,
    FourFunnelLinerWhistle,
    TripodHorn,
    LakeFreighterHorn,
    ShieldhallSteamSiren,
    QueenElizabeth2Horn,
    SSRexWhistle,
    Klaxon1,
    NuclearAlarm1,
    EvacuationAlarm1,
    EvacuationAlarm2,
}

impl ShipSoundKind {
    /// How long this sound agitates the ocean surface when it starts
    /// playing; `None` for sounds too quiet to matter.
    pub fn ocean_disturbance(self) -> Option<Duration> {
        match self {
            ShipSoundKind::Bell1 | ShipSoundKind::Bell2 => None,
            ShipSoundKind::QueenMaryHorn => Some(Duration::from_millis(250)),
            ShipSoundKind::FourFunnelLinerWhistle => Some(Duration::from_millis(600)),
            ShipSoundKind::TripodHorn => Some(Duration::from_millis(500)),
            ShipSoundKind::LakeFreighterHorn => Some(Duration::from_millis(150)),
            ShipSoundKind::ShieldhallSteamSiren => Some(Duration::from_millis(550)),
            ShipSoundKind::QueenElizabeth2Horn => Some(Duration::from_millis(250)),
            ShipSoundKind::SSRexWhistle => Some(Duration::from_millis(250)),
            ShipSoundKind::Klaxon1 => Some(Duration::from_millis(100)),
            ShipSoundKind::NuclearAlarm1 => Some(Duration::from_millis(500)),
            ShipSoundKind::EvacuationAlarm1 | ShipSoundKind::EvacuationAlarm2 => {
                Some(Duration::from_millis(100))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// An electrical material definition.
///
/// Kind-specific fields are meaningful only for the matching [`ElementKind`]
/// and carry inert defaults otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricalMaterial {
    pub name: String,
    pub kind: ElementKind,

    /// Whether the element conducts at factory time. For switches this is
    /// the default position.
    pub conducts_electricity: bool,

    /// Heat deposited per second at the host point while operating.
    pub heat_generated: f32,
    pub minimum_operating_temperature: f32,
    pub maximum_operating_temperature: f32,

    // Lamps
    pub luminiscence: f32,
    pub light_spread: f32,
    /// Expected failures per minute while the lamp's point is wet.
    pub wet_failure_rate: f32,
    /// Self-powered lamps and sounds work without a connected source.
    pub is_self_powered: bool,

    // Smoke emitters
    /// Mean smoke particles emitted per second.
    pub particle_emission_rate: f32,

    // Water pumps
    /// Full-throttle pumping force; positive pumps water out.
    pub water_pump_nominal_force: f32,

    // Engines
    /// Engine power in HP.
    pub engine_power: f32,
    /// Per-tick exponential convergence factor towards the group target,
    /// in `(0, 1]`.
    pub engine_responsiveness: f32,
    /// As-designed thrust direction, CCW radians from the +x axis.
    pub engine_ccw_direction: f32,

    // Engine controllers
    /// Telegraph positions including full-astern, stop, and full-ahead;
    /// the telegraph value ranges over `[-dof/2, +dof/2]`.
    pub telegraph_degrees_of_freedom: u32,

    // Interactive switches
    pub interactive_switch_kind: InteractiveSwitchKind,

    // Ship sounds
    pub ship_sound_kind: ShipSoundKind,
}

impl ElectricalMaterial {
    /// A material of the given kind with inert defaults; callers adjust the
    /// fields that matter for their kind.
    pub fn new(name: &str, kind: ElementKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            conducts_electricity: true,
            heat_generated: 0.0,
            minimum_operating_temperature: 233.15,
            maximum_operating_temperature: 398.15,
            luminiscence: 1.0,
            light_spread: 2.0,
            wet_failure_rate: 0.0,
            is_self_powered: false,
            particle_emission_rate: 1.0,
            water_pump_nominal_force: 0.0,
            engine_power: 0.0,
            engine_responsiveness: 1.0,
            engine_ccw_direction: 0.0,
            telegraph_degrees_of_freedom: 11,
            interactive_switch_kind: InteractiveSwitchKind::Toggle,
            ship_sound_kind: ShipSoundKind::Bell1,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Identifies a material within a [`MaterialRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Builder for constructing an immutable [`MaterialRegistry`].
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct MaterialRegistryBuilder {
    materials: Vec<ElectricalMaterial>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material. Returns its ID.
    pub fn register(&mut self, material: ElectricalMaterial) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.name_to_id.insert(material.name.clone(), id);
        self.materials.push(material);
        id
    }

    /// Lookup material ID by name.
    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry, validating kind-specific
    /// constraints.
    pub fn build(self) -> Result<MaterialRegistry, MaterialRegistryError> {
        let mut seen = std::collections::HashSet::new();
        for material in &self.materials {
            if !seen.insert(material.name.as_str()) {
                return Err(MaterialRegistryError::DuplicateName(material.name.clone()));
            }

            if material.minimum_operating_temperature > material.maximum_operating_temperature {
                return Err(MaterialRegistryError::InvalidOperatingTemperatures(
                    material.name.clone(),
                ));
            }

            match material.kind {
                ElementKind::Engine => {
                    if material.engine_responsiveness <= 0.0 || material.engine_responsiveness > 1.0
                    {
                        return Err(MaterialRegistryError::InvalidResponsiveness(
                            material.name.clone(),
                        ));
                    }
                }
                ElementKind::EngineController => {
                    // Need at least stop, slow-ahead, and one powered notch.
                    if material.telegraph_degrees_of_freedom < 4 {
                        return Err(MaterialRegistryError::InvalidTelegraphDegreesOfFreedom(
                            material.name.clone(),
                        ));
                    }
                }
                ElementKind::Lamp => {
                    if material.wet_failure_rate < 0.0 {
                        return Err(MaterialRegistryError::InvalidWetFailureRate(
                            material.name.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(MaterialRegistry {
            materials: self.materials,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable material registry. Frozen after build().
#[derive(Debug)]
pub struct MaterialRegistry {
    materials: Vec<ElectricalMaterial>,
    name_to_id: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    pub fn get(&self, id: MaterialId) -> Option<&ElectricalMaterial> {
        self.materials.get(id.index())
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MaterialRegistryError {
    #[error("duplicate material name: {0}")]
    DuplicateName(String),
    #[error("material {0}: minimum operating temperature exceeds maximum")]
    InvalidOperatingTemperatures(String),
    #[error("material {0}: engine responsiveness must be in (0, 1]")]
    InvalidResponsiveness(String),
    #[error("material {0}: telegraph degrees of freedom must be at least 4")]
    InvalidTelegraphDegreesOfFreedom(String),
    #[error("material {0}: wet failure rate must be non-negative")]
    InvalidWetFailureRate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_build() {
        let mut builder = MaterialRegistryBuilder::new();
        let generator = builder.register(ElectricalMaterial::new("generator", ElementKind::Generator));
        let cable = builder.register(ElectricalMaterial::new("cable", ElementKind::Cable));
        let registry = builder.build().unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.material_id("generator"), Some(generator));
        assert_eq!(registry.get(cable).unwrap().kind, ElementKind::Cable);
        assert!(registry.material_id("nonexistent").is_none());
    }

    #[test]
    fn duplicate_name_fails() {
        let mut builder = MaterialRegistryBuilder::new();
        builder.register(ElectricalMaterial::new("lamp", ElementKind::Lamp));
        builder.register(ElectricalMaterial::new("lamp", ElementKind::Lamp));
        assert!(matches!(
            builder.build(),
            Err(MaterialRegistryError::DuplicateName(_))
        ));
    }

    #[test]
    fn inverted_temperature_range_fails() {
        let mut builder = MaterialRegistryBuilder::new();
        let mut material = ElectricalMaterial::new("backwards", ElementKind::OtherSink);
        material.minimum_operating_temperature = 400.0;
        material.maximum_operating_temperature = 300.0;
        builder.register(material);
        assert!(matches!(
            builder.build(),
            Err(MaterialRegistryError::InvalidOperatingTemperatures(_))
        ));
    }

    #[test]
    fn zero_responsiveness_fails() {
        let mut builder = MaterialRegistryBuilder::new();
        let mut material = ElectricalMaterial::new("engine", ElementKind::Engine);
        material.engine_responsiveness = 0.0;
        builder.register(material);
        assert!(matches!(
            builder.build(),
            Err(MaterialRegistryError::InvalidResponsiveness(_))
        ));
    }

    #[test]
    fn undersized_telegraph_fails() {
        let mut builder = MaterialRegistryBuilder::new();
        let mut material = ElectricalMaterial::new("telegraph", ElementKind::EngineController);
        material.telegraph_degrees_of_freedom = 2;
        builder.register(material);
        assert!(matches!(
            builder.build(),
            Err(MaterialRegistryError::InvalidTelegraphDegreesOfFreedom(_))
        ));
    }

    #[test]
    fn sound_disturbance_table() {
        assert_eq!(ShipSoundKind::Bell1.ocean_disturbance(), None);
        assert_eq!(
            ShipSoundKind::FourFunnelLinerWhistle.ocean_disturbance(),
            Some(Duration::from_millis(600))
        );
        assert_eq!(
            ShipSoundKind::Klaxon1.ocean_disturbance(),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn material_json_round_trip() {
        let mut material = ElectricalMaterial::new("main engine", ElementKind::Engine);
        material.engine_power = 3000.0;
        material.engine_responsiveness = 0.05;

        let json = serde_json::to_string(&material).unwrap();
        let restored: ElectricalMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(material, restored);
    }
}
