//! Toggleable per-lifetime behaviour modules.
//!
//! An asset carries an ordered list of [`Module`]s. Each is a kind tag, an
//! `enabled` flag and the parameters of that kind. Every tick the stepper
//! resolves the list into a [`ModuleStack`] and applies the active modules to
//! each particle in a fixed order:
//!
//! | Step | Module | Active instances |
//! |------|--------|------------------|
//! | c | [`VelocityOverLifetime`] | all enabled, in list order |
//! | e | [`RotationOverLifetime`] | first enabled |
//! | f | [`ColorOverLifetime`] | first enabled |
//! | g | [`SizeOverLifetime`] | first enabled |
//! | h | [`NoiseModule`] | all enabled, in list order |
//! | i | [`ForceField`] | all enabled, in list order |
//! | j | [`Collision`] | all enabled with a boundary |
//!
//! # Asset Format
//!
//! ```json
//! { "type": "ForceField", "enabled": true, "field_type": "Vortex", "strength": 90.0 }
//! ```
//!
//! Missing parameters take their defaults. A module whose `type` is not
//! recognised is kept (so it survives a save) but never does anything.

mod collision;
mod color;
mod force_field;
mod noise;
mod rotation;
mod size;
mod velocity;

pub use collision::{BoundaryType, Collision, CollisionResponse};
pub use color::ColorOverLifetime;
pub use force_field::{Falloff, ForceField, ForceFieldType};
pub use noise::NoiseModule;
pub use rotation::RotationOverLifetime;
pub use size::SizeOverLifetime;
pub use velocity::VelocityOverLifetime;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lengths below this are treated as zero in directional math.
pub(crate) const DIRECTION_EPSILON: f32 = 1e-4;

/// Shared inputs for applying modules to one particle.
pub(crate) struct ModuleContext<'a> {
    /// Current emitter centre in world space.
    pub center: Vec2,
    /// Simulation time in seconds, used to scroll noise.
    pub time: f32,
    pub noise: &'a ::noise::Perlin,
}

/// One entry in an asset's module list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModule", into = "RawModule")]
pub struct Module {
    pub enabled: bool,
    pub kind: ModuleKind,
}

/// Module kind and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleKind {
    ColorOverLifetime(ColorOverLifetime),
    SizeOverLifetime(SizeOverLifetime),
    VelocityOverLifetime(VelocityOverLifetime),
    RotationOverLifetime(RotationOverLifetime),
    Noise(NoiseModule),
    Collision(Collision),
    ForceField(ForceField),
    /// Unrecognised tag. Parameters are retained verbatim and ignored.
    Unknown {
        type_name: String,
        params: Map<String, Value>,
    },
}

impl ModuleKind {
    /// Tag written to the `type` field.
    pub fn type_name(&self) -> &str {
        match self {
            ModuleKind::ColorOverLifetime(_) => "ColorOverLifetime",
            ModuleKind::SizeOverLifetime(_) => "SizeOverLifetime",
            ModuleKind::VelocityOverLifetime(_) => "VelocityOverLifetime",
            ModuleKind::RotationOverLifetime(_) => "RotationOverLifetime",
            ModuleKind::Noise(_) => "Noise",
            ModuleKind::Collision(_) => "Collision",
            ModuleKind::ForceField(_) => "ForceField",
            ModuleKind::Unknown { type_name, .. } => type_name,
        }
    }
}

impl Module {
    /// An enabled module of the given kind.
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            enabled: true,
            kind,
        }
    }

    /// Same module with `enabled` set.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether the stepper will apply this module.
    pub fn is_active(&self) -> bool {
        self.enabled && !matches!(self.kind, ModuleKind::Unknown { .. })
    }
}

macro_rules! module_from {
    ($($params:ident => $variant:ident),+ $(,)?) => {
        $(
            impl From<$params> for Module {
                fn from(params: $params) -> Self {
                    Module::new(ModuleKind::$variant(params))
                }
            }
        )+
    };
}

module_from! {
    ColorOverLifetime => ColorOverLifetime,
    SizeOverLifetime => SizeOverLifetime,
    VelocityOverLifetime => VelocityOverLifetime,
    RotationOverLifetime => RotationOverLifetime,
    NoiseModule => Noise,
    Collision => Collision,
    ForceField => ForceField,
}

fn enabled_by_default() -> bool {
    true
}

/// Wire form of a [`Module`]: the tag, the flag, and everything else.
#[derive(Serialize, Deserialize)]
struct RawModule {
    #[serde(rename = "type", default)]
    type_name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(flatten)]
    params: Map<String, Value>,
}

impl TryFrom<RawModule> for Module {
    type Error = serde_json::Error;

    fn try_from(raw: RawModule) -> Result<Self, Self::Error> {
        fn parse<T: serde::de::DeserializeOwned>(
            params: Map<String, Value>,
        ) -> serde_json::Result<T> {
            serde_json::from_value(Value::Object(params))
        }

        let kind = match raw.type_name.as_str() {
            "ColorOverLifetime" => ModuleKind::ColorOverLifetime(parse(raw.params)?),
            "SizeOverLifetime" => ModuleKind::SizeOverLifetime(parse(raw.params)?),
            "VelocityOverLifetime" => ModuleKind::VelocityOverLifetime(parse(raw.params)?),
            "RotationOverLifetime" => ModuleKind::RotationOverLifetime(parse(raw.params)?),
            "Noise" => ModuleKind::Noise(parse(raw.params)?),
            "Collision" => ModuleKind::Collision(parse(raw.params)?),
            "ForceField" => ModuleKind::ForceField(parse(raw.params)?),
            _ => {
                log::debug!("ignoring module with unknown type `{}`", raw.type_name);
                ModuleKind::Unknown {
                    type_name: raw.type_name,
                    params: raw.params,
                }
            }
        };

        Ok(Module {
            enabled: raw.enabled,
            kind,
        })
    }
}

impl From<Module> for RawModule {
    fn from(module: Module) -> Self {
        fn to_map<T: Serialize>(params: &T) -> Map<String, Value> {
            match serde_json::to_value(params) {
                Ok(Value::Object(map)) => map,
                _ => Map::new(),
            }
        }

        let type_name = module.kind.type_name().to_string();
        let params = match module.kind {
            ModuleKind::ColorOverLifetime(p) => to_map(&p),
            ModuleKind::SizeOverLifetime(p) => to_map(&p),
            ModuleKind::VelocityOverLifetime(p) => to_map(&p),
            ModuleKind::RotationOverLifetime(p) => to_map(&p),
            ModuleKind::Noise(p) => to_map(&p),
            ModuleKind::Collision(p) => to_map(&p),
            ModuleKind::ForceField(p) => to_map(&p),
            ModuleKind::Unknown { params, .. } => params,
        };

        RawModule {
            type_name,
            enabled: module.enabled,
            params,
        }
    }
}

/// The active modules of an asset, grouped by application step.
#[derive(Debug, Default)]
pub(crate) struct ModuleStack<'a> {
    pub color: Option<&'a ColorOverLifetime>,
    pub size: Option<&'a SizeOverLifetime>,
    pub rotation: Option<&'a RotationOverLifetime>,
    pub velocity: Vec<&'a VelocityOverLifetime>,
    pub noise: Vec<&'a NoiseModule>,
    pub force_fields: Vec<&'a ForceField>,
    pub collisions: Vec<&'a Collision>,
}

impl<'a> ModuleStack<'a> {
    pub fn resolve(modules: &'a [Module]) -> Self {
        let mut stack = ModuleStack::default();
        for module in modules.iter().filter(|m| m.is_active()) {
            match &module.kind {
                ModuleKind::ColorOverLifetime(p) => {
                    stack.color.get_or_insert(p);
                }
                ModuleKind::SizeOverLifetime(p) => {
                    stack.size.get_or_insert(p);
                }
                ModuleKind::RotationOverLifetime(p) => {
                    stack.rotation.get_or_insert(p);
                }
                ModuleKind::VelocityOverLifetime(p) => stack.velocity.push(p),
                ModuleKind::Noise(p) => stack.noise.push(p),
                ModuleKind::ForceField(p) => stack.force_fields.push(p),
                ModuleKind::Collision(p) => {
                    if p.boundary != BoundaryType::None {
                        stack.collisions.push(p);
                    }
                }
                ModuleKind::Unknown { .. } => {}
            }
        }
        stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_round_trip_keeps_tag_and_flag() {
        let module = Module::from(ForceField::default()).with_enabled(false);
        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["type"], "ForceField");
        assert_eq!(json["enabled"], false);

        let back: Module = serde_json::from_value(json).unwrap();
        assert_eq!(back, module);
    }

    #[test]
    fn test_missing_params_default() {
        let module: Module = serde_json::from_str(r#"{ "type": "Noise" }"#).unwrap();
        assert!(module.enabled);
        assert_eq!(module.kind, ModuleKind::Noise(NoiseModule::default()));
    }

    #[test]
    fn test_unknown_type_is_inert_but_preserved() {
        let json = r#"{ "type": "Lightning", "enabled": true, "bolts": 3 }"#;
        let module: Module = serde_json::from_str(json).unwrap();
        assert!(!module.is_active());
        assert_eq!(module.kind.type_name(), "Lightning");

        let json = serde_json::to_value(&module).unwrap();
        assert_eq!(json["bolts"], 3);
    }

    #[test]
    fn test_malformed_params_fail() {
        let result: Result<Module, _> =
            serde_json::from_str(r#"{ "type": "Noise", "strength": "loud" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_stack_takes_first_enabled_color() {
        let first = ColorOverLifetime::fade_to(0.5);
        let second = ColorOverLifetime::fade_to(0.0);
        let modules = vec![
            Module::from(ColorOverLifetime::default()).with_enabled(false),
            Module::from(first.clone()),
            Module::from(second),
        ];
        let stack = ModuleStack::resolve(&modules);
        assert_eq!(stack.color, Some(&first));
    }

    #[test]
    fn test_stack_collects_all_force_fields() {
        let modules = vec![
            Module::from(ForceField::wind(0.0, 10.0)),
            Module::from(ForceField::wind(90.0, 5.0)),
            Module::from(ForceField::default()).with_enabled(false),
        ];
        let stack = ModuleStack::resolve(&modules);
        assert_eq!(stack.force_fields.len(), 2);
    }

    #[test]
    fn test_stack_skips_collision_without_boundary() {
        let modules = vec![Module::from(Collision::default())];
        let stack = ModuleStack::resolve(&modules);
        assert!(stack.collisions.is_empty());
    }
}
