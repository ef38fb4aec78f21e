//! Declarative effect definition.
//!
//! A [`ParticleAsset`] is plain data: how many particles, how they are
//! emitted, what ranges their initial state is drawn from, which modules act
//! on them and how the host should draw them. Assets round-trip through JSON;
//! every field is optional on load and falls back to its default.
//!
//! ```json
//! {
//!   "name": "Sparks",
//!   "max_particles": 200,
//!   "emission": { "rate": 40, "shape": "Circle", "shape_params": { "radius": 8 } },
//!   "spawn": { "speed_min": 80, "speed_max": 140, "direction": 90, "spread": 60 },
//!   "gravity": [0, -200],
//!   "modules": [ { "type": "ColorOverLifetime" } ],
//!   "bursts": [ { "time": 0, "count": 30 } ]
//! }
//! ```
//!
//! # Editing
//!
//! [`ParticleAsset::with_property`] addresses any field by a dotted path
//! into the serialized form (`"emission.rate"`, `"gravity.y"`,
//! `"modules.0.enabled"`). The edited asset is validated before it is
//! returned, so a rejected edit never produces an invalid asset.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::burst::BurstConfig;
use crate::curve::{CurveKey, GradientKey};
use crate::error::{AssetError, Result};
use crate::modules::{Module, ModuleKind};
use crate::render::RenderConfig;
use crate::shape::{EmissionShape, ShapeParams};

/// Continuous emission settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    /// Particles per second.
    pub rate: f32,
    pub shape: EmissionShape,
    pub shape_params: ShapeParams,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            rate: 10.0,
            shape: EmissionShape::Point,
            shape_params: ShapeParams::default(),
        }
    }
}

/// Ranges the initial particle state is drawn from.
///
/// Each `*_min`/`*_max` pair is sampled uniformly. Angles are in degrees,
/// with 0 pointing along +X and positive turning counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Launch direction.
    pub direction: f32,
    /// Full angular spread around `direction`, `[0, 360]`.
    pub spread: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    pub rotation_min: f32,
    pub rotation_max: f32,
    /// Degrees per second.
    pub angular_velocity_min: f32,
    pub angular_velocity_max: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            lifetime_min: 1.0,
            lifetime_max: 2.0,
            speed_min: 50.0,
            speed_max: 100.0,
            direction: 90.0,
            spread: 30.0,
            scale_min: 1.0,
            scale_max: 1.0,
            rotation_min: 0.0,
            rotation_max: 0.0,
            angular_velocity_min: 0.0,
            angular_velocity_max: 0.0,
        }
    }
}

/// Complete particle effect definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleAsset {
    pub name: String,
    /// Pool capacity. Spawns beyond it are dropped.
    pub max_particles: u32,
    /// Keep emitting after `duration` and restart scheduled bursts.
    pub looping: bool,
    /// Length of one playthrough in seconds.
    pub duration: f32,
    /// Multiplier on every host-supplied delta.
    pub playback_speed: f32,
    pub emission: EmissionConfig,
    pub spawn: SpawnConfig,
    /// Constant acceleration of every particle.
    pub gravity: Vec2,
    /// Start RGB, each in `[0, 1]`.
    pub start_color: [f32; 3],
    pub start_alpha: f32,
    /// Alpha reached at end of life when no colour module is active.
    pub end_alpha: f32,
    /// Scale factor reached at end of life when no size module is active.
    pub end_scale: f32,
    pub render: RenderConfig,
    pub modules: Vec<Module>,
    pub bursts: Vec<BurstConfig>,
}

impl Default for ParticleAsset {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
            max_particles: 1000,
            looping: true,
            duration: 5.0,
            playback_speed: 1.0,
            emission: EmissionConfig::default(),
            spawn: SpawnConfig::default(),
            gravity: Vec2::ZERO,
            start_color: [1.0, 1.0, 1.0],
            start_alpha: 1.0,
            end_alpha: 0.0,
            end_scale: 1.0,
            render: RenderConfig::default(),
            modules: Vec::new(),
            bursts: Vec::new(),
        }
    }
}

impl ParticleAsset {
    /// Parse and validate an asset from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let asset: ParticleAsset = serde_json::from_str(json)?;
        asset.validate()?;
        Ok(asset)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the asset to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load and validate an asset from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn add_module(mut self, module: impl Into<Module>) -> Self {
        self.modules.push(module.into());
        self
    }

    pub fn add_burst(mut self, burst: BurstConfig) -> Self {
        self.bursts.push(burst);
        self
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.max_particles == 0 {
            return Err(AssetError::invalid("max_particles", "must be greater than 0"));
        }
        check_finite("duration", self.duration)?;
        if self.duration < 0.0 {
            return Err(AssetError::invalid("duration", "must not be negative"));
        }
        check_finite("playback_speed", self.playback_speed)?;
        if self.playback_speed <= 0.0 {
            return Err(AssetError::invalid("playback_speed", "must be greater than 0"));
        }

        check_finite("emission.rate", self.emission.rate)?;
        if self.emission.rate < 0.0 {
            return Err(AssetError::invalid("emission.rate", "must not be negative"));
        }

        let spawn = &self.spawn;
        check_range("spawn.lifetime", spawn.lifetime_min, spawn.lifetime_max)?;
        if spawn.lifetime_max <= 0.0 {
            return Err(AssetError::invalid("spawn.lifetime_max", "must be greater than 0"));
        }
        if spawn.lifetime_min < 0.0 {
            return Err(AssetError::invalid("spawn.lifetime_min", "must not be negative"));
        }
        check_range("spawn.speed", spawn.speed_min, spawn.speed_max)?;
        check_range("spawn.scale", spawn.scale_min, spawn.scale_max)?;
        check_range("spawn.rotation", spawn.rotation_min, spawn.rotation_max)?;
        check_range(
            "spawn.angular_velocity",
            spawn.angular_velocity_min,
            spawn.angular_velocity_max,
        )?;
        check_finite("spawn.direction", spawn.direction)?;
        if !(0.0..=360.0).contains(&spawn.spread) {
            return Err(AssetError::invalid("spawn.spread", "must be within [0, 360]"));
        }

        for (i, c) in self.start_color.iter().enumerate() {
            check_unit(&format!("start_color.{i}"), *c)?;
        }
        check_unit("start_alpha", self.start_alpha)?;
        check_unit("end_alpha", self.end_alpha)?;
        check_finite("end_scale", self.end_scale)?;

        for (i, burst) in self.bursts.iter().enumerate() {
            if burst.time < 0.0 || !burst.time.is_finite() {
                return Err(AssetError::invalid(
                    format!("bursts.{i}.time"),
                    "must be a non-negative number",
                ));
            }
            if burst.interval < 0.0 || !burst.interval.is_finite() {
                return Err(AssetError::invalid(
                    format!("bursts.{i}.interval"),
                    "must be a non-negative number",
                ));
            }
        }

        for (i, module) in self.modules.iter().enumerate() {
            match &module.kind {
                ModuleKind::SizeOverLifetime(size) => check_curve_keys(i, &size.keys)?,
                ModuleKind::ColorOverLifetime(color) => check_gradient_keys(i, &color.gradient)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Copy of this asset with the property at `key` replaced by `value`.
    ///
    /// Fails with [`AssetError::UnknownProperty`] if the path does not exist,
    /// [`AssetError::InvalidPropertyValue`] if the value has the wrong shape,
    /// or [`AssetError::Invalid`] if the result does not validate.
    pub fn with_property(&self, key: &str, value: Value) -> Result<Self> {
        let mut tree = serde_json::to_value(self)?;
        let slot = property_slot(&mut tree, key)
            .ok_or_else(|| AssetError::UnknownProperty(key.to_string()))?;
        *slot = value;

        let edited: ParticleAsset =
            serde_json::from_value(tree).map_err(|e| AssetError::InvalidPropertyValue {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        edited.validate()?;
        Ok(edited)
    }
}

/// Walk a dotted path to an existing node.
///
/// Array elements are addressed by index; `x`, `y`, `z` and `w` alias indices
/// 0 to 3 so vector components read naturally.
fn property_slot<'a>(tree: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    if key.is_empty() {
        return None;
    }
    key.split('.').try_fold(tree, |node, segment| match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => {
            let index = match segment {
                "x" => 0,
                "y" => 1,
                "z" => 2,
                "w" => 3,
                _ => segment.parse::<usize>().ok()?,
            };
            items.get_mut(index)
        }
        _ => None,
    })
}

fn check_finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AssetError::invalid(field, "must be a finite number"))
    }
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AssetError::invalid(field, "must be within [0, 1]"))
    }
}

fn check_range(field: &str, min: f32, max: f32) -> Result<()> {
    check_finite(&format!("{field}_min"), min)?;
    check_finite(&format!("{field}_max"), max)?;
    if min > max {
        return Err(AssetError::invalid(
            format!("{field}_min"),
            format!("({min}) must not exceed {field}_max ({max})"),
        ));
    }
    Ok(())
}

fn check_curve_keys(module: usize, keys: &[CurveKey]) -> Result<()> {
    for (k, key) in keys.iter().enumerate() {
        check_unit(&format!("modules.{module}.keys.{k}.time"), key.time)?;
        check_finite(&format!("modules.{module}.keys.{k}.scale"), key.scale)?;
    }
    Ok(())
}

fn check_gradient_keys(module: usize, keys: &[GradientKey]) -> Result<()> {
    for (k, key) in keys.iter().enumerate() {
        let prefix = format!("modules.{module}.gradient.{k}");
        check_unit(&format!("{prefix}.time"), key.time)?;
        for (channel, value) in [("r", key.r), ("g", key.g), ("b", key.b), ("a", key.a)] {
            check_unit(&format!("{prefix}.{channel}"), value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ColorOverLifetime, ForceField, NoiseModule, SizeOverLifetime};
    use crate::render::BlendMode;
    use serde_json::json;

    #[test]
    fn test_default_is_valid() {
        assert!(ParticleAsset::default().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_default() {
        let asset = ParticleAsset::from_json(r#"{ "name": "Tiny", "emission": { "rate": 3 } }"#)
            .unwrap();
        assert_eq!(asset.name, "Tiny");
        assert_eq!(asset.emission.rate, 3.0);
        assert_eq!(asset.emission.shape, EmissionShape::Point);
        assert_eq!(asset.max_particles, 1000);
        assert_eq!(asset.spawn, SpawnConfig::default());
    }

    #[test]
    fn test_unknown_enums_degrade() {
        let asset = ParticleAsset::from_json(
            r#"{
                "emission": { "shape": "Hexagon" },
                "render": { "blend_mode": "Screen" },
                "modules": [ { "type": "Gravity2", "enabled": true } ]
            }"#,
        )
        .unwrap();
        assert_eq!(asset.emission.shape, EmissionShape::Point);
        assert_eq!(asset.render.blend_mode, BlendMode::Alpha);
        assert!(!asset.modules[0].is_active());
    }

    #[test]
    fn test_json_round_trip() {
        let asset = ParticleAsset {
            name: "Round Trip".into(),
            gravity: Vec2::new(0.0, -9.8),
            ..Default::default()
        }
        .add_module(ColorOverLifetime::fade_to(0.2))
        .add_module(ForceField::wind(45.0, 3.0))
        .add_burst(BurstConfig::new(0.5, 20));

        let json = asset.to_json().unwrap();
        let back = ParticleAsset::from_json(&json).unwrap();
        assert_eq!(back, asset);
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(matches!(
            ParticleAsset::from_json("{ not json"),
            Err(AssetError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let zero_capacity = ParticleAsset {
            max_particles: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_capacity.validate(),
            Err(AssetError::Invalid { field, .. }) if field == "max_particles"
        ));

        let mut inverted = ParticleAsset::default();
        inverted.spawn.speed_min = 10.0;
        inverted.spawn.speed_max = 5.0;
        assert!(inverted.validate().is_err());

        let mut wide = ParticleAsset::default();
        wide.spawn.spread = 400.0;
        assert!(wide.validate().is_err());

        let mut immortal = ParticleAsset::default();
        immortal.spawn.lifetime_min = 0.0;
        immortal.spawn.lifetime_max = 0.0;
        assert!(immortal.validate().is_err());

        let stalled = ParticleAsset {
            playback_speed: 0.0,
            ..Default::default()
        };
        assert!(stalled.validate().is_err());
    }

    #[test]
    fn test_validate_checks_module_keys() {
        let asset = ParticleAsset::default().add_module(SizeOverLifetime {
            keys: vec![CurveKey::new(0.0, 1.0), CurveKey::new(1.5, 0.0)],
            ..Default::default()
        });
        assert!(asset.validate().is_err());
    }

    #[test]
    fn test_with_property_edits_nested_fields() {
        let asset = ParticleAsset::default().add_module(NoiseModule::default());

        let edited = asset.with_property("emission.rate", json!(25.0)).unwrap();
        assert_eq!(edited.emission.rate, 25.0);

        let edited = edited.with_property("gravity.y", json!(-50.0)).unwrap();
        assert_eq!(edited.gravity, Vec2::new(0.0, -50.0));

        let edited = edited.with_property("modules.0.enabled", json!(false)).unwrap();
        assert!(!edited.modules[0].enabled);

        let edited = edited.with_property("emission.shape", json!("Ring")).unwrap();
        assert_eq!(edited.emission.shape, EmissionShape::Ring);

        // source untouched
        assert_eq!(asset.emission.rate, 10.0);
    }

    #[test]
    fn test_with_property_rejects_unknown_key() {
        let asset = ParticleAsset::default();
        for key in ["", "emission.speed", "gravity.q", "modules.3", "name.first"] {
            assert!(
                matches!(asset.with_property(key, json!(1)), Err(AssetError::UnknownProperty(_))),
                "{key}"
            );
        }
    }

    #[test]
    fn test_with_property_rejects_bad_values() {
        let asset = ParticleAsset::default();
        assert!(matches!(
            asset.with_property("max_particles", json!("many")),
            Err(AssetError::InvalidPropertyValue { .. })
        ));
        assert!(matches!(
            asset.with_property("max_particles", json!(0)),
            Err(AssetError::Invalid { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("flurry-asset-{}.json", std::process::id()));
        let asset = ParticleAsset {
            name: "Saved".into(),
            ..Default::default()
        };
        asset.save(&path).unwrap();
        let loaded = ParticleAsset::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, asset);

        assert!(matches!(
            ParticleAsset::load(std::env::temp_dir().join("flurry-missing.json")),
            Err(AssetError::Io(_))
        ));
    }
}
