//! # Flurry - declarative 2D particle effects
//!
//! Flurry simulates particle effects on the CPU from a declarative
//! [`ParticleAsset`]. The host owns the frame loop and the renderer; Flurry
//! spawns, evolves and retires a bounded set of particles every tick and
//! hands back a drawable snapshot.
//!
//! ## Quick Start
//!
//! ```
//! use flurry::prelude::*;
//!
//! let asset = ParticleAsset::default()
//!     .add_module(ColorOverLifetime::fade_to(0.0))
//!     .add_module(ForceField::wind(0.0, 30.0))
//!     .add_burst(BurstConfig::new(0.0, 25));
//!
//! let mut effect = ParticleEffect::new(asset);
//! effect.play();
//! effect.tick(1.0 / 60.0);
//!
//! for sprite in effect.render_feed() {
//!     let _ = (sprite.position, sprite.color);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Assets
//!
//! A [`ParticleAsset`] is plain serde data: capacity, looping, emission rate
//! and shape, spawn ranges, gravity, colours, render hints, an ordered list of
//! [`Module`]s and an ordered list of [`BurstConfig`]s. Assets load from JSON
//! and every field is optional.
//!
//! ### Ticks
//!
//! Each [`ParticleEffect::tick`] scales the host delta by the asset's playback
//! speed, spawns from the emission accumulator and any due bursts, runs the
//! module pipeline on every particle and removes the dead.
//!
//! ### Modules
//!
//! | Module | Acts on |
//! |--------|---------|
//! | [`VelocityOverLifetime`] | drag, orbit, radial push |
//! | [`RotationOverLifetime`] | spin multiplier |
//! | [`ColorOverLifetime`] | gradient over normalized age |
//! | [`SizeOverLifetime`] | eased curve over normalized age |
//! | [`NoiseModule`] | coherent noise on position, velocity, rotation |
//! | [`ForceField`] | wind, point, vortex, turbulence |
//! | [`Collision`] | rectangle or circle bounds: kill, bounce, wrap |

#[macro_use]
mod macros;

pub mod asset;
pub mod burst;
pub mod curve;
pub mod effect;
pub mod error;
pub mod modules;
pub mod pool;
pub mod presets;
pub mod render;
pub mod shape;
pub mod stepper;
pub mod time;

pub use asset::{EmissionConfig, ParticleAsset, SpawnConfig};
pub use burst::{BurstConfig, BurstScheduler};
pub use curve::{evaluate_curve, evaluate_gradient, CurveKey, CurveType, GradientKey};
pub use effect::{EffectStats, ParticleEffect, PlaybackState};
pub use error::{AssetError, Result};
pub use glam::{Vec2, Vec4};
pub use modules::{
    BoundaryType, Collision, CollisionResponse, ColorOverLifetime, Falloff, ForceField,
    ForceFieldType, Module, ModuleKind, NoiseModule, RotationOverLifetime, SizeOverLifetime,
    VelocityOverLifetime,
};
pub use pool::{Particle, ParticlePool};
pub use render::{BlendMode, RenderConfig, RenderFeed, RenderParticle, TextureRef};
pub use shape::{EmissionShape, ShapeParams};
pub use stepper::{SimulationStepper, StepReport};
pub use time::PlaybackClock;

pub use bytemuck;

/// Convenient re-exports for common usage.
///
/// ```
/// use flurry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::asset::{EmissionConfig, ParticleAsset, SpawnConfig};
    pub use crate::burst::BurstConfig;
    pub use crate::curve::{CurveKey, CurveType, GradientKey};
    pub use crate::effect::{EffectStats, ParticleEffect, PlaybackState};
    pub use crate::error::AssetError;
    pub use crate::modules::{
        BoundaryType, Collision, CollisionResponse, ColorOverLifetime, Falloff, ForceField,
        ForceFieldType, Module, NoiseModule, RotationOverLifetime, SizeOverLifetime,
        VelocityOverLifetime,
    };
    pub use crate::presets;
    pub use crate::render::{BlendMode, RenderParticle, TextureRef};
    pub use crate::shape::{EmissionShape, ShapeParams};
    pub use crate::{Vec2, Vec4};
}
