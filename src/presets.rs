//! Ready-made assets for common effects.
//!
//! ```
//! use flurry::presets;
//!
//! let fire = presets::fire(400.0);
//! assert!(fire.validate().is_ok());
//! assert_eq!(presets::by_name("Smoke").map(|a| a.name), Some("Smoke".to_string()));
//! ```
//!
//! Units are world units and seconds, with +Y up.

use glam::Vec2;

use crate::asset::ParticleAsset;
use crate::burst::BurstConfig;
use crate::curve::{CurveKey, CurveType, GradientKey};
use crate::modules::{
    Collision, CollisionResponse, ColorOverLifetime, NoiseModule, SizeOverLifetime,
    VelocityOverLifetime,
};
use crate::render::BlendMode;
use crate::shape::EmissionShape;

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &["Fire", "Smoke", "Fountain", "Explosion", "Snow"];

/// Look up a preset by name, case-insensitively, at its default rate.
pub fn by_name(name: &str) -> Option<ParticleAsset> {
    let asset = match name.to_ascii_lowercase().as_str() {
        "fire" => fire(120.0),
        "smoke" => smoke(30.0),
        "fountain" => fountain(200.0),
        "explosion" => explosion(150),
        "snow" => snow(60.0),
        _ => return None,
    };
    Some(asset)
}

/// Colour ramp from `start` to `end` RGB, fading alpha to zero.
fn color_over_life(start: [f32; 3], end: [f32; 3]) -> ColorOverLifetime {
    ColorOverLifetime {
        gradient: vec![
            GradientKey::new(0.0, start[0], start[1], start[2], 1.0),
            GradientKey::new(1.0, end[0], end[1], end[2], 0.0),
        ],
    }
}

/// Flickering flame rising from a small disc.
pub fn fire(rate: f32) -> ParticleAsset {
    let mut asset = ParticleAsset {
        name: "Fire".into(),
        max_particles: 500,
        ..Default::default()
    };
    asset.emission.rate = rate;
    asset.emission.shape = EmissionShape::Circle;
    asset.emission.shape_params.radius = 12.0;
    asset.spawn.lifetime_min = 0.8;
    asset.spawn.lifetime_max = 1.5;
    asset.spawn.speed_min = 40.0;
    asset.spawn.speed_max = 80.0;
    asset.spawn.direction = 90.0;
    asset.spawn.spread = 25.0;
    asset.render.blend_mode = BlendMode::Additive;

    asset
        .add_module(color_over_life([1.0, 0.9, 0.3], [0.8, 0.2, 0.0]))
        .add_module(SizeOverLifetime::ramp(1.0, 0.2).with_curve_type(CurveType::EaseIn))
        .add_module(NoiseModule {
            strength: 1.0,
            frequency: 0.04,
            scroll_speed: 1.5,
            velocity_amount: 40.0,
            ..Default::default()
        })
}

/// Slow, spreading, expanding grey plumes.
pub fn smoke(rate: f32) -> ParticleAsset {
    let mut asset = ParticleAsset {
        name: "Smoke".into(),
        max_particles: 300,
        ..Default::default()
    };
    asset.emission.rate = rate;
    asset.emission.shape = EmissionShape::Circle;
    asset.emission.shape_params.radius = 8.0;
    asset.spawn.lifetime_min = 3.0;
    asset.spawn.lifetime_max = 4.0;
    asset.spawn.speed_min = 15.0;
    asset.spawn.speed_max = 30.0;
    asset.spawn.spread = 40.0;
    asset.spawn.angular_velocity_min = -30.0;
    asset.spawn.angular_velocity_max = 30.0;
    asset.start_alpha = 0.6;
    asset.render.blend_mode = BlendMode::Multiply;

    asset
        .add_module(color_over_life([0.4, 0.4, 0.4], [0.15, 0.15, 0.15]))
        .add_module(SizeOverLifetime {
            curve_type: CurveType::EaseOut,
            keys: vec![CurveKey::new(0.0, 1.0), CurveKey::new(1.0, 4.0)],
        })
        .add_module(VelocityOverLifetime {
            drag: 0.3,
            ..Default::default()
        })
}

/// Water jet that arcs up and falls back under gravity.
pub fn fountain(rate: f32) -> ParticleAsset {
    let mut asset = ParticleAsset {
        name: "Fountain".into(),
        max_particles: 1000,
        gravity: Vec2::new(0.0, -250.0),
        start_color: [0.7, 0.85, 1.0],
        ..Default::default()
    };
    asset.emission.rate = rate;
    asset.spawn.lifetime_min = 2.5;
    asset.spawn.lifetime_max = 3.0;
    asset.spawn.speed_min = 220.0;
    asset.spawn.speed_max = 260.0;
    asset.spawn.spread = 12.0;
    asset.spawn.scale_min = 0.6;
    asset.spawn.scale_max = 1.0;

    asset
        .add_module(color_over_life([1.0, 1.0, 1.0], [0.3, 0.5, 0.9]))
        .add_module(Collision {
            bounce_factor: 0.3,
            life_loss_on_bounce: 0.5,
            min_velocity_threshold: 10.0,
            // floor 40 units below the nozzle
            offset: Vec2::new(0.0, 560.0),
            ..Collision::rectangle(800.0, 1200.0, CollisionResponse::Bounce)
        })
}

/// One radial burst that slows and fades.
pub fn explosion(count: u32) -> ParticleAsset {
    let mut asset = ParticleAsset {
        name: "Explosion".into(),
        max_particles: count.max(1),
        looping: false,
        duration: 1.5,
        ..Default::default()
    };
    asset.emission.rate = 0.0;
    asset.spawn.lifetime_min = 0.8;
    asset.spawn.lifetime_max = 1.2;
    asset.spawn.speed_min = 150.0;
    asset.spawn.speed_max = 300.0;
    asset.spawn.spread = 360.0;
    asset.render.blend_mode = BlendMode::Additive;

    asset
        .add_burst(BurstConfig::new(0.0, count))
        .add_module(color_over_life([1.0, 1.0, 0.8], [1.0, 0.3, 0.0]))
        .add_module(SizeOverLifetime::ramp(1.0, 0.0))
        .add_module(VelocityOverLifetime {
            drag: 2.0,
            ..Default::default()
        })
}

/// Flakes drifting down across a wide band, wrapping at the edges.
pub fn snow(rate: f32) -> ParticleAsset {
    let mut asset = ParticleAsset {
        name: "Snow".into(),
        max_particles: 800,
        gravity: Vec2::new(0.0, -10.0),
        end_alpha: 1.0,
        ..Default::default()
    };
    asset.emission.rate = rate;
    asset.emission.shape = EmissionShape::Line;
    asset.emission.shape_params.width = 600.0;
    asset.spawn.lifetime_min = 6.0;
    asset.spawn.lifetime_max = 8.0;
    asset.spawn.speed_min = 20.0;
    asset.spawn.speed_max = 40.0;
    asset.spawn.direction = 270.0;
    asset.spawn.spread = 20.0;
    asset.spawn.scale_min = 0.4;
    asset.spawn.scale_max = 1.0;
    asset.spawn.angular_velocity_min = -45.0;
    asset.spawn.angular_velocity_max = 45.0;

    asset
        .add_module(NoiseModule {
            strength: 1.0,
            frequency: 0.01,
            scroll_speed: 0.2,
            velocity_amount: 15.0,
            ..Default::default()
        })
        .add_module(Collision {
            offset: Vec2::new(0.0, -200.0),
            ..Collision::rectangle(600.0, 400.0, CollisionResponse::Wrap)
        })
}
