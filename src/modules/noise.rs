use ::noise::NoiseFn;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ModuleContext;
use crate::pool::Particle;

/// Offset between the two Perlin channels so X and Y decorrelate.
const CHANNEL_OFFSET: f64 = 57.31;

/// Perturbs particles with scrolling coherent noise.
///
/// Two Perlin channels are sampled at `position * frequency + time * scroll_speed`
/// and scaled by `strength`. Each target gets its own amount, so a module can
/// jitter position, push velocity, wobble rotation, or any mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseModule {
    pub strength: f32,
    /// Spatial frequency (cycles per world unit).
    pub frequency: f32,
    /// Noise-space units scrolled per second.
    pub scroll_speed: f32,
    pub position_amount: f32,
    pub velocity_amount: f32,
    /// Degrees per unit of noise.
    pub rotation_amount: f32,
}

impl NoiseModule {
    /// Sample both channels, each roughly in `[-1, 1]`.
    pub(crate) fn sample(&self, position: Vec2, ctx: &ModuleContext<'_>) -> Vec2 {
        let scroll = (ctx.time * self.scroll_speed) as f64;
        let x = position.x as f64 * self.frequency as f64 + scroll;
        let y = position.y as f64 * self.frequency as f64 + scroll;
        Vec2::new(
            ctx.noise.get([x, y]) as f32,
            ctx.noise.get([x + CHANNEL_OFFSET, y + CHANNEL_OFFSET]) as f32,
        )
    }

    pub(crate) fn apply(&self, particle: &mut Particle, ctx: &ModuleContext<'_>, dt: f32) {
        if self.strength == 0.0 {
            return;
        }
        let n = self.sample(particle.position, ctx) * self.strength;

        if self.position_amount != 0.0 {
            particle.position += n * self.position_amount * dt;
        }
        if self.velocity_amount != 0.0 {
            particle.velocity += n * self.velocity_amount * dt;
        }
        if self.rotation_amount != 0.0 {
            particle.rotation += n.x * self.rotation_amount * dt;
        }
    }
}

impl Default for NoiseModule {
    fn default() -> Self {
        Self {
            strength: 1.0,
            frequency: 0.05,
            scroll_speed: 0.5,
            position_amount: 0.0,
            velocity_amount: 50.0,
            rotation_amount: 0.0,
        }
    }
}
