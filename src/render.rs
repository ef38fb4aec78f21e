//! What the host needs to draw an effect.
//!
//! The engine never draws. After each tick, [`ParticleEffect::render_feed`]
//! hands out a [`RenderFeed`]: the live particles in draw order plus the
//! asset-level blend mode, sort order and texture reference. Hosts that upload
//! to the GPU can collect [`RenderParticle`]s and cast the slice to bytes.
//!
//! ```ignore
//! let instances: Vec<RenderParticle> = effect.render_feed().collect();
//! queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&instances));
//! ```
//!
//! [`ParticleEffect::render_feed`]: crate::ParticleEffect::render_feed

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::pool::Particle;

/// How particle colours combine with what is behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Colours add up; overlapping particles glow.
    Additive,
    /// Colours multiply, darkening the background.
    Multiply,
}

named_enum!(BlendMode, fallback = Alpha, {
    Alpha => "Alpha",
    Additive => "Additive",
    Multiply => "Multiply",
});

/// Opaque texture identifier, resolved by the host's asset registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureRef(pub String);

impl TextureRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Drawing hints carried by the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base sprite size in world units, multiplied by particle scale.
    pub size: f32,
    pub blend_mode: BlendMode,
    /// Effects with lower values draw first.
    pub sort_order: i32,
    pub texture: Option<TextureRef>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            size: 8.0,
            blend_mode: BlendMode::Alpha,
            sort_order: 0,
            texture: None,
        }
    }
}

/// Snapshot of one live particle, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct RenderParticle {
    pub position: [f32; 2],
    pub scale: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
    /// Degrees, counter-clockwise.
    pub rotation: f32,
    _pad: [f32; 3],
}

impl From<&Particle> for RenderParticle {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            scale: p.scale.to_array(),
            color: p.color.to_array(),
            rotation: p.rotation,
            _pad: [0.0; 3],
        }
    }
}

/// Read-only view of an effect's drawable state.
///
/// Iterating yields one [`RenderParticle`] per live particle, oldest first.
#[derive(Debug, Clone)]
pub struct RenderFeed<'a> {
    particles: std::slice::Iter<'a, Particle>,
    pub blend_mode: BlendMode,
    pub sort_order: i32,
    /// Base sprite size.
    pub size: f32,
    pub texture: Option<&'a TextureRef>,
}

impl<'a> RenderFeed<'a> {
    pub(crate) fn new(particles: &'a [Particle], config: &'a RenderConfig) -> Self {
        Self {
            particles: particles.iter(),
            blend_mode: config.blend_mode,
            sort_order: config.sort_order,
            size: config.size,
            texture: config.texture.as_ref(),
        }
    }
}

impl Iterator for RenderFeed<'_> {
    type Item = RenderParticle;

    fn next(&mut self) -> Option<RenderParticle> {
        self.particles
            .by_ref()
            .find(|p| p.is_alive())
            .map(RenderParticle::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    #[test]
    fn test_render_particle_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RenderParticle>(), 48);

        let mut p = Particle::new(Vec2::new(1.0, 2.0), 1.0);
        p.color = Vec4::new(0.1, 0.2, 0.3, 0.4);
        let instances = [RenderParticle::from(&p)];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn test_feed_skips_dead_particles() {
        let mut particles = vec![
            Particle::new(Vec2::new(0.0, 0.0), 1.0),
            Particle::new(Vec2::new(1.0, 0.0), 1.0),
            Particle::new(Vec2::new(2.0, 0.0), 1.0),
        ];
        particles[1].kill();
        let config = RenderConfig {
            blend_mode: BlendMode::Additive,
            texture: Some(TextureRef::new("sprites/spark")),
            ..Default::default()
        };

        let feed = RenderFeed::new(&particles, &config);
        assert_eq!(feed.blend_mode, BlendMode::Additive);
        assert_eq!(feed.texture.map(TextureRef::as_str), Some("sprites/spark"));

        let xs: Vec<f32> = feed.map(|r| r.position[0]).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
    }

    #[test]
    fn test_texture_ref_is_plain_string() {
        let json = serde_json::to_string(&TextureRef::new("abc-123")).unwrap();
        assert_eq!(json, "\"abc-123\"");
    }
}
