use ::noise::NoiseFn;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ModuleContext, DIRECTION_EPSILON};
use crate::pool::Particle;

/// Phase shift between the turbulence channels.
const TURBULENCE_PHASE: f64 = 113.7;

/// Spatial rule a force field follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ForceFieldType {
    /// Constant acceleration along `direction`.
    #[default]
    Wind,
    /// Attraction (positive strength) or repulsion toward `position`.
    Point,
    /// Swirl around `position`, plus optional inward/outward bias.
    Vortex,
    /// Noise-driven buffeting that evolves over time.
    Turbulence,
}

named_enum!(ForceFieldType, fallback = Wind, {
    Wind => "Wind",
    Point => "Point",
    Vortex => "Vortex",
    Turbulence => "Turbulence",
});

/// How a field weakens toward its radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Falloff {
    /// Full strength everywhere inside the radius.
    #[default]
    None,
    /// `1 - d / radius`
    Linear,
    /// `(1 - d / radius)²`
    Quadratic,
}

named_enum!(Falloff, fallback = None, {
    None => "None",
    Linear => "Linear",
    Quadratic => "Quadratic",
});

impl Falloff {
    /// Weight at `distance` for a field of `radius`. A radius of zero or less
    /// means unbounded, full strength.
    pub fn factor(&self, distance: f32, radius: f32) -> f32 {
        if radius <= 0.0 {
            return 1.0;
        }
        if distance > radius {
            return 0.0;
        }
        let t = 1.0 - distance / radius;
        match self {
            Falloff::None => 1.0,
            Falloff::Linear => t,
            Falloff::Quadratic => t * t,
        }
    }
}

/// A continuous velocity influence.
///
/// `position` is relative to the emitter centre. Strengths are in world units
/// per second squared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceField {
    pub field_type: ForceFieldType,
    pub strength: f32,
    /// Wind direction in degrees.
    pub direction: f32,
    pub position: Vec2,
    /// Range of Point and Vortex fields. Zero or less is unbounded.
    pub radius: f32,
    pub falloff: Falloff,
    /// Vortex radial bias; positive pulls inward, negative pushes outward.
    pub inward_force: f32,
    /// Turbulence spatial frequency.
    pub frequency: f32,
    /// Turbulence evolution speed.
    pub speed: f32,
}

impl ForceField {
    pub fn wind(direction: f32, strength: f32) -> Self {
        Self {
            field_type: ForceFieldType::Wind,
            direction,
            strength,
            ..Default::default()
        }
    }

    pub fn point(position: Vec2, strength: f32, radius: f32, falloff: Falloff) -> Self {
        Self {
            field_type: ForceFieldType::Point,
            position,
            strength,
            radius,
            falloff,
            ..Default::default()
        }
    }

    pub fn vortex(position: Vec2, strength: f32, inward_force: f32) -> Self {
        Self {
            field_type: ForceFieldType::Vortex,
            position,
            strength,
            inward_force,
            ..Default::default()
        }
    }

    pub fn turbulence(strength: f32, frequency: f32) -> Self {
        Self {
            field_type: ForceFieldType::Turbulence,
            strength,
            frequency,
            ..Default::default()
        }
    }

    pub(crate) fn apply(&self, particle: &mut Particle, ctx: &ModuleContext<'_>, dt: f32) {
        particle.velocity += self.acceleration(particle.position, ctx) * dt;
    }

    /// Acceleration this field exerts at `position`.
    pub(crate) fn acceleration(&self, position: Vec2, ctx: &ModuleContext<'_>) -> Vec2 {
        match self.field_type {
            ForceFieldType::Wind => Vec2::from_angle(self.direction.to_radians()) * self.strength,
            ForceFieldType::Point => {
                let to_field = ctx.center + self.position - position;
                let distance = to_field.length();
                if distance < DIRECTION_EPSILON {
                    return Vec2::ZERO;
                }
                let weight = self.falloff.factor(distance, self.radius);
                to_field / distance * self.strength * weight
            }
            ForceFieldType::Vortex => {
                let from_center = position - (ctx.center + self.position);
                let distance = from_center.length();
                if distance < DIRECTION_EPSILON {
                    return Vec2::ZERO;
                }
                let weight = self.falloff.factor(distance, self.radius);
                let outward = from_center / distance;
                (outward.perp() * self.strength - outward * self.inward_force) * weight
            }
            ForceFieldType::Turbulence => {
                let f = self.frequency as f64;
                let t = (ctx.time * self.speed) as f64;
                let (x, y) = (position.x as f64 * f, position.y as f64 * f);
                let nx = ctx.noise.get([x, y, t]);
                let ny = ctx.noise.get([
                    x + TURBULENCE_PHASE,
                    y - TURBULENCE_PHASE,
                    t + TURBULENCE_PHASE,
                ]);
                Vec2::new(nx as f32, ny as f32) * self.strength
            }
        }
    }
}

impl Default for ForceField {
    fn default() -> Self {
        Self {
            field_type: ForceFieldType::Wind,
            strength: 0.0,
            direction: 0.0,
            position: Vec2::ZERO,
            radius: 0.0,
            falloff: Falloff::None,
            inward_force: 0.0,
            frequency: 0.02,
            speed: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::noise::Perlin;

    fn ctx(noise: &Perlin) -> ModuleContext<'_> {
        ModuleContext {
            center: Vec2::ZERO,
            time: 0.0,
            noise,
        }
    }

    #[test]
    fn test_wind_is_directional() {
        let perlin = Perlin::new(1);
        let field = ForceField::wind(90.0, 10.0);
        let mut p = Particle::new(Vec2::new(5.0, 5.0), 1.0);

        field.apply(&mut p, &ctx(&perlin), 0.5);
        assert!((p.velocity - Vec2::new(0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_point_attracts_and_repels() {
        let perlin = Perlin::new(1);
        let attract = ForceField::point(Vec2::new(10.0, 0.0), 4.0, 0.0, Falloff::None);
        let a = attract.acceleration(Vec2::ZERO, &ctx(&perlin));
        assert!((a - Vec2::new(4.0, 0.0)).length() < 1e-5);

        let repel = ForceField::point(Vec2::new(10.0, 0.0), -4.0, 0.0, Falloff::None);
        let r = repel.acceleration(Vec2::ZERO, &ctx(&perlin));
        assert!((r - Vec2::new(-4.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_point_outside_radius_has_no_effect() {
        let perlin = Perlin::new(1);
        let field = ForceField::point(Vec2::ZERO, 4.0, 5.0, Falloff::Linear);
        assert_eq!(field.acceleration(Vec2::new(6.0, 0.0), &ctx(&perlin)), Vec2::ZERO);
    }

    #[test]
    fn test_falloff_factors() {
        assert_eq!(Falloff::None.factor(3.0, 4.0), 1.0);
        assert!((Falloff::Linear.factor(3.0, 4.0) - 0.25).abs() < 1e-6);
        assert!((Falloff::Quadratic.factor(2.0, 4.0) - 0.25).abs() < 1e-6);
        assert_eq!(Falloff::Quadratic.factor(5.0, 4.0), 0.0);
        assert_eq!(Falloff::Linear.factor(100.0, 0.0), 1.0);
    }

    #[test]
    fn test_vortex_is_tangential() {
        let perlin = Perlin::new(1);
        let field = ForceField::vortex(Vec2::ZERO, 3.0, 0.0);
        let a = field.acceleration(Vec2::new(2.0, 0.0), &ctx(&perlin));
        assert!((a - Vec2::new(0.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_vortex_inward_bias() {
        let perlin = Perlin::new(1);
        let field = ForceField::vortex(Vec2::ZERO, 0.0, 2.0);
        let a = field.acceleration(Vec2::new(0.0, 4.0), &ctx(&perlin));
        assert!((a - Vec2::new(0.0, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_distance_is_ignored() {
        let perlin = Perlin::new(1);
        let vortex = ForceField::vortex(Vec2::ZERO, 3.0, 1.0);
        let point = ForceField::point(Vec2::ZERO, 3.0, 0.0, Falloff::None);
        assert_eq!(vortex.acceleration(Vec2::ZERO, &ctx(&perlin)), Vec2::ZERO);
        assert_eq!(point.acceleration(Vec2::ZERO, &ctx(&perlin)), Vec2::ZERO);
    }

    #[test]
    fn test_turbulence_is_bounded_and_varies() {
        let perlin = Perlin::new(9);
        let field = ForceField::turbulence(10.0, 0.1);
        let c = ctx(&perlin);
        let a = field.acceleration(Vec2::new(12.3, 4.5), &c);
        let b = field.acceleration(Vec2::new(-31.7, 20.2), &c);
        assert!(a.length() <= 10.0 * 2.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_falloff_is_none() {
        let falloff: Falloff = serde_json::from_str("\"Cubic\"").unwrap();
        assert_eq!(falloff, Falloff::None);
    }
}
