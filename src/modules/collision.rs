use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ModuleContext, DIRECTION_EPSILON};
use crate::pool::Particle;

/// Shape of the collision boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BoundaryType {
    /// Collision disabled.
    #[default]
    None,
    Rectangle,
    Circle,
}

named_enum!(BoundaryType, fallback = None, {
    None => "None",
    Rectangle => "Rectangle",
    Circle => "Circle",
});

/// What happens to a particle that leaves the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CollisionResponse {
    #[default]
    Kill,
    Bounce,
    Wrap,
}

named_enum!(CollisionResponse, fallback = Kill, {
    Kill => "Kill",
    Bounce => "Bounce",
    Wrap => "Wrap",
});

/// Keeps particles inside a rectangle or circle centred on the emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collision {
    pub boundary: BoundaryType,
    pub response: CollisionResponse,
    /// Rectangle size.
    pub width: f32,
    pub height: f32,
    /// Circle radius.
    pub radius: f32,
    /// Boundary centre relative to the emitter.
    pub offset: Vec2,
    /// Fraction of the crossing velocity kept after a bounce.
    pub bounce_factor: f32,
    /// Fraction of remaining lifetime lost on each bounce.
    pub life_loss_on_bounce: f32,
    /// Bounced particles slower than this are killed.
    pub min_velocity_threshold: f32,
}

impl Collision {
    pub fn rectangle(width: f32, height: f32, response: CollisionResponse) -> Self {
        Self {
            boundary: BoundaryType::Rectangle,
            response,
            width,
            height,
            ..Default::default()
        }
    }

    pub fn circle(radius: f32, response: CollisionResponse) -> Self {
        Self {
            boundary: BoundaryType::Circle,
            response,
            radius,
            ..Default::default()
        }
    }

    pub(crate) fn apply(&self, particle: &mut Particle, ctx: &ModuleContext<'_>) {
        let center = ctx.center + self.offset;
        let breached = match self.boundary {
            BoundaryType::None => false,
            BoundaryType::Rectangle => self.resolve_rectangle(particle, center),
            BoundaryType::Circle => self.resolve_circle(particle, center),
        };

        if !breached {
            return;
        }
        match self.response {
            CollisionResponse::Kill => particle.kill(),
            CollisionResponse::Bounce => {
                let lost = particle.remaining_life() * self.life_loss_on_bounce.clamp(0.0, 1.0);
                particle.lifetime -= lost;
                if particle.age >= particle.lifetime
                    || particle.velocity.length() < self.min_velocity_threshold
                {
                    particle.kill();
                }
            }
            CollisionResponse::Wrap => {}
        }
    }

    /// Corrects position and velocity for a rectangle breach according to
    /// the response. Returns whether the particle was outside.
    fn resolve_rectangle(&self, particle: &mut Particle, center: Vec2) -> bool {
        let half = Vec2::new(self.width, self.height).abs() * 0.5;
        let min = center - half;
        let max = center + half;
        let mut breached = false;

        for axis in 0..2 {
            let (lo, hi) = (min[axis], max[axis]);
            let pos = particle.position[axis];
            if pos >= lo && pos <= hi {
                continue;
            }
            breached = true;
            match self.response {
                CollisionResponse::Kill => {}
                CollisionResponse::Bounce => {
                    let vel = particle.velocity[axis];
                    if pos > hi {
                        particle.position[axis] = hi;
                        particle.velocity[axis] = -vel.abs() * self.bounce_factor;
                    } else {
                        particle.position[axis] = lo;
                        particle.velocity[axis] = vel.abs() * self.bounce_factor;
                    }
                }
                CollisionResponse::Wrap => {
                    let span = hi - lo;
                    particle.position[axis] = if span < DIRECTION_EPSILON {
                        center[axis]
                    } else {
                        lo + (pos - lo).rem_euclid(span)
                    };
                }
            }
        }

        breached
    }

    fn resolve_circle(&self, particle: &mut Particle, center: Vec2) -> bool {
        let radius = self.radius.abs();
        let offset = particle.position - center;
        let distance = offset.length();
        if distance <= radius || distance < DIRECTION_EPSILON {
            return false;
        }
        let normal = offset / distance;

        match self.response {
            CollisionResponse::Kill => {}
            CollisionResponse::Bounce => {
                particle.position = center + normal * radius;
                let outward = particle.velocity.dot(normal);
                if outward > 0.0 {
                    particle.velocity -= normal * outward * (1.0 + self.bounce_factor);
                }
            }
            CollisionResponse::Wrap => {
                particle.position = center - normal * radius;
            }
        }

        true
    }
}

impl Default for Collision {
    fn default() -> Self {
        Self {
            boundary: BoundaryType::None,
            response: CollisionResponse::Kill,
            width: 400.0,
            height: 400.0,
            radius: 200.0,
            offset: Vec2::ZERO,
            bounce_factor: 0.5,
            life_loss_on_bounce: 0.0,
            min_velocity_threshold: 0.0,
        }
    }
}
