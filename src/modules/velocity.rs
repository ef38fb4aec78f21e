use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ModuleContext, DIRECTION_EPSILON};
use crate::pool::Particle;

/// Shapes velocity relative to the emitter centre.
///
/// Applied before integration, in this order:
///
/// 1. **Drag** damps velocity by `drag` per second.
/// 2. **Orbital** revolves the particle about the centre at `orbital`
///    degrees per second (positive is counter-clockwise).
/// 3. **Radial** accelerates along the centre-to-particle vector;
///    positive pushes out, negative pulls in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityOverLifetime {
    pub drag: f32,
    pub orbital: f32,
    pub radial: f32,
}

impl VelocityOverLifetime {
    pub(crate) fn apply(&self, particle: &mut Particle, ctx: &ModuleContext<'_>, dt: f32) {
        if self.drag > 0.0 {
            particle.velocity *= (1.0 - self.drag * dt).max(0.0);
        }

        let offset = particle.position - ctx.center;
        let distance = offset.length();
        if distance < DIRECTION_EPSILON {
            return;
        }

        if self.orbital != 0.0 {
            let turn = Vec2::from_angle((self.orbital * dt).to_radians());
            particle.position = ctx.center + turn.rotate(offset);
        }

        if self.radial != 0.0 {
            particle.velocity += offset / distance * self.radial * dt;
        }
    }
}

impl Default for VelocityOverLifetime {
    fn default() -> Self {
        Self {
            drag: 0.0,
            orbital: 0.0,
            radial: 0.0,
        }
    }
}
