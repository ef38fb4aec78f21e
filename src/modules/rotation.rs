use serde::{Deserialize, Serialize};

use crate::curve::lerp;
use crate::pool::Particle;

/// Scales spin over lifetime and adds a constant extra spin.
///
/// `rotation += angular_velocity * lerp(start_multiplier, end_multiplier, age) * dt
///            + additional_rotation * dt`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationOverLifetime {
    pub start_multiplier: f32,
    pub end_multiplier: f32,
    /// Degrees per second added regardless of the particle's own spin.
    pub additional_rotation: f32,
}

impl RotationOverLifetime {
    pub(crate) fn apply(&self, particle: &mut Particle, normalized_age: f32, dt: f32) {
        let multiplier = lerp(self.start_multiplier, self.end_multiplier, normalized_age);
        particle.rotation +=
            particle.angular_velocity * multiplier * dt + self.additional_rotation * dt;
    }
}

impl Default for RotationOverLifetime {
    fn default() -> Self {
        Self {
            start_multiplier: 1.0,
            end_multiplier: 1.0,
            additional_rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_multiplier_follows_age() {
        let module = RotationOverLifetime {
            start_multiplier: 0.0,
            end_multiplier: 2.0,
            additional_rotation: 10.0,
        };
        let mut p = Particle::new(Vec2::ZERO, 1.0);
        p.angular_velocity = 90.0;

        module.apply(&mut p, 0.5, 0.1);
        // 90 * 1.0 * 0.1 + 10 * 0.1
        assert!((p.rotation - 10.0).abs() < 1e-4);
    }
}
