use serde::{Deserialize, Serialize};

use crate::curve::{evaluate_curve, CurveKey, CurveType};
use crate::pool::Particle;

/// Scales particles by an eased curve over their lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeOverLifetime {
    pub curve_type: CurveType,
    pub keys: Vec<CurveKey>,
}

impl SizeOverLifetime {
    /// Straight ramp from `start` to `end`.
    pub fn ramp(start: f32, end: f32) -> Self {
        Self {
            curve_type: CurveType::Linear,
            keys: vec![CurveKey::new(0.0, start), CurveKey::new(1.0, end)],
        }
    }

    pub fn with_curve_type(mut self, curve_type: CurveType) -> Self {
        self.curve_type = curve_type;
        self
    }

    pub(crate) fn apply(&self, particle: &mut Particle, normalized_age: f32) {
        particle.scale =
            particle.start_scale * evaluate_curve(&self.keys, self.curve_type, normalized_age);
    }
}

impl Default for SizeOverLifetime {
    fn default() -> Self {
        Self::ramp(1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_scales_start_scale() {
        let module = SizeOverLifetime::ramp(1.0, 3.0).with_curve_type(CurveType::EaseIn);
        let mut p = Particle::new(Vec2::ZERO, 1.0);
        p.start_scale = Vec2::new(2.0, 1.0);

        module.apply(&mut p, 0.5);
        // EaseIn(0.5) = 0.25 -> 1.5
        assert!((p.scale - Vec2::new(3.0, 1.5)).length() < 1e-5);
    }
}
