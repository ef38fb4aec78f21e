use serde::{Deserialize, Serialize};

use crate::curve::{evaluate_gradient, GradientKey};
use crate::pool::Particle;

/// Tints particles by a gradient over their lifetime.
///
/// The gradient multiplies each particle's start colour componentwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOverLifetime {
    pub gradient: Vec<GradientKey>,
}

impl ColorOverLifetime {
    /// Keep the colour, fade alpha from 1 to `end_alpha`.
    pub fn fade_to(end_alpha: f32) -> Self {
        Self {
            gradient: vec![
                GradientKey::new(0.0, 1.0, 1.0, 1.0, 1.0),
                GradientKey::new(1.0, 1.0, 1.0, 1.0, end_alpha),
            ],
        }
    }

    pub(crate) fn apply(&self, particle: &mut Particle, normalized_age: f32) {
        particle.color = particle.start_color * evaluate_gradient(&self.gradient, normalized_age);
    }
}

impl Default for ColorOverLifetime {
    fn default() -> Self {
        Self::fade_to(0.0)
    }
}
