//! Keyframe curves and colour gradients indexed by normalized age.
//!
//! Both evaluators share the same bracketing rules:
//!
//! | Keys | Result |
//! |------|--------|
//! | none | neutral default (scale `1.0`, opaque white) |
//! | one | that key for every `t` |
//! | `t` before the first / after the last key | the boundary key |
//! | otherwise | linear interpolation between the bracketing pair |
//!
//! Keys are expected in ascending time order. Out-of-order keys never panic;
//! the scan simply finds the first pair that brackets `t`.
//!
//! [`evaluate_curve`] additionally remaps the local interpolation factor
//! through the easing selected by [`CurveType`].

use glam::Vec4;
use serde::{Deserialize, Serialize};

const KEY_EPSILON: f32 = 1e-6;

/// Easing applied between two curve keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CurveType {
    /// `t`
    #[default]
    Linear,
    /// `t²`
    EaseIn,
    /// `1 - (1 - t)²`
    EaseOut,
    /// `2t²` below one half, `1 - 2(1 - t)²` above.
    EaseInOut,
}

named_enum!(CurveType, fallback = Linear, {
    Linear => "Linear",
    EaseIn => "EaseIn",
    EaseOut => "EaseOut",
    EaseInOut => "EaseInOut",
});

impl CurveType {
    /// Remap a local factor in `[0, 1]`.
    pub fn ease(&self, t: f32) -> f32 {
        match self {
            CurveType::Linear => t,
            CurveType::EaseIn => t * t,
            CurveType::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            CurveType::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

/// A scalar keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveKey {
    /// Normalized age in `[0, 1]`.
    pub time: f32,
    /// Multiplier at this time.
    pub scale: f32,
}

impl CurveKey {
    pub fn new(time: f32, scale: f32) -> Self {
        Self { time, scale }
    }
}

impl Default for CurveKey {
    fn default() -> Self {
        Self {
            time: 0.0,
            scale: 1.0,
        }
    }
}

/// A colour keyframe, all channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientKey {
    pub time: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl GradientKey {
    pub fn new(time: f32, r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { time, r, g, b, a }
    }

    /// Channels as an RGBA vector.
    #[inline]
    pub fn color(&self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for GradientKey {
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0, 1.0, 1.0)
    }
}

/// Evaluate a scalar curve at normalized age `t`.
pub fn evaluate_curve(keys: &[CurveKey], curve_type: CurveType, t: f32) -> f32 {
    match keys {
        [] => 1.0,
        [only] => only.scale,
        [first, .., last] => {
            if t <= first.time {
                return first.scale;
            }
            if t >= last.time {
                return last.scale;
            }
            match bracket(keys, t, |k| k.time) {
                Some((left, right, f)) => lerp(left.scale, right.scale, curve_type.ease(f)),
                None => last.scale,
            }
        }
    }
}

/// Evaluate a colour gradient at normalized age `t`.
pub fn evaluate_gradient(keys: &[GradientKey], t: f32) -> Vec4 {
    match keys {
        [] => Vec4::ONE,
        [only] => only.color(),
        [first, .., last] => {
            if t <= first.time {
                return first.color();
            }
            if t >= last.time {
                return last.color();
            }
            match bracket(keys, t, |k| k.time) {
                Some((left, right, f)) => left.color().lerp(right.color(), f),
                None => last.color(),
            }
        }
    }
}

/// Find the first adjacent pair with `left.time <= t <= right.time`.
///
/// Returns the pair and the local factor. A zero-width pair yields `1.0`.
fn bracket<K>(keys: &[K], t: f32, time: impl Fn(&K) -> f32) -> Option<(&K, &K, f32)> {
    keys.windows(2).find_map(|pair| {
        let (left, right) = (&pair[0], &pair[1]);
        let (lt, rt) = (time(left), time(right));
        if t < lt || t > rt {
            return None;
        }
        let span = rt - lt;
        let f = if span > KEY_EPSILON {
            ((t - lt) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Some((left, right, f))
    })
}

#[inline]
pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
