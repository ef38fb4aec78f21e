//! Emission shapes: where around the emitter a new particle appears.
//!
//! [`sample`] returns an offset relative to the emitter centre. Launch
//! direction and spread are applied by the caller; the only shapes that read
//! `direction` are [`EmissionShape::Line`] (the segment is perpendicular to
//! it) and [`EmissionShape::Cone`] (offsets fan out around it).
//!
//! | Shape | Offset |
//! |-------|--------|
//! | `Point` | always zero |
//! | `Circle` | random angle, radius drawn uniformly in `[0, radius)` |
//! | `Ring` | random angle at exactly `radius` |
//! | `Rectangle` | uniform in `width × height` |
//! | `Edge` | uniform by arclength along the rectangle perimeter |
//! | `Line` | uniform along a `width`-long segment perpendicular to `direction` |
//! | `Cone` | angle `direction ± U(0, cone_angle / 2)`, radius in `[0, radius)` |
//!
//! `Circle` and `Cone` draw the radius linearly rather than by square root,
//! so density is highest near the centre.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Geometric region new particles are spawned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmissionShape {
    #[default]
    Point,
    Circle,
    Ring,
    Rectangle,
    Edge,
    Line,
    Cone,
}

named_enum!(EmissionShape, fallback = Point, {
    Point => "Point",
    Circle => "Circle",
    Ring => "Ring",
    Rectangle => "Rectangle",
    Edge => "Edge",
    Line => "Line",
    Cone => "Cone",
});

/// Dimensions read by the emission shapes. Unused fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Circle, Ring and Cone radius.
    pub radius: f32,
    /// Rectangle/Edge width, Line length.
    pub width: f32,
    /// Rectangle/Edge height.
    pub height: f32,
    /// Full cone opening in degrees.
    pub cone_angle: f32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            radius: 50.0,
            width: 100.0,
            height: 100.0,
            cone_angle: 30.0,
        }
    }
}

/// Sample a spawn offset for `shape`.
///
/// `direction` is the emitter's launch direction in degrees (0 = +X,
/// counter-clockwise). Never panics; degenerate dimensions collapse to the
/// centre.
pub fn sample<R: Rng + ?Sized>(
    shape: EmissionShape,
    params: &ShapeParams,
    direction: f32,
    rng: &mut R,
) -> Vec2 {
    match shape {
        EmissionShape::Point => Vec2::ZERO,
        EmissionShape::Circle => {
            let angle = rng.gen::<f32>() * TAU;
            let r = rng.gen::<f32>() * params.radius;
            Vec2::from_angle(angle) * r
        }
        EmissionShape::Ring => {
            let angle = rng.gen::<f32>() * TAU;
            Vec2::from_angle(angle) * params.radius
        }
        EmissionShape::Rectangle => Vec2::new(
            (rng.gen::<f32>() - 0.5) * params.width,
            (rng.gen::<f32>() - 0.5) * params.height,
        ),
        EmissionShape::Edge => sample_perimeter(params.width, params.height, rng.gen()),
        EmissionShape::Line => {
            let normal = Vec2::from_angle(direction.to_radians()).perp();
            normal * (rng.gen::<f32>() - 0.5) * params.width
        }
        EmissionShape::Cone => {
            let half = params.cone_angle * 0.5;
            let deviation = rng.gen::<f32>() * half;
            let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
            let angle = (direction + sign * deviation).to_radians();
            let r = rng.gen::<f32>() * params.radius;
            Vec2::from_angle(angle) * r
        }
    }
}

/// Map `u` in `[0, 1)` to a point on the rectangle perimeter by arclength.
///
/// Walks bottom, right, top, left starting from the bottom-left corner.
fn sample_perimeter(width: f32, height: f32, u: f32) -> Vec2 {
    let (w, h) = (width.abs(), height.abs());
    let perimeter = 2.0 * (w + h);
    if perimeter <= f32::EPSILON {
        return Vec2::ZERO;
    }

    let (hw, hh) = (w * 0.5, h * 0.5);
    let mut d = u * perimeter;
    if d < w {
        return Vec2::new(-hw + d, -hh);
    }
    d -= w;
    if d < h {
        return Vec2::new(hw, -hh + d);
    }
    d -= h;
    if d < w {
        return Vec2::new(hw - d, hh);
    }
    d -= w;
    Vec2::new(-hw, (hh - d).max(-hh))
}
