//! Shared geometry for point-centred features: footprints, falloff
//! profiles and poly-line probing.
//!
//! Rotations are radians counter-clockwise from +x in the x/z plane.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::noise::{lerp, smoothstep};

/// Footprint outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circular,
    /// Ellipse stretched by `aspect` along `rotation`.
    Oval { aspect: f64, rotation: f64 },
    /// Capsule: a spine of `length` meters along `rotation`, rounded by the radius.
    Elongated { length: f64, rotation: f64 },
}

/// Where a point-centred feature lives on the seafloor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: DVec2,
    pub radius: f64,
    pub shape: Shape,
}

impl Footprint {
    pub fn circle(center: DVec2, radius: f64) -> Self {
        Self {
            center,
            radius,
            shape: Shape::Circular,
        }
    }

    /// Normalized distance: 0 at the centre (or spine), 1 on the rim.
    pub fn normalized_distance(&self, p: DVec2) -> f64 {
        let d = p - self.center;
        match self.shape {
            Shape::Circular => d.length() / self.radius,
            Shape::Oval { aspect, rotation } => {
                let local = DVec2::from_angle(-rotation).rotate(d);
                DVec2::new(local.x / (self.radius * aspect), local.y / self.radius).length()
            }
            Shape::Elongated { length, rotation } => {
                let dir = DVec2::from_angle(rotation);
                let half = length * 0.5;
                let along = d.dot(dir).clamp(-half, half);
                (d - dir * along).length() / self.radius
            }
        }
    }

    /// Radius of a circle around the centre that encloses the whole footprint.
    pub fn reach(&self) -> f64 {
        match self.shape {
            Shape::Circular => self.radius,
            Shape::Oval { aspect, .. } => self.radius * aspect.max(1.0),
            Shape::Elongated { length, .. } => length * 0.5 + self.radius,
        }
    }

    pub fn is_valid(&self) -> bool {
        let shape_ok = match self.shape {
            Shape::Circular => true,
            Shape::Oval { aspect, rotation } => {
                aspect.is_finite() && aspect > 0.0 && rotation.is_finite()
            }
            Shape::Elongated { length, rotation } => {
                length.is_finite() && length >= 0.0 && rotation.is_finite()
            }
        };
        shape_ok && self.center.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }
}

/// Radial profile from full strength (t = 0) to nothing (t >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Falloff {
    /// `exp(-sharpness * t²)`, windowed so it reaches exactly 0 at the rim.
    Gaussian { sharpness: f64 },
    /// `(1 - t²)^exponent`.
    PowerLaw { exponent: f64 },
}

impl Falloff {
    pub fn weight(&self, t: f64) -> f64 {
        if t >= 1.0 {
            return 0.0;
        }
        let t = t.max(0.0);
        match *self {
            Falloff::Gaussian { sharpness } => {
                (-sharpness * t * t).exp() * (1.0 - smoothstep(0.7, 1.0, t))
            }
            Falloff::PowerLaw { exponent } => (1.0 - t * t).powf(exponent),
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            Falloff::Gaussian { sharpness } => sharpness.is_finite() && sharpness >= 0.0,
            Falloff::PowerLaw { exponent } => exponent.is_finite() && exponent > 0.0,
        }
    }
}

/// Nearest point on a poly-line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProbe {
    /// Distance from the query point to the path.
    pub distance: f64,
    /// Index of the segment holding the nearest point.
    pub segment: usize,
    /// Parameter along that segment in [0, 1].
    pub t: f64,
}

impl PathProbe {
    /// Interpolate a per-vertex attribute at the probed point.
    pub fn interpolate(&self, values: &[f64]) -> f64 {
        let a = values[self.segment];
        let b = values.get(self.segment + 1).copied().unwrap_or(a);
        lerp(a, b, self.t)
    }
}

/// Project `p` onto the poly-line `points`. None for an empty path.
pub fn nearest_on_path(points: &[DVec2], p: DVec2) -> Option<PathProbe> {
    let first = *points.first()?;
    if points.len() == 1 {
        return Some(PathProbe {
            distance: (p - first).length(),
            segment: 0,
            t: 0.0,
        });
    }

    let mut best: Option<PathProbe> = None;
    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let ab = b - a;
        let len_sq = ab.length_squared();
        let t = if len_sq > 0.0 {
            ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let distance = (p - (a + ab * t)).length();
        if best.map_or(true, |prev| distance < prev.distance) {
            best = Some(PathProbe {
                distance,
                segment: i,
                t,
            });
        }
    }
    best
}

/// Axis-aligned bounds of a path grown by `margin`, as (min, max).
pub fn path_bounds(points: &[DVec2], margin: f64) -> (DVec2, DVec2) {
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for p in points {
        min = min.min(*p);
        max = max.max(*p);
    }
    (min - DVec2::splat(margin), max + DVec2::splat(margin))
}
