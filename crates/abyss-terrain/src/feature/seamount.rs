//! Seamounts (raised) and depressions (soft carve).

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::feature::shape::{Falloff, Footprint};
use crate::feature::{Contribution, SampleContext};
use crate::noise::{lerp, smoothstep, value_noise};

/// Wavelength of plateau-top roughness (meters).
const PLATEAU_NOISE_WAVELENGTH: f64 = 80.0;

/// Flat top covering the inner `fraction` of the radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plateau {
    pub fraction: f64,
    /// Amplitude of small-scale roughness on the plateau top (meters).
    #[serde(default)]
    pub roughness: f64,
}

/// Asymmetric step on one flank: a terrace `drop` meters below the peak,
/// facing `direction` (radians from +x) and extending to normalized radius `outer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShelfStep {
    pub direction: f64,
    pub drop: f64,
    pub outer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seamount {
    pub name: String,
    pub footprint: Footprint,
    /// Depth of the summit (meters, negative).
    pub peak_depth: f64,
    pub falloff: Falloff,
    #[serde(default)]
    pub plateau: Option<Plateau>,
    #[serde(default)]
    pub shelf: Option<ShelfStep>,
    /// Mixed into the world seed for plateau roughness.
    #[serde(default)]
    pub salt: u64,
}

impl Seamount {
    pub fn new(name: impl Into<String>, footprint: Footprint, peak_depth: f64, falloff: Falloff) -> Self {
        Self {
            name: name.into(),
            footprint,
            peak_depth,
            falloff,
            plateau: None,
            shelf: None,
            salt: 0,
        }
    }

    pub fn with_plateau(mut self, plateau: Plateau) -> Self {
        self.plateau = Some(plateau);
        self
    }

    pub fn with_shelf(mut self, shelf: ShelfStep) -> Self {
        self.shelf = Some(shelf);
        self
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.footprint.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid footprint"));
        }
        if !self.falloff.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid falloff"));
        }
        if !self.peak_depth.is_finite() {
            return Err(TerrainError::malformed(&self.name, "peak depth must be finite"));
        }
        if let Some(p) = self.plateau {
            if !(0.0..1.0).contains(&p.fraction) || !p.roughness.is_finite() || p.roughness < 0.0 {
                return Err(TerrainError::malformed(&self.name, "plateau fraction must lie in [0, 1)"));
            }
        }
        if let Some(s) = self.shelf {
            let inner = self.plateau.map_or(0.0, |p| p.fraction);
            if !(s.outer > inner && s.outer < 1.0) || !s.drop.is_finite() || !s.direction.is_finite() {
                return Err(TerrainError::malformed(
                    &self.name,
                    "shelf must end between the plateau edge and the rim",
                ));
            }
        }
        Ok(())
    }

    /// Radial weight: 1 on the plateau, then the falloff profile to the rim.
    fn weight(&self, t: f64) -> f64 {
        match self.plateau {
            Some(p) if t <= p.fraction => 1.0,
            Some(p) => self.falloff.weight((t - p.fraction) / (1.0 - p.fraction)),
            None => self.falloff.weight(t),
        }
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let p = ctx.point;
        if p.distance(self.footprint.center) >= self.footprint.reach() {
            return None;
        }
        let t = self.footprint.normalized_distance(p);
        if t >= 1.0 {
            return None;
        }

        let mut surface = lerp(ctx.base, self.peak_depth, self.weight(t));

        if let Some(shelf) = self.shelf {
            let toward = (p - self.footprint.center).normalize_or_zero();
            let facing = toward.dot(DVec2::from_angle(shelf.direction));
            let side = smoothstep(0.0, 0.5, facing);
            let radial = 1.0 - smoothstep(shelf.outer - 0.1, shelf.outer, t);
            let terrace = lerp(ctx.base, self.peak_depth - shelf.drop, side * radial);
            surface = surface.max(terrace);
        }

        if let Some(plateau) = self.plateau.filter(|p| p.roughness > 0.0) {
            let mask = 1.0 - smoothstep(plateau.fraction * 0.7, plateau.fraction, t);
            if mask > 0.0 {
                let n = value_noise(
                    ctx.seed ^ self.salt,
                    0,
                    p.x / PLATEAU_NOISE_WAVELENGTH,
                    p.y / PLATEAU_NOISE_WAVELENGTH,
                );
                surface += plateau.roughness * mask * n;
            }
        }

        Some(Contribution::Raise(surface))
    }
}

/// Closed basin lowering the floor by up to `depth` meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depression {
    pub name: String,
    pub footprint: Footprint,
    pub depth: f64,
    pub falloff: Falloff,
}

impl Depression {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.footprint.is_valid() || !self.falloff.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid footprint or falloff"));
        }
        if !(self.depth.is_finite() && self.depth >= 0.0) {
            return Err(TerrainError::malformed(&self.name, "depth must be non-negative"));
        }
        Ok(())
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        if ctx.point.distance(self.footprint.center) >= self.footprint.reach() {
            return None;
        }
        let t = self.footprint.normalized_distance(ctx.point);
        if t >= 1.0 {
            return None;
        }
        Some(Contribution::Sink(ctx.base - self.depth * self.falloff.weight(t)))
    }
}
