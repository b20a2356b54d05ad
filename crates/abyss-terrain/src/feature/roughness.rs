//! Additive perturbations: fractal roughness and sediment infill.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::feature::{Contribution, SampleContext};
use crate::noise::{lerp, smoothstep, Fbm};

/// Base depth above which roughness is fully damped to `shelf_scale`.
const SMOOTH_FLOOR_DEPTH: f64 = -200.0;
/// Base depth below which roughness reaches full amplitude.
const ROUGH_FLOOR_DEPTH: f64 = -3_000.0;

/// Multi-octave fBm roughness. Quiet on the shelf, full amplitude in the abyss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roughness {
    pub name: String,
    pub fbm: Fbm,
    /// Peak amplitude in meters.
    pub amplitude: f64,
    /// Fraction of the amplitude kept on shallow floors.
    pub shelf_scale: f64,
    #[serde(default)]
    pub salt: u64,
}

impl Roughness {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.fbm.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid fbm parameters"));
        }
        if !(self.amplitude.is_finite() && self.amplitude >= 0.0) {
            return Err(TerrainError::malformed(&self.name, "amplitude must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.shelf_scale) {
            return Err(TerrainError::malformed(&self.name, "shelf scale must lie in [0, 1]"));
        }
        Ok(())
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let depth_weight = smoothstep(SMOOTH_FLOOR_DEPTH, ROUGH_FLOOR_DEPTH, ctx.base);
        let amplitude = self.amplitude * lerp(self.shelf_scale, 1.0, depth_weight);
        let n = self.fbm.sample(ctx.seed ^ self.salt, ctx.point.x, ctx.point.y);
        Some(Contribution::Perturb(amplitude * n))
    }
}

/// Sediment blanket that partly fills deep floors. Always raises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SedimentCover {
    pub name: String,
    pub fbm: Fbm,
    pub max_thickness: f64,
    /// Base depth where sediment starts to accumulate.
    pub onset_depth: f64,
    /// Base depth where thickness reaches its maximum.
    pub full_depth: f64,
    #[serde(default)]
    pub salt: u64,
}

impl SedimentCover {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !self.fbm.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid fbm parameters"));
        }
        if !(self.max_thickness.is_finite() && self.max_thickness >= 0.0) {
            return Err(TerrainError::malformed(&self.name, "thickness must be non-negative"));
        }
        if !(self.full_depth < self.onset_depth) {
            return Err(TerrainError::malformed(&self.name, "full depth must lie below onset depth"));
        }
        Ok(())
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let weight = smoothstep(self.onset_depth, self.full_depth, ctx.base);
        if weight <= 0.0 {
            return None;
        }
        let n = self.fbm.sample(ctx.seed ^ self.salt, ctx.point.x, ctx.point.y);
        Some(Contribution::Perturb(self.max_thickness * weight * (0.5 + 0.5 * n)))
    }
}
