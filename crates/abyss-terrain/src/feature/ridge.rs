//! Submarine ridges: raised crests along a poly-line.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::feature::shape::{nearest_on_path, path_bounds, Falloff};
use crate::feature::{Contribution, SampleContext};
use crate::noise::lerp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ridge {
    pub name: String,
    pub crest: Vec<DVec2>,
    /// Crest depth per vertex (meters, negative).
    pub crest_depths: Vec<f64>,
    pub half_width: f64,
    pub falloff: Falloff,
}

impl Ridge {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.crest.len() < 2 {
            return Err(TerrainError::malformed(&self.name, "ridge crest needs two or more vertices"));
        }
        if self.crest_depths.len() != self.crest.len() {
            return Err(TerrainError::malformed(&self.name, "one crest depth per vertex"));
        }
        if !self.crest.iter().all(|p| p.is_finite()) || !self.crest_depths.iter().all(|d| d.is_finite()) {
            return Err(TerrainError::malformed(&self.name, "non-finite crest"));
        }
        if !(self.half_width.is_finite() && self.half_width > 0.0) || !self.falloff.is_valid() {
            return Err(TerrainError::malformed(&self.name, "invalid half width or falloff"));
        }
        Ok(())
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let (min, max) = path_bounds(&self.crest, self.half_width);
        let p = ctx.point;
        if p.x < min.x || p.y < min.y || p.x > max.x || p.y > max.y {
            return None;
        }
        let probe = nearest_on_path(&self.crest, p)?;
        let t = probe.distance / self.half_width;
        if t >= 1.0 {
            return None;
        }
        let crest = probe.interpolate(&self.crest_depths);
        Some(Contribution::Raise(lerp(ctx.base, crest, self.falloff.weight(t))))
    }
}
