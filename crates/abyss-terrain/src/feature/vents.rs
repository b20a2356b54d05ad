//! Hydrothermal vent fields: narrow towers scattered on a coarse cell grid.
//!
//! Each cell runs a hashed presence test; an occupied cell holds one tower
//! at a jittered position. Towers are narrow Gaussians windowed to zero at
//! three radii, and `validate` keeps that window inside one cell so only the
//! 3×3 neighbourhood of a query point needs checking. Towers stand on the
//! floor composed so far, so they rise above ridges and seamount flanks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::feature::{Contribution, SampleContext};
use crate::noise::{cell_unit, lerp, smoothstep};

const PRESENCE: u32 = 0;
const JITTER_X: u32 = 1;
const JITTER_Z: u32 = 2;
const HEIGHT: u32 = 3;
const RADIUS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentField {
    pub name: String,
    pub center: DVec2,
    /// Radius of the field; towers outside it are suppressed.
    pub radius: f64,
    /// Side length of a placement cell (meters).
    pub cell_size: f64,
    /// Probability that a cell holds a tower.
    pub density: f64,
    /// Tower height range above the floor (meters).
    pub tower_height: [f64; 2],
    /// Tower radius range (meters).
    pub tower_radius: [f64; 2],
    #[serde(default)]
    pub salt: u64,
}

/// One placed tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VentTower {
    pub position: DVec2,
    pub height: f64,
    pub radius: f64,
}

impl VentTower {
    /// Height above the floor at distance `d` from the tower axis.
    pub fn lift(&self, d: f64) -> f64 {
        let r = self.radius;
        self.height * (-(d / r).powi(2)).exp() * (1.0 - smoothstep(2.0 * r, 3.0 * r, d))
    }
}

impl VentField {
    pub fn validate(&self) -> Result<(), TerrainError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !(self.center.is_finite() && positive(self.radius) && positive(self.cell_size)) {
            return Err(TerrainError::malformed(&self.name, "invalid field geometry"));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(TerrainError::malformed(&self.name, "density must lie in [0, 1]"));
        }
        let [h0, h1] = self.tower_height;
        let [r0, r1] = self.tower_radius;
        if !(h0.is_finite() && h1.is_finite() && h0 >= 0.0 && h0 <= h1) {
            return Err(TerrainError::malformed(&self.name, "tower height range"));
        }
        if !(positive(r0) && r1.is_finite() && r0 <= r1) {
            return Err(TerrainError::malformed(&self.name, "tower radius range"));
        }
        if 3.0 * r1 > self.cell_size {
            return Err(TerrainError::malformed(
                &self.name,
                "towers must fit within one cell (3 × max radius <= cell size)",
            ));
        }
        Ok(())
    }

    /// Tower in cell `(ix, iz)`, if the presence test passes and it lies in the field.
    pub fn tower_in_cell(&self, seed: u64, ix: i64, iz: i64) -> Option<VentTower> {
        let seed = seed ^ self.salt;
        if cell_unit(seed, ix, iz, PRESENCE) >= self.density {
            return None;
        }
        let jx = 0.2 + 0.6 * cell_unit(seed, ix, iz, JITTER_X);
        let jz = 0.2 + 0.6 * cell_unit(seed, ix, iz, JITTER_Z);
        let position = DVec2::new((ix as f64 + jx) * self.cell_size, (iz as f64 + jz) * self.cell_size);
        if position.distance(self.center) > self.radius {
            return None;
        }
        Some(VentTower {
            position,
            height: lerp(self.tower_height[0], self.tower_height[1], cell_unit(seed, ix, iz, HEIGHT)),
            radius: lerp(self.tower_radius[0], self.tower_radius[1], cell_unit(seed, ix, iz, RADIUS)),
        })
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let p = ctx.point;
        if p.distance(self.center) > self.radius + self.cell_size {
            return None;
        }
        let ix = (p.x / self.cell_size).floor() as i64;
        let iz = (p.y / self.cell_size).floor() as i64;

        let mut lift: f64 = 0.0;
        for dz in -1..=1 {
            for dx in -1..=1 {
                if let Some(tower) = self.tower_in_cell(ctx.seed, ix + dx, iz + dz) {
                    lift = lift.max(tower.lift(p.distance(tower.position)));
                }
            }
        }
        (lift > 0.0).then(|| Contribution::Raise(ctx.floor + lift))
    }
}
