//! Geological provinces: the base-depth layer of the height field.
//!
//! Provinces are banded along z. The shelf sits against the northern edge
//! and the trench against the southern edge. Each band eases between its
//! edge depths, and adjacent bands must agree at their shared boundary, so
//! the base depth is continuous across the whole world.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use abyss_core::enums::GeologicalProvince;

use crate::error::TerrainError;
use crate::noise::{lerp, smoothstep, Fbm};

/// Salt mixed into the world seed for band undulation.
const UNDULATION_SALT: u64 = 0x00B5_A11D;

const UNDULATION_NOISE: Fbm = Fbm {
    octaves: 3,
    wavelength: 9_000.0,
    lacunarity: 2.0,
    persistence: 0.5,
};

/// One province band, half-open along z: `[z_start, z_end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceBand {
    pub province: GeologicalProvince,
    pub z_start: f64,
    pub z_end: f64,
    /// Base depth at `z_start`.
    pub depth_start: f64,
    /// Base depth at `z_end`.
    pub depth_end: f64,
    /// Amplitude of low-frequency undulation (meters). Vanishes at the band edges.
    #[serde(default)]
    pub undulation: f64,
}

impl ProvinceBand {
    pub fn contains(&self, z: f64) -> bool {
        z >= self.z_start && z < self.z_end
    }

    /// Base depth inside this band. Coordinates beyond the band are clamped to its edges.
    pub fn depth_at(&self, seed: u64, x: f64, z: f64) -> f64 {
        let t = ((z - self.z_start) / (self.z_end - self.z_start)).clamp(0.0, 1.0);
        let depth = lerp(self.depth_start, self.depth_end, smoothstep(0.0, 1.0, t));
        if self.undulation == 0.0 {
            return depth;
        }
        let taper = (PI * t).sin();
        depth + self.undulation * taper * UNDULATION_NOISE.sample(seed ^ UNDULATION_SALT, x, z)
    }
}

/// Total, non-overlapping partition of the world into province bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceMap {
    bands: Vec<ProvinceBand>,
}

impl ProvinceMap {
    /// Build and validate a province map covering `[-extent, extent]`.
    pub fn new(
        bands: Vec<ProvinceBand>,
        extent: f64,
        tolerance: f64,
    ) -> Result<Self, TerrainError> {
        let mut map = Self { bands };
        map.bands.sort_by(|a, b| a.z_start.total_cmp(&b.z_start));
        map.validate(extent, tolerance)?;
        Ok(map)
    }

    /// Reference layout: trench to the south, shelf to the north.
    /// Boundaries scale with the world extent.
    pub fn reference(extent: f64) -> Self {
        let s = extent / 35_000.0;
        let band = |province, z_start: f64, z_end: f64, depth_start, depth_end, undulation| {
            ProvinceBand {
                province,
                z_start: z_start * s,
                z_end: z_end * s,
                depth_start,
                depth_end,
                undulation,
            }
        };
        Self {
            bands: vec![
                band(GeologicalProvince::Trench, -35_000.0, -26_000.0, -7_600.0, -4_300.0, 150.0),
                band(GeologicalProvince::AbyssalPlain, -26_000.0, 4_000.0, -4_300.0, -3_900.0, 120.0),
                band(GeologicalProvince::ContinentalSlope, 4_000.0, 20_000.0, -3_900.0, -200.0, 60.0),
                band(GeologicalProvince::ContinentalShelf, 20_000.0, 35_000.0, -200.0, -40.0, 15.0),
            ],
        }
    }

    /// Check coverage, contiguity and boundary continuity.
    pub fn validate(&self, extent: f64, tolerance: f64) -> Result<(), TerrainError> {
        let (first, last) = match (self.bands.first(), self.bands.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(TerrainError::EmptyProvinceMap),
        };

        for band in &self.bands {
            let finite = [band.z_start, band.z_end, band.depth_start, band.depth_end, band.undulation]
                .iter()
                .all(|v| v.is_finite());
            if !finite || band.z_end <= band.z_start || band.undulation < 0.0 {
                return Err(TerrainError::DegenerateBand {
                    province: band.province,
                    z_start: band.z_start,
                    z_end: band.z_end,
                });
            }
        }

        if first.z_start > -extent || last.z_end < extent {
            return Err(TerrainError::ProvinceCoverage {
                start: first.z_start,
                end: last.z_end,
                extent,
            });
        }

        for pair in self.bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if (lower.z_end - upper.z_start).abs() > 1e-6 {
                return Err(TerrainError::ProvinceGap {
                    lower: lower.province,
                    upper: upper.province,
                    z: lower.z_end,
                });
            }
            let step = (lower.depth_end - upper.depth_start).abs();
            if step > tolerance {
                return Err(TerrainError::ProvinceDiscontinuity {
                    lower: lower.province,
                    upper: upper.province,
                    step,
                    tolerance,
                });
            }
        }

        Ok(())
    }

    pub fn bands(&self) -> &[ProvinceBand] {
        &self.bands
    }

    /// Interior boundaries (z values where one band hands over to the next).
    pub fn boundaries(&self) -> impl Iterator<Item = f64> + '_ {
        self.bands.windows(2).map(|pair| pair[1].z_start)
    }

    /// The band owning `z`. Coordinates beyond either end fall to the end band.
    pub fn band_at(&self, z: f64) -> &ProvinceBand {
        let idx = self.bands.partition_point(|b| b.z_start <= z);
        &self.bands[idx.saturating_sub(1)]
    }

    pub fn province_at(&self, z: f64) -> GeologicalProvince {
        self.band_at(z).province
    }

    /// Province and base depth at a coordinate.
    pub fn base_depth(&self, seed: u64, x: f64, z: f64) -> (GeologicalProvince, f64) {
        let band = self.band_at(z);
        (band.province, band.depth_at(seed, x, z))
    }
}
