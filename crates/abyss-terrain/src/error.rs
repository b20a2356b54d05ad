//! Construction-time terrain errors.
//!
//! Runtime queries never fail; these only surface while a world is being
//! configured.

use abyss_core::config::ConfigError;
use abyss_core::enums::GeologicalProvince;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid feature JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("province map has no bands")]
    EmptyProvinceMap,
    #[error("province bands cover [{start}, {end}) but the world spans [-{extent}, {extent}]")]
    ProvinceCoverage { start: f64, end: f64, extent: f64 },
    #[error("{province:?} band is empty or inverted: [{z_start}, {z_end})")]
    DegenerateBand {
        province: GeologicalProvince,
        z_start: f64,
        z_end: f64,
    },
    #[error("gap or overlap between {lower:?} and {upper:?} near z = {z}")]
    ProvinceGap {
        lower: GeologicalProvince,
        upper: GeologicalProvince,
        z: f64,
    },
    #[error("depth step of {step} m between {lower:?} and {upper:?} exceeds {tolerance} m")]
    ProvinceDiscontinuity {
        lower: GeologicalProvince,
        upper: GeologicalProvince,
        step: f64,
        tolerance: f64,
    },
    #[error("feature set needs exactly one zone feature, found {0}")]
    ZoneCount(usize),
    #[error("feature '{name}' is malformed: {reason}")]
    MalformedFeature { name: String, reason: String },
}

impl TerrainError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        TerrainError::MalformedFeature {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
