//! World and sonar configuration.
//!
//! Defaults come from `constants.rs`. Designers may override any subset
//! through JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("sample spacing {spacing} does not evenly divide chunk size {chunk_size}")]
    SpacingDoesNotDivide { chunk_size: f64, spacing: f64 },
    #[error("depth bounds inverted: min {min} is not below max {max}")]
    InvertedDepthBounds { min: f64, max: f64 },
    #[error("fallback depth {depth} lies outside [{min}, {max}]")]
    FallbackOutOfBounds { depth: f64, min: f64, max: f64 },
    #[error("active sonar range {active} is shorter than passive range {passive}")]
    SonarRangeOrder { passive: f64, active: f64 },
    #[error("blind-spot half angle {0} must lie within [0, pi]")]
    BlindSpotAngle(f64),
    #[error("extent {extent} at chunk size {chunk_size} needs {per_axis} chunks per axis (limit {limit})")]
    TooManyChunks {
        extent: f64,
        chunk_size: f64,
        per_axis: f64,
        limit: usize,
    },
    #[error("chunk size {chunk_size} at spacing {spacing} needs {per_axis} samples per axis (limit {limit})")]
    TooManySamples {
        chunk_size: f64,
        spacing: f64,
        per_axis: f64,
        limit: usize,
    },
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Terrain world parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for coordinate-hashed noise and the reference feature layout.
    pub seed: u64,
    /// Half-width of the world in meters.
    pub extent: f64,
    /// Chunk side length in meters.
    pub chunk_size: f64,
    /// Distance between height samples in meters. Must divide `chunk_size`.
    pub sample_spacing: f64,
    pub min_depth: f64,
    pub max_depth: f64,
    /// Depth returned for queries outside the world extent.
    pub out_of_bounds_depth: f64,
    /// Largest allowed depth step across a province boundary.
    pub continuity_tolerance: f64,
    /// Queued chunks materialized per tick.
    pub generation_budget_per_tick: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_WORLD_SEED,
            extent: WORLD_EXTENT,
            chunk_size: CHUNK_SIZE,
            sample_spacing: SAMPLE_SPACING,
            min_depth: MIN_DEPTH,
            max_depth: MAX_DEPTH,
            out_of_bounds_depth: OUT_OF_BOUNDS_DEPTH,
            continuity_tolerance: CONTINUITY_TOLERANCE,
            generation_budget_per_tick: GENERATION_BUDGET_PER_TICK,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("extent", self.extent)?;
        require_positive("chunk_size", self.chunk_size)?;
        require_positive("sample_spacing", self.sample_spacing)?;
        require_positive("continuity_tolerance", self.continuity_tolerance)?;

        let chunks_per_axis = 2.0 * (self.extent / self.chunk_size).ceil();
        if chunks_per_axis > MAX_CHUNKS_PER_AXIS as f64 {
            return Err(ConfigError::TooManyChunks {
                extent: self.extent,
                chunk_size: self.chunk_size,
                per_axis: chunks_per_axis,
                limit: MAX_CHUNKS_PER_AXIS,
            });
        }

        let steps = self.chunk_size / self.sample_spacing;
        if steps.round() + 1.0 > MAX_SAMPLES_PER_AXIS as f64 {
            return Err(ConfigError::TooManySamples {
                chunk_size: self.chunk_size,
                spacing: self.sample_spacing,
                per_axis: steps.round() + 1.0,
                limit: MAX_SAMPLES_PER_AXIS,
            });
        }
        if (steps - steps.round()).abs() > 1e-9 || steps.round() < 1.0 {
            return Err(ConfigError::SpacingDoesNotDivide {
                chunk_size: self.chunk_size,
                spacing: self.sample_spacing,
            });
        }

        if !(self.min_depth.is_finite() && self.max_depth.is_finite())
            || self.min_depth >= self.max_depth
        {
            return Err(ConfigError::InvertedDepthBounds {
                min: self.min_depth,
                max: self.max_depth,
            });
        }

        let fallback = self.out_of_bounds_depth;
        if !(fallback >= self.min_depth && fallback <= self.max_depth) {
            return Err(ConfigError::FallbackOutOfBounds {
                depth: fallback,
                min: self.min_depth,
                max: self.max_depth,
            });
        }

        Ok(())
    }

    /// Number of height samples along one chunk axis (both edges included).
    pub fn samples_per_axis(&self) -> usize {
        (self.chunk_size / self.sample_spacing).round() as usize + 1
    }
}

/// Sonar sensing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarConfig {
    pub passive_range: f64,
    pub active_range: f64,
    pub full_visibility_secs: f64,
    pub fade_secs: f64,
    /// Rear blind-spot half angle in radians, measured from directly astern.
    pub blind_spot_half_angle: f64,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            passive_range: PASSIVE_RANGE,
            active_range: ACTIVE_SONAR_RANGE,
            full_visibility_secs: FULL_VISIBILITY_SECS,
            fade_secs: FADE_SECS,
            blind_spot_half_angle: BLIND_SPOT_HALF_ANGLE,
        }
    }
}

impl SonarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("passive_range", self.passive_range)?;
        require_positive("active_range", self.active_range)?;
        require_positive("full_visibility_secs", self.full_visibility_secs)?;
        require_positive("fade_secs", self.fade_secs)?;

        if self.active_range < self.passive_range {
            return Err(ConfigError::SonarRangeOrder {
                passive: self.passive_range,
                active: self.active_range,
            });
        }

        let angle = self.blind_spot_half_angle;
        if !(0.0..=std::f64::consts::PI).contains(&angle) {
            return Err(ConfigError::BlindSpotAngle(angle));
        }

        Ok(())
    }

    /// Total lifetime of one ping (full window plus fade).
    pub fn ping_lifetime_secs(&self) -> f64 {
        self.full_visibility_secs + self.fade_secs
    }
}

/// Complete configuration of the terrain service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub world: WorldConfig,
    pub sonar: SonarConfig,
}

impl ServiceConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.sonar.validate()
    }
}
