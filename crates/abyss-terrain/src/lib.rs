//! Procedural bathymetry for ABYSS.
//!
//! Geological feature library, the height-field synthesizer that composes
//! it, and the lazily materialized chunk store sampling the result.

pub use abyss_core as core;

pub mod chunk;
pub mod error;
pub mod feature;
pub mod layout;
pub mod noise;
pub mod province;
pub mod synth;

// Re-export key types for convenience.
pub use chunk::{Chunk, ChunkGrid, ChunkStore};
pub use error::TerrainError;
pub use feature::{Contribution, Feature, FeatureSet, SampleContext, Stage};
pub use province::{ProvinceBand, ProvinceMap};
pub use synth::{HeightBreakdown, HeightField};

#[cfg(test)]
mod tests;
