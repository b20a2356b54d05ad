//! Sensing core for ABYSS.
//!
//! Owns the sonar ping state machine, the per-chunk visibility controller
//! and the `TerrainService` that collaborators hold instead of a global
//! terrain singleton. Completely headless, so every tick is reproducible
//! in tests.

pub mod service;
pub mod sonar;
pub mod visibility;

pub use abyss_core as core;
pub use abyss_terrain as terrain;
pub use service::TerrainService;

#[cfg(test)]
mod tests;
