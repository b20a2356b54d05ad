//! Default world and sonar tuning parameters.

use std::f64::consts::PI;

// --- World ---

/// Default world seed for coordinate-hashed noise and the reference layout.
pub const DEFAULT_WORLD_SEED: u64 = 0x5EA_F100;

/// Half-width of the square world in meters (the world spans ±extent per axis).
pub const WORLD_EXTENT: f64 = 35_000.0;

/// Side length of one terrain chunk in meters.
pub const CHUNK_SIZE: f64 = 1_000.0;

/// Distance between height samples inside a chunk (meters).
pub const SAMPLE_SPACING: f64 = 50.0;

/// Deepest depth any height sample may take (meters, negative below sea level).
pub const MIN_DEPTH: f64 = -11_000.0;

/// Shallowest depth any height sample may take (meters).
pub const MAX_DEPTH: f64 = -5.0;

/// Depth reported for coordinates outside the world extent.
pub const OUT_OF_BOUNDS_DEPTH: f64 = -4_000.0;

/// Largest allowed depth jump across a province boundary (meters).
pub const CONTINUITY_TOLERANCE: f64 = 50.0;

/// Queued chunks materialized per tick.
pub const GENERATION_BUDGET_PER_TICK: usize = 4;

/// Largest chunk count along one grid axis (`2 * ceil(extent / chunk_size)`).
pub const MAX_CHUNKS_PER_AXIS: usize = 1_024;

/// Largest sample count along one chunk axis, both edges included.
pub const MAX_SAMPLES_PER_AXIS: usize = 1_025;

// --- Sonar ---

/// Always-on passive listening radius (meters).
pub const PASSIVE_RANGE: f64 = 500.0;

/// Active ping radius (meters).
pub const ACTIVE_SONAR_RANGE: f64 = 6_000.0;

/// Seconds an active ping keeps full opacity.
pub const FULL_VISIBILITY_SECS: f64 = 30.0;

/// Seconds of linear fade after the full-visibility window.
pub const FADE_SECS: f64 = 10.0;

/// Half angle of the rear blind-spot cone, measured from directly astern (radians).
pub const BLIND_SPOT_HALF_ANGLE: f64 = PI / 4.0;
