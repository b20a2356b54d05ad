//! Fundamental geometric and simulation types.

use serde::{Deserialize, Serialize};

/// Planar world position in meters.
/// x = East, z = North. Depth is carried separately as a negative `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: f64,
    pub z: f64,
}

impl WorldCoord {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Planar distance to another coordinate in meters.
    pub fn distance_to(&self, other: &WorldCoord) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Bearing to another coordinate in radians (0 = +z / North, clockwise).
    pub fn bearing_to(&self, other: &WorldCoord) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx.atan2(dz).rem_euclid(std::f64::consts::TAU)
    }

    /// True if both axes lie within `[-extent, extent]`.
    pub fn within_extent(&self, extent: f64) -> bool {
        self.x.abs() <= extent && self.z.abs() <= extent
    }
}

/// Integer grid indices of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkKey {
    pub fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }
}

/// Axis-aligned world rectangle covered by a chunk.
/// Half-open: `[min_x, max_x) × [min_z, max_z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkBounds {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl ChunkBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    pub fn center(&self) -> WorldCoord {
        WorldCoord::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    pub fn contains(&self, p: &WorldCoord) -> bool {
        p.x >= self.min_x && p.x < self.max_x && p.z >= self.min_z && p.z < self.max_z
    }
}

/// Observer pose fed to the visibility controller each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub position: WorldCoord,
    /// Heading in radians (0 = +z / North, clockwise).
    pub heading: f64,
}

impl Observer {
    pub fn new(position: WorldCoord, heading: f64) -> Self {
        Self { position, heading }
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of ticks processed so far.
    pub tick: u64,
    /// Timestamp of the latest tick in seconds.
    pub now_secs: f64,
}

impl SimTime {
    /// Record a processed tick at `now`.
    pub fn advance(&mut self, now: f64) {
        self.tick += 1;
        self.now_secs = now;
    }
}
