//! Enumeration types used throughout the terrain and sensor core.

use serde::{Deserialize, Serialize};

/// Large-scale geological zone with a characteristic depth range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeologicalProvince {
    ContinentalShelf,
    ContinentalSlope,
    AbyssalPlain,
    Trench,
}

impl GeologicalProvince {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            GeologicalProvince::ContinentalShelf => "continental shelf",
            GeologicalProvince::ContinentalSlope => "continental slope",
            GeologicalProvince::AbyssalPlain => "abyssal plain",
            GeologicalProvince::Trench => "trench",
        }
    }
}

/// Sensing mode of the observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorMode {
    /// Passive listening only.
    #[default]
    Passive,
    /// An active ping is in flight (full window or fading).
    ActivePing,
}

/// Finer-grained ping lifecycle phase for the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SonarPhase {
    #[default]
    Passive,
    /// Ping at full opacity.
    FullVisibility,
    /// Ping opacity decaying linearly to zero.
    Fading,
}
