//! Sensor and visibility state, and the snapshot returned by each tick.

use serde::{Deserialize, Serialize};

use crate::config::SonarConfig;
use crate::enums::{SensorMode, SonarPhase};
use crate::events::SonarEvent;
use crate::types::{ChunkKey, SimTime};

/// Process-wide sensing state owned by the sonar ping state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub mode: SensorMode,
    pub phase: SonarPhase,
    /// Timestamp of the latest `activate_ping`, if any ping is in flight.
    pub ping_start_secs: Option<f64>,
    /// Current sensing radius in meters.
    pub current_radius: f64,
    /// Current opacity multiplier in [0, 1].
    pub current_opacity: f64,
}

impl SensorState {
    /// Resting passive state.
    pub fn passive(config: &SonarConfig) -> Self {
        Self {
            mode: SensorMode::Passive,
            phase: SonarPhase::Passive,
            ping_start_secs: None,
            current_radius: config.passive_range,
            current_opacity: 1.0,
        }
    }
}

/// Visibility record of a single chunk. Written only by the visibility controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkVisibility {
    pub is_visible: bool,
    /// Opacity in [0, 1]; 0 while hidden.
    pub opacity: f64,
}

impl ChunkVisibility {
    pub const HIDDEN: ChunkVisibility = ChunkVisibility {
        is_visible: false,
        opacity: 0.0,
    };
}

/// State broadcast to collaborators after each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub time: SimTime,
    pub sensor: SensorState,
    /// Keys of all chunks visible after this tick, in grid order.
    pub visible_chunks: Vec<ChunkKey>,
    pub events: Vec<SonarEvent>,
}
