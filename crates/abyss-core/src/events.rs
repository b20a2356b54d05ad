//! Events emitted by the sensor core for audio and UI feedback.

use serde::{Deserialize, Serialize};

/// Sonar lifecycle events, drained once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SonarEvent {
    /// Active ping triggered. `restarted` is true if a ping was already in flight.
    PingStarted { at_secs: f64, restarted: bool },
    /// Full-visibility window ended, fade begins.
    FadeStarted { at_secs: f64 },
    /// Fade finished, sensor back to passive.
    PingExpired { at_secs: f64 },
}
