//! Sonar ping state machine.
//!
//! `Passive` until `activate_ping`, then a full-visibility window followed
//! by a linear fade, then back to `Passive`. Everything is a function of
//! the elapsed time since the latest ping, sampled once per `advance`.

use tracing::{info, warn};

use abyss_core::config::SonarConfig;
use abyss_core::enums::{SensorMode, SonarPhase};
use abyss_core::events::SonarEvent;
use abyss_core::state::SensorState;

#[derive(Debug, Clone)]
pub struct SonarPing {
    config: SonarConfig,
    state: SensorState,
    /// Largest elapsed time seen for the current ping. Elapsed never goes below it.
    last_elapsed: f64,
    last_now: Option<f64>,
    events: Vec<SonarEvent>,
}

impl SonarPing {
    pub fn new(config: SonarConfig) -> Self {
        Self {
            state: SensorState::passive(&config),
            config,
            last_elapsed: 0.0,
            last_now: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SonarConfig {
        &self.config
    }

    pub fn state(&self) -> &SensorState {
        &self.state
    }

    pub fn phase(&self) -> SonarPhase {
        self.state.phase
    }

    /// Trigger a ping, or restart the one in flight.
    pub fn activate_ping(&mut self, now: f64) {
        if !now.is_finite() {
            warn!(now, "ignoring ping with non-finite timestamp");
            return;
        }
        let start = match self.last_now {
            Some(last) if now < last => {
                warn!(now, last, "ping timestamp is behind the last tick; starting it at the last tick");
                last
            }
            _ => now,
        };
        let restarted = self.state.mode == SensorMode::ActivePing;
        self.state = SensorState {
            mode: SensorMode::ActivePing,
            phase: SonarPhase::FullVisibility,
            ping_start_secs: Some(start),
            current_radius: self.config.active_range,
            current_opacity: 1.0,
        };
        self.last_elapsed = 0.0;
        self.events.push(SonarEvent::PingStarted {
            at_secs: start,
            restarted,
        });
        info!(start, restarted, "active sonar ping");
    }

    /// Advance to `now`. Returns the events raised since the last call.
    pub fn advance(&mut self, now: f64) -> Vec<SonarEvent> {
        if let Some(start) = self.state.ping_start_secs {
            self.advance_ping(start, now);
        } else {
            self.state = SensorState::passive(&self.config);
        }
        if now.is_finite() {
            self.last_now = Some(now);
        }
        std::mem::take(&mut self.events)
    }

    fn advance_ping(&mut self, start: f64, now: f64) {
        let raw = now - start;
        if raw.is_nan() || raw < self.last_elapsed {
            warn!(now, start, raw, "sonar clock regression; holding elapsed time");
        }
        let elapsed = raw.max(self.last_elapsed);
        self.last_elapsed = elapsed;

        let full = self.config.full_visibility_secs;
        let lifetime = self.config.ping_lifetime_secs();

        if elapsed <= full {
            self.state.phase = SonarPhase::FullVisibility;
            self.state.current_opacity = 1.0;
        } else if elapsed <= lifetime {
            if self.state.phase != SonarPhase::Fading {
                self.events.push(SonarEvent::FadeStarted {
                    at_secs: start + full,
                });
            }
            self.state.phase = SonarPhase::Fading;
            self.state.current_opacity = 1.0 - (elapsed - full) / self.config.fade_secs;
        } else {
            self.events.push(SonarEvent::PingExpired {
                at_secs: start + lifetime,
            });
            self.state = SensorState::passive(&self.config);
            self.last_elapsed = 0.0;
            info!(now, "active sonar ping expired");
            return;
        }
        self.state.current_radius = self.config.active_range;
    }

    /// Seconds until the current ping expires, if one is in flight.
    pub fn remaining_secs(&self) -> Option<f64> {
        self.state
            .ping_start_secs
            .map(|_| (self.config.ping_lifetime_secs() - self.last_elapsed).max(0.0))
    }
}
