//! Sensor visibility controller.
//!
//! Keeps one visibility record per grid slot and recomputes all of them
//! from scratch every tick. Only chunk centers are consulted, so no heights
//! are materialized to decide visibility.

use std::f64::consts::{PI, TAU};

use abyss_core::config::SonarConfig;
use abyss_core::enums::SensorMode;
use abyss_core::state::{ChunkVisibility, SensorState};
use abyss_core::types::{ChunkKey, Observer, WorldCoord};
use abyss_terrain::ChunkGrid;

/// True if `target` lies inside the rear cone of `half_angle` radians
/// centred directly astern of the observer.
pub fn in_blind_spot(observer: &Observer, target: &WorldCoord, half_angle: f64) -> bool {
    let bearing = observer.position.bearing_to(target);
    let relative = (bearing - observer.heading).rem_euclid(TAU);
    (relative - PI).abs() <= half_angle
}

/// Visibility of one chunk center for the current sensor state.
pub fn evaluate(
    observer: &Observer,
    center: &WorldCoord,
    sensor: &SensorState,
    config: &SonarConfig,
) -> ChunkVisibility {
    let distance = observer.position.distance_to(center);

    // Passive listening is unconditional.
    if distance <= config.passive_range {
        return ChunkVisibility {
            is_visible: true,
            opacity: 1.0,
        };
    }

    match sensor.mode {
        SensorMode::Passive => ChunkVisibility::HIDDEN,
        SensorMode::ActivePing => {
            let pinged = distance <= sensor.current_radius
                && sensor.current_opacity > 0.0
                && !in_blind_spot(observer, center, config.blind_spot_half_angle);
            if pinged {
                ChunkVisibility {
                    is_visible: true,
                    opacity: sensor.current_opacity,
                }
            } else {
                ChunkVisibility::HIDDEN
            }
        }
    }
}

/// Dense visibility records for every chunk of the grid.
#[derive(Debug, Clone)]
pub struct VisibilityMap {
    grid: ChunkGrid,
    keys: Vec<ChunkKey>,
    centers: Vec<WorldCoord>,
    records: Vec<ChunkVisibility>,
}

impl VisibilityMap {
    pub fn new(grid: &ChunkGrid) -> Self {
        let keys: Vec<ChunkKey> = grid.keys().collect();
        let centers = keys.iter().map(|k| grid.center(*k)).collect();
        Self {
            grid: grid.clone(),
            records: vec![ChunkVisibility::HIDDEN; keys.len()],
            keys,
            centers,
        }
    }

    /// Recompute every record. Returns the visible keys in grid order.
    pub fn update(
        &mut self,
        observer: &Observer,
        sensor: &SensorState,
        config: &SonarConfig,
    ) -> Vec<ChunkKey> {
        let mut visible = Vec::new();
        for (i, center) in self.centers.iter().enumerate() {
            let record = evaluate(observer, center, sensor, config);
            if record.is_visible {
                visible.push(self.keys[i]);
            }
            self.records[i] = record;
        }
        visible
    }

    /// Current record of a chunk. Hidden for keys outside the grid.
    pub fn get(&self, key: ChunkKey) -> ChunkVisibility {
        self.grid
            .slot(key)
            .map_or(ChunkVisibility::HIDDEN, |slot| self.records[slot])
    }

    pub fn visible_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_visible).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
