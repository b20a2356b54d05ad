//! TerrainService: the one handle collaborators hold.
//!
//! Owns the chunk store, the sonar state machine and the visibility map.
//! Constructed once at startup and passed by reference; nothing here is
//! global. Rendering reads heights and visibility through it, and the
//! simulation loop drives it with one `tick` per step.

use std::ops::RangeInclusive;

use tracing::{info, warn};

use abyss_core::config::ServiceConfig;
use abyss_core::enums::GeologicalProvince;
use abyss_core::state::{SensorSnapshot, SensorState};
use abyss_core::types::{ChunkBounds, ChunkKey, Observer, SimTime, WorldCoord};
use abyss_terrain::layout::default_features;
use abyss_terrain::{ChunkStore, FeatureSet, HeightField, TerrainError};

use crate::sonar::SonarPing;
use crate::visibility::VisibilityMap;

#[derive(Debug)]
pub struct TerrainService {
    config: ServiceConfig,
    store: ChunkStore,
    sonar: SonarPing,
    visibility: VisibilityMap,
    time: SimTime,
    observer: Observer,
    visible: Vec<ChunkKey>,
}

impl TerrainService {
    /// Service over the reference world layout.
    pub fn new(config: ServiceConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let features = default_features(&config.world);
        Self::with_features(config, features)
    }

    /// Service over a designer-supplied feature set.
    pub fn with_features(config: ServiceConfig, features: FeatureSet) -> Result<Self, TerrainError> {
        config.validate()?;
        let field = HeightField::new(features, &config.world)?;
        let store = ChunkStore::new(&config.world, field);
        let visibility = VisibilityMap::new(store.grid());
        info!(
            seed = config.world.seed,
            extent = config.world.extent,
            chunks = visibility.len(),
            features = store.field().features().len(),
            "terrain service ready"
        );
        Ok(Self {
            sonar: SonarPing::new(config.sonar.clone()),
            config,
            store,
            visibility,
            time: SimTime::default(),
            observer: Observer::default(),
            visible: Vec::new(),
        })
    }

    /// Parse a JSON configuration and build the reference world.
    pub fn from_json(json: &str) -> Result<Self, TerrainError> {
        Self::new(ServiceConfig::from_json(json)?)
    }

    // --- Boundary operations ---

    /// Depth at (x, z). Never fails; outside the world this is the fallback depth.
    pub fn height_at(&mut self, x: f64, z: f64) -> f64 {
        self.store.height_at(x, z)
    }

    /// Trigger or restart an active ping.
    pub fn active_sonar_ping(&mut self, now: f64) {
        self.sonar.activate_ping(now);
    }

    /// Advance the ping, recompute visibility for every chunk and spend
    /// this tick's generation budget on visible chunks, nearest first.
    pub fn tick(&mut self, now: f64, position: WorldCoord, heading: f64) -> SensorSnapshot {
        let events = self.sonar.advance(now);

        let heading = if heading.is_finite() {
            heading
        } else {
            warn!(heading, "non-finite observer heading; using north");
            0.0
        };
        self.observer = Observer::new(position, heading);

        self.visible = self
            .visibility
            .update(&self.observer, self.sonar.state(), self.sonar.config());

        let grid = self.store.grid();
        let mut by_distance: Vec<(f64, ChunkKey)> = self
            .visible
            .iter()
            .map(|k| (position.distance_to(&grid.center(*k)), *k))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, key) in by_distance {
            self.store.request(key);
        }
        self.store.drain(self.config.world.generation_budget_per_tick);

        self.time.advance(now);

        SensorSnapshot {
            time: self.time,
            sensor: *self.sonar.state(),
            visible_chunks: self.visible.clone(),
            events,
        }
    }

    /// (is_visible, opacity) of a chunk after the latest tick.
    pub fn is_chunk_visible(&self, cx: i32, cz: i32) -> (bool, f64) {
        let record = self.visibility.get(ChunkKey::new(cx, cz));
        (record.is_visible, record.opacity)
    }

    /// World rectangle of a chunk, or None outside the grid.
    pub fn chunk_bounds(&self, cx: i32, cz: i32) -> Option<ChunkBounds> {
        let key = ChunkKey::new(cx, cz);
        let grid = self.store.grid();
        grid.contains(key).then(|| grid.bounds(key))
    }

    pub fn chunk_size(&self) -> f64 {
        self.store.grid().chunk_size()
    }

    pub fn sample_spacing(&self) -> f64 {
        self.store.grid().sample_spacing()
    }

    pub fn samples_per_axis(&self) -> usize {
        self.store.grid().samples_per_axis()
    }

    /// Valid chunk indices along either axis.
    pub fn grid_range(&self) -> RangeInclusive<i32> {
        self.store.grid().index_range()
    }

    // --- Read-only views ---

    /// Cached height samples of a chunk, generating them if needed.
    /// Row-major by z, `samples_per_axis()` per row.
    pub fn chunk_samples(&mut self, cx: i32, cz: i32) -> Option<&[f64]> {
        self.store.get_chunk(cx, cz).map(|chunk| chunk.samples())
    }

    pub fn sensor(&self) -> &SensorState {
        self.sonar.state()
    }

    pub fn visible_chunks(&self) -> &[ChunkKey] {
        &self.visible
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Province at (x, z), or None outside the world extent.
    pub fn province_at(&self, x: f64, z: f64) -> Option<GeologicalProvince> {
        WorldCoord::new(x, z)
            .within_extent(self.config.world.extent)
            .then(|| self.store.field().province_at(x, z))
    }

    pub fn cached_chunks(&self) -> usize {
        self.store.cached_count()
    }

    pub fn pending_chunks(&self) -> usize {
        self.store.pending_count()
    }
}
