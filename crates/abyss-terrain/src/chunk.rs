//! Chunk grid and the lazily materialized chunk store.
//!
//! The world `[-extent, extent]²` is tiled by square chunks keyed by integer
//! indices. Chunk `(cx, cz)` covers `[cx·size, (cx+1)·size)` on x and the
//! same on z. Samples include the far edge, so neighbouring chunks share
//! their seam samples and bilinear lookups are continuous across chunks.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::RangeInclusive;

use tracing::{debug, warn};

use abyss_core::config::WorldConfig;
use abyss_core::types::{ChunkBounds, ChunkKey, WorldCoord};

use crate::synth::HeightField;

/// Geometry of the chunk grid. Holds no heights.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGrid {
    extent: f64,
    chunk_size: f64,
    spacing: f64,
    samples_per_axis: usize,
    /// Chunks on each side of the origin along one axis.
    half_count: i32,
}

impl ChunkGrid {
    pub fn new(world: &WorldConfig) -> Self {
        Self {
            extent: world.extent,
            chunk_size: world.chunk_size,
            spacing: world.sample_spacing,
            samples_per_axis: world.samples_per_axis(),
            half_count: (world.extent / world.chunk_size).ceil() as i32,
        }
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    pub fn sample_spacing(&self) -> f64 {
        self.spacing
    }

    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    /// Valid chunk indices along either axis.
    pub fn index_range(&self) -> RangeInclusive<i32> {
        -self.half_count..=self.half_count - 1
    }

    /// Chunks along one axis.
    pub fn axis_count(&self) -> usize {
        (2 * self.half_count) as usize
    }

    pub fn chunk_count(&self) -> usize {
        self.axis_count() * self.axis_count()
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        let range = self.index_range();
        range.contains(&key.cx) && range.contains(&key.cz)
    }

    /// Key of the chunk owning (x, z), or None outside the world extent.
    /// Points on the positive edge of the extent belong to the last chunk.
    pub fn key_at(&self, x: f64, z: f64) -> Option<ChunkKey> {
        if !WorldCoord::new(x, z).within_extent(self.extent) {
            return None;
        }
        let (lo, hi) = (-self.half_count, self.half_count - 1);
        let index = |v: f64| ((v / self.chunk_size).floor() as i32).clamp(lo, hi);
        Some(ChunkKey::new(index(x), index(z)))
    }

    pub fn bounds(&self, key: ChunkKey) -> ChunkBounds {
        let min_x = key.cx as f64 * self.chunk_size;
        let min_z = key.cz as f64 * self.chunk_size;
        ChunkBounds {
            min_x,
            min_z,
            max_x: min_x + self.chunk_size,
            max_z: min_z + self.chunk_size,
        }
    }

    pub fn center(&self, key: ChunkKey) -> WorldCoord {
        self.bounds(key).center()
    }

    /// Dense index of a key, row-major with z outer. None outside the grid.
    pub fn slot(&self, key: ChunkKey) -> Option<usize> {
        if !self.contains(key) {
            return None;
        }
        let row = (key.cz + self.half_count) as usize;
        let col = (key.cx + self.half_count) as usize;
        Some(row * self.axis_count() + col)
    }

    /// Every key in slot order.
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.index_range()
            .flat_map(move |cz| self.index_range().map(move |cx| ChunkKey::new(cx, cz)))
    }
}

/// One materialized chunk. Samples never change after generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub key: ChunkKey,
    pub bounds: ChunkBounds,
    samples_per_axis: usize,
    spacing: f64,
    /// Depths, row-major: row = z step from `min_z`, column = x step from `min_x`.
    samples: Vec<f64>,
}

impl Chunk {
    /// Sample the height field over the chunk's sub-grid.
    pub fn generate(grid: &ChunkGrid, key: ChunkKey, field: &HeightField) -> Self {
        let bounds = grid.bounds(key);
        let n = grid.samples_per_axis();
        let spacing = grid.sample_spacing();
        let mut samples = Vec::with_capacity(n * n);
        for row in 0..n {
            let z = bounds.min_z + row as f64 * spacing;
            for col in 0..n {
                let x = bounds.min_x + col as f64 * spacing;
                samples.push(field.height(x, z));
            }
        }
        Self {
            key,
            bounds,
            samples_per_axis: n,
            spacing,
            samples,
        }
    }

    pub fn center(&self) -> WorldCoord {
        self.bounds.center()
    }

    pub fn samples_per_axis(&self) -> usize {
        self.samples_per_axis
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Raw sample at integer grid coordinates. Out-of-range indices clamp to the edge.
    pub fn sample(&self, row: usize, col: usize) -> f64 {
        let last = self.samples_per_axis - 1;
        self.samples[row.min(last) * self.samples_per_axis + col.min(last)]
    }

    /// Depth at a world coordinate by bilinear interpolation of cached samples.
    /// Coordinates outside the chunk clamp to its edge.
    pub fn interpolate(&self, x: f64, z: f64) -> f64 {
        let last = (self.samples_per_axis - 1) as f64;
        let col = ((x - self.bounds.min_x) / self.spacing).clamp(0.0, last);
        let row = ((z - self.bounds.min_z) / self.spacing).clamp(0.0, last);
        self.bilinear(row, col)
    }

    fn bilinear(&self, row: f64, col: f64) -> f64 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = r0 + 1;
        let c1 = c0 + 1;

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.sample(r0, c0);
        let e01 = self.sample(r0, c1);
        let e10 = self.sample(r1, c0);
        let e11 = self.sample(r1, c1);

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        top * (1.0 - fr) + bot * fr
    }
}

/// Cache of materialized chunks plus a queue for budgeted generation.
#[derive(Debug)]
pub struct ChunkStore {
    grid: ChunkGrid,
    field: HeightField,
    chunks: HashMap<ChunkKey, Chunk>,
    pending: VecDeque<ChunkKey>,
    queued: HashSet<ChunkKey>,
    fallback: f64,
}

impl ChunkStore {
    pub fn new(world: &WorldConfig, field: HeightField) -> Self {
        Self {
            grid: ChunkGrid::new(world),
            field,
            chunks: HashMap::new(),
            pending: VecDeque::new(),
            queued: HashSet::new(),
            fallback: world.out_of_bounds_depth,
        }
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn fallback_depth(&self) -> f64 {
        self.fallback
    }

    /// The chunk at (cx, cz), generated on first access. None outside the grid.
    pub fn get_chunk(&mut self, cx: i32, cz: i32) -> Option<&Chunk> {
        let key = ChunkKey::new(cx, cz);
        if !self.grid.contains(key) {
            warn!(cx, cz, "chunk requested outside the world grid");
            return None;
        }
        let grid = &self.grid;
        let field = &self.field;
        Some(self.chunks.entry(key).or_insert_with(|| {
            debug!(cx, cz, "materializing chunk");
            Chunk::generate(grid, key, field)
        }))
    }

    /// Cached chunk, without generating.
    pub fn cached(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    pub fn is_cached(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    /// Depth at (x, z) interpolated from the owning chunk's cached samples.
    /// Outside the world extent this is the fallback depth.
    pub fn height_at(&mut self, x: f64, z: f64) -> f64 {
        if !(x.is_finite() && z.is_finite()) {
            return self.fallback;
        }
        let Some(key) = self.grid.key_at(x, z) else {
            return self.fallback;
        };
        match self.get_chunk(key.cx, key.cz) {
            Some(chunk) => chunk.interpolate(x, z),
            None => self.fallback,
        }
    }

    /// Queue a chunk for budgeted generation. Returns false if the key is
    /// outside the grid, already cached or already queued.
    pub fn request(&mut self, key: ChunkKey) -> bool {
        if !self.grid.contains(key) || self.chunks.contains_key(&key) || !self.queued.insert(key) {
            return false;
        }
        self.pending.push_back(key);
        true
    }

    /// Materialize up to `budget` queued chunks in request order. Returns how many were generated.
    pub fn drain(&mut self, budget: usize) -> usize {
        let mut generated = 0;
        while generated < budget {
            let Some(key) = self.pending.pop_front() else {
                break;
            };
            self.queued.remove(&key);
            if self.chunks.contains_key(&key) {
                continue;
            }
            self.get_chunk(key.cx, key.cz);
            generated += 1;
        }
        if generated > 0 {
            debug!(generated, remaining = self.pending.len(), "drained chunk queue");
        }
        generated
    }

    pub fn cached_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
