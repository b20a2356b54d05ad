//! Coordinate-hashed value noise.
//!
//! Every value is a pure function of (seed, lattice cell, octave): there is
//! no generator state to advance, so any sample can be reproduced in
//! isolation and in any order.

use serde::{Deserialize, Serialize};

/// splitmix64 finalizer.
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash a lattice cell and octave under a seed.
pub fn hash2(seed: u64, ix: i64, iz: i64, octave: u32) -> u64 {
    let mut v = seed ^ (ix as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    v = v.wrapping_add((iz as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9));
    v = v.wrapping_add((octave as u64 + 1).wrapping_mul(0x94D0_49BB_1331_11EB));
    splitmix64(v)
}

/// Uniform value in [0, 1) for a cell. `salt` separates independent draws.
pub fn cell_unit(seed: u64, ix: i64, iz: i64, salt: u32) -> f64 {
    (hash2(seed, ix, iz, salt) >> 11) as f64 / (1u64 << 53) as f64
}

/// Lattice value in [-1, 1).
pub fn lattice(seed: u64, ix: i64, iz: i64, octave: u32) -> f64 {
    cell_unit(seed, ix, iz, octave) * 2.0 - 1.0
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep. Works with `edge0 > edge1` (the ramp is mirrored).
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Continuous 2D value noise in [-1, 1] with unit lattice spacing.
pub fn value_noise(seed: u64, octave: u32, x: f64, z: f64) -> f64 {
    let x0 = x.floor();
    let z0 = z.floor();
    let ix = x0 as i64;
    let iz = z0 as i64;
    let tx = smoothstep(0.0, 1.0, x - x0);
    let tz = smoothstep(0.0, 1.0, z - z0);

    let v00 = lattice(seed, ix, iz, octave);
    let v10 = lattice(seed, ix + 1, iz, octave);
    let v01 = lattice(seed, ix, iz + 1, octave);
    let v11 = lattice(seed, ix + 1, iz + 1, octave);

    let top = lerp(v00, v10, tx);
    let bot = lerp(v01, v11, tx);
    lerp(top, bot, tz)
}

/// Multi-octave fractal noise configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fbm {
    /// Number of octaves summed.
    pub octaves: u32,
    /// Wavelength of the first octave in meters.
    pub wavelength: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave (< 1 so detail fades).
    pub persistence: f64,
}

impl Default for Fbm {
    fn default() -> Self {
        Self {
            octaves: 4,
            wavelength: 2_000.0,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl Fbm {
    /// Sample at world meters. Normalized by the amplitude sum, so the
    /// result stays in [-1, 1].
    pub fn sample(&self, seed: u64, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut norm = 0.0;
        let mut frequency = 1.0 / self.wavelength;

        for octave in 0..self.octaves {
            total += amplitude * value_noise(seed, octave, x * frequency, z * frequency);
            norm += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if norm > 0.0 {
            total / norm
        } else {
            0.0
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.wavelength.is_finite()
            && self.wavelength > 0.0
            && self.lacunarity.is_finite()
            && self.lacunarity >= 1.0
            && self.persistence.is_finite()
            && self.persistence > 0.0
            && self.persistence < 1.0
    }
}
