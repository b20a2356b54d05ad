//! Submarine canyons: carved channels with tributaries and hanging valleys.
//!
//! A channel cuts `incision` meters below the surrounding floor along its
//! centreline and meets the floor again at its local half-width, so the
//! carve is continuous at the canyon rim. A hanging-valley terminus instead
//! pins the floor to an absolute depth around the channel's last vertex.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::feature::shape::{nearest_on_path, path_bounds};
use crate::feature::{Contribution, SampleContext};
use crate::noise::{lerp, smoothstep};

/// Cross-section of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    /// Linear walls down to a sharp thalweg.
    #[default]
    V,
    /// Steep walls and a broad flat floor.
    U,
}

impl Profile {
    /// Carve strength at normalized distance `u` from the centreline (1 at the rim).
    pub fn strength(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0);
        match self {
            Profile::V => 1.0 - u,
            Profile::U => 1.0 - u.powi(4),
        }
    }
}

/// Absolute-depth terminus of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HangingValley {
    /// Floor depth at the terminus (meters, negative).
    pub depth: f64,
    /// Radius of the terminus basin; blends back to the surrounding floor at the rim.
    pub radius: f64,
}

/// One carved poly-line: the trunk or a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub path: Vec<DVec2>,
    /// Half-width per path vertex (meters).
    pub half_widths: Vec<f64>,
    /// Incision below the surrounding floor per path vertex (meters).
    pub incisions: Vec<f64>,
    #[serde(default)]
    pub terminus: Option<HangingValley>,
}

impl Channel {
    /// Straight channel with linearly varying width and incision.
    pub fn straight(
        start: DVec2,
        end: DVec2,
        half_width: (f64, f64),
        incision: (f64, f64),
        segments: usize,
    ) -> Self {
        let segments = segments.max(1);
        let mut channel = Self {
            path: Vec::with_capacity(segments + 1),
            half_widths: Vec::with_capacity(segments + 1),
            incisions: Vec::with_capacity(segments + 1),
            terminus: None,
        };
        for i in 0..=segments {
            let u = i as f64 / segments as f64;
            channel.path.push(start.lerp(end, u));
            channel.half_widths.push(lerp(half_width.0, half_width.1, u));
            channel.incisions.push(lerp(incision.0, incision.1, u));
        }
        channel
    }

    /// Sinusoidal meander between two points. The meander amplitude tapers to
    /// zero at both ends so the endpoints stay where they were placed.
    pub fn meandering(
        start: DVec2,
        end: DVec2,
        amplitude: f64,
        wavelength: f64,
        half_width: (f64, f64),
        incision: (f64, f64),
    ) -> Self {
        let length = start.distance(end);
        let segments = ((length / (wavelength / 8.0)).ceil() as usize).max(8);
        let mut channel = Self::straight(start, end, half_width, incision, segments);
        let normal = (end - start).normalize_or_zero().perp();
        for (i, point) in channel.path.iter_mut().enumerate() {
            let u = i as f64 / segments as f64;
            let along = u * length;
            let taper = (u * std::f64::consts::PI).sin();
            *point += normal * amplitude * taper * (TAU * along / wavelength).sin();
        }
        channel
    }

    pub fn with_terminus(mut self, terminus: HangingValley) -> Self {
        self.terminus = Some(terminus);
        self
    }

    fn validate(&self, name: &str) -> Result<(), TerrainError> {
        if self.path.is_empty() {
            return Err(TerrainError::malformed(name, "channel has an empty path"));
        }
        if self.half_widths.len() != self.path.len() || self.incisions.len() != self.path.len() {
            return Err(TerrainError::malformed(
                name,
                "half_widths and incisions need one value per path vertex",
            ));
        }
        if !self.path.iter().all(|p| p.is_finite()) {
            return Err(TerrainError::malformed(name, "non-finite path vertex"));
        }
        if !self.half_widths.iter().all(|w| w.is_finite() && *w > 0.0) {
            return Err(TerrainError::malformed(name, "half widths must be positive"));
        }
        if !self.incisions.iter().all(|d| d.is_finite() && *d >= 0.0) {
            return Err(TerrainError::malformed(name, "incisions must be non-negative"));
        }
        if let Some(t) = self.terminus {
            if !(t.depth.is_finite() && t.radius.is_finite() && t.radius > 0.0) {
                return Err(TerrainError::malformed(name, "hanging valley needs a positive radius"));
            }
        }
        Ok(())
    }

    /// Widest extent of the channel or its terminus basin from the path.
    pub(crate) fn reach(&self) -> f64 {
        let widest = self.half_widths.iter().copied().fold(0.0, f64::max);
        widest.max(self.terminus.map_or(0.0, |t| t.radius))
    }

    /// Carved depth at the context point, if it lies inside the channel.
    fn carve(&self, profile: Profile, ctx: &SampleContext) -> Option<f64> {
        let (min, max) = path_bounds(&self.path, self.reach());
        let p = ctx.point;
        if p.x < min.x || p.y < min.y || p.x > max.x || p.y > max.y {
            return None;
        }
        let probe = nearest_on_path(&self.path, p)?;
        let half_width = probe.interpolate(&self.half_widths);
        if probe.distance >= half_width {
            return None;
        }
        let incision = probe.interpolate(&self.incisions);
        Some(ctx.base - incision * profile.strength(probe.distance / half_width))
    }

    /// Hanging-valley depth and blend weight at the context point, if it
    /// lies inside the terminus basin. The weight reaches 0 at the rim.
    fn terminus_at(&self, ctx: &SampleContext) -> Option<(f64, f64)> {
        let terminus = self.terminus?;
        let end = *self.path.last()?;
        let u = ctx.point.distance(end) / terminus.radius;
        if u >= 1.0 {
            return None;
        }
        Some((terminus.depth, 1.0 - smoothstep(0.6, 1.0, u)))
    }
}

/// A canyon system: a trunk channel plus branches and tributaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canyon {
    pub name: String,
    #[serde(default)]
    pub profile: Profile,
    pub trunk: Channel,
    #[serde(default)]
    pub branches: Vec<Channel>,
}

impl Canyon {
    pub fn new(name: impl Into<String>, profile: Profile, trunk: Channel) -> Self {
        Self {
            name: name.into(),
            profile,
            trunk,
            branches: Vec::new(),
        }
    }

    pub fn with_branch(mut self, branch: Channel) -> Self {
        self.branches.push(branch);
        self
    }

    fn channels(&self) -> impl Iterator<Item = &Channel> {
        std::iter::once(&self.trunk).chain(self.branches.iter())
    }

    pub fn validate(&self) -> Result<(), TerrainError> {
        self.channels().try_for_each(|c| c.validate(&self.name))
    }

    /// The deepest channel carve at the point applies. Inside a hanging-valley
    /// basin the terminus depth overrides it, blending back to the carved
    /// floor at the basin rim.
    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        let carved = self
            .channels()
            .filter_map(|c| c.carve(self.profile, ctx))
            .reduce(f64::min);
        if let Some((depth, weight)) = self.channels().find_map(|c| c.terminus_at(ctx)) {
            let surround = carved.map_or(ctx.floor, |d| d.min(ctx.floor));
            return Some(Contribution::Carve {
                depth: lerp(surround, depth, weight),
                hard: true,
            });
        }
        carved.map(|depth| Contribution::Carve { depth, hard: false })
    }
}
