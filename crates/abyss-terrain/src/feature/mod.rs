//! Feature library: tagged descriptors, each able to contribute to the
//! height at a point.
//!
//! Every feature is a pure function of (seed, point, base depth, floor so
//! far). The synthesizer evaluates them in [`Stage`] order: zone, carve,
//! raise, vents, perturb.

pub mod canyon;
pub mod ridge;
pub mod roughness;
pub mod seamount;
pub mod shape;
pub mod vents;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use abyss_core::config::WorldConfig;
use abyss_core::enums::GeologicalProvince;

use crate::error::TerrainError;
use crate::province::ProvinceMap;

pub use canyon::{Canyon, Channel, HangingValley, Profile};
pub use ridge::Ridge;
pub use roughness::{Roughness, SedimentCover};
pub use seamount::{Depression, Plateau, Seamount, ShelfStep};
pub use shape::{Falloff, Footprint, Shape};
pub use vents::VentField;

/// Composition stage. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Zone,
    Carve,
    Raise,
    /// Towers standing on whatever the raise stage built.
    Vents,
    Perturb,
}

/// Inputs shared by every feature evaluation at one point.
#[derive(Debug, Clone, Copy)]
pub struct SampleContext {
    pub seed: u64,
    /// Query point; `y` holds world z.
    pub point: DVec2,
    /// Province base depth at the point (set by the zone stage).
    pub base: f64,
    /// Composed depth before the feature being evaluated.
    pub floor: f64,
}

/// What one feature contributes at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    /// Province base depth.
    Base {
        depth: f64,
        province: GeologicalProvince,
    },
    /// Canyon floor. Soft carves combine with `min`; a hard carve replaces
    /// the current depth and ends the carve stage. Either kind locks out
    /// every raise at the point.
    Carve { depth: f64, hard: bool },
    /// Depression floor, combined with `min`. Raises still apply on top.
    Sink(f64),
    /// Raised surface, combined with `max`.
    Raise(f64),
    /// Additive delta.
    Perturb(f64),
}

/// A named procedural overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Feature {
    Zone(ProvinceMap),
    Canyon(Canyon),
    Depression(Depression),
    Seamount(Seamount),
    Ridge(Ridge),
    VentField(VentField),
    Roughness(Roughness),
    Sediment(SedimentCover),
}

impl Feature {
    pub fn name(&self) -> &str {
        match self {
            Feature::Zone(_) => "zone",
            Feature::Canyon(f) => &f.name,
            Feature::Depression(f) => &f.name,
            Feature::Seamount(f) => &f.name,
            Feature::Ridge(f) => &f.name,
            Feature::VentField(f) => &f.name,
            Feature::Roughness(f) => &f.name,
            Feature::Sediment(f) => &f.name,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Feature::Zone(_) => Stage::Zone,
            Feature::Canyon(_) | Feature::Depression(_) => Stage::Carve,
            Feature::Seamount(_) | Feature::Ridge(_) => Stage::Raise,
            Feature::VentField(_) => Stage::Vents,
            Feature::Roughness(_) | Feature::Sediment(_) => Stage::Perturb,
        }
    }

    pub fn contributes(&self, ctx: &SampleContext) -> Option<Contribution> {
        match self {
            Feature::Zone(map) => {
                let (province, depth) = map.base_depth(ctx.seed, ctx.point.x, ctx.point.y);
                Some(Contribution::Base { depth, province })
            }
            Feature::Canyon(f) => f.contributes(ctx),
            Feature::Depression(f) => f.contributes(ctx),
            Feature::Seamount(f) => f.contributes(ctx),
            Feature::Ridge(f) => f.contributes(ctx),
            Feature::VentField(f) => f.contributes(ctx),
            Feature::Roughness(f) => f.contributes(ctx),
            Feature::Sediment(f) => f.contributes(ctx),
        }
    }

    pub fn validate(&self, world: &WorldConfig) -> Result<(), TerrainError> {
        match self {
            Feature::Zone(map) => map.validate(world.extent, world.continuity_tolerance),
            Feature::Canyon(f) => f.validate(),
            Feature::Depression(f) => f.validate(),
            Feature::Seamount(f) => f.validate(),
            Feature::Ridge(f) => f.validate(),
            Feature::VentField(f) => f.validate(),
            Feature::Roughness(f) => f.validate(),
            Feature::Sediment(f) => f.validate(),
        }
    }
}

/// Ordered list of feature descriptors making up one world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Parse designer-authored JSON and validate it against the world.
    pub fn from_json(json: &str, world: &WorldConfig) -> Result<Self, TerrainError> {
        let set: FeatureSet = serde_json::from_str(json)?;
        set.validate(world)?;
        Ok(set)
    }

    /// Exactly one zone feature, and every descriptor well formed.
    pub fn validate(&self, world: &WorldConfig) -> Result<(), TerrainError> {
        let zones = self
            .features
            .iter()
            .filter(|f| matches!(f, Feature::Zone(_)))
            .count();
        if zones != 1 {
            return Err(TerrainError::ZoneCount(zones));
        }
        self.features.iter().try_for_each(|f| f.validate(world))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(Stage::Zone < Stage::Carve);
        assert!(Stage::Carve < Stage::Raise);
        assert!(Stage::Raise < Stage::Vents);
        assert!(Stage::Vents < Stage::Perturb);
    }

    #[test]
    fn test_zone_count_enforced() {
        let world = WorldConfig::default();
        let empty = FeatureSet::default();
        assert!(matches!(empty.validate(&world), Err(TerrainError::ZoneCount(0))));

        let zone = Feature::Zone(ProvinceMap::reference(world.extent));
        let twice = FeatureSet::new(vec![zone.clone(), zone.clone()]);
        assert!(matches!(twice.validate(&world), Err(TerrainError::ZoneCount(2))));

        FeatureSet::new(vec![zone]).validate(&world).unwrap();
    }

    #[test]
    fn test_zone_contributes_base() {
        let world = WorldConfig::default();
        let zone = Feature::Zone(ProvinceMap::reference(world.extent));
        let ctx = SampleContext {
            seed: world.seed,
            point: DVec2::new(0.0, 30_000.0),
            base: 0.0,
            floor: 0.0,
        };
        match zone.contributes(&ctx) {
            Some(Contribution::Base { province, depth }) => {
                assert_eq!(province, GeologicalProvince::ContinentalShelf);
                assert!(depth > -250.0 && depth < 0.0, "shelf depth {depth}");
            }
            other => panic!("expected base, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_json_tagged_by_kind() {
        let feature = Feature::Depression(Depression {
            name: "pit".into(),
            footprint: Footprint::circle(DVec2::new(1.0, 2.0), 300.0),
            depth: 50.0,
            falloff: Falloff::PowerLaw { exponent: 2.0 },
        });
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(json["kind"], "Depression");
        assert_eq!(json["name"], "pit");
        let back: Feature = serde_json::from_value(json).unwrap();
        assert_eq!(back, feature);
    }
}
