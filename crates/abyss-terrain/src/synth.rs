//! HeightField: composes the feature library into one authoritative depth.
//!
//! Precedence is fixed: zone base, then carve, then raise, then vent towers,
//! then perturb, then clamp. A canyon carve at a point locks out every raising feature
//! there, so a canyon is never filled by an overlapping seamount or ridge.
//! Depressions only take the `min` and leave later raises free.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use abyss_core::config::WorldConfig;
use abyss_core::enums::GeologicalProvince;

use crate::error::TerrainError;
use crate::feature::{Contribution, Feature, FeatureSet, SampleContext};
use crate::layout;

/// Every stage of one height evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightBreakdown {
    pub province: GeologicalProvince,
    pub base: f64,
    /// Floor after the carve stage, if any carve applied.
    pub carved: Option<f64>,
    /// True if a hanging-valley terminus set the floor.
    pub hard_carve: bool,
    /// True if a canyon carve suppressed the raise stage.
    pub raise_locked: bool,
    /// Floor after the raise stage, if any raise applied.
    pub raised: Option<f64>,
    /// Sum of additive perturbations.
    pub perturbation: f64,
    /// Final clamped depth.
    pub depth: f64,
}

/// Deterministic height function over the whole world.
#[derive(Debug, Clone)]
pub struct HeightField {
    features: Vec<Feature>,
    seed: u64,
    min_depth: f64,
    max_depth: f64,
}

impl HeightField {
    /// Validate a feature set and order it by stage. Authoring order is kept within a stage.
    pub fn new(set: FeatureSet, world: &WorldConfig) -> Result<Self, TerrainError> {
        world.validate()?;
        set.validate(world)?;
        let mut features = set.features;
        features.sort_by_key(|f| f.stage());
        Ok(Self {
            features,
            seed: world.seed,
            min_depth: world.min_depth,
            max_depth: world.max_depth,
        })
    }

    /// Height field over the reference layout.
    pub fn reference(world: &WorldConfig) -> Result<Self, TerrainError> {
        Self::new(layout::default_features(world), world)
    }

    /// Depth at world coordinate (x, z). Always finite and within the depth bounds.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        self.breakdown(x, z).depth
    }

    pub fn breakdown(&self, x: f64, z: f64) -> HeightBreakdown {
        let mut ctx = SampleContext {
            seed: self.seed,
            point: DVec2::new(x, z),
            base: 0.0,
            floor: 0.0,
        };
        let mut out = HeightBreakdown {
            province: GeologicalProvince::AbyssalPlain,
            base: 0.0,
            carved: None,
            hard_carve: false,
            raise_locked: false,
            raised: None,
            perturbation: 0.0,
            depth: 0.0,
        };
        let mut current = 0.0;

        for feature in &self.features {
            ctx.floor = current;
            let Some(contribution) = feature.contributes(&ctx) else {
                continue;
            };
            match contribution {
                Contribution::Base { depth, province } => {
                    ctx.base = depth;
                    out.base = depth;
                    out.province = province;
                    current = depth;
                }
                Contribution::Carve { depth, hard } => {
                    if out.hard_carve {
                        continue;
                    }
                    current = if hard { depth } else { current.min(depth) };
                    out.hard_carve = hard;
                    out.raise_locked = true;
                    out.carved = Some(current);
                }
                Contribution::Sink(depth) => {
                    if out.hard_carve {
                        continue;
                    }
                    current = current.min(depth);
                    out.carved = Some(current);
                }
                Contribution::Raise(surface) => {
                    if out.raise_locked {
                        continue;
                    }
                    current = f64::max(current, surface);
                    out.raised = Some(current);
                }
                Contribution::Perturb(delta) => {
                    out.perturbation += delta;
                    current += delta;
                }
            }
        }

        if !current.is_finite() {
            current = if out.base.is_finite() { out.base } else { self.max_depth };
        }
        out.depth = current.clamp(self.min_depth, self.max_depth);
        out
    }

    pub fn province_at(&self, x: f64, z: f64) -> GeologicalProvince {
        self.breakdown(x, z).province
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// (min_depth, max_depth).
    pub fn depth_bounds(&self) -> (f64, f64) {
        (self.min_depth, self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{
        Canyon, Channel, Depression, Falloff, Footprint, HangingValley, Profile, Roughness, Seamount, VentField,
    };
    use crate::noise::Fbm;
    use crate::province::ProvinceMap;

    fn world() -> WorldConfig {
        WorldConfig::default()
    }

    fn zone() -> Feature {
        Feature::Zone(ProvinceMap::reference(world().extent))
    }

    fn canyon() -> Feature {
        Feature::Canyon(Canyon::new(
            "cut",
            Profile::V,
            Channel::straight(DVec2::new(0.0, -5_000.0), DVec2::new(0.0, 0.0), (500.0, 500.0), (400.0, 400.0), 4),
        ))
    }

    fn seamount() -> Feature {
        Feature::Seamount(Seamount::new(
            "mount",
            Footprint::circle(DVec2::new(0.0, -2_500.0), 3_000.0),
            -1_000.0,
            Falloff::PowerLaw { exponent: 2.0 },
        ))
    }

    #[test]
    fn test_authoring_order_does_not_matter() {
        let a = HeightField::new(FeatureSet::new(vec![zone(), canyon(), seamount()]), &world()).unwrap();
        let b = HeightField::new(FeatureSet::new(vec![seamount(), canyon(), zone()]), &world()).unwrap();
        for i in 0..50 {
            let (x, z) = (i as f64 * 97.0 - 2_000.0, i as f64 * -80.0);
            assert_eq!(a.height(x, z), b.height(x, z), "order changed height at ({x}, {z})");
        }
    }

    #[test]
    fn test_carve_locks_out_raise() {
        let field = HeightField::new(FeatureSet::new(vec![zone(), canyon(), seamount()]), &world()).unwrap();
        let b = field.breakdown(0.0, -2_500.0);
        let carved = b.carved.expect("canyon should carve");
        assert!(b.raised.is_none(), "seamount must not fill the canyon");
        assert!((carved - (b.base - 400.0)).abs() < 1e-9);
        assert_eq!(b.depth, carved);

        // Off the canyon the seamount applies.
        let off = field.breakdown(1_500.0, -2_500.0);
        assert!(off.carved.is_none());
        assert!(off.raised.unwrap() > off.base);
    }

    #[test]
    fn test_depression_under_raise_leaves_no_rim_step() {
        let pit = Feature::Depression(Depression {
            name: "pit".into(),
            footprint: Footprint::circle(DVec2::new(1_500.0, -2_500.0), 1_000.0),
            depth: 250.0,
            falloff: Falloff::PowerLaw { exponent: 2.0 },
        });
        let field = HeightField::new(FeatureSet::new(vec![zone(), pit, seamount()]), &world()).unwrap();

        let centre = field.breakdown(1_500.0, -2_500.0);
        assert!(!centre.raise_locked, "a depression must not lock out raises");
        assert!(centre.raised.is_some(), "the seamount still applies inside the pit");

        for i in 0..16 {
            let angle = i as f64 * std::f64::consts::TAU / 16.0;
            let dir = DVec2::new(angle.cos(), angle.sin());
            let inner = DVec2::new(1_500.0, -2_500.0) + dir * 999.0;
            let outer = DVec2::new(1_500.0, -2_500.0) + dir * 1_001.0;
            let step = (field.height(inner.x, inner.y) - field.height(outer.x, outer.y)).abs();
            assert!(step < 10.0, "rim step {step} m at angle {angle}");
        }
    }

    #[test]
    fn test_vent_towers_rise_above_raised_floor() {
        let vents = VentField {
            name: "vents".into(),
            center: DVec2::new(0.0, -2_500.0),
            radius: 1_500.0,
            cell_size: 400.0,
            density: 0.6,
            tower_height: [40.0, 140.0],
            tower_radius: [15.0, 35.0],
            salt: 3,
        };
        let bare = HeightField::new(FeatureSet::new(vec![zone(), seamount()]), &world()).unwrap();
        let with_vents = HeightField::new(
            FeatureSet::new(vec![zone(), Feature::VentField(vents.clone()), seamount()]),
            &world(),
        )
        .unwrap();

        let mut checked = 0;
        for iz in -12..=0 {
            for ix in -5..=5 {
                let Some(tower) = vents.tower_in_cell(world().seed, ix, iz) else {
                    continue;
                };
                let p = tower.position;
                let floor = bare.height(p.x, p.y);
                let top = with_vents.height(p.x, p.y);
                assert!(floor > bare.breakdown(p.x, p.y).base, "seamount should lift the floor");
                assert!(
                    top >= floor + tower.height - 1e-6,
                    "tower at {p} reaches {top}, floor {floor}, height {}",
                    tower.height
                );
                checked += 1;
            }
        }
        assert!(checked > 0, "vent field should place towers");
    }

    #[test]
    fn test_hard_carve_sets_absolute_depth() {
        let branch = Channel::straight(DVec2::new(0.0, -20_000.0), DVec2::new(0.0, -30_000.0), (400.0, 400.0), (200.0, 200.0), 4)
            .with_terminus(HangingValley {
                depth: -4_800.0,
                radius: 800.0,
            });
        let hv = Feature::Canyon(Canyon::new("hv", Profile::U, branch));
        let deep = Feature::Canyon(Canyon::new(
            "deep",
            Profile::V,
            Channel::straight(DVec2::new(-2_000.0, -30_000.0), DVec2::new(2_000.0, -30_000.0), (600.0, 600.0), (2_000.0, 2_000.0), 4),
        ));
        let field = HeightField::new(FeatureSet::new(vec![zone(), hv, deep]), &world()).unwrap();
        let b = field.breakdown(0.0, -30_000.0);
        assert!(b.hard_carve);
        assert!(
            (b.depth + 4_800.0).abs() < 1e-9,
            "terminus depth must not be double-carved, got {}",
            b.depth
        );
    }

    #[test]
    fn test_clamped_to_bounds() {
        let mut w = world();
        w.max_depth = -3_000.0;
        let rough = Feature::Roughness(Roughness {
            name: "r".into(),
            fbm: Fbm::default(),
            amplitude: 500.0,
            shelf_scale: 1.0,
            salt: 0,
        });
        let field = HeightField::new(FeatureSet::new(vec![zone(), rough]), &w).unwrap();
        for i in 0..200 {
            let h = field.height(i as f64 * 313.0 - 30_000.0, i as f64 * 347.0 - 34_000.0);
            assert!((w.min_depth..=w.max_depth).contains(&h), "unclamped height {h}");
        }
    }

    #[test]
    fn test_invalid_set_rejected() {
        let err = HeightField::new(FeatureSet::new(vec![canyon()]), &world()).unwrap_err();
        assert!(matches!(err, TerrainError::ZoneCount(0)));
    }
}
