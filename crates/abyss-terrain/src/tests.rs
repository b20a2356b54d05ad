#[cfg(test)]
mod tests {
    use glam::DVec2;

    use crate::core::config::WorldConfig;
    use crate::core::enums::GeologicalProvince;
    use crate::feature::{Feature, FeatureSet};
    use crate::layout::default_features;
    use crate::{ChunkStore, HeightField, TerrainError};

    fn reference() -> (WorldConfig, HeightField) {
        let world = WorldConfig::default();
        let field = HeightField::reference(&world).unwrap();
        (world, field)
    }

    fn meridian_trunk(field: &HeightField) -> Vec<DVec2> {
        field
            .features()
            .iter()
            .find_map(|f| match f {
                Feature::Canyon(c) if c.name == "Meridian Canyon" => Some(c.trunk.path.clone()),
                _ => None,
            })
            .expect("reference layout has the Meridian Canyon")
    }

    #[test]
    fn test_heights_deterministic_across_instances() {
        let (world, a) = reference();
        let b = HeightField::reference(&world).unwrap();
        let row = |f: &HeightField| -> String {
            let samples: Vec<f64> = (0..200)
                .map(|i| f.height(i as f64 * 350.0 - 35_000.0, i as f64 * -310.0 + 31_000.0))
                .collect();
            serde_json::to_string(&samples).unwrap()
        };
        assert_eq!(row(&a), row(&b), "Same config must give identical terrain");
    }

    #[test]
    fn test_heights_bounded_and_finite() {
        let (world, field) = reference();
        let step = 700.0;
        let mut z = -world.extent;
        while z <= world.extent {
            let mut x = -world.extent;
            while x <= world.extent {
                let h = field.height(x, z);
                assert!(h.is_finite(), "non-finite height at ({x}, {z})");
                assert!(
                    (world.min_depth..=world.max_depth).contains(&h),
                    "height {h} out of bounds at ({x}, {z})"
                );
                x += step;
            }
            z += step;
        }
    }

    #[test]
    fn test_province_continuity() {
        let (world, field) = reference();
        let zone = field
            .features()
            .iter()
            .find_map(|f| match f {
                Feature::Zone(map) => Some(map.clone()),
                _ => None,
            })
            .unwrap();

        let mut checked = 0;
        for boundary in zone.boundaries() {
            for i in 0..140 {
                let x = -world.extent + i as f64 * 500.0;
                let below = field.breakdown(x, boundary - 0.5);
                let above = field.breakdown(x, boundary + 0.5);
                let plain = |b: &crate::HeightBreakdown| b.carved.is_none() && b.raised.is_none();
                if !(plain(&below) && plain(&above)) {
                    continue;
                }
                assert_ne!(below.province, above.province);
                let step = (below.depth - above.depth).abs();
                assert!(
                    step <= world.continuity_tolerance,
                    "step of {step} m at x={x} across z={boundary}"
                );
                checked += 1;
            }
        }
        assert!(checked > 300, "only {checked} boundary pairs were feature-free");
    }

    #[test]
    fn test_canyon_dominates_raising_features() {
        let (_, field) = reference();
        for p in meridian_trunk(&field) {
            let b = field.breakdown(p.x, p.y);
            let carved = b.carved.expect("canyon centreline should be carved");
            assert!(b.raised.is_none(), "raise applied inside the canyon at {p}");
            assert!(carved < b.base, "canyon must cut below the base at {p}");
        }
    }

    #[test]
    fn test_hanging_valley_over_trench() {
        let (_, field) = reference();
        let terminus = field
            .features()
            .iter()
            .find_map(|f| match f {
                Feature::Canyon(c) => c
                    .branches
                    .iter()
                    .find(|b| b.terminus.is_some())
                    .and_then(|b| b.path.last().copied()),
                _ => None,
            })
            .unwrap();
        let b = field.breakdown(terminus.x, terminus.y);
        assert_eq!(b.province, GeologicalProvince::Trench);
        assert!(b.hard_carve);
        let carved = b.carved.unwrap();
        assert!((carved + 4_900.0).abs() < 1e-9, "terminus floor at {carved}");
    }

    #[test]
    fn test_caldera_vents_stand_on_ridge() {
        let (world, field) = reference();
        let vents = field
            .features()
            .iter()
            .find_map(|f| match f {
                Feature::VentField(v) if v.name == "Caldera Vents" => Some(v.clone()),
                _ => None,
            })
            .expect("reference layout has the Caldera Vents");
        let bare_set: Vec<Feature> = field
            .features()
            .iter()
            .filter(|f| !matches!(f, Feature::VentField(_)))
            .cloned()
            .collect();
        let bare = HeightField::new(FeatureSet::new(bare_set), &world).unwrap();

        let (mut towers, mut on_ridge) = (0, 0);
        for iz in -32..=-14 {
            for ix in -39..=-22 {
                let Some(tower) = vents.tower_in_cell(field.seed(), ix, iz) else {
                    continue;
                };
                let p = tower.position;
                let b = bare.breakdown(p.x, p.y);
                if b.raise_locked {
                    // Inside a canyon corridor.
                    continue;
                }
                let top = field.height(p.x, p.y);
                assert!(
                    top >= b.depth + tower.height - 1e-6,
                    "tower at {p} reaches {top} over floor {}",
                    b.depth
                );
                towers += 1;
                if b.raised.is_some() {
                    on_ridge += 1;
                }
            }
        }
        assert!(towers > 20, "only {towers} towers placed");
        assert!(on_ridge > towers / 2, "{on_ridge} of {towers} towers sit on the ridge");
    }

    #[test]
    fn test_reference_relief_present() {
        let (_, field) = reference();
        // Kestrel summit stands far above the abyssal floor.
        let summit = field.height(10_000.0, -8_000.0);
        assert!(summit > -1_100.0, "Kestrel summit at {summit}");
        assert_eq!(field.province_at(0.0, -10_000.0), GeologicalProvince::AbyssalPlain);
        assert_eq!(field.province_at(0.0, 30_000.0), GeologicalProvince::ContinentalShelf);
    }

    #[test]
    fn test_chunk_cache_stable() {
        let (world, field) = reference();
        let mut store = ChunkStore::new(&world, field);
        let first = store.get_chunk(3, -4).unwrap().samples().to_vec();
        let h1 = store.height_at(3_250.0, -3_600.0);
        let second = store.get_chunk(3, -4).unwrap().samples().to_vec();
        let h2 = store.height_at(3_250.0, -3_600.0);
        assert_eq!(first, second);
        assert_eq!(h1, h2);
        assert_eq!(store.cached_count(), 1);
    }

    #[test]
    fn test_store_interpolates_between_samples() {
        let (world, field) = reference();
        let mut store = ChunkStore::new(&world, field);
        let x = 1_025.0;
        let z = 2_010.0;
        let interpolated = store.height_at(x, z);
        let corners = [
            store.height_at(1_000.0, 2_000.0),
            store.height_at(1_050.0, 2_000.0),
            store.height_at(1_000.0, 2_050.0),
            store.height_at(1_050.0, 2_050.0),
        ];
        let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            interpolated >= lo - 1e-9 && interpolated <= hi + 1e-9,
            "bilinear value {interpolated} outside [{lo}, {hi}]"
        );
    }

    #[test]
    fn test_feature_set_json_round_trip() {
        let (world, field) = reference();
        let json = serde_json::to_string(&default_features(&world)).unwrap();
        let parsed = FeatureSet::from_json(&json, &world).unwrap();
        let reloaded = HeightField::new(parsed, &world).unwrap();
        for i in 0..100 {
            let (x, z) = (i as f64 * 611.0 - 30_000.0, i as f64 * 577.0 - 28_000.0);
            let diff = (field.height(x, z) - reloaded.height(x, z)).abs();
            assert!(diff < 1e-6, "reloaded terrain differs by {diff} at ({x}, {z})");
        }
    }

    #[test]
    fn test_feature_set_json_errors() {
        let world = WorldConfig::default();
        let err = FeatureSet::from_json("{\"features\": [", &world).unwrap_err();
        assert!(matches!(err, TerrainError::Parse(_)));

        let err = FeatureSet::from_json("{\"features\": []}", &world).unwrap_err();
        assert!(matches!(err, TerrainError::ZoneCount(0)));
    }

    #[test]
    fn test_invalid_world_rejected() {
        let world = WorldConfig {
            sample_spacing: 300.0,
            ..WorldConfig::default()
        };
        let err = HeightField::reference(&world).unwrap_err();
        assert!(matches!(err, TerrainError::Config(_)), "{err}");
    }
}
