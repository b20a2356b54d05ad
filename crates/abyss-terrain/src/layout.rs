//! Reference world layout.
//!
//! Named features are placed by hand on the 35 km reference world and
//! scaled with the configured extent. Scattered seamounts and depressions
//! on the abyssal plain are drawn once from a ChaCha8 stream seeded with
//! the world seed; height queries never touch the RNG.

use std::f64::consts::FRAC_PI_4;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use abyss_core::config::WorldConfig;

use crate::feature::{
    Canyon, Channel, Depression, Falloff, Feature, FeatureSet, Footprint, HangingValley, Plateau,
    Profile, Ridge, Roughness, Seamount, SedimentCover, Shape, ShelfStep, VentField,
};
use crate::feature::shape::nearest_on_path;
use crate::noise::Fbm;
use crate::province::ProvinceMap;

/// Extent the hand-placed coordinates were authored for.
const REFERENCE_EXTENT: f64 = 35_000.0;

const SCATTERED_SEAMOUNTS: usize = 6;
const SCATTERED_DEPRESSIONS: usize = 4;
const PLACEMENT_ATTEMPTS: usize = 32;

/// Feature set of the reference world.
pub fn default_features(world: &WorldConfig) -> FeatureSet {
    let s = world.extent / REFERENCE_EXTENT;
    let at = |x: f64, z: f64| DVec2::new(x * s, z * s);

    let mut features = vec![Feature::Zone(ProvinceMap::reference(world.extent))];

    // --- Canyons ---

    let meridian = Canyon::new(
        "Meridian Canyon",
        Profile::V,
        Channel::meandering(
            at(-8_000.0, 34_000.0),
            at(-6_000.0, -24_000.0),
            1_800.0 * s,
            9_000.0 * s,
            (600.0 * s, 1_200.0 * s),
            (300.0, 600.0),
        ),
    )
    .with_branch(Channel::straight(
        at(-2_000.0, 30_000.0),
        at(-7_000.0, 18_000.0),
        (300.0 * s, 300.0 * s),
        (200.0, 200.0),
        12,
    ))
    .with_branch(
        Channel::straight(
            at(-6_200.0, -18_000.0),
            at(-3_000.0, -29_000.0),
            (500.0 * s, 700.0 * s),
            (250.0, 350.0),
            12,
        )
        .with_terminus(HangingValley {
            depth: -4_900.0,
            radius: 900.0 * s,
        }),
    );
    features.push(Feature::Canyon(meridian));

    features.push(Feature::Canyon(Canyon::new(
        "Eastern Gully",
        Profile::U,
        Channel::straight(
            at(18_000.0, 33_000.0),
            at(21_000.0, 6_000.0),
            (400.0 * s, 800.0 * s),
            (150.0, 350.0),
            16,
        ),
    )));

    // --- Kestrel seamount chain ---

    features.push(Feature::Seamount(
        Seamount::new(
            "Kestrel Seamount",
            Footprint::circle(at(10_000.0, -8_000.0), 4_000.0 * s),
            -900.0,
            Falloff::PowerLaw { exponent: 2.0 },
        )
        .with_plateau(Plateau {
            fraction: 0.3,
            roughness: 25.0,
        })
        .with_shelf(ShelfStep {
            direction: 0.0,
            drop: 300.0,
            outer: 0.7,
        }),
    ));
    features.push(Feature::Seamount(Seamount::new(
        "Kestrel II",
        Footprint {
            center: at(15_000.0, -12_000.0),
            radius: 3_000.0 * s,
            shape: Shape::Oval {
                aspect: 1.6,
                rotation: -FRAC_PI_4,
            },
        },
        -1_600.0,
        Falloff::Gaussian { sharpness: 2.5 },
    )));
    features.push(Feature::Seamount(Seamount::new(
        "Kestrel III",
        Footprint {
            center: at(19_000.0, -15_500.0),
            radius: 2_500.0 * s,
            shape: Shape::Elongated {
                length: 4_000.0 * s,
                rotation: -FRAC_PI_4,
            },
        },
        -2_200.0,
        Falloff::PowerLaw { exponent: 1.5 },
    )));

    // --- Caldera ridge and vents ---

    features.push(Feature::Ridge(Ridge {
        name: "Caldera Ridge".into(),
        crest: vec![at(-30_000.0, -5_000.0), at(-12_000.0, -9_000.0), at(-2_000.0, -16_000.0)],
        crest_depths: vec![-2_600.0, -2_300.0, -2_900.0],
        half_width: 3_000.0 * s,
        falloff: Falloff::PowerLaw { exponent: 1.5 },
    }));
    features.push(Feature::VentField(VentField {
        name: "Caldera Vents".into(),
        center: at(-12_000.0, -9_000.0),
        radius: 3_500.0 * s,
        cell_size: 400.0,
        density: 0.25,
        tower_height: [40.0, 140.0],
        tower_radius: [15.0, 35.0],
        salt: 0xC0FFEE,
    }));

    // --- Scattered abyssal relief ---

    let keep_out = keep_out_zones(&features);
    let mut rng = ChaCha8Rng::seed_from_u64(world.seed);
    for i in 0..SCATTERED_SEAMOUNTS {
        let radius = rng.gen_range(1_200.0..2_800.0) * s;
        let peak = rng.gen_range(-3_400.0..-2_600.0);
        let Some(center) = place_clear(&mut rng, s, radius, &keep_out) else {
            continue;
        };
        features.push(Feature::Seamount(Seamount::new(
            format!("Abyssal Knoll {}", i + 1),
            Footprint::circle(center, radius),
            peak,
            Falloff::Gaussian { sharpness: 3.0 },
        )));
    }
    for i in 0..SCATTERED_DEPRESSIONS {
        let radius = rng.gen_range(800.0..2_000.0) * s;
        let depth = rng.gen_range(80.0..250.0);
        let Some(center) = place_clear(&mut rng, s, radius, &keep_out) else {
            continue;
        };
        features.push(Feature::Depression(Depression {
            name: format!("Abyssal Pit {}", i + 1),
            footprint: Footprint::circle(center, radius),
            depth,
            falloff: Falloff::PowerLaw { exponent: 2.0 },
        }));
    }

    // --- Perturbation ---

    features.push(Feature::Roughness(Roughness {
        name: "Floor Roughness".into(),
        fbm: Fbm {
            octaves: 5,
            wavelength: 1_800.0,
            lacunarity: 2.0,
            persistence: 0.5,
        },
        amplitude: 30.0,
        shelf_scale: 0.25,
        salt: 0x0F00_D5E5,
    }));
    features.push(Feature::Sediment(SedimentCover {
        name: "Abyssal Sediment".into(),
        fbm: Fbm {
            octaves: 3,
            wavelength: 6_000.0,
            lacunarity: 2.0,
            persistence: 0.5,
        },
        max_thickness: 35.0,
        onset_depth: -3_000.0,
        full_depth: -4_500.0,
        salt: 0x05ED,
    }));

    FeatureSet::new(features)
}

/// Corridors around named relief that scattered features must not touch:
/// a path plus the clearance around it. Round features are one-point paths.
fn keep_out_zones(features: &[Feature]) -> Vec<(Vec<DVec2>, f64)> {
    let mut zones = Vec::new();
    for f in features {
        match f {
            Feature::Seamount(m) => zones.push((vec![m.footprint.center], m.footprint.reach())),
            Feature::VentField(v) => zones.push((vec![v.center], v.radius)),
            Feature::Ridge(r) => zones.push((r.crest.clone(), r.half_width)),
            Feature::Canyon(c) => {
                for channel in std::iter::once(&c.trunk).chain(&c.branches) {
                    zones.push((channel.path.clone(), channel.reach()));
                }
            }
            _ => {}
        }
    }
    zones
}

/// Distance from `p` to the nearest keep-out corridor edge. Negative inside.
fn clearance(zones: &[(Vec<DVec2>, f64)], p: DVec2) -> f64 {
    zones
        .iter()
        .filter_map(|(path, r)| nearest_on_path(path, p).map(|probe| probe.distance - r))
        .fold(f64::INFINITY, f64::min)
}

/// Draw a centre on the abyssal plain clear of every keep-out zone.
/// Gives up after a bounded number of attempts.
fn place_clear(
    rng: &mut ChaCha8Rng,
    s: f64,
    radius: f64,
    keep_out: &[(Vec<DVec2>, f64)],
) -> Option<DVec2> {
    for _ in 0..PLACEMENT_ATTEMPTS {
        let center = DVec2::new(
            rng.gen_range(-32_000.0..32_000.0) * s,
            rng.gen_range(-24_000.0..2_000.0) * s,
        );
        if clearance(keep_out, center) > radius {
            return Some(center);
        }
    }
    None
}
