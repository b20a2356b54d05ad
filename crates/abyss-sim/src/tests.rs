//! Tests for the terrain service: sonar lifecycle, visibility and budgeted generation.

use std::f64::consts::PI;

use abyss_core::config::{ConfigError, ServiceConfig, WorldConfig};
use abyss_core::enums::{GeologicalProvince, SensorMode, SonarPhase};
use abyss_core::events::SonarEvent;
use abyss_core::types::{ChunkKey, WorldCoord};
use abyss_terrain::feature::{Feature, FeatureSet};
use abyss_terrain::{ProvinceMap, TerrainError};

use crate::service::TerrainService;

fn service() -> TerrainService {
    TerrainService::new(ServiceConfig::default()).unwrap()
}

/// Observer centred in chunk (0, 0), facing north.
fn at_origin_chunk() -> WorldCoord {
    WorldCoord::new(500.0, 500.0)
}

// ---- End-to-end ----

#[test]
fn test_ping_scenario_end_to_end() {
    let mut svc = service();
    let pos = at_origin_chunk();
    // Chunk (0, 5) is centred 5000 m straight ahead.
    let (cx, cz) = (0, 5);

    svc.active_sonar_ping(0.0);
    let snap = svc.tick(0.0, pos, 0.0);
    assert_eq!(snap.sensor.mode, SensorMode::ActivePing);
    assert!(snap.events.contains(&SonarEvent::PingStarted {
        at_secs: 0.0,
        restarted: false
    }));

    svc.tick(29.9, pos, 0.0);
    assert_eq!(svc.is_chunk_visible(cx, cz), (true, 1.0));

    svc.tick(35.0, pos, 0.0);
    let (visible, opacity) = svc.is_chunk_visible(cx, cz);
    assert!(visible, "chunk should still be visible while fading");
    assert!((opacity - 0.5).abs() < 1e-9, "opacity at mid-fade was {opacity}");

    let snap = svc.tick(41.0, pos, 0.0);
    assert_eq!(svc.is_chunk_visible(cx, cz), (false, 0.0));
    assert_eq!(snap.sensor.mode, SensorMode::Passive);
    assert_eq!(snap.sensor.current_radius, 500.0);
    assert!(snap.events.contains(&SonarEvent::PingExpired { at_secs: 40.0 }));
}

// ---- Passive range ----

#[test]
fn test_passive_visibility_distance() {
    let mut svc = service();
    // Chunk (0, 0) centre (500, 500) is 450 m away; chunk (0, -1) centre (500, -500) is 550 m away.
    svc.tick(1.0, WorldCoord::new(500.0, 50.0), 0.0);
    assert_eq!(svc.is_chunk_visible(0, 0), (true, 1.0));
    assert_eq!(svc.is_chunk_visible(0, -1), (false, 0.0));
    assert_eq!(svc.visible_chunks(), &[ChunkKey::new(0, 0)]);
}

#[test]
fn test_passive_ignores_heading() {
    let mut svc = service();
    for heading in [0.0, PI / 2.0, PI, 3.0 * PI / 2.0] {
        svc.tick(1.0, WorldCoord::new(500.0, 50.0), heading);
        assert!(svc.is_chunk_visible(0, 0).0, "passive range applies at heading {heading}");
    }
}

// ---- Blind spot ----

#[test]
fn test_blind_spot_suppresses_ping() {
    let mut svc = service();
    let pos = at_origin_chunk();
    svc.active_sonar_ping(0.0);
    svc.tick(1.0, pos, 0.0);

    assert!(svc.is_chunk_visible(0, 4).0, "ahead and in range");
    assert!(!svc.is_chunk_visible(0, -4).0, "directly astern is not pinged");
    assert!(svc.is_chunk_visible(4, 0).0, "abeam is pinged");
    assert!(svc.is_chunk_visible(0, 0).0, "own chunk is within passive range");

    // Turning around swaps which chunk is astern.
    svc.tick(2.0, pos, PI);
    assert!(svc.is_chunk_visible(0, -4).0);
    assert!(!svc.is_chunk_visible(0, 4).0);
}

#[test]
fn test_ping_range_limit() {
    let mut svc = service();
    svc.active_sonar_ping(0.0);
    svc.tick(1.0, at_origin_chunk(), 0.0);
    // Chunk (0, 6) centre is 6000 m ahead, (0, 7) is 7000 m ahead.
    assert!(svc.is_chunk_visible(0, 6).0);
    assert!(!svc.is_chunk_visible(0, 7).0);
}

// ---- Ping lifecycle through the service ----

#[test]
fn test_retrigger_restarts_window() {
    let mut svc = service();
    let pos = at_origin_chunk();
    svc.active_sonar_ping(0.0);
    svc.tick(36.0, pos, 0.0);
    assert_eq!(svc.sensor().phase, SonarPhase::Fading);

    svc.active_sonar_ping(36.0);
    let snap = svc.tick(37.0, pos, 0.0);
    assert!(snap.events.contains(&SonarEvent::PingStarted {
        at_secs: 36.0,
        restarted: true
    }));
    assert_eq!(svc.is_chunk_visible(0, 5), (true, 1.0));

    svc.tick(60.0, pos, 0.0);
    assert_eq!(svc.is_chunk_visible(0, 5), (true, 1.0), "old deadline no longer applies");
}

#[test]
fn test_clock_regression_is_harmless() {
    let mut svc = service();
    let pos = at_origin_chunk();
    svc.active_sonar_ping(10.0);
    svc.tick(45.0, pos, 0.0);
    let (_, before) = svc.is_chunk_visible(0, 5);
    svc.tick(12.0, pos, 0.0);
    let (visible, after) = svc.is_chunk_visible(0, 5);
    assert!(visible);
    assert_eq!(before, after, "opacity must not recover on a clock regression");
    assert_eq!(svc.time().tick, 2);
}

#[test]
fn test_late_ping_trigger_still_reveals() {
    let mut svc = service();
    let pos = at_origin_chunk();
    svc.tick(200.0, pos, 0.0);
    // Trigger stamped well behind the simulation clock.
    svc.active_sonar_ping(100.0);
    let snap = svc.tick(201.0, pos, 0.0);
    assert!(snap.events.contains(&SonarEvent::PingStarted {
        at_secs: 200.0,
        restarted: false
    }));
    assert_eq!(snap.sensor.mode, SensorMode::ActivePing);
    assert_eq!(svc.is_chunk_visible(0, 5), (true, 1.0));
}

// ---- Determinism ----

#[test]
fn test_determinism_same_config() {
    let mut a = service();
    let mut b = service();
    let path = |i: usize| WorldCoord::new(-2_000.0 + i as f64 * 40.0, 1_000.0 - i as f64 * 25.0);

    for i in 0..120 {
        let now = i as f64 * 0.5;
        if i == 10 || i == 90 {
            a.active_sonar_ping(now);
            b.active_sonar_ping(now);
        }
        let heading = (i as f64 * 0.05).rem_euclid(2.0 * PI);
        let snap_a = a.tick(now, path(i), heading);
        let snap_b = b.tick(now, path(i), heading);
        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged at tick {i}");
    }

    for i in 0..50 {
        let (x, z) = (i as f64 * 1_300.0 - 32_000.0, i as f64 * -1_100.0 + 27_000.0);
        assert_eq!(a.height_at(x, z), b.height_at(x, z));
    }
}

// ---- Heights and chunk geometry ----

#[test]
fn test_height_queries() {
    let mut svc = service();
    let world = svc.config().world.clone();

    assert_eq!(svc.height_at(50_000.0, 0.0), world.out_of_bounds_depth);
    assert_eq!(svc.height_at(0.0, f64::INFINITY), world.out_of_bounds_depth);

    for i in 0..40 {
        let (x, z) = (i as f64 * 1_700.0 - 34_000.0, i as f64 * 1_650.0 - 33_000.0);
        let h = svc.height_at(x, z);
        assert!(
            (world.min_depth..=world.max_depth).contains(&h),
            "height {h} out of bounds at ({x}, {z})"
        );
        assert_eq!(h, svc.height_at(x, z), "repeat query changed the height");
    }
}

#[test]
fn test_chunk_geometry() {
    let mut svc = service();
    assert_eq!(svc.chunk_size(), 1_000.0);
    assert_eq!(svc.sample_spacing(), 50.0);
    assert_eq!(svc.samples_per_axis(), 21);
    assert_eq!(svc.grid_range(), -35..=34);

    let b = svc.chunk_bounds(-35, 34).unwrap();
    assert_eq!((b.min_x, b.min_z, b.max_x, b.max_z), (-35_000.0, 34_000.0, -34_000.0, 35_000.0));
    assert!(svc.chunk_bounds(35, 0).is_none());
    assert_eq!(svc.is_chunk_visible(500, 500), (false, 0.0));

    let samples = svc.chunk_samples(2, 3).unwrap().to_vec();
    assert_eq!(samples.len(), 21 * 21);
    assert_eq!(svc.chunk_samples(2, 3).unwrap(), samples.as_slice());
    assert!(svc.chunk_samples(99, 0).is_none());
}

#[test]
fn test_province_lookup() {
    let svc = service();
    assert_eq!(svc.province_at(0.0, 30_000.0), Some(GeologicalProvince::ContinentalShelf));
    assert_eq!(svc.province_at(0.0, -30_000.0), Some(GeologicalProvince::Trench));
    assert_eq!(svc.province_at(0.0, 40_000.0), None);
}

// ---- Budgeted generation ----

#[test]
fn test_generation_budget_per_tick() {
    let mut svc = service();
    let pos = at_origin_chunk();
    let budget = svc.config().world.generation_budget_per_tick;

    svc.tick(0.0, pos, 0.0);
    assert_eq!(svc.cached_chunks(), 1, "passive: only the own chunk is visible");
    assert_eq!(svc.pending_chunks(), 0);

    svc.active_sonar_ping(1.0);
    let snap = svc.tick(1.0, pos, 0.0);
    let visible = snap.visible_chunks.len();
    assert!(visible > 50, "ping should reveal many chunks, got {visible}");
    assert_eq!(svc.cached_chunks(), 1 + budget);
    assert_eq!(svc.pending_chunks(), visible - 1 - budget);

    svc.tick(2.0, pos, 0.0);
    assert_eq!(svc.cached_chunks(), 1 + 2 * budget);

    // Visibility never waits on generation.
    assert!(svc.is_chunk_visible(0, 6).0);
}

// ---- Construction ----

#[test]
fn test_invalid_config_rejected() {
    let mut config = ServiceConfig::default();
    config.sonar.active_range = 100.0;
    let err = TerrainService::new(config).unwrap_err();
    assert!(
        matches!(err, TerrainError::Config(ConfigError::SonarRangeOrder { .. })),
        "{err}"
    );

    let err = TerrainService::from_json("{\"world\": {\"chunk_size\": -1}}").unwrap_err();
    assert!(matches!(err, TerrainError::Config(ConfigError::NonPositive { .. })), "{err}");

    let err = TerrainService::from_json("{\"world\": {\"chunk_size\": 1, \"sample_spacing\": 1}}")
        .unwrap_err();
    assert!(matches!(err, TerrainError::Config(ConfigError::TooManyChunks { .. })), "{err}");
}

#[test]
fn test_from_json_overrides() {
    let svc = TerrainService::from_json(
        "{\"world\": {\"extent\": 10000, \"chunk_size\": 500, \"sample_spacing\": 25}, \
          \"sonar\": {\"passive_range\": 800}}",
    )
    .unwrap();
    assert_eq!(svc.grid_range(), -20..=19);
    assert_eq!(svc.samples_per_axis(), 21);
    assert_eq!(svc.sensor().current_radius, 800.0);
}

#[test]
fn test_custom_feature_set() {
    let world = WorldConfig::default();
    let features = FeatureSet::new(vec![Feature::Zone(ProvinceMap::reference(world.extent))]);
    let mut svc = TerrainService::with_features(ServiceConfig::default(), features).unwrap();
    let h = svc.height_at(100.0, -10_000.0);
    assert!(h < -3_000.0 && h > -5_000.0, "bare abyssal plain at {h}");

    let err = TerrainService::with_features(ServiceConfig::default(), FeatureSet::default()).unwrap_err();
    assert!(matches!(err, TerrainError::ZoneCount(0)));
}
