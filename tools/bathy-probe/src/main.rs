//! bathy-probe: inspect the procedural seafloor and sonar visibility from the terminal.
//!
//! Usage:
//!   bathy-probe transect --from -20000,30000 --to -20000,-34000 --steps 40
//!   bathy-probe map --size 70
//!   bathy-probe breakdown --at 10000,-8000
//!   bathy-probe visibility --pos 500,500 --heading 0 --ping 0 --now 35

use std::process;

use abyss_core::config::ServiceConfig;
use abyss_core::types::WorldCoord;
use abyss_sim::TerrainService;
use abyss_terrain::HeightField;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "transect" => cmd_transect(&args[2..]),
        "map" => cmd_map(&args[2..]),
        "breakdown" => cmd_breakdown(&args[2..]),
        "visibility" => cmd_visibility(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "bathy-probe: ABYSS bathymetry inspection tool\n\
         \n\
         Commands:\n\
         \n\
         transect    Print depths along a straight line\n\
         \n\
           --from <x,z>       Start point in meters\n\
           --to <x,z>         End point in meters\n\
           --steps <N>        Number of intervals (default: 50)\n\
         \n\
         map         ASCII depth map of the whole world\n\
         \n\
           --size <N>         Characters per side (default: 64)\n\
         \n\
         breakdown   Print every composition stage at one point as JSON\n\
         \n\
           --at <x,z>         Query point in meters\n\
         \n\
         visibility  ASCII chunk visibility around an observer\n\
         \n\
           --pos <x,z>        Observer position (default: 500,500)\n\
           --heading <deg>    Observer heading, 0 = north, clockwise (default: 0)\n\
           --ping <secs>      Trigger an active ping at this time (optional)\n\
           --now <secs>       Tick time (default: 0)\n\
           --radius <N>       Chunks shown on each side (default: 8)\n\
         \n\
         Every command accepts --config <path> with a JSON service configuration.\n\
         \n\
         Examples:\n\
         \n\
           bathy-probe transect --from -7000,34000 --to -7000,-34000 --steps 68\n\
           bathy-probe visibility --pos 500,500 --heading 90 --ping 0 --now 35\n"
    );
}

// --- Argument parsing ---

fn parse_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(&args[i + 1]);
        }
    }
    None
}

fn parse_point(args: &[String], flag: &str) -> Option<WorldCoord> {
    let raw = parse_value(args, flag)?;
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return None;
    }
    let x: f64 = parts[0].trim().parse().ok()?;
    let z: f64 = parts[1].trim().parse().ok()?;
    Some(WorldCoord::new(x, z))
}

fn parse_number(args: &[String], flag: &str) -> Option<f64> {
    parse_value(args, flag)?.parse().ok()
}

fn parse_count(args: &[String], flag: &str, default: usize) -> usize {
    parse_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn require_point(args: &[String], flag: &str) -> WorldCoord {
    match parse_point(args, flag) {
        Some(p) => p,
        None => {
            eprintln!("Error: {flag} <x,z> is required");
            process::exit(1);
        }
    }
}

fn load_config(args: &[String]) -> ServiceConfig {
    let Some(path) = parse_value(args, "--config") else {
        return ServiceConfig::default();
    };
    let json = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            process::exit(1);
        }
    };
    match ServiceConfig::from_json(&json) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn build_service(args: &[String]) -> TerrainService {
    match TerrainService::new(load_config(args)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error building terrain: {e}");
            process::exit(1);
        }
    }
}

// --- Transect command ---

fn cmd_transect(args: &[String]) {
    let from = require_point(args, "--from");
    let to = require_point(args, "--to");
    let steps = parse_count(args, "--steps", 50).max(1);
    let mut service = build_service(args);

    let length = from.distance_to(&to);
    println!("{:>10} {:>10} {:>10} {:>10}  province", "dist", "x", "z", "depth");
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = from.x + (to.x - from.x) * t;
        let z = from.z + (to.z - from.z) * t;
        let depth = service.height_at(x, z);
        let province = service
            .province_at(x, z)
            .map_or("out of bounds", |p| p.name());
        println!("{:>10.0} {x:>10.0} {z:>10.0} {depth:>10.1}  {province}", length * t);
    }
}

// --- Map command ---

/// Shallow to deep.
const DEPTH_RAMP: &[u8] = b"@%#*+=-:. ";

fn depth_glyph(depth: f64, min: f64, max: f64) -> char {
    let t = ((max - depth) / (max - min)).clamp(0.0, 1.0);
    let idx = (t * (DEPTH_RAMP.len() - 1) as f64).round() as usize;
    DEPTH_RAMP[idx] as char
}

fn cmd_map(args: &[String]) {
    let size = parse_count(args, "--size", 64).max(2);
    let config = load_config(args);
    let field = match HeightField::reference(&config.world) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error building terrain: {e}");
            process::exit(1);
        }
    };

    let extent = config.world.extent;
    let step = 2.0 * extent / (size - 1) as f64;
    let mut rows = Vec::with_capacity(size);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    // North at the top.
    for row in 0..size {
        let z = extent - row as f64 * step;
        let depths: Vec<f64> = (0..size)
            .map(|col| field.height(-extent + col as f64 * step, z))
            .collect();
        for d in &depths {
            lo = lo.min(*d);
            hi = hi.max(*d);
        }
        rows.push(depths);
    }

    for depths in &rows {
        let line: String = depths.iter().map(|d| depth_glyph(*d, lo, hi)).collect();
        println!("{line}");
    }
    eprintln!("Depth range {lo:.0}..{hi:.0} m, shallow '@' to deep ' '");
}

// --- Breakdown command ---

fn cmd_breakdown(args: &[String]) {
    let at = require_point(args, "--at");
    let config = load_config(args);
    let field = match HeightField::reference(&config.world) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error building terrain: {e}");
            process::exit(1);
        }
    };
    let breakdown = field.breakdown(at.x, at.z);
    match serde_json::to_string_pretty(&breakdown) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error encoding breakdown: {e}");
            process::exit(1);
        }
    }
}

// --- Visibility command ---

fn cmd_visibility(args: &[String]) {
    let pos = parse_point(args, "--pos").unwrap_or(WorldCoord::new(500.0, 500.0));
    let heading = parse_number(args, "--heading").unwrap_or(0.0).to_radians();
    let now = parse_number(args, "--now").unwrap_or(0.0);
    let radius = parse_count(args, "--radius", 8) as i32;
    let mut service = build_service(args);

    if let Some(ping) = parse_number(args, "--ping") {
        service.active_sonar_ping(ping);
        // Establish the ping before the queried tick.
        service.tick(ping, pos, heading);
    }
    let snapshot = service.tick(now, pos, heading);

    let size = service.chunk_size();
    let ocx = (pos.x / size).floor() as i32;
    let ocz = (pos.z / size).floor() as i32;
    for cz in (ocz - radius..=ocz + radius).rev() {
        let line: String = (ocx - radius..=ocx + radius)
            .map(|cx| {
                if cx == ocx && cz == ocz {
                    return 'O';
                }
                match service.is_chunk_visible(cx, cz) {
                    (true, o) if o >= 0.999 => '#',
                    (true, _) => '+',
                    (false, _) => '.',
                }
            })
            .collect();
        println!("{line}");
    }

    let sensor = snapshot.sensor;
    eprintln!(
        "t={now}s mode={:?} phase={:?} radius={} m opacity={:.2} visible={} chunks",
        sensor.mode,
        sensor.phase,
        sensor.current_radius,
        sensor.current_opacity,
        snapshot.visible_chunks.len()
    );
}
