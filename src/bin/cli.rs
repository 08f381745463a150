//! turfclaim CLI - Debug tool for territory claims
//!
//! Usage:
//!   turfclaim-cli claim <folder> [--output <file>] [--activity <type>]
//!   turfclaim-cli check <file> [--activity <type>]
//!   turfclaim-cli demo [--seed <n>]
//!
//! GPX files are replayed in filename order. The owner of an activity is the
//! part of the file stem before the first '-' ("alice-morning.gpx" is
//! claimed by "alice").

use clap::{Parser, Subcommand};
use gpx::{read, Gpx};
use log::warn;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use turfclaim::synthetic::{LoopConfig, LoopShape};
use turfclaim::{
    check_loop_closure, validate_path_speeds, ActivityType, ClaimReceipt, GpsPoint, LatLng,
    TerritoryEngine,
};

#[derive(Parser)]
#[command(name = "turfclaim-cli")]
#[command(about = "Debug tool for territory claims and conquering", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay every GPX file in a folder as a territory claim
    Claim {
        /// Folder containing GPX files
        folder: PathBuf,

        /// Write territories and invasions as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Declared activity type used for speed validation (walk, run, ride)
        #[arg(short, long, default_value = "run")]
        activity: ActivityType,
    },

    /// Report loop closure and speed plausibility for one GPX file
    Check {
        /// GPX file
        file: PathBuf,

        /// Declared activity type (walk, run, ride)
        #[arg(short, long, default_value = "run")]
        activity: ActivityType,
    },

    /// Replay synthetic overlapping loops
    Demo {
        /// RNG seed for the GPS noise
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Claim {
            folder,
            output,
            activity,
        } => run_claims(&folder, output.as_deref(), activity, cli.verbose),
        Commands::Check { file, activity } => run_check(&file, activity),
        Commands::Demo { seed } => run_demo(seed, cli.verbose),
    }
}

/// Activity loaded from a GPX file
struct GpxActivity {
    id: String,
    owner: String,
    points: Vec<GpsPoint>,
}

fn parse_gpx_file(path: &Path) -> Result<GpxActivity, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    let gpx: Gpx = read(reader).map_err(|e| e.to_string())?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    let owner = stem.split('-').next().unwrap_or(&stem).to_string();

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                let timestamp = pt
                    .time
                    .as_ref()
                    .and_then(|t| t.format().ok())
                    .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.timestamp_millis())
                    .unwrap_or(0);
                points.push(GpsPoint {
                    latitude: pt.point().y(),
                    longitude: pt.point().x(),
                    timestamp,
                    speed: pt.speed,
                    accuracy: None,
                    elevation: pt.elevation,
                });
            }
        }
    }

    if points.is_empty() {
        return Err("No track points found".to_string());
    }

    Ok(GpxActivity {
        id: stem,
        owner,
        points,
    })
}

fn load_gpx_files(folder: &Path, verbose: bool) -> Vec<GpxActivity> {
    let mut paths: Vec<PathBuf> = match fs::read_dir(folder) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "gpx"))
            .collect(),
        Err(e) => {
            eprintln!("Error reading folder: {}", e);
            return Vec::new();
        }
    };
    paths.sort();

    let mut activities = Vec::new();
    for path in paths {
        match parse_gpx_file(&path) {
            Ok(activity) => {
                if verbose {
                    println!(
                        "  Loaded {} ({} points, owner {})",
                        activity.id,
                        activity.points.len(),
                        activity.owner
                    );
                }
                activities.push(activity);
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    activities
}

fn print_receipt(receipt: &ClaimReceipt, verbose: bool) {
    let t = &receipt.territory;
    println!(
        "  + {} ({}): {:.0} m², perimeter {:.0} m, center ({:.5}, {:.5})",
        t.activity_id, t.owner_id, t.area, t.perimeter, t.center.latitude, t.center.longitude
    );
    for invasion in &receipt.invasions {
        println!(
            "    {} {} of {} ({:.0} m²)",
            if invasion.territory_was_destroyed {
                "destroyed"
            } else {
                "invaded"
            },
            invasion.invaded_territory_id,
            invasion.invaded_user_id,
            invasion.overlap_area
        );
    }
    if verbose {
        println!("    polygon vertices: {}", t.polygon.len());
    }
}

fn run_claims(folder: &Path, output: Option<&Path>, activity_type: ActivityType, verbose: bool) {
    let activities = load_gpx_files(folder, verbose);
    if activities.is_empty() {
        println!("No activities to process");
        return;
    }

    println!("\n{}", "=".repeat(60));
    println!("CLAIMS ({} activities)", activities.len());
    println!("{}", "=".repeat(60));

    let mut engine = TerritoryEngine::new();
    for activity in &activities {
        let report = validate_path_speeds(&activity.points, activity_type);
        if report.invalid > 0 {
            println!(
                "  [WARN] {}: {} of {} samples too fast for {}",
                activity.id, report.invalid, report.checked, activity_type
            );
        }

        let owner = activity.owner.as_str();
        match engine.claim_activity(&activity.points, owner, Some(owner), &activity.id) {
            Some(receipt) => print_receipt(&receipt, verbose),
            None => {
                let closure = check_loop_closure(&activity.points);
                println!(
                    "  - {}: no territory (closed: {}, gap {:.0} m)",
                    activity.id, closure.is_closed, closure.distance
                );
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("RESULT");
    println!("{}", "=".repeat(60));
    let stats = engine.stats();
    println!(
        "  {} territories, {} owners, {} invasions",
        stats.territory_count, stats.owner_count, stats.invasion_count
    );

    if let Some(path) = output {
        if let Err(e) = write_json(&engine, path) {
            eprintln!("Error writing {}: {}", path.display(), e);
        } else {
            println!("  Wrote {}", path.display());
        }
    }
}

fn write_json(engine: &TerritoryEngine, path: &Path) -> std::io::Result<()> {
    let mut territories: Vec<_> = engine.territories.values().collect();
    territories.sort_by(|a, b| a.claimed_at.cmp(&b.claimed_at).then_with(|| a.id.cmp(&b.id)));
    let invasions: Vec<_> = engine.invasions.iter().collect();

    let doc = serde_json::json!({
        "territories": territories,
        "invasions": invasions,
    });

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &doc)?;
    writer.flush()
}

fn run_check(file: &Path, activity_type: ActivityType) {
    let activity = match parse_gpx_file(file) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            return;
        }
    };

    let closure = check_loop_closure(&activity.points);
    let report = validate_path_speeds(&activity.points, activity_type);

    println!("{}", activity.id);
    println!("  points:     {}", activity.points.len());
    println!(
        "  loop:       {} (gap {:.0} m)",
        if closure.is_closed { "closed" } else { "open" },
        closure.distance
    );
    println!(
        "  speed:      {} checked, {} invalid, {} suspicious",
        report.checked, report.invalid, report.suspicious
    );
    if let Some(suggested) = report.suggested {
        println!("  suggested:  {}", suggested);
    }
}

fn run_demo(seed: u64, verbose: bool) {
    let loops = [
        ("alice", "alice-1", LatLng::new(37.770, -122.420), 150.0, LoopShape::Square),
        ("bob", "bob-1", LatLng::new(37.770, -122.418), 150.0, LoopShape::Circle),
        ("carol", "carol-1", LatLng::new(37.770, -122.419), 400.0, LoopShape::Square),
        ("alice", "alice-2", LatLng::new(37.772, -122.419), 120.0, LoopShape::FigureEight),
    ];

    let mut engine = TerritoryEngine::new();
    for (i, (owner, activity_id, center, radius, shape)) in loops.into_iter().enumerate() {
        let path = LoopConfig {
            center,
            radius_meters: radius,
            point_count: 120,
            shape,
            gps_noise_sigma_meters: 3.0,
            speed_mps: Some(3.0),
            seed: seed + i as u64,
        }
        .generate();

        match engine.claim_activity(&path, owner, Some(owner), activity_id) {
            Some(receipt) => print_receipt(&receipt, verbose),
            None => println!("  - {}: no territory", activity_id),
        }
    }

    for owner in ["alice", "bob", "carol"] {
        println!(
            "  {}: {} territories, {:.0} m²",
            owner,
            engine.territories_for_owner(owner).len(),
            engine.area_for_owner(owner)
        );
    }
}
