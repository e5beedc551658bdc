//! Validate track data: every registry entry points at a file, every track file builds.
//! Run: cargo run --bin validate_tracks [tracks_dir]

use std::path::Path;

use frostguide::data::registry::load_registry;
use frostguide::data::tracks::DEFAULT_TRACKS_DIR;
use frostguide::data::validate::{
    track_ids_in_dir, validate_registry, validate_track_dir, ValidationSeverity,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let root = Path::new(&manifest_dir);
    let tracks_dir = std::env::args()
        .nth(1)
        .map(|dir| root.join(dir))
        .unwrap_or_else(|| root.join(DEFAULT_TRACKS_DIR));
    let registry_path = root.join("data").join("registry.json");

    if !registry_path.exists() {
        eprintln!("Registry not found: {}", registry_path.display());
        std::process::exit(1);
    }

    let mut report = validate_track_dir(&tracks_dir)?;
    let track_ids = track_ids_in_dir(&tracks_dir)?;
    let registry = load_registry(&registry_path)?;
    validate_registry(&mut report, &registry, root, &track_ids);

    for diag in &report.diagnostics {
        if diag.severity != ValidationSeverity::Info {
            eprintln!("{diag}");
        }
    }
    println!(
        "Validated {} track files and {} registry entries: {} errors, {} warnings",
        track_ids.len(),
        registry.len(),
        report.count(ValidationSeverity::Error),
        report.count(ValidationSeverity::Warning)
    );
    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
