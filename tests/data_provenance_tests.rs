//! Data provenance: every shipped track has a registry entry with a source and version,
//! and the on-disk tables match the copies compiled into the binary.

use std::collections::BTreeSet;
use std::path::Path;

use frostguide::data::registry::{load_registry, DEFAULT_REGISTRY_PATH};
use frostguide::data::tracks::{load_track_dir, DEFAULT_TRACKS_DIR};
use frostguide::data::validate::{validate_registry, ValidationReport};
use frostguide::progression::TrackRegistry;

#[test]
fn registry_entries_have_provenance_fields() {
    let path = Path::new(DEFAULT_REGISTRY_PATH);
    if !path.exists() {
        eprintln!("Skipping: {} not found", path.display());
        return;
    }
    let registry = load_registry(path).expect("registry should parse");
    assert!(!registry.is_empty(), "registry should have entries");
    for (id, entry) in &registry {
        assert!(!entry.source.trim().is_empty(), "{id} has no source");
        assert!(entry.data_version.is_some(), "{id} has no data_version");
        assert!(entry.updated_on().is_some(), "{id} has no parseable last_updated");
    }
}

#[test]
fn registry_matches_track_directory() {
    let files = load_track_dir(DEFAULT_TRACKS_DIR).expect("track dir should load");
    let ids: BTreeSet<String> = files.into_iter().map(|file| file.id).collect();
    let registry = load_registry(DEFAULT_REGISTRY_PATH).expect("registry should parse");

    let mut report = ValidationReport::default();
    validate_registry(&mut report, &registry, Path::new("."), &ids);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn directory_tables_match_builtin_tables() {
    let builtin = TrackRegistry::builtin().expect("builtin tables should load");
    let from_dir = TrackRegistry::from_dir(DEFAULT_TRACKS_DIR).expect("track dir should load");
    assert_eq!(builtin.len(), from_dir.len());
    for track in builtin.tracks() {
        let other = from_dir.get(track.id()).expect("same ids in both sources");
        assert_eq!(track.steps(), other.steps(), "{}", track.id());
        assert_eq!(track.data_version(), other.data_version());
    }
}
