//! Track reference data: one YAML document per upgrade track.
//!
//! Built-in copies of `data/tracks/*.yaml` are compiled into the binary. Setting
//! `FROSTGUIDE_TRACKS_DIR` points the loader at a directory of replacement files
//! so balance numbers can change without a rebuild.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::TrackKind;

pub const DEFAULT_TRACKS_DIR: &str = "data/tracks";
pub const TRACKS_DIR_ENV: &str = "FROSTGUIDE_TRACKS_DIR";

pub const BUILTIN_TRACK_FILES: &[(&str, &str)] = &[
    (
        "hero_gear_enhancement",
        include_str!("../../data/tracks/hero_gear_enhancement.yaml"),
    ),
    (
        "hero_gear_legendary",
        include_str!("../../data/tracks/hero_gear_legendary.yaml"),
    ),
    (
        "hero_gear_mastery",
        include_str!("../../data/tracks/hero_gear_mastery.yaml"),
    ),
    ("chief_gear", include_str!("../../data/tracks/chief_gear.yaml")),
    ("chief_charm", include_str!("../../data/tracks/chief_charm.yaml")),
    ("war_academy", include_str!("../../data/tracks/war_academy.yaml")),
];

/// Raw track document as written in `data/tracks/*.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data_version: Option<String>,
    pub kind: TrackKind,
    pub addressing: AddressingSpec,
    pub max_quantity: u32,
    #[serde(default)]
    pub bonus_stat: Option<String>,
    #[serde(default)]
    pub base_bonus: Option<f64>,
    /// Per-step rows (integer and named-tier tracks).
    #[serde(default)]
    pub steps: Vec<StepEntry>,
    /// Per-major-transition rows (composite tracks).
    #[serde(default)]
    pub majors: Vec<MajorEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum AddressingSpec {
    Integer,
    Composite { plain_majors: u32 },
    NamedTier { base_tier: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepEntry {
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cost: BTreeMap<String, u64>,
    #[serde(default)]
    pub bonus: Option<f64>,
    #[serde(default)]
    pub prerequisite: Option<String>,
    #[serde(default)]
    pub build_time_seconds: Option<u64>,
    #[serde(default)]
    pub power_gain: Option<u64>,
}

/// Cost of one whole major transition (`M-1` -> `M`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorEntry {
    #[serde(default)]
    pub cost: BTreeMap<String, u64>,
    /// Materials charged in full on the step landing on `M-0`, never split.
    #[serde(default)]
    pub completion: BTreeMap<String, u64>,
    #[serde(default)]
    pub bonus: Option<f64>,
}

#[derive(Debug, Error)]
pub enum TrackDataError {
    #[error("failed to read track data from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse track data '{origin}': {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("track '{track}' is invalid: {reason}")]
    Invalid { track: String, reason: String },
    #[error("track '{0}' is defined more than once")]
    Duplicate(String),
    #[error("no track files found in {0:?}")]
    EmptyDirectory(PathBuf),
}

impl TrackDataError {
    pub fn invalid(track: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            track: track.to_string(),
            reason: reason.into(),
        }
    }
}

pub fn parse_track_file(raw: &str, origin: &str) -> Result<TrackFile, TrackDataError> {
    serde_yaml::from_str(raw).map_err(|source| TrackDataError::Parse {
        origin: origin.to_string(),
        source,
    })
}

pub fn load_track_file(path: impl AsRef<Path>) -> Result<TrackFile, TrackDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| TrackDataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_track_file(&raw, &path.display().to_string())
}

fn is_track_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
}

/// `*.yaml` / `*.yml` files of a directory in file-name order.
pub fn track_file_paths(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, TrackDataError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| TrackDataError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TrackDataError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if is_track_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Files are parsed in parallel; the result keeps file-name order.
pub fn load_track_dir(dir: impl AsRef<Path>) -> Result<Vec<TrackFile>, TrackDataError> {
    let dir = dir.as_ref();
    let paths = track_file_paths(dir)?;
    if paths.is_empty() {
        return Err(TrackDataError::EmptyDirectory(dir.to_path_buf()));
    }
    paths.par_iter().map(load_track_file).collect()
}

pub fn builtin_track_files() -> Result<Vec<TrackFile>, TrackDataError> {
    BUILTIN_TRACK_FILES
        .iter()
        .map(|(name, raw)| parse_track_file(raw, &format!("builtin:{name}")))
        .collect()
}
