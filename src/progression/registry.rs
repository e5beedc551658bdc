//! Startup-loaded track tables.
//! Build once, wrap in an Arc and hand to the CLI / server so nothing reloads per request.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::tracks::{
    builtin_track_files, load_track_dir, TrackDataError, TrackFile, TRACKS_DIR_ENV,
};
use crate::progression::error::{ProgressionError, Result};
use crate::progression::store::build_track;
use crate::progression::track::Track;

/// Where the loaded tables came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    Builtin,
    Directory(PathBuf),
}

impl TrackSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Builtin => "builtin".to_string(),
            Self::Directory(path) => path.display().to_string(),
        }
    }
}

/// Read-only set of tracks keyed by id.
#[derive(Debug)]
pub struct TrackRegistry {
    tracks: BTreeMap<String, Track>,
    source: TrackSource,
}

impl TrackRegistry {
    pub fn from_files(
        files: Vec<TrackFile>,
        source: TrackSource,
    ) -> std::result::Result<Self, TrackDataError> {
        let mut tracks = BTreeMap::new();
        for file in files {
            let track = build_track(file)?;
            let id = track.id().to_string();
            if tracks.insert(id.clone(), track).is_some() {
                return Err(TrackDataError::Duplicate(id));
            }
        }
        Ok(Self { tracks, source })
    }

    /// Tables compiled into the binary.
    pub fn builtin() -> std::result::Result<Self, TrackDataError> {
        Self::from_files(builtin_track_files()?, TrackSource::Builtin)
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> std::result::Result<Self, TrackDataError> {
        let dir = dir.as_ref();
        Self::from_files(load_track_dir(dir)?, TrackSource::Directory(dir.to_path_buf()))
    }

    /// Load from `FROSTGUIDE_TRACKS_DIR` when set, falling back to the builtin
    /// tables if that directory cannot be loaded.
    pub fn load_from_env() -> std::result::Result<Arc<Self>, TrackDataError> {
        if let Some(dir) = env::var_os(TRACKS_DIR_ENV).map(PathBuf::from) {
            match Self::from_dir(&dir) {
                Ok(registry) => {
                    tracing::info!(
                        target: "frostguide::data",
                        path = %dir.display(),
                        tracks = registry.len(),
                        "track_tables.loaded=directory"
                    );
                    return Ok(Arc::new(registry));
                }
                Err(err) => {
                    tracing::warn!(
                        target: "frostguide::data",
                        path = %dir.display(),
                        error = %err,
                        "track_tables.load_failed"
                    );
                }
            }
        }

        let registry = Self::builtin()?;
        tracing::info!(
            target: "frostguide::data",
            tracks = registry.len(),
            "track_tables.loaded=builtin"
        );
        Ok(Arc::new(registry))
    }

    pub fn get(&self, id: &str) -> Result<&Track> {
        let key = id.trim();
        self.tracks
            .get(key)
            .ok_or_else(|| ProgressionError::UnknownTrack(key.to_string()))
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn source(&self) -> &TrackSource {
        &self.source
    }
}
