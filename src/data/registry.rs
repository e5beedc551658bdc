//! Data registry: source and version of each track table.
//! Maintained by hand alongside `data/tracks/`; read by the API and CLI to show "data as of".

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetEntry {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub path: String,
}

/// Track id -> provenance entry.
pub type Registry = BTreeMap<String, DataSetEntry>;

pub const DEFAULT_REGISTRY_PATH: &str = "data/registry.json";

/// Compiled-in copy of `data/registry.json`.
pub const BUILTIN_REGISTRY: &str = include_str!("../../data/registry.json");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn parse_registry(raw: &str) -> Result<Registry, RegistryError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_registry(&raw)
}

pub fn builtin_registry() -> Result<Registry, RegistryError> {
    parse_registry(BUILTIN_REGISTRY)
}

pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d";

impl DataSetEntry {
    /// `last_updated` as a date; `None` when absent or not `YYYY-MM-DD`.
    pub fn updated_on(&self) -> Option<NaiveDate> {
        let raw = self.last_updated.as_deref()?;
        NaiveDate::parse_from_str(raw.trim(), LAST_UPDATED_FORMAT).ok()
    }
}

/// Most recent parseable `last_updated` across all entries.
pub fn latest_update(registry: &Registry) -> Option<NaiveDate> {
    registry.values().filter_map(DataSetEntry::updated_on).max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_lists_every_builtin_track() {
        let registry = builtin_registry().unwrap();
        for (id, _) in crate::data::tracks::BUILTIN_TRACK_FILES {
            let entry = registry.get(*id).unwrap_or_else(|| panic!("{id} missing"));
            assert_eq!(entry.path, format!("data/tracks/{id}.yaml"));
        }
    }

    #[test]
    fn latest_update_picks_max_date() {
        let raw = r#"{
            "a": {"source": "x", "last_updated": "2024-01-05", "path": "a.yaml"},
            "b": {"source": "y", "last_updated": "2024-03-01", "path": "b.yaml"},
            "c": {"source": "z", "path": "c.yaml"},
            "d": {"source": "w", "last_updated": "March 2025", "path": "d.yaml"}
        }"#;
        let registry = parse_registry(raw).unwrap();
        assert_eq!(latest_update(&registry), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(registry["d"].updated_on().is_none());
        assert!(registry["c"].data_version.is_none());
    }
}
