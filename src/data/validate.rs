use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use crate::data::registry::Registry;
use crate::data::tracks::{load_track_file, track_file_paths, TrackDataError};
use crate::progression::build_track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Validates every track file in `dir`. Only an unreadable directory is an
/// `Err`; problems with individual files land in the report.
pub fn validate_track_dir(dir: impl AsRef<Path>) -> Result<ValidationReport, TrackDataError> {
    let dir = dir.as_ref();
    let paths = track_file_paths(dir)?;
    let mut report = ValidationReport::default();
    if paths.is_empty() {
        report.push(
            ValidationSeverity::Error,
            dir.display().to_string(),
            "no *.yaml track files found",
        );
        return Ok(report);
    }

    let mut seen_ids: HashMap<String, String> = HashMap::new();
    for path in &paths {
        let context = path.display().to_string();
        let file = match load_track_file(path) {
            Ok(file) => file,
            Err(err) => {
                report.push(ValidationSeverity::Error, context, err.to_string());
                continue;
            }
        };

        if let Some(first) = seen_ids.insert(file.id.clone(), context.clone()) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate track id '{}' (first defined in {first})", file.id),
            );
        }
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        if stem != Some(file.id.as_str()) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!("file name does not match track id '{}'", file.id),
            );
        }
        if file.data_version.is_none() {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "missing 'data_version'",
            );
        }

        let track = match build_track(file) {
            Ok(track) => track,
            Err(err) => {
                report.push(ValidationSeverity::Error, context, err.to_string());
                continue;
            }
        };
        for step in track.steps() {
            if step.cost.is_empty() {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context} level '{}'", step.label),
                    "step has no cost",
                );
            }
        }
        report.push(
            ValidationSeverity::Info,
            context,
            format!(
                "track '{}' ok: {} steps, {} addressing",
                track.id(),
                track.len(),
                track.addressing().scheme()
            ),
        );
    }

    Ok(report)
}

/// Ids of every track file in `dir` that parses; broken files are skipped so
/// they do not hide the ids of the others.
pub fn track_ids_in_dir(dir: impl AsRef<Path>) -> Result<BTreeSet<String>, TrackDataError> {
    let ids = track_file_paths(dir)?
        .iter()
        .filter_map(|path| load_track_file(path).ok())
        .map(|file| file.id)
        .collect();
    Ok(ids)
}

/// Cross-checks the provenance registry against the track ids actually present
/// and the files it points at (relative to `root`).
pub fn validate_registry(
    report: &mut ValidationReport,
    registry: &Registry,
    root: &Path,
    track_ids: &BTreeSet<String>,
) {
    for (id, entry) in registry {
        let context = format!("registry.{id}");
        if !root.join(&entry.path).is_file() {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("path '{}' does not exist", entry.path),
            );
        }
        if !track_ids.contains(id) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                "no track with this id",
            );
        }
        if entry.data_version.is_none() {
            report.push(ValidationSeverity::Warning, context.clone(), "missing 'data_version'");
        }
        if entry.last_updated.is_some() && entry.updated_on().is_none() {
            report.push(
                ValidationSeverity::Warning,
                context,
                "'last_updated' is not a YYYY-MM-DD date",
            );
        }
    }
    for id in track_ids {
        if !registry.contains_key(id) {
            report.push(
                ValidationSeverity::Warning,
                format!("registry.{id}"),
                "track has no provenance entry",
            );
        }
    }
}
