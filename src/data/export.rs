//! CSV export of a track's dense step table, for spreadsheets.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::progression::Track;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Column order: `index, level, category`, one column per resource the track
/// uses (sorted), then `bonus` for tracks with a curve and the building
/// columns for building tracks. Missing amounts are written as `0`.
pub fn export_columns(track: &Track) -> Vec<String> {
    let mut columns = vec!["index".to_string(), "level".to_string(), "category".to_string()];
    columns.extend(resource_columns(track));
    if track.has_bonus_curve() {
        columns.push("bonus".to_string());
    }
    if track.is_building() {
        columns.extend(
            ["prerequisite", "build_time_seconds", "power_gain"]
                .iter()
                .map(|c| c.to_string()),
        );
    }
    columns
}

fn resource_columns(track: &Track) -> Vec<String> {
    let resources: BTreeSet<&str> = track
        .steps()
        .iter()
        .flat_map(|step| step.cost.resources())
        .collect();
    resources.into_iter().map(str::to_string).collect()
}

pub fn write_track_csv<W: io::Write>(track: &Track, writer: W) -> Result<(), ExportError> {
    let resources = resource_columns(track);
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(export_columns(track))?;

    for (index, step) in track.steps().iter().enumerate() {
        let mut record = vec![
            index.to_string(),
            step.label.clone(),
            step.category.clone().unwrap_or_default(),
        ];
        record.extend(resources.iter().map(|r| step.cost.get(r).to_string()));
        if track.has_bonus_curve() {
            record.push(step.bonus.map(|b| b.to_string()).unwrap_or_default());
        }
        if track.is_building() {
            record.push(step.prerequisite.clone().unwrap_or_default());
            record.push(step.build_time_seconds.unwrap_or(0).to_string());
            record.push(step.power_gain.unwrap_or(0).to_string());
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_track_csv(track: &Track, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_track_csv(track, file)
}
