use std::fmt;

use serde::Serialize;

use crate::data::registry::{
    builtin_registry, latest_update, load_registry, DataSetEntry, DEFAULT_REGISTRY_PATH,
};
use crate::progression::{
    calculate, LevelStep, ProgressionError, Track, TrackRegistry, UpgradeQuery,
};

#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub kind: &'static str,
    pub addressing: &'static str,
    pub max_quantity: u32,
    pub steps: usize,
    pub base_level: String,
    pub top_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_stat: Option<String>,
    pub has_bonus_curve: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
}

impl TrackSummary {
    fn from_track(track: &Track) -> Self {
        let level_ids = track.level_ids();
        Self {
            id: track.id().to_string(),
            name: track.name().to_string(),
            kind: track.kind().as_str(),
            addressing: track.addressing().scheme(),
            max_quantity: track.max_quantity(),
            steps: track.len(),
            base_level: level_ids.first().cloned().unwrap_or_default(),
            top_level: level_ids.last().cloned().unwrap_or_default(),
            bonus_stat: track.bonus_stat().map(str::to_string),
            has_bonus_curve: track.has_bonus_curve(),
            data_version: track.data_version().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackDetail<'a> {
    #[serde(flatten)]
    pub summary: TrackSummary,
    pub levels: Vec<String>,
    pub table: &'a [LevelStep],
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackVersion {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<DataSetEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataVersionResponse {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub generated_at: String,
    pub tracks: Vec<TrackVersion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum PayloadError {
    Parse(String),
    Validation(ValidationErrorResponse),
    Engine(ProgressionError),
    Serialize(serde_json::Error),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid request"),
            Self::Engine(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<ProgressionError> for PayloadError {
    fn from(err: ProgressionError) -> Self {
        Self::Engine(err)
    }
}

pub fn health_payload(registry: &TrackRegistry) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "frostguide-api",
        "version": env!("CARGO_PKG_VERSION"),
        "tracks": registry.len(),
        "data_source": registry.source().describe(),
    }))
}

pub fn tracks_payload(registry: &TrackRegistry) -> Result<String, serde_json::Error> {
    let tracks: Vec<TrackSummary> = registry.tracks().map(TrackSummary::from_track).collect();
    serde_json::to_string_pretty(&tracks)
}

pub fn track_payload(registry: &TrackRegistry, id: &str) -> Result<String, PayloadError> {
    let track = registry.get(id)?;
    let detail = TrackDetail {
        summary: TrackSummary::from_track(track),
        levels: track.level_ids(),
        table: track.steps(),
    };
    serde_json::to_string_pretty(&detail).map_err(PayloadError::Serialize)
}

pub fn data_version_payload(registry: &TrackRegistry) -> Result<String, serde_json::Error> {
    let provenance = load_registry(DEFAULT_REGISTRY_PATH)
        .or_else(|_| builtin_registry())
        .unwrap_or_default();
    let response = DataVersionResponse {
        source: registry.source().describe(),
        last_updated: latest_update(&provenance).map(|date| date.to_string()),
        generated_at: chrono::Utc::now().to_rfc3339(),
        tracks: registry
            .tracks()
            .map(|track| TrackVersion {
                id: track.id().to_string(),
                data_version: track.data_version().map(str::to_string),
                provenance: provenance.get(track.id()).cloned(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&response)
}

pub fn calculate_payload(
    registry: &TrackRegistry,
    body: &str,
) -> Result<String, PayloadError> {
    let query: UpgradeQuery = serde_json::from_str(body)
        .map_err(|err| PayloadError::Parse(err.to_string()))?;
    run_calculation(registry, &query)
}

/// `GET /api/calculate?track=..&from=..&to=..&quantity=..`
pub fn calculate_query_payload(
    registry: &TrackRegistry,
    path: &str,
) -> Result<String, PayloadError> {
    let params = parse_query(path);
    let lookup = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let quantity = match params.iter().find(|(k, _)| k == "quantity") {
        Some((_, raw)) => raw.trim().parse::<u32>().map_err(|_| {
            PayloadError::Parse(format!("invalid quantity '{raw}'"))
        })?,
        None => 1,
    };
    let query = UpgradeQuery {
        track: lookup("track"),
        from: lookup("from"),
        to: lookup("to"),
        quantity,
    };
    run_calculation(registry, &query)
}

fn run_calculation(
    registry: &TrackRegistry,
    query: &UpgradeQuery,
) -> Result<String, PayloadError> {
    validate_query(query)?;
    let estimate = calculate(registry, query)?;
    serde_json::to_string_pretty(&estimate).map_err(PayloadError::Serialize)
}

fn validate_query(query: &UpgradeQuery) -> Result<(), PayloadError> {
    let mut errors: Vec<ValidationIssue> = Vec::new();
    for (field, value) in [
        ("track", &query.track),
        ("from", &query.from),
        ("to", &query.to),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationIssue {
                field,
                messages: vec!["must not be empty".to_string()],
            });
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    Err(PayloadError::Validation(ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors,
    }))
}

/// Query string pairs, percent-decoded, `+` as space.
pub fn parse_query(path: &str) -> Vec<(String, String)> {
    let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect()
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values_are_percent_decoded() {
        let params = parse_query("/api/calculate?track=war_academy&from=Lv.%2030&to=FC1-2&x");
        assert_eq!(
            params,
            vec![
                ("track".to_string(), "war_academy".to_string()),
                ("from".to_string(), "Lv. 30".to_string()),
                ("to".to_string(), "FC1-2".to_string()),
                ("x".to_string(), String::new()),
            ]
        );
        assert_eq!(percent_decode("Legendary+1%2A"), "Legendary 1*");
        assert_eq!(percent_decode("100%"), "100%");
    }

    #[test]
    fn empty_fields_fail_validation() {
        let registry = TrackRegistry::builtin().unwrap();
        let err = calculate_payload(&registry, r#"{"track":"","from":"1","to":" "}"#).unwrap_err();
        let PayloadError::Validation(payload) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = payload.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["track", "to"]);
    }
}
