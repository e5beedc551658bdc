use serde::{Deserialize, Serialize};

use crate::progression::addressing::{Addressing, LevelAddressing};
use crate::progression::cost::ResourceCost;
use crate::progression::error::{LevelParseError, ProgressionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Gear,
    Building,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gear => "gear",
            Self::Building => "building",
        }
    }
}

/// Cost (and optional bonus / building data) of advancing one dense index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStep {
    /// Level identifier this step lands on.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub cost: ResourceCost,
    /// Cumulative bonus on completing this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_gain: Option<u64>,
}

impl LevelStep {
    pub fn new(cost: ResourceCost) -> Self {
        Self {
            label: String::new(),
            category: None,
            cost,
            bonus: None,
            prerequisite: None,
            build_time_seconds: None,
            power_gain: None,
        }
    }

    pub fn with_bonus(mut self, bonus: Option<f64>) -> Self {
        self.bonus = bonus;
        self
    }
}

/// One upgrade path. Built by the store, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Track {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) data_version: Option<String>,
    pub(crate) kind: TrackKind,
    pub(crate) max_quantity: u32,
    pub(crate) bonus_stat: Option<String>,
    /// Bonus at position 0; `Some` exactly when the track has a bonus curve.
    pub(crate) base_bonus: Option<f64>,
    pub(crate) addressing: Addressing,
    pub(crate) levels: Vec<LevelStep>,
}

impl Track {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_version(&self) -> Option<&str> {
        self.data_version.as_deref()
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_building(&self) -> bool {
        self.kind == TrackKind::Building
    }

    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    pub fn bonus_stat(&self) -> Option<&str> {
        self.bonus_stat.as_deref()
    }

    pub fn has_bonus_curve(&self) -> bool {
        self.base_bonus.is_some()
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    pub fn steps(&self) -> &[LevelStep] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn resolve(&self, level: &str) -> Result<usize> {
        self.addressing
            .resolve(level)
            .map_err(|reason| self.invalid_level(level, reason))
    }

    pub fn unresolve(&self, position: usize) -> Result<String> {
        self.addressing
            .unresolve(position)
            .map_err(|reason| self.invalid_level(&position.to_string(), reason))
    }

    /// Identifier of the level reached by completing step `index`.
    pub fn step_label(&self, index: usize) -> Result<String> {
        self.unresolve(index + 1)
    }

    /// Every canonical level identifier, position 0 first.
    pub fn level_ids(&self) -> Vec<String> {
        self.addressing.level_ids()
    }

    /// Stored bonus at a position: the base bonus at 0, else the bonus of the
    /// step landing there. `None` for interpolated positions.
    pub fn stored_bonus(&self, position: usize) -> Option<f64> {
        match position {
            0 => self.base_bonus,
            p => self.levels.get(p - 1).and_then(|step| step.bonus),
        }
    }

    pub(crate) fn invalid_level(&self, level: &str, reason: LevelParseError) -> ProgressionError {
        ProgressionError::InvalidLevel {
            track: self.id.clone(),
            level: level.to_string(),
            reason,
        }
    }

    pub(crate) fn unsupported(&self, operation: &'static str) -> ProgressionError {
        ProgressionError::UnsupportedOperation {
            track: self.id.clone(),
            operation,
        }
    }
}
