//! One-call upgrade estimate: resolve both endpoints, sum the range, scale by
//! quantity and attach bonus / building annotations.

use serde::{Deserialize, Serialize};

use crate::progression::aggregate::sum_cost;
use crate::progression::annotate::{milestones_in_range, summarize_range, Milestone, RangeSummary};
use crate::progression::bonus::bonus_at;
use crate::progression::cost::ResourceCost;
use crate::progression::error::{ProgressionError, Result};
use crate::progression::registry::TrackRegistry;
use crate::progression::track::Track;

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeQuery {
    pub track: String,
    pub from: String,
    pub to: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl UpgradeQuery {
    pub fn new(track: &str, from: &str, to: &str, quantity: u32) -> Self {
        Self {
            track: track.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BonusChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeBreakdown {
    pub track: String,
    pub from: String,
    pub to: String,
    pub from_index: usize,
    pub to_index: usize,
    pub quantity: u32,
    pub steps: usize,
    pub per_unit: ResourceCost,
    pub total: ResourceCost,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<BonusChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<RangeSummary>,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpgradeEstimate {
    /// `from` is at or past `to`: nothing to pay, nothing to show.
    Empty {
        track: String,
        from: String,
        to: String,
    },
    #[serde(rename = "ok")]
    Upgrade(UpgradeBreakdown),
}

impl UpgradeEstimate {
    pub fn breakdown(&self) -> Option<&UpgradeBreakdown> {
        match self {
            Self::Upgrade(breakdown) => Some(breakdown),
            Self::Empty { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

pub fn check_quantity(track: &Track, quantity: u32) -> Result<()> {
    let max = track.max_quantity();
    if quantity == 0 || quantity > max {
        return Err(ProgressionError::InvalidQuantity {
            track: track.id().to_string(),
            quantity,
            max,
        });
    }
    Ok(())
}

pub fn calculate(registry: &TrackRegistry, query: &UpgradeQuery) -> Result<UpgradeEstimate> {
    let track = registry.get(&query.track)?;
    check_quantity(track, query.quantity)?;
    let from_index = track.resolve(&query.from)?;
    let to_index = track.resolve(&query.to)?;

    let per_unit = match sum_cost(track, from_index, to_index, 1) {
        Ok(cost) => cost,
        Err(err) if err.is_empty_range() => {
            tracing::debug!(
                target: "frostguide::calculator",
                track = track.id(),
                from = %query.from,
                to = %query.to,
                "empty range"
            );
            return Ok(UpgradeEstimate::Empty {
                track: track.id().to_string(),
                from: query.from.trim().to_string(),
                to: query.to.trim().to_string(),
            });
        }
        Err(err) => return Err(err),
    };
    let total = per_unit.scaled(u64::from(query.quantity));

    let bonus = if track.has_bonus_curve() {
        let before = bonus_at(track, &query.from)?;
        let after = bonus_at(track, &query.to)?;
        Some(BonusChange {
            stat: track.bonus_stat().map(str::to_string),
            before,
            after,
            delta: after - before,
        })
    } else {
        None
    };

    let building = if track.is_building() {
        Some(summarize_range(track, from_index, to_index)?)
    } else {
        None
    };

    Ok(UpgradeEstimate::Upgrade(UpgradeBreakdown {
        track: track.id().to_string(),
        from: track.unresolve(from_index)?,
        to: track.unresolve(to_index)?,
        from_index,
        to_index,
        quantity: query.quantity,
        steps: to_index - from_index,
        per_unit,
        total,
        bonus,
        building,
        milestones: milestones_in_range(track, from_index, to_index)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charm_sockets_multiply_the_whole_range() {
        let registry = TrackRegistry::builtin().unwrap();
        let query = UpgradeQuery::new("chief_charm", "11", "12", 18);
        let estimate = calculate(&registry, &query).unwrap();
        let breakdown = estimate.breakdown().expect("11 -> 12 is a real upgrade");
        assert_eq!(breakdown.to, "12-0");
        assert_eq!(breakdown.steps, 4);
        assert_eq!(breakdown.per_unit.get("charm_guides"), 580);
        assert_eq!(breakdown.per_unit.get("charm_designs"), 600);
        assert_eq!(breakdown.per_unit.get("charm_secrets"), 15);
        assert_eq!(breakdown.total.get("charm_secrets"), 270);
        let bonus = breakdown.bonus.as_ref().unwrap();
        assert_eq!((bonus.before, bonus.after, bonus.delta), (55.0, 59.0, 4.0));
        assert!(breakdown.building.is_none());
    }

    #[test]
    fn empty_range_is_not_an_error() {
        let registry = TrackRegistry::builtin().unwrap();
        let query = UpgradeQuery::new("hero_gear_enhancement", "50", "50", 1);
        let estimate = calculate(&registry, &query).unwrap();
        assert!(estimate.is_empty());

        let inverted = UpgradeQuery::new("chief_gear", "Mythic", "Rare", 2);
        assert!(calculate(&registry, &inverted).unwrap().is_empty());
    }

    #[test]
    fn quantity_above_cap_is_rejected() {
        let registry = TrackRegistry::builtin().unwrap();
        let query = UpgradeQuery::new("hero_gear_enhancement", "0", "10", 5);
        assert_eq!(
            calculate(&registry, &query).unwrap_err(),
            ProgressionError::InvalidQuantity {
                track: "hero_gear_enhancement".to_string(),
                quantity: 5,
                max: 4,
            }
        );
    }

    #[test]
    fn building_estimate_carries_summary() {
        let registry = TrackRegistry::builtin().unwrap();
        let query = UpgradeQuery::new("war_academy", "Lv. 30", "FC2", 1);
        let estimate = calculate(&registry, &query).unwrap();
        let breakdown = estimate.breakdown().unwrap();
        let building = breakdown.building.as_ref().unwrap();
        assert_eq!(building.highest_prerequisite.as_deref(), Some("Furnace FC2"));
        assert!(breakdown.bonus.is_none());
    }

    #[test]
    fn estimate_serializes_with_status_tag() {
        let registry = TrackRegistry::builtin().unwrap();
        let empty = calculate(&registry, &UpgradeQuery::new("hero_gear_mastery", "3", "3", 1)).unwrap();
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["status"], "empty");

        let ok = calculate(&registry, &UpgradeQuery::new("hero_gear_mastery", "3", "4", 1)).unwrap();
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["total"]["essence_stones"], 40);
    }
}
