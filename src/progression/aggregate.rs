//! Range cost aggregation over dense positions.

use serde::Serialize;

use crate::progression::cost::ResourceCost;
use crate::progression::error::{LevelParseError, ProgressionError, Result};
use crate::progression::track::Track;

/// Checks `from < to <= len`. Positions past the end are invalid levels;
/// `from >= to` is the "nothing to compute" case.
pub fn check_range(track: &Track, from: usize, to: usize) -> Result<()> {
    let max = track.len();
    for position in [from, to] {
        if position > max {
            return Err(track.invalid_level(
                &position.to_string(),
                LevelParseError::OutOfRange { position, max },
            ));
        }
    }
    if from >= to {
        return Err(ProgressionError::EmptyOrInvertedRange {
            track: track.id().to_string(),
            from,
            to,
        });
    }
    Ok(())
}

/// Sum of step costs over `[from, to)`, multiplied by `quantity` once at the end.
pub fn sum_cost(track: &Track, from: usize, to: usize, quantity: u32) -> Result<ResourceCost> {
    check_range(track, from, to)?;
    if quantity == 0 {
        return Err(ProgressionError::InvalidQuantity {
            track: track.id().to_string(),
            quantity,
            max: track.max_quantity(),
        });
    }

    let mut total = ResourceCost::new();
    for step in &track.steps()[from..to] {
        total.add_from(&step.cost);
    }
    Ok(total.scaled(u64::from(quantity)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepCost {
    pub index: usize,
    pub level: String,
    pub cost: ResourceCost,
}

/// Per-step costs over `[from, to)`, for table views.
pub fn step_breakdown(track: &Track, from: usize, to: usize) -> Result<Vec<StepCost>> {
    check_range(track, from, to)?;
    Ok(track.steps()[from..to]
        .iter()
        .enumerate()
        .map(|(offset, step)| StepCost {
            index: from + offset,
            level: step.label.clone(),
            cost: step.cost.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::TrackRegistry;

    #[test]
    fn enhancement_full_range_and_quantity() {
        let registry = TrackRegistry::builtin().unwrap();
        let track = registry.get("hero_gear_enhancement").unwrap();
        let single = sum_cost(track, 0, 100, 1).unwrap();
        assert_eq!(single.get("enhancement_xp"), 73_320);
        let four = sum_cost(track, 0, 100, 4).unwrap();
        assert_eq!(four.get("enhancement_xp"), 293_280);
    }

    #[test]
    fn empty_inverted_and_out_of_range() {
        let registry = TrackRegistry::builtin().unwrap();
        let track = registry.get("hero_gear_enhancement").unwrap();
        assert!(sum_cost(track, 50, 50, 1).unwrap_err().is_empty_range());
        assert!(sum_cost(track, 60, 10, 1).unwrap_err().is_empty_range());
        assert!(matches!(
            sum_cost(track, 0, 101, 1),
            Err(ProgressionError::InvalidLevel { .. })
        ));
        assert!(matches!(
            sum_cost(track, 0, 10, 0),
            Err(ProgressionError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn breakdown_matches_sum() {
        let registry = TrackRegistry::builtin().unwrap();
        let track = registry.get("chief_charm").unwrap();
        let rows = step_breakdown(track, 4, 8).unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r.level.as_str()).collect();
        assert_eq!(labels, ["4-1", "4-2", "4-3", "5-0"]);

        let mut total = ResourceCost::new();
        for row in &rows {
            total.add_from(&row.cost);
        }
        assert_eq!(total, sum_cost(track, 4, 8, 1).unwrap());
    }
}
