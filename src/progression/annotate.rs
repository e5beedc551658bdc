//! Build time, power and prerequisite reporting for building tracks, plus
//! milestone detection over any range.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::progression::aggregate::check_range;
use crate::progression::cost::ResourceCost;
use crate::progression::error::Result;
use crate::progression::track::Track;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeSummary {
    /// Unaccelerated build time, in seconds.
    pub total_time_seconds: u64,
    /// Most advanced external tier needed to finish the range. Not enforced.
    pub highest_prerequisite: Option<String>,
    pub power_gain: u64,
}

pub fn summarize_range(track: &Track, from: usize, to: usize) -> Result<RangeSummary> {
    if !track.is_building() {
        return Err(track.unsupported("build time or prerequisites"));
    }
    check_range(track, from, to)?;

    let steps = track.steps();
    let mut summary = RangeSummary {
        total_time_seconds: 0,
        highest_prerequisite: steps[from].prerequisite.clone(),
        power_gain: 0,
    };
    for index in from..to {
        let step = &steps[index];
        summary.total_time_seconds = summary
            .total_time_seconds
            .saturating_add(step.build_time_seconds.unwrap_or(0));
        summary.power_gain = summary.power_gain.saturating_add(step.power_gain.unwrap_or(0));
        if index > 0 && step.prerequisite != steps[index - 1].prerequisite {
            summary.highest_prerequisite = step.prerequisite.clone();
        }
    }
    Ok(summary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneReason {
    NewPrerequisite,
    NewResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    /// Dense step index.
    pub index: usize,
    /// Level the milestone step lands on.
    pub level: String,
    pub reasons: Vec<MilestoneReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerequisite: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub new_resources: Vec<String>,
    /// Cost of the steps since the previous milestone (or the range start).
    pub cost_since_previous: ResourceCost,
}

/// Steps in `[from, to)` that need a new prerequisite tier or consume a
/// resource kind no earlier step of the track used. The track's first step
/// is the baseline and never a milestone.
pub fn milestones_in_range(track: &Track, from: usize, to: usize) -> Result<Vec<Milestone>> {
    check_range(track, from, to)?;
    let steps = track.steps();

    let mut seen: BTreeSet<&str> = steps[..from.max(1)]
        .iter()
        .flat_map(|step| step.cost.resources())
        .collect();
    let mut milestones = Vec::new();
    let mut since = ResourceCost::new();

    for index in from..to {
        let step = &steps[index];
        let mut reasons = Vec::new();
        if index > 0 && step.prerequisite != steps[index - 1].prerequisite {
            reasons.push(MilestoneReason::NewPrerequisite);
        }
        let new_resources: Vec<String> = step
            .cost
            .resources()
            .filter(|resource| seen.insert(*resource))
            .map(str::to_string)
            .collect();
        if !new_resources.is_empty() {
            reasons.push(MilestoneReason::NewResource);
        }

        if !reasons.is_empty() {
            milestones.push(Milestone {
                index,
                level: step.label.clone(),
                reasons,
                prerequisite: step.prerequisite.clone(),
                new_resources,
                cost_since_previous: std::mem::take(&mut since),
            });
        }
        since.add_from(&step.cost);
    }
    Ok(milestones)
}
