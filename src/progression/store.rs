//! Table construction: raw track documents -> immutable dense [Track]s.
//!
//! All rounding happens here, once. Composite (charm) majors are expanded to
//! quarter steps with rounded-up costs so aggregation never divides.

use std::collections::BTreeMap;

use crate::data::tracks::{AddressingSpec, MajorEntry, StepEntry, TrackDataError, TrackFile};
use crate::progression::addressing::{
    Addressing, CompositeAddressing, IntegerAddressing, LevelAddressing, NamedTierAddressing,
    QUARTERS,
};
use crate::progression::cost::ResourceCost;
use crate::progression::track::{LevelStep, Track, TrackKind};

fn to_cost(raw: &BTreeMap<String, u64>) -> ResourceCost {
    raw.iter().map(|(k, v)| (k.as_str(), *v)).collect()
}

/// Build one track from its reference document, validating invariants.
pub fn build_track(file: TrackFile) -> Result<Track, TrackDataError> {
    let id = file.id.trim().to_string();
    if id.is_empty() {
        return Err(TrackDataError::invalid("<missing-id>", "missing non-empty 'id'"));
    }
    if file.max_quantity == 0 {
        return Err(TrackDataError::invalid(&id, "max_quantity must be at least 1"));
    }

    let (addressing, mut levels) = match &file.addressing {
        AddressingSpec::Integer => {
            let levels = plain_steps(&id, &file.steps, file.kind)?;
            (Addressing::Integer(IntegerAddressing::new(levels.len())), levels)
        }
        AddressingSpec::NamedTier { base_tier } => {
            let levels = plain_steps(&id, &file.steps, file.kind)?;
            let names = file
                .steps
                .iter()
                .enumerate()
                .map(|(index, step)| {
                    step.tier
                        .as_deref()
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .ok_or_else(|| {
                            TrackDataError::invalid(&id, format!("steps[{index}] is missing 'tier'"))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let scheme = NamedTierAddressing::new(base_tier.trim(), names).map_err(|name| {
                TrackDataError::invalid(&id, format!("duplicate tier name '{name}'"))
            })?;
            (Addressing::NamedTier(scheme), levels)
        }
        AddressingSpec::Composite { plain_majors } => {
            if !file.steps.is_empty() {
                return Err(TrackDataError::invalid(
                    &id,
                    "composite tracks list 'majors', not 'steps'",
                ));
            }
            if file.kind == TrackKind::Building {
                return Err(TrackDataError::invalid(&id, "building tracks cannot be composite"));
            }
            let top_major = file.majors.len() as u32;
            if *plain_majors > top_major {
                return Err(TrackDataError::invalid(
                    &id,
                    format!("plain_majors {plain_majors} exceeds the {top_major} majors listed"),
                ));
            }
            let levels = expand_majors(*plain_majors, &file.majors);
            (
                Addressing::Composite(CompositeAddressing::new(*plain_majors, top_major)),
                levels,
            )
        }
    };

    if levels.is_empty() {
        return Err(TrackDataError::invalid(&id, "track has no levels"));
    }
    debug_assert_eq!(addressing.step_count(), levels.len());
    for (index, step) in levels.iter_mut().enumerate() {
        step.label = addressing
            .unresolve(index + 1)
            .map_err(|err| TrackDataError::invalid(&id, err.to_string()))?;
    }

    let base_bonus = bonus_curve(&id, &file, &levels)?;

    Ok(Track {
        id,
        name: file.name,
        data_version: file.data_version,
        kind: file.kind,
        max_quantity: file.max_quantity,
        bonus_stat: file.bonus_stat,
        base_bonus,
        addressing,
        levels,
    })
}

fn plain_steps(
    id: &str,
    steps: &[StepEntry],
    kind: TrackKind,
) -> Result<Vec<LevelStep>, TrackDataError> {
    steps
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let has_building_data = entry.prerequisite.is_some()
                || entry.build_time_seconds.is_some()
                || entry.power_gain.is_some();
            if has_building_data && kind != TrackKind::Building {
                return Err(TrackDataError::invalid(
                    id,
                    format!("steps[{index}] has building fields on a non-building track"),
                ));
            }
            Ok(LevelStep {
                label: String::new(),
                category: entry.category.clone(),
                cost: to_cost(&entry.cost),
                bonus: entry.bonus,
                prerequisite: entry.prerequisite.clone(),
                build_time_seconds: entry.build_time_seconds,
                power_gain: entry.power_gain,
            })
        })
        .collect()
}

/// Expand per-major rows into dense steps.
///
/// Majors up to `plain_majors` are one step each. For a later major `M` the
/// steps landing on `(M-1)-1..3` each carry a rounded-up quarter of `cost(M)`
/// and the step landing on `M-0` carries what is left plus the `completion`
/// materials, so the four sub-steps sum to `cost(M)` within 3 units per
/// resource.
pub fn expand_majors(plain_majors: u32, majors: &[MajorEntry]) -> Vec<LevelStep> {
    let quartered = majors.len().saturating_sub(plain_majors as usize);
    let mut levels =
        Vec::with_capacity(plain_majors as usize + quartered * QUARTERS as usize);

    for (offset, entry) in majors.iter().enumerate() {
        let major = offset as u32 + 1;
        let cost = to_cost(&entry.cost);
        let completion = to_cost(&entry.completion);

        if major <= plain_majors {
            let mut whole = cost;
            whole.add_from(&completion);
            levels.push(LevelStep::new(whole).with_bonus(entry.bonus));
            continue;
        }

        let quarter = cost.divided_ceil(u64::from(QUARTERS));
        for _ in 1..QUARTERS {
            levels.push(LevelStep::new(quarter.clone()));
        }
        let mut last = cost.saturating_sub(&quarter.scaled(u64::from(QUARTERS - 1)));
        last.add_from(&completion);
        levels.push(LevelStep::new(last).with_bonus(entry.bonus));
    }
    levels
}

/// Returns the base bonus when the track carries a curve, checking that every
/// anchor is present and the curve never decreases.
fn bonus_curve(
    id: &str,
    file: &TrackFile,
    levels: &[LevelStep],
) -> Result<Option<f64>, TrackDataError> {
    let any_bonus = levels.iter().any(|step| step.bonus.is_some());
    if !any_bonus {
        if file.base_bonus.is_some() {
            return Err(TrackDataError::invalid(id, "base_bonus set but no step has a bonus"));
        }
        return Ok(None);
    }

    let anchors_complete = match &file.addressing {
        AddressingSpec::Composite { .. } => file.majors.iter().all(|m| m.bonus.is_some()),
        _ => levels.iter().all(|step| step.bonus.is_some()),
    };
    if !anchors_complete {
        return Err(TrackDataError::invalid(id, "bonus curve has missing entries"));
    }

    let base = file.base_bonus.unwrap_or(0.0);
    if !base.is_finite() {
        return Err(TrackDataError::invalid(id, format!("base_bonus is not finite ({base})")));
    }
    let mut previous = base;
    for step in levels {
        let Some(bonus) = step.bonus else { continue };
        if !bonus.is_finite() || bonus < previous {
            return Err(TrackDataError::invalid(
                id,
                format!("bonus decreases at level '{}' ({previous} -> {bonus})", step.label),
            ));
        }
        previous = bonus;
    }
    Ok(Some(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tracks::parse_track_file;

    const CHARM_SNIPPET: &str = r#"
id: charm_test
name: Charm Test
kind: gear
addressing: { scheme: composite, plain_majors: 2 }
max_quantity: 3
majors:
  - { cost: { guides: 5 }, bonus: 1.0 }
  - { cost: { guides: 10 }, completion: { seal: 2 }, bonus: 2.0 }
  - { cost: { guides: 41, designs: 2 }, bonus: 4.0 }
  - { cost: { guides: 80 }, completion: { secrets: 7 }, bonus: 8.0 }
"#;

    fn charm() -> Track {
        build_track(parse_track_file(CHARM_SNIPPET, "test").unwrap()).unwrap()
    }

    #[test]
    fn composite_expansion_quarters_later_majors() {
        let track = charm();
        // 2 plain steps + 2 quartered majors.
        assert_eq!(track.len(), 10);
        let labels: Vec<_> = track.steps().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["1", "2", "2-1", "2-2", "2-3", "3-0", "3-1", "3-2", "3-3", "4-0"]
        );

        // Plain major keeps completion materials on its single step.
        assert_eq!(track.steps()[1].cost.get("seal"), 2);

        // 41 / 4 rounds up to 11; the landing step takes 41 - 33 = 8.
        assert_eq!(track.steps()[2].cost.get("guides"), 11);
        assert_eq!(track.steps()[5].cost.get("guides"), 8);
        // 2 / 4 rounds up to 1 three times; the landing step floors at 0.
        assert_eq!(track.steps()[4].cost.get("designs"), 1);
        assert!(!track.steps()[5].cost.contains("designs"));

        // Completion materials only on the M-0 step.
        assert!(track.steps()[6..9].iter().all(|s| !s.cost.contains("secrets")));
        assert_eq!(track.steps()[9].cost.get("secrets"), 7);
    }

    #[test]
    fn bonuses_only_on_whole_majors() {
        let track = charm();
        let with_bonus: Vec<_> = track
            .steps()
            .iter()
            .filter(|s| s.bonus.is_some())
            .map(|s| s.label.as_str())
            .collect();
        assert_eq!(with_bonus, ["1", "2", "3-0", "4-0"]);
        assert_eq!(track.stored_bonus(0), Some(0.0));
        assert_eq!(track.stored_bonus(3), None);
        assert_eq!(track.addressing().step_count(), track.len());
    }

    #[test]
    fn decreasing_bonus_is_rejected() {
        let raw = r#"
id: broken
name: Broken
kind: gear
addressing: { scheme: integer }
max_quantity: 1
steps:
  - { cost: { xp: 1 }, bonus: 2.0 }
  - { cost: { xp: 1 }, bonus: 1.0 }
"#;
        let err = build_track(parse_track_file(raw, "test").unwrap()).unwrap_err();
        assert!(err.to_string().contains("bonus decreases"), "{err}");
    }

    #[test]
    fn non_finite_base_bonus_is_rejected() {
        let raw = r#"
id: broken
name: Broken
kind: gear
addressing: { scheme: integer }
max_quantity: 1
base_bonus: .nan
steps:
  - { cost: { xp: 1 }, bonus: 2.0 }
"#;
        let err = build_track(parse_track_file(raw, "test").unwrap()).unwrap_err();
        assert!(err.to_string().contains("base_bonus is not finite"), "{err}");
    }

    #[test]
    fn building_fields_require_building_kind() {
        let raw = r#"
id: not_a_building
name: Nope
kind: gear
addressing: { scheme: integer }
max_quantity: 1
steps:
  - { cost: { xp: 1 }, build_time_seconds: 60 }
"#;
        let err = build_track(parse_track_file(raw, "test").unwrap()).unwrap_err();
        assert!(err.to_string().contains("building fields"), "{err}");
    }

    #[test]
    fn empty_and_zero_quantity_tracks_are_rejected() {
        let raw = "id: empty\nname: Empty\nkind: gear\naddressing: { scheme: integer }\nmax_quantity: 1\n";
        assert!(build_track(parse_track_file(raw, "test").unwrap()).is_err());

        let raw = "id: zero\nname: Zero\nkind: gear\naddressing: { scheme: integer }\nmax_quantity: 0\nsteps:\n  - { cost: { xp: 1 } }\n";
        assert!(build_track(parse_track_file(raw, "test").unwrap()).is_err());
    }
}
