//! Progression cost & bonus engine.
//!
//! Tracks are immutable tables of per-step resource costs. Level identifiers
//! resolve to dense positions; a range of positions sums to a cost that is
//! scaled by the number of slots upgraded together. Everything here is a pure
//! function of the loaded tables, so a [TrackRegistry] can be shared freely.

pub mod addressing;
pub mod aggregate;
pub mod annotate;
pub mod bonus;
pub mod calculator;
pub mod cost;
pub mod error;
pub mod registry;
pub mod store;
pub mod track;

pub use addressing::{
    Addressing, CompositeAddressing, IntegerAddressing, LevelAddressing, NamedTierAddressing,
    QUARTERS,
};
pub use aggregate::{step_breakdown, sum_cost, StepCost};
pub use annotate::{milestones_in_range, summarize_range, Milestone, MilestoneReason, RangeSummary};
pub use bonus::{bonus_at, bonus_at_position, bonus_delta};
pub use calculator::{calculate, BonusChange, UpgradeBreakdown, UpgradeEstimate, UpgradeQuery};
pub use cost::ResourceCost;
pub use error::{LevelParseError, ProgressionError, Result};
pub use registry::{TrackRegistry, TrackSource};
pub use store::build_track;
pub use track::{LevelStep, Track, TrackKind};
