//! Level addressing schemes: how a track's external level identifiers map onto
//! dense positions.
//!
//! A track with `n` steps has positions `0..=n`; position `p` means the first
//! `p` steps are complete. Every scheme implements [LevelAddressing] and
//! [Addressing] is the closed set a track picks from.

use std::collections::HashMap;

use crate::progression::error::LevelParseError;

/// Sub-steps per major level once composite addressing begins.
pub const QUARTERS: u32 = 4;

pub trait LevelAddressing {
    /// Number of steps the scheme addresses (the highest valid position).
    fn step_count(&self) -> usize;

    /// Identifier -> dense position. Rejects, never clamps.
    fn resolve(&self, level: &str) -> Result<usize, LevelParseError>;

    /// Dense position -> canonical identifier.
    fn unresolve(&self, position: usize) -> Result<String, LevelParseError>;

    fn level_ids(&self) -> Vec<String> {
        (0..=self.step_count())
            .filter_map(|position| self.unresolve(position).ok())
            .collect()
    }
}

fn out_of_range(position: usize, max: usize) -> LevelParseError {
    LevelParseError::OutOfRange { position, max }
}

/// Plain integer levels `0..=max_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerAddressing {
    max_level: usize,
}

impl IntegerAddressing {
    pub fn new(max_level: usize) -> Self {
        Self { max_level }
    }
}

impl LevelAddressing for IntegerAddressing {
    fn step_count(&self) -> usize {
        self.max_level
    }

    fn resolve(&self, level: &str) -> Result<usize, LevelParseError> {
        let position: usize = parse_component(level.trim())?;
        if position > self.max_level {
            return Err(out_of_range(position, self.max_level));
        }
        Ok(position)
    }

    fn unresolve(&self, position: usize) -> Result<String, LevelParseError> {
        if position > self.max_level {
            return Err(out_of_range(position, self.max_level));
        }
        Ok(position.to_string())
    }
}

/// `major` / `major-minor` identifiers.
///
/// Majors up to `plain_majors` are single steps. From `plain_majors` on, every
/// major transition is split into [QUARTERS] steps: `M-1`, `M-2`, `M-3` are
/// quarter progress toward `M+1` and `M-0` (or bare `M`) is M freshly reached.
/// `top_major` accepts minor 0 only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeAddressing {
    plain_majors: u32,
    top_major: u32,
}

impl CompositeAddressing {
    pub fn new(plain_majors: u32, top_major: u32) -> Self {
        Self {
            plain_majors: plain_majors.min(top_major),
            top_major,
        }
    }

    pub fn plain_majors(&self) -> u32 {
        self.plain_majors
    }

    pub fn top_major(&self) -> u32 {
        self.top_major
    }

    /// Split an identifier into a validated `(major, minor)` pair.
    pub fn parse(&self, level: &str) -> Result<(u32, u32), LevelParseError> {
        let level = level.trim();
        let (major_raw, minor_raw) = match level.split_once('-') {
            Some((major, minor)) => (major.trim(), Some(minor.trim())),
            None => (level, None),
        };
        let major: u32 = parse_component(major_raw)?;
        let minor = match minor_raw {
            Some(raw) => parse_component::<u32>(raw)?,
            None => 0,
        };

        let unknown = LevelParseError::UnknownMajorMinor { major, minor };
        if minor >= QUARTERS || major > self.top_major {
            return Err(unknown);
        }
        if minor > 0 && (major < self.plain_majors || major == self.top_major) {
            return Err(unknown);
        }
        Ok((major, minor))
    }

    /// Position of an already validated `(major, minor)` pair.
    pub fn position_of(&self, major: u32, minor: u32) -> usize {
        if major <= self.plain_majors && minor == 0 {
            return major as usize;
        }
        let quartered = (major - self.plain_majors) * QUARTERS + minor;
        (self.plain_majors + quartered) as usize
    }
}

/// Digits only: `str::parse` alone would accept a leading `+`.
fn parse_component<T: std::str::FromStr>(raw: &str) -> Result<T, LevelParseError> {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(LevelParseError::Malformed);
    }
    raw.parse::<T>().map_err(|_| LevelParseError::Malformed)
}

impl LevelAddressing for CompositeAddressing {
    fn step_count(&self) -> usize {
        let quartered = (self.top_major - self.plain_majors) * QUARTERS;
        (self.plain_majors + quartered) as usize
    }

    fn resolve(&self, level: &str) -> Result<usize, LevelParseError> {
        let (major, minor) = self.parse(level)?;
        Ok(self.position_of(major, minor))
    }

    fn unresolve(&self, position: usize) -> Result<String, LevelParseError> {
        let max = self.step_count();
        if position > max {
            return Err(out_of_range(position, max));
        }
        let plain = self.plain_majors as usize;
        if position <= plain {
            return Ok(position.to_string());
        }
        let offset = position - plain;
        let quarters = QUARTERS as usize;
        let major = plain + offset / quarters;
        let minor = offset % quarters;
        Ok(format!("{major}-{minor}"))
    }
}

/// Named tiers in declared order; the base tier is position 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTierAddressing {
    base_tier: String,
    tiers: Vec<String>,
    lookup: HashMap<String, usize>,
}

/// Lowercase and collapse whitespace so "epic  t1" finds "Epic T1".
pub fn normalize_tier_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl NamedTierAddressing {
    /// Fails with the first name that collides after normalization.
    pub fn new(base_tier: impl Into<String>, tiers: Vec<String>) -> Result<Self, String> {
        let base_tier = base_tier.into();
        let mut lookup = HashMap::with_capacity(tiers.len() + 1);
        for (position, name) in std::iter::once(&base_tier).chain(tiers.iter()).enumerate() {
            if lookup.insert(normalize_tier_name(name), position).is_some() {
                return Err(name.clone());
            }
        }
        Ok(Self {
            base_tier,
            tiers,
            lookup,
        })
    }

    pub fn base_tier(&self) -> &str {
        &self.base_tier
    }
}

impl LevelAddressing for NamedTierAddressing {
    fn step_count(&self) -> usize {
        self.tiers.len()
    }

    fn resolve(&self, level: &str) -> Result<usize, LevelParseError> {
        self.lookup
            .get(&normalize_tier_name(level))
            .copied()
            .ok_or(LevelParseError::UnknownTier)
    }

    fn unresolve(&self, position: usize) -> Result<String, LevelParseError> {
        match position {
            0 => Ok(self.base_tier.clone()),
            p => self
                .tiers
                .get(p - 1)
                .cloned()
                .ok_or_else(|| out_of_range(p, self.tiers.len())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    Integer(IntegerAddressing),
    Composite(CompositeAddressing),
    NamedTier(NamedTierAddressing),
}

impl Addressing {
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Composite(_) => "composite",
            Self::NamedTier(_) => "named_tier",
        }
    }

    fn inner(&self) -> &dyn LevelAddressing {
        match self {
            Self::Integer(scheme) => scheme,
            Self::Composite(scheme) => scheme,
            Self::NamedTier(scheme) => scheme,
        }
    }
}

impl LevelAddressing for Addressing {
    fn step_count(&self) -> usize {
        self.inner().step_count()
    }

    fn resolve(&self, level: &str) -> Result<usize, LevelParseError> {
        self.inner().resolve(level)
    }

    fn unresolve(&self, position: usize) -> Result<String, LevelParseError> {
        self.inner().unresolve(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charm() -> CompositeAddressing {
        CompositeAddressing::new(4, 16)
    }

    #[test]
    fn composite_step_count_matches_sixteen_majors() {
        assert_eq!(charm().step_count(), 52);
    }

    #[test]
    fn composite_plain_prefix_then_quarters() {
        let c = charm();
        assert_eq!(c.resolve("0"), Ok(0));
        assert_eq!(c.resolve("3"), Ok(3));
        assert_eq!(c.resolve("4"), Ok(4));
        assert_eq!(c.resolve("4-0"), Ok(4));
        assert_eq!(c.resolve("4-1"), Ok(5));
        assert_eq!(c.resolve("4-3"), Ok(7));
        assert_eq!(c.resolve("5"), Ok(8));
        assert_eq!(c.resolve("5-0"), Ok(8));
        assert_eq!(c.resolve("16-0"), Ok(52));
        assert_eq!(c.resolve(" 12 - 2 "), Ok(c.position_of(12, 2)));
    }

    #[test]
    fn composite_rejects_unknown_pairs() {
        let c = charm();
        for bad in ["17-5", "17", "16-1", "2-1", "5-4", "", "-1", "a-1", "5-", "4.5", "+3"] {
            assert!(c.resolve(bad).is_err(), "{bad:?} should be rejected");
        }
        assert_eq!(
            c.resolve("17-5"),
            Err(LevelParseError::UnknownMajorMinor { major: 17, minor: 5 })
        );
    }

    #[test]
    fn composite_unresolve_prefers_major_zero_after_prefix() {
        let c = charm();
        assert_eq!(c.unresolve(4).unwrap(), "4");
        assert_eq!(c.unresolve(5).unwrap(), "4-1");
        assert_eq!(c.unresolve(8).unwrap(), "5-0");
        assert_eq!(c.unresolve(52).unwrap(), "16-0");
        assert!(c.unresolve(53).is_err());
    }

    #[test]
    fn integer_rejects_out_of_range_instead_of_clamping() {
        let scheme = IntegerAddressing::new(100);
        assert_eq!(scheme.resolve("100"), Ok(100));
        assert_eq!(
            scheme.resolve("101"),
            Err(LevelParseError::OutOfRange { position: 101, max: 100 })
        );
        assert_eq!(scheme.resolve("-3"), Err(LevelParseError::Malformed));
    }

    #[test]
    fn integer_accepts_digits_only() {
        let scheme = IntegerAddressing::new(100);
        assert_eq!(scheme.resolve(" 7 "), Ok(7));
        for bad in ["+3", "3.0", "", "1e2", "0x10"] {
            assert_eq!(scheme.resolve(bad), Err(LevelParseError::Malformed), "{bad:?}");
        }
    }

    #[test]
    fn named_tiers_resolve_case_insensitively() {
        let scheme = NamedTierAddressing::new(
            "Common",
            vec!["Uncommon".to_string(), "Epic T1".to_string()],
        )
        .unwrap();
        assert_eq!(scheme.resolve("common"), Ok(0));
        assert_eq!(scheme.resolve("  epic   T1 "), Ok(2));
        assert_eq!(scheme.resolve("Legendary"), Err(LevelParseError::UnknownTier));
        assert_eq!(scheme.level_ids(), vec!["Common", "Uncommon", "Epic T1"]);
    }

    #[test]
    fn named_tiers_reject_duplicate_names() {
        let err = NamedTierAddressing::new("Rare", vec!["rare".to_string()]).unwrap_err();
        assert_eq!(err, "rare");
    }
}
