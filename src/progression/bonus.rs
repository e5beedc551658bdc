//! Cumulative stat bonus at a level.
//!
//! Tracks with a bonus on every step are a direct lookup. Composite tracks
//! store bonuses on whole majors only; quarter levels interpolate linearly
//! toward the next major and clamp at the top of the track.

use crate::progression::addressing::{Addressing, QUARTERS};
use crate::progression::error::Result;
use crate::progression::track::Track;

const BONUS_OPERATION: &str = "a bonus curve";

pub fn bonus_at(track: &Track, level: &str) -> Result<f64> {
    if !track.has_bonus_curve() {
        return Err(track.unsupported(BONUS_OPERATION));
    }

    if let Addressing::Composite(scheme) = track.addressing() {
        let (major, minor) = scheme
            .parse(level)
            .map_err(|reason| track.invalid_level(level, reason))?;
        let at_major = stored_at(track, scheme.position_of(major, 0))?;
        if minor == 0 || major >= scheme.top_major() {
            return Ok(at_major);
        }
        let at_next = stored_at(track, scheme.position_of(major + 1, 0))?;
        let fraction = f64::from(minor) / f64::from(QUARTERS);
        return Ok(at_major + (at_next - at_major) * fraction);
    }

    let position = track.resolve(level)?;
    stored_at(track, position)
}

/// Bonus at a dense position, via its canonical identifier.
pub fn bonus_at_position(track: &Track, position: usize) -> Result<f64> {
    let level = track.unresolve(position)?;
    bonus_at(track, &level)
}

/// Net bonus gained going from `from` to `to`.
pub fn bonus_delta(track: &Track, from: &str, to: &str) -> Result<f64> {
    Ok(bonus_at(track, to)? - bonus_at(track, from)?)
}

fn stored_at(track: &Track, position: usize) -> Result<f64> {
    track
        .stored_bonus(position)
        .ok_or_else(|| track.unsupported(BONUS_OPERATION))
}
