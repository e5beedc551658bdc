use thiserror::Error;

/// Why a level identifier could not be mapped onto a track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelParseError {
    #[error("not a recognised level identifier")]
    Malformed,
    #[error("no level {major}-{minor} on this track")]
    UnknownMajorMinor { major: u32, minor: u32 },
    #[error("position {position} is outside 0..={max}")]
    OutOfRange { position: usize, max: usize },
    #[error("unknown tier name")]
    UnknownTier,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressionError {
    #[error("unknown track '{0}'")]
    UnknownTrack(String),
    #[error("invalid level '{level}' for track '{track}': {reason}")]
    InvalidLevel {
        track: String,
        level: String,
        #[source]
        reason: LevelParseError,
    },
    /// `from >= to`. Callers treat this as "nothing to compute".
    #[error("range {from}..{to} on track '{track}' is empty or inverted")]
    EmptyOrInvertedRange { track: String, from: usize, to: usize },
    #[error("quantity {quantity} is outside 1..={max} for track '{track}'")]
    InvalidQuantity { track: String, quantity: u32, max: u32 },
    #[error("track '{track}' does not define {operation}")]
    UnsupportedOperation {
        track: String,
        operation: &'static str,
    },
}

impl ProgressionError {
    pub fn is_empty_range(&self) -> bool {
        matches!(self, Self::EmptyOrInvertedRange { .. })
    }

    /// Errors a presentation layer should recover from by clamping the input.
    pub fn is_caller_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidLevel { .. } | Self::EmptyOrInvertedRange { .. } | Self::InvalidQuantity { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProgressionError>;
