use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Which phase of a generation request ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPhase {
    /// The search ran under the caller's criteria.
    Requested,
    /// The search ran under unrestricted criteria after the requested phase failed.
    Unrestricted,
}

impl SearchPhase {
    /// Returns a string representation suitable for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Unrestricted => "unrestricted",
        }
    }
}

impl Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a request was rejected at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidRequestKind {
    /// The species provider has no entry for this species.
    UnknownSpecies {
        /// The species that was requested.
        species: u16,
    },
    /// A move list held more slots than an entity can know.
    MoveListTooLong {
        /// Number of moves supplied.
        len: usize,
        /// Maximum number of move slots.
        max: usize,
    },
    /// Learnset entries were not sorted by ascending level.
    LearnsetNotSorted {
        /// Index of the first entry whose level is lower than its predecessor.
        index: usize,
    },
    /// A lock chain was required but had no locks.
    EmptyLockChain,
    /// A numeric configuration value fell outside its allowed range.
    ConfigValueOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
        /// Value that was supplied.
        actual: i64,
    },
    /// An individual value exceeded 31.
    IvOutOfRange {
        /// Stat index (HP, Atk, Def, SpA, SpD, Spe).
        stat: usize,
        /// Value that was supplied.
        value: u8,
    },
    /// A nature index was 25 or above.
    NatureOutOfRange {
        /// Value that was supplied.
        value: u8,
    },
    /// An ability slot other than 0 or 1 was requested.
    AbilitySlotOutOfRange {
        /// Value that was supplied.
        slot: u8,
    },
    /// An LCG multiplier was even and so has no inverse modulo `2^32`.
    EvenMultiplier {
        /// Value that was supplied.
        mult: u32,
    },
}

impl Display for InvalidRequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSpecies { species } => write!(f, "unknown species {}", species),
            Self::MoveListTooLong { len, max } => {
                write!(f, "move list has {} entries, at most {} allowed", len, max)
            },
            Self::LearnsetNotSorted { index } => {
                write!(
                    f,
                    "learnset entry {} has a lower level than the entry before it",
                    index
                )
            },
            Self::EmptyLockChain => write!(f, "lock chain has no locks"),
            Self::ConfigValueOutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                write!(
                    f,
                    "configuration field `{}` must be in {}..={}, got {}",
                    field, min, max, actual
                )
            },
            Self::IvOutOfRange { stat, value } => {
                write!(f, "IV for stat {} is {}, must be at most 31", stat, value)
            },
            Self::NatureOutOfRange { value } => {
                write!(f, "nature {} is out of range, must be below 25", value)
            },
            Self::AbilitySlotOutOfRange { slot } => {
                write!(f, "ability slot {} is out of range, must be 0 or 1", slot)
            },
            Self::EvenMultiplier { mult } => {
                write!(f, "LCG multiplier {:#x} is even and cannot be inverted", mult)
            },
        }
    }
}

/// This enum contains all errors this library can return. Most API functions return a [`SeedResult`].
///
/// An exhausted search is an expected outcome under restrictive criteria; it is
/// reported here rather than by panicking so callers can relax their request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeedError {
    /// The bounded attempt ceiling was reached without finding a satisfying seed.
    SearchExhausted {
        /// Number of seeds drawn before giving up.
        attempts: u32,
        /// Which criteria the failing search ran under.
        phase: SearchPhase,
    },
    /// The request can never be satisfied as stated, for example an IV above 31.
    InvalidRequest {
        /// What was wrong with it.
        kind: InvalidRequestKind,
    },
    /// A packed learnset table could not be decoded.
    Decode {
        /// A description of what failed to decode.
        context: String,
    },
    /// A code path that should be unreachable was taken.
    InternalError {
        /// What went wrong.
        context: String,
    },
}

impl SeedError {
    /// Returns `true` if this error is an exhausted search rather than a rejected request.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::SearchExhausted { .. })
    }
}

impl From<InvalidRequestKind> for SeedError {
    fn from(kind: InvalidRequestKind) -> Self {
        Self::InvalidRequest { kind }
    }
}

impl Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchExhausted { attempts, phase } => {
                write!(
                    f,
                    "No satisfying seed found after {} attempts ({} criteria)",
                    attempts, phase
                )
            },
            Self::InvalidRequest { kind } => write!(f, "Invalid Request: {}", kind),
            Self::Decode { context } => write!(f, "Decode error: {}", context),
            Self::InternalError { context } => {
                write!(f, "Internal error (please report as bug): {}", context)
            },
        }
    }
}

impl Error for SeedError {}

/// Convenience alias used throughout the crate.
pub type SeedResult<T> = std::result::Result<T, SeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_kind_converts() {
        let err: SeedError = InvalidRequestKind::EmptyLockChain.into();
        assert_eq!(
            err,
            SeedError::InvalidRequest {
                kind: InvalidRequestKind::EmptyLockChain
            }
        );
        assert!(!err.is_exhausted());
    }

    #[test]
    fn test_display_mentions_attempts_and_phase() {
        let err = SeedError::SearchExhausted {
            attempts: 100_000,
            phase: SearchPhase::Unrestricted,
        };
        let text = err.to_string();
        assert!(text.contains("100000"));
        assert!(text.contains("unrestricted"));
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_config_range_display() {
        let err = SeedError::from(InvalidRequestKind::ConfigValueOutOfRange {
            field: "max_attempts",
            min: 1,
            max: 10,
            actual: 0,
        });
        assert_eq!(
            err.to_string(),
            "Invalid Request: configuration field `max_attempts` must be in 1..=10, got 0"
        );
    }
}
