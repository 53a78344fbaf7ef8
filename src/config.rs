//! Search configuration.
//!
//! | Preset | `max_attempts` | `max_rerolls` |
//! |---|---|---|
//! | `default()` | 100 000 | 16 |
//! | `quick()` | 10 000 | 16 |
//! | `exhaustive()` | 1 000 000 | 32 |
//!
//! Construct custom values with the `..SearchConfig::default()` pattern and
//! pass them to [`Generator::with_config`](crate::Generator::with_config),
//! which rejects out-of-range fields.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidRequestKind, SeedResult};
use crate::search::PidPairing;

/// Bounds and tuning for every seed search.
///
/// # Example
///
/// ```
/// use shadowseed::SearchConfig;
///
/// let config = SearchConfig {
///     max_attempts: 5_000,
///     fallback_to_unrestricted: false,
///     ..SearchConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[must_use = "SearchConfig has no effect unless passed to Generator::with_config()"]
pub struct SearchConfig {
    /// Seeds drawn before a search phase gives up.
    pub max_attempts: u32,
    /// Rejected PID attempts the lock walker will consider per team member.
    pub max_rerolls: u32,
    /// Generator calls each team member consumes before its PID attempts.
    pub prefix_frames: u32,
    /// Which frames supply the two PID halves in a lock search.
    pub pid_pairing: PidPairing,
    /// Retry once under unrestricted criteria when the requested search is exhausted.
    pub fallback_to_unrestricted: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 100_000,
            max_rerolls: 16,
            prefix_frames: 3,
            pid_pairing: PidPairing::EREADER,
            fallback_to_unrestricted: true,
        }
    }
}

impl SearchConfig {
    /// Creates a `SearchConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fewer attempts, for interactive callers that prefer a fast failure.
    pub fn quick() -> Self {
        Self {
            max_attempts: 10_000,
            ..Self::default()
        }
    }

    /// Many more attempts and a deeper lock walk, for batch use.
    pub fn exhaustive() -> Self {
        Self {
            max_attempts: 1_000_000,
            max_rerolls: 32,
            ..Self::default()
        }
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestKind::ConfigValueOutOfRange`] for the first bad field.
    pub fn validate(&self) -> SeedResult<()> {
        check_range("max_attempts", self.max_attempts.into(), 1, 10_000_000)?;
        check_range("max_rerolls", self.max_rerolls.into(), 0, 64)?;
        check_range("prefix_frames", self.prefix_frames.into(), 0, 16)?;
        check_range(
            "pid_pairing.high",
            self.pid_pairing.high.into(),
            PidPairing::MIN_OFFSET.into(),
            PidPairing::MAX_OFFSET.into(),
        )?;
        check_range(
            "pid_pairing.low",
            self.pid_pairing.low.into(),
            PidPairing::MIN_OFFSET.into(),
            PidPairing::MAX_OFFSET.into(),
        )?;
        Ok(())
    }
}

fn check_range(field: &'static str, actual: i64, min: i64, max: i64) -> SeedResult<()> {
    if actual < min || actual > max {
        return Err(InvalidRequestKind::ConfigValueOutOfRange {
            field,
            min,
            max,
            actual,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SearchConfig::default();
        assert_eq!(config.max_attempts, 100_000);
        assert_eq!(config.max_rerolls, 16);
        assert_eq!(config.prefix_frames, 3);
        assert_eq!(config.pid_pairing, PidPairing::EREADER);
        assert!(config.fallback_to_unrestricted);
        assert_eq!(SearchConfig::new(), config);
    }

    #[test]
    fn test_presets_are_valid() {
        for config in [
            SearchConfig::default(),
            SearchConfig::quick(),
            SearchConfig::exhaustive(),
        ] {
            assert!(config.validate().is_ok(), "{:?}", config);
        }
        assert_eq!(SearchConfig::quick().max_attempts, 10_000);
        assert_eq!(SearchConfig::exhaustive().max_rerolls, 32);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = SearchConfig {
            max_attempts: 0,
            ..SearchConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            crate::SeedError::from(InvalidRequestKind::ConfigValueOutOfRange {
                field: "max_attempts",
                min: 1,
                max: 10_000_000,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_pairing_offsets_bounded() {
        let config = SearchConfig {
            pid_pairing: PidPairing { high: -9, low: 1 },
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SearchConfig {
            prefix_frames: 17,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
