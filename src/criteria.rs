//! Caller-supplied filters a generated candidate must satisfy.

use serde::{Deserialize, Serialize};

use crate::entity::{Gender, IvSet, Nature, MAX_IV};
use crate::error::{InvalidRequestKind, SeedResult};
use crate::shiny::{self, SHINY_THRESHOLD};

/// Requested shininess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShinyRequest {
    /// Whatever the seed produces.
    #[default]
    Random,
    /// The result must be shiny.
    Always,
    /// The result must not be shiny.
    Never,
}

impl ShinyRequest {
    /// Returns `true` if a candidate with the given shininess is acceptable.
    #[must_use]
    pub const fn accepts(self, shiny: bool) -> bool {
        match self {
            Self::Random => true,
            Self::Always => shiny,
            Self::Never => !shiny,
        }
    }

    /// The forced state, if any.
    #[must_use]
    pub const fn forced(self) -> Option<bool> {
        match self {
            Self::Random => None,
            Self::Always => Some(true),
            Self::Never => Some(false),
        }
    }
}

/// Requested ability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AbilityRequest {
    /// Either slot.
    #[default]
    Any,
    /// A specific slot, 0 or 1.
    Slot(u8),
}

impl AbilityRequest {
    /// Returns `true` if `slot` satisfies the request.
    #[must_use]
    pub const fn accepts(self, slot: u8) -> bool {
        match self {
            Self::Any => true,
            Self::Slot(want) => want == slot,
        }
    }
}

/// Per-stat IV constraints in HP, Atk, Def, SpA, SpD, Spe order; `None` is "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IvCriteria(pub [Option<u8>; 6]);

impl IvCriteria {
    /// No IV constraints.
    pub const ANY: Self = Self([None; 6]);

    /// Pins every IV to the given set.
    #[must_use]
    pub const fn exact(ivs: IvSet) -> Self {
        Self([
            Some(ivs.hp),
            Some(ivs.atk),
            Some(ivs.def),
            Some(ivs.spa),
            Some(ivs.spd),
            Some(ivs.spe),
        ])
    }

    /// Returns the pinned set if every stat is pinned.
    #[must_use]
    pub fn pinned(&self) -> Option<IvSet> {
        let [hp, atk, def, spa, spd, spe] = self.0;
        Some(IvSet {
            hp: hp?,
            atk: atk?,
            def: def?,
            spa: spa?,
            spd: spd?,
            spe: spe?,
        })
    }

    /// Returns `true` if every pinned stat matches.
    #[must_use]
    pub fn accepts(&self, ivs: &IvSet) -> bool {
        self.0
            .iter()
            .zip(ivs.to_array())
            .all(|(want, got)| want.is_none_or(|w| w == got))
    }
}

/// Filter applied to generated candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EntityCriteria {
    /// Requested shininess.
    pub shiny: ShinyRequest,
    /// Requested individual values.
    pub ivs: IvCriteria,
    /// Requested ability slot.
    pub ability: AbilityRequest,
    /// Requested nature.
    pub nature: Option<Nature>,
    /// Requested gender.
    pub gender: Option<Gender>,
}

impl EntityCriteria {
    /// Accepts every candidate.
    pub const UNRESTRICTED: Self = Self {
        shiny: ShinyRequest::Random,
        ivs: IvCriteria::ANY,
        ability: AbilityRequest::Any,
        nature: None,
        gender: None,
    };

    /// Returns `true` if this is the universal filter.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::UNRESTRICTED
    }

    /// Returns `true` if all six IVs are pinned.
    #[must_use]
    pub fn ivs_fully_pinned(&self) -> bool {
        self.ivs.pinned().is_some()
    }

    /// Rejects pinned IVs above 31 and ability slots other than 0 or 1.
    pub fn validate(&self) -> SeedResult<()> {
        if let Some((stat, value)) = self
            .ivs
            .0
            .iter()
            .enumerate()
            .find_map(|(stat, v)| v.filter(|&v| v > MAX_IV).map(|v| (stat, v)))
        {
            return Err(InvalidRequestKind::IvOutOfRange { stat, value }.into());
        }
        if let AbilityRequest::Slot(slot) = self.ability {
            if slot > 1 {
                return Err(InvalidRequestKind::AbilitySlotOutOfRange { slot }.into());
            }
        }
        Ok(())
    }

    /// Checks the PID-derived properties of a candidate.
    #[must_use]
    pub fn accepts_pid(&self, pid: u32, id32: u32, gender_ratio: u8) -> bool {
        self.shiny
            .accepts(shiny::is_shiny(id32, pid, SHINY_THRESHOLD))
            && self.nature.is_none_or(|n| n == Nature::from_pid(pid))
            && self
                .gender
                .is_none_or(|g| g == Gender::from_pid(pid, gender_ratio))
    }

    /// Checks every property of a candidate.
    #[must_use]
    pub fn accepts(
        &self,
        pid: u32,
        ivs: &IvSet,
        ability_slot: u8,
        id32: u32,
        gender_ratio: u8,
    ) -> bool {
        self.accepts_pid(pid, id32, gender_ratio)
            && self.ivs.accepts(ivs)
            && self.ability.accepts(ability_slot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_accepts_anything() {
        let criteria = EntityCriteria::UNRESTRICTED;
        assert!(criteria.is_unrestricted());
        assert!(!criteria.ivs_fully_pinned());
        assert!(criteria.accepts(0xFFFF_FFFF, &IvSet::ZERO, 1, 0, 127));
        assert_eq!(EntityCriteria::default(), EntityCriteria::UNRESTRICTED);
    }

    #[test]
    fn test_pinned_ivs() {
        let ivs = IvSet {
            hp: 31,
            atk: 0,
            def: 31,
            spa: 31,
            spd: 31,
            spe: 31,
        };
        let criteria = EntityCriteria {
            ivs: IvCriteria::exact(ivs),
            ..EntityCriteria::UNRESTRICTED
        };
        assert!(criteria.ivs_fully_pinned());
        assert_eq!(criteria.ivs.pinned(), Some(ivs));
        assert!(criteria.ivs.accepts(&ivs));
        assert!(!criteria.ivs.accepts(&IvSet::ZERO));
    }

    #[test]
    fn test_partial_ivs_not_pinned() {
        let mut ivs = IvCriteria::ANY;
        ivs.0[0] = Some(31);
        assert!(ivs.pinned().is_none());
        assert!(ivs.accepts(&IvSet {
            hp: 31,
            ..IvSet::ZERO
        }));
        assert!(!ivs.accepts(&IvSet::ZERO));
    }

    #[test]
    fn test_nature_and_gender_filter() {
        let criteria = EntityCriteria {
            nature: Nature::new(3),
            gender: Some(Gender::Male),
            ..EntityCriteria::UNRESTRICTED
        };
        // 28 % 25 == 3, low byte 28 >= 27
        assert!(criteria.accepts_pid(28, 0, 27));
        assert!(!criteria.accepts_pid(28, 0, 200));
        assert!(!criteria.accepts_pid(29, 0, 27));
    }

    #[test]
    fn test_shiny_request() {
        assert!(ShinyRequest::Always.accepts(true));
        assert!(!ShinyRequest::Always.accepts(false));
        assert!(ShinyRequest::Never.accepts(false));
        assert_eq!(ShinyRequest::Random.forced(), None);
        assert_eq!(ShinyRequest::Never.forced(), Some(false));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut criteria = EntityCriteria::UNRESTRICTED;
        criteria.ivs.0[4] = Some(40);
        assert_eq!(
            criteria.validate().unwrap_err(),
            InvalidRequestKind::IvOutOfRange {
                stat: 4,
                value: 40
            }
            .into()
        );

        let criteria = EntityCriteria {
            ability: AbilityRequest::Slot(2),
            ..EntityCriteria::UNRESTRICTED
        };
        assert!(criteria.validate().is_err());
        assert!(EntityCriteria::UNRESTRICTED.validate().is_ok());
    }
}
