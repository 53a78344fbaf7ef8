//! Team locks and lock-chain validation.
//!
//! A shadow encounter is preceded by a fixed team whose members are generated
//! from the same generator. Each non-shadow member rerolls its PID until the
//! result has the member's required nature and gender, so the state the
//! target is generated from depends on the whole team. A [`LockValidator`]
//! decides whether a candidate origin seed is reachable through such a team.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::SearchConfig;
use crate::entity::{Gender, Nature, RATIO_GENDERLESS};
use crate::error::{InvalidRequestKind, SeedResult};
use crate::rng::Lcg32;
use crate::telemetry::{InvariantChecker, InvariantViolation};

/// Constraint on one team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcLock {
    /// Species of the member.
    pub species: u16,
    /// Required nature, or `None` for any.
    pub nature: Option<Nature>,
    /// Required gender, or `None` for any.
    pub gender: Option<Gender>,
    /// Gender ratio of the member's species.
    pub gender_ratio: u8,
    /// Shadow members take their first PID without rerolling.
    pub shadow: bool,
}

impl NpcLock {
    /// A member locked to a nature and optionally a gender.
    #[must_use]
    pub const fn new(species: u16, nature: Nature, gender: Option<Gender>, gender_ratio: u8) -> Self {
        Self {
            species,
            nature: Some(nature),
            gender,
            gender_ratio,
            shadow: false,
        }
    }

    /// A shadow member, which accepts whatever PID it draws first.
    #[must_use]
    pub const fn shadow(species: u16) -> Self {
        Self {
            species,
            nature: None,
            gender: None,
            gender_ratio: RATIO_GENDERLESS,
            shadow: true,
        }
    }

    /// Returns `true` if `pid` has the required nature and gender, using
    /// `gender_ratio` for the gender derivation.
    #[must_use]
    pub fn matches_with_ratio(&self, pid: u32, gender_ratio: u8) -> bool {
        self.nature.is_none_or(|n| n == Nature::from_pid(pid))
            && self
                .gender
                .is_none_or(|g| g == Gender::from_pid(pid, gender_ratio))
    }

    /// Returns `true` if `pid` has the required nature and gender.
    #[must_use]
    pub fn matches(&self, pid: u32) -> bool {
        self.matches_with_ratio(pid, self.gender_ratio)
    }

    /// Returns `true` if the member would keep `pid`.
    #[must_use]
    pub fn accepts(&self, pid: u32) -> bool {
        self.shadow || self.matches(pid)
    }
}

/// Ordered, non-empty list of locks; the first element is generated first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<NpcLock>", into = "Vec<NpcLock>")]
pub struct LockChain {
    locks: SmallVec<[NpcLock; 6]>,
}

impl LockChain {
    /// Creates a chain, rejecting an empty one.
    pub fn new(locks: impl IntoIterator<Item = NpcLock>) -> SeedResult<Self> {
        let locks: SmallVec<[NpcLock; 6]> = locks.into_iter().collect();
        if locks.is_empty() {
            return Err(InvalidRequestKind::EmptyLockChain.into());
        }
        Ok(Self { locks })
    }

    /// All locks in generation order.
    #[must_use]
    pub fn locks(&self) -> &[NpcLock] {
        &self.locks
    }

    /// The lock applying to the final position.
    #[must_use]
    pub fn last(&self) -> Option<&NpcLock> {
        self.locks.last()
    }

    /// Every lock before the final position.
    #[must_use]
    pub fn preceding(&self) -> &[NpcLock] {
        match self.locks.split_last() {
            Some((_, preceding)) => preceding,
            None => &[],
        }
    }

    /// Number of locks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Always `false` for a chain built through [`LockChain::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl TryFrom<Vec<NpcLock>> for LockChain {
    type Error = crate::SeedError;

    fn try_from(locks: Vec<NpcLock>) -> SeedResult<Self> {
        Self::new(locks)
    }
}

impl From<LockChain> for Vec<NpcLock> {
    fn from(chain: LockChain) -> Self {
        chain.locks.into_vec()
    }
}

impl InvariantChecker for LockChain {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.locks.is_empty() {
            return Err(InvariantViolation::new("LockChain", "chain has at least one lock"));
        }
        Ok(())
    }
}

/// A candidate produced by a seed search, handed to a [`LockValidator`].
///
/// Carries the generator and team frame counts the search ran with, so the
/// validator walks the same sequence the candidate was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockCandidate {
    /// The seed drawn from the entropy source.
    pub seed: u32,
    /// State the target's own frame starts from; the team ends here.
    pub origin: u32,
    /// PID the candidate would receive.
    pub pid: u32,
    /// Generator the search ran on.
    pub lcg: Lcg32,
    /// Generator calls each team member consumes before its PID attempts.
    pub prefix_frames: u32,
    /// Rejected PID attempts allowed per team member.
    pub max_rerolls: u32,
}

impl LockCandidate {
    /// A candidate whose team runs on `lcg` with the frame counts in `config`.
    #[must_use]
    pub const fn new(
        seed: u32,
        origin: u32,
        pid: u32,
        lcg: Lcg32,
        config: &SearchConfig,
    ) -> Self {
        Self {
            seed,
            origin,
            pid,
            lcg,
            prefix_frames: config.prefix_frames,
            max_rerolls: config.max_rerolls,
        }
    }
}

/// Decides whether a candidate is reachable through a team of locked members.
pub trait LockValidator {
    /// Returns `true` if the team described by `locks` can end exactly at
    /// `candidate.origin`.
    fn validate(&self, candidate: &LockCandidate, locks: &[NpcLock]) -> bool;
}

impl<F> LockValidator for F
where
    F: Fn(&LockCandidate, &[NpcLock]) -> bool,
{
    fn validate(&self, candidate: &LockCandidate, locks: &[NpcLock]) -> bool {
        self(candidate, locks)
    }
}

/// PID of the two-call attempt on `lcg` whose second call produced `end`.
#[must_use]
pub const fn pid_ending_at(lcg: Lcg32, end: u32) -> u32 {
    let high = lcg.prev(end) >> 16;
    let low = end >> 16;
    (high << 16) | low
}

/// Walks a lock chain backwards from the candidate's origin.
///
/// Each member is modelled as `prefix_frames` generator calls followed by
/// PID attempts of two calls each (high half, then low half). A member keeps
/// the first attempt it accepts. Walking backwards, the walker requires the
/// attempt ending at the current state to be accepted, then tries every
/// reroll count up to `max_rerolls`, checking that each skipped attempt would
/// have been rejected, and recurses into the previous member.
///
/// The generator and frame counts come from the [`LockCandidate`], so the
/// walk always matches the search that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseLockWalker;

impl ReverseLockWalker {
    fn walk(candidate: &LockCandidate, locks: &[NpcLock], end: u32) -> bool {
        let Some((lock, rest)) = locks.split_last() else {
            return true;
        };
        let lcg = candidate.lcg;
        if !lock.accepts(pid_ending_at(lcg, end)) {
            return false;
        }

        let mut attempt_start = lcg.prev_n(end, 2);
        for _ in 0..=candidate.max_rerolls {
            let member_start = lcg.prev_n(attempt_start, candidate.prefix_frames);
            if Self::walk(candidate, rest, member_start) {
                return true;
            }
            // One more rejected attempt before this one is only possible if
            // the member rerolls and that attempt fails its lock.
            if lock.shadow || lock.accepts(pid_ending_at(lcg, attempt_start)) {
                return false;
            }
            attempt_start = lcg.prev_n(attempt_start, 2);
        }
        false
    }
}

impl LockValidator for ReverseLockWalker {
    fn validate(&self, candidate: &LockCandidate, locks: &[NpcLock]) -> bool {
        Self::walk(candidate, locks, candidate.origin)
    }
}


#[cfg(test)]
mod property_tests {
    use super::tests::run_team_forward;
    use super::*;
    use crate::rng::{LCRNG, XDRNG};
    use proptest::prelude::*;

    fn lock_strategy() -> impl Strategy<Value = NpcLock> {
        prop_oneof![
            1 => Just(NpcLock::shadow(0)),
            4 => (0u8..25).prop_map(|n| NpcLock {
                species: 0,
                nature: Nature::new(n),
                gender: None,
                gender_ratio: RATIO_GENDERLESS,
                shadow: false,
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_forward_team_is_accepted(
            start: u32,
            lcg in prop_oneof![Just(XDRNG), Just(LCRNG)],
            locks in prop::collection::vec(lock_strategy(), 1..4),
        ) {
            let config = SearchConfig { max_rerolls: 64, ..SearchConfig::default() };
            if let Some(origin) = run_team_forward(lcg, &config, start, &locks) {
                let candidate = LockCandidate::new(origin, origin, 0, lcg, &config);
                prop_assert!(ReverseLockWalker.validate(&candidate, &locks));
            }
        }
    }
}
