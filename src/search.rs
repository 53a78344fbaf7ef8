//! Seed searches: random frame generation, lock-chain search, and IV seed recovery.
//!
//! Every search owns its seed locally and draws starting points from a
//! caller-supplied [`EntropySource`]. Searches are bounded by
//! [`SearchConfig::max_attempts`] and report exhaustion as
//! [`SeedError::SearchExhausted`]; they never touch entity storage.

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::criteria::EntityCriteria;
use crate::entity::IvSet;
use crate::error::{InvalidRequestKind, SearchPhase, SeedError, SeedResult};
use crate::lock::{LockCandidate, LockChain, LockValidator};
use crate::rng::{EntropySource, Lcg32, XDRNG};

/// Frame offsets, relative to a drawn seed, of the states whose upper
/// halves become the PID's high and low halves in a lock search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PidPairing {
    /// Offset of the state supplying the high half.
    pub high: i8,
    /// Offset of the state supplying the low half.
    pub low: i8,
}

impl PidPairing {
    /// High half three frames back, low half one frame forward.
    pub const EREADER: Self = Self { high: -3, low: 1 };

    /// Smallest offset accepted by [`SearchConfig::validate`].
    pub const MIN_OFFSET: i8 = -8;
    /// Largest offset accepted by [`SearchConfig::validate`].
    pub const MAX_OFFSET: i8 = 8;

    /// Builds the PID for a drawn seed.
    #[must_use]
    pub const fn pid(&self, lcg: Lcg32, seed: u32) -> u32 {
        let high = lcg.jump(seed, self.high as i32) >> 16;
        let low = lcg.jump(seed, self.low as i32) >> 16;
        (high << 16) | low
    }

    /// State one frame before the earliest state the pairing reads; the
    /// preceding team must end here.
    #[must_use]
    pub const fn origin(&self, lcg: Lcg32, seed: u32) -> u32 {
        let earliest = if self.high < self.low {
            self.high
        } else {
            self.low
        };
        lcg.jump(seed, earliest as i32 - 1)
    }
}

impl Default for PidPairing {
    fn default() -> Self {
        Self::EREADER
    }
}

/// Values generated from one origin seed: two IV halves, ability bit, then
/// PID high and low halves, each from the upper 16 bits of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CxdFrame {
    /// Seed before the first call.
    pub origin: u32,
    /// Individual values.
    pub ivs: IvSet,
    /// Ability slot (0 or 1).
    pub ability_slot: u8,
    /// Identity value.
    pub pid: u32,
}

impl CxdFrame {
    /// Generates the frame starting at `origin`.
    #[must_use]
    pub fn generate(lcg: Lcg32, origin: u32) -> Self {
        let mut cursor = lcg.cursor(origin);
        let first = cursor.advance16() & 0x7FFF;
        let second = cursor.advance16() & 0x7FFF;
        let ability_slot = (cursor.advance16() & 1) as u8;
        let high = u32::from(cursor.advance16());
        let low = u32::from(cursor.advance16());
        Self {
            origin,
            ivs: IvSet::from_halves(first, second),
            ability_slot,
            pid: (high << 16) | low,
        }
    }
}

/// Successful lock search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockHit {
    /// Seed drawn from the entropy source.
    pub seed: u32,
    /// State the preceding team ends at.
    pub origin: u32,
    /// Committed PID.
    pub pid: u32,
    /// Seeds drawn, including the successful one.
    pub attempts: u32,
}

/// The trainer and species a search generates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchTarget {
    /// Combined trainer ID.
    pub id32: u32,
    /// Gender ratio of the target species.
    pub gender_ratio: u8,
}

/// Bounded seed searches over one generator.
pub struct LockSearch<'a, V: LockValidator + ?Sized> {
    lcg: Lcg32,
    config: SearchConfig,
    validator: &'a V,
}

impl<'a, V: LockValidator + ?Sized> LockSearch<'a, V> {
    /// Creates a search over [`XDRNG`].
    pub fn new(validator: &'a V, config: SearchConfig) -> Self {
        Self {
            lcg: XDRNG,
            config,
            validator,
        }
    }

    /// Replaces the generator.
    #[must_use]
    pub fn with_lcg(mut self, lcg: Lcg32) -> Self {
        self.lcg = lcg;
        self
    }

    /// Searches for a PID that satisfies the chain's last lock and `criteria`,
    /// and whose origin the validator accepts for the preceding locks.
    ///
    /// # Errors
    ///
    /// [`SeedError::SearchExhausted`] after `max_attempts` seeds, or
    /// [`InvalidRequestKind::EmptyLockChain`] for a chain without locks.
    pub fn find_locked_pid<E: EntropySource + ?Sized>(
        &self,
        chain: &LockChain,
        criteria: &EntityCriteria,
        target: SearchTarget,
        phase: SearchPhase,
        entropy: &mut E,
    ) -> SeedResult<LockHit> {
        let last = chain.last().ok_or(InvalidRequestKind::EmptyLockChain)?;
        let preceding = chain.preceding();
        let pairing = self.config.pid_pairing;

        tracing::debug!(
            locks = chain.len(),
            max_attempts = self.config.max_attempts,
            %phase,
            "starting lock search"
        );
        for attempt in 1..=self.config.max_attempts {
            let seed = entropy.next_u32();
            let pid = pairing.pid(self.lcg, seed);

            if !last.matches_with_ratio(pid, target.gender_ratio)
                || !criteria.accepts_pid(pid, target.id32, target.gender_ratio)
            {
                continue;
            }

            let origin = pairing.origin(self.lcg, seed);
            let candidate = LockCandidate::new(seed, origin, pid, self.lcg, &self.config);
            if self.validator.validate(&candidate, preceding) {
                tracing::debug!(attempts = attempt, seed, pid, "lock search succeeded");
                return Ok(LockHit {
                    seed,
                    origin: candidate.origin,
                    pid,
                    attempts: attempt,
                });
            }
        }

        Err(SeedError::SearchExhausted {
            attempts: self.config.max_attempts,
            phase,
        })
    }

    /// Searches for a random frame satisfying `criteria`. With a chain, the
    /// frame's origin must also pass the validator for every lock.
    ///
    /// # Errors
    ///
    /// [`SeedError::SearchExhausted`] after `max_attempts` seeds.
    pub fn find_frame<E: EntropySource + ?Sized>(
        &self,
        chain: Option<&LockChain>,
        criteria: &EntityCriteria,
        target: SearchTarget,
        phase: SearchPhase,
        entropy: &mut E,
    ) -> SeedResult<CxdFrame> {
        tracing::trace!(
            locked = chain.is_some(),
            max_attempts = self.config.max_attempts,
            %phase,
            "starting frame search"
        );
        for attempt in 1..=self.config.max_attempts {
            let origin = entropy.next_u32();
            let frame = CxdFrame::generate(self.lcg, origin);
            if !criteria.accepts(
                frame.pid,
                &frame.ivs,
                frame.ability_slot,
                target.id32,
                target.gender_ratio,
            ) {
                continue;
            }

            let passes = chain.is_none_or(|chain| {
                let candidate =
                    LockCandidate::new(origin, origin, frame.pid, self.lcg, &self.config);
                self.validator.validate(&candidate, chain.locks())
            });
            if passes {
                tracing::trace!(attempts = attempt, origin, "frame search succeeded");
                return Ok(frame);
            }
        }

        Err(SeedError::SearchExhausted {
            attempts: self.config.max_attempts,
            phase,
        })
    }
}

/// Every frame whose IVs equal `ivs`.
///
/// The first IV half is the top 15 bits (below bit 31) of the first state,
/// so only 2^17 states can produce it; those whose successor also encodes
/// the second half are kept.
#[must_use]
pub fn recover_iv_frames(lcg: Lcg32, ivs: &IvSet) -> Vec<CxdFrame> {
    let (first, second) = ivs.to_halves();
    let first = u32::from(first & 0x7FFF);
    let second = u32::from(second & 0x7FFF);

    let mut frames = Vec::new();
    for top in 0..2u32 {
        for low in 0..0x1_0000u32 {
            let state = (top << 31) | (first << 16) | low;
            if (lcg.next(state) >> 16) & 0x7FFF == second {
                frames.push(CxdFrame::generate(lcg, lcg.prev(state)));
            }
        }
    }
    frames
}
