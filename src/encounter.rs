//! Encounter templates and the [`Generator`] that turns them into entities.
//!
//! Dispatch, per template:
//!
//! 1. Fixed-distribution encounters (`EReader`) run a lock search using the
//!    chain's last lock as the target's nature and gender; the result has
//!    zero IVs and ability slot 0.
//! 2. Otherwise, if the criteria pin every IV, the entity is built directly
//!    from a frame that reproduces those IVs. For `Shadow` encounters, frames
//!    whose origin passes the lock validator are preferred; when none does,
//!    the entity is still built and the miss is reported.
//! 3. Otherwise a random frame search runs; `Shadow` encounters additionally
//!    require the frame's origin to pass the lock validator.
//!
//! Searches that exhaust under the caller's criteria are retried once under
//! [`EntityCriteria::UNRESTRICTED`] when the config allows it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::criteria::{AbilityRequest, EntityCriteria};
use crate::entity::{Entity, IvSet, DEFAULT_BALL, MAX_MOVES};
use crate::error::{SearchPhase, SeedError, SeedResult};
use crate::learnset::LearnsetTable;
use crate::lock::{LockCandidate, LockChain, LockValidator};
use crate::report_violation_to;
use crate::rng::{EntropySource, Lcg32, XDRNG};
use crate::search::{self, CxdFrame, LockSearch, SearchTarget};
use crate::shiny::{self, TrainerId, SQUARE_SHINY_THRESHOLD};
use crate::species::SpeciesInfo;
use crate::telemetry::{ViolationKind, ViolationObserver, ViolationSeverity};

/// The encounter variants and the data each one needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterKind {
    /// Plain random generation.
    Static,
    /// Random generation behind a locked team.
    Shadow {
        /// The team generated before the target.
        chain: LockChain,
    },
    /// Fixed-content distribution: no random IVs, PID found by lock search.
    EReader {
        /// The team; its last lock constrains the target itself.
        chain: LockChain,
    },
}

/// What a generator needs to know about an encounter beyond its variant.
pub trait EncounterCapabilities {
    /// Ball the encounter is always caught in, if fixed.
    fn fixed_ball(&self) -> Option<u8>;

    /// The lock chain, for locked encounters.
    fn lock_chain(&self) -> Option<&LockChain>;

    /// Returns `true` if the encounter skips random IV generation.
    fn uses_fixed_distribution(&self) -> bool;
}

/// A species/level/location to generate, plus its variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncounterTemplate {
    /// Species.
    pub species: u16,
    /// Level.
    pub level: u8,
    /// Met location.
    pub location: u16,
    /// Ball override; [`DEFAULT_BALL`] otherwise.
    pub fixed_ball: Option<u8>,
    /// Move slots; all zero means "derive from the learnset".
    pub moves: [u16; MAX_MOVES],
    /// Variant.
    pub kind: EncounterKind,
}

impl EncounterTemplate {
    /// A static encounter with no fixed ball or moves.
    #[must_use]
    pub const fn new(species: u16, level: u8, location: u16) -> Self {
        Self {
            species,
            level,
            location,
            fixed_ball: None,
            moves: [0; MAX_MOVES],
            kind: EncounterKind::Static,
        }
    }

    /// Replaces the variant.
    #[must_use]
    pub fn with_kind(mut self, kind: EncounterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Fixes the ball.
    #[must_use]
    pub fn with_ball(mut self, ball: u8) -> Self {
        self.fixed_ball = Some(ball);
        self
    }

    /// Fixes the moves.
    #[must_use]
    pub fn with_moves(mut self, moves: [u16; MAX_MOVES]) -> Self {
        self.moves = moves;
        self
    }
}

impl EncounterCapabilities for EncounterTemplate {
    fn fixed_ball(&self) -> Option<u8> {
        self.fixed_ball
    }

    fn lock_chain(&self) -> Option<&LockChain> {
        match &self.kind {
            EncounterKind::Static => None,
            EncounterKind::Shadow { chain } | EncounterKind::EReader { chain } => Some(chain),
        }
    }

    fn uses_fixed_distribution(&self) -> bool {
        matches!(self.kind, EncounterKind::EReader { .. })
    }
}

/// Generates entities from templates.
///
/// Holds no mutable state: every call draws from the entropy source it is
/// given, so one generator can serve many callers.
///
/// # Example
///
/// ```
/// use shadowseed::prelude::*;
///
/// let species = SpeciesTable::new().with(
///     196,
///     PersonalInfo { gender_ratio: 31, base_friendship: 70, abilities: [28, 28] },
/// );
/// let walker = ReverseLockWalker;
/// let generator = Generator::new(&species, &walker);
///
/// let template = EncounterTemplate::new(196, 25, 1);
/// let mut entropy = Pcg32::seed_from_u64(9);
/// let entity = generator
///     .generate(&template, TrainerId::new(1, 2), &EntityCriteria::UNRESTRICTED, &mut entropy)
///     .unwrap();
/// assert_eq!(entity.species(), 196);
/// ```
pub struct Generator<'a, S: SpeciesInfo + ?Sized, V: LockValidator + ?Sized> {
    species: &'a S,
    validator: &'a V,
    learnsets: Option<&'a LearnsetTable>,
    config: SearchConfig,
    lcg: Lcg32,
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl<S: SpeciesInfo + ?Sized, V: LockValidator + ?Sized> fmt::Debug for Generator<'_, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            species: _,
            validator: _,
            learnsets,
            config,
            lcg,
            violation_observer,
        } = self;

        f.debug_struct("Generator")
            .field("has_learnsets", &learnsets.is_some())
            .field("config", config)
            .field("lcg", lcg)
            .field("has_violation_observer", &violation_observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, S: SpeciesInfo + ?Sized, V: LockValidator + ?Sized> Generator<'a, S, V> {
    /// Creates a generator with the default [`SearchConfig`] over [`XDRNG`].
    pub fn new(species: &'a S, validator: &'a V) -> Self {
        Self {
            species,
            validator,
            learnsets: None,
            config: SearchConfig::default(),
            lcg: XDRNG,
            violation_observer: None,
        }
    }

    /// Replaces the search configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::InvalidRequest`] if a field is out of range.
    pub fn with_config(mut self, config: SearchConfig) -> SeedResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Routes search diagnostics to `observer` instead of the default tracing output.
    #[must_use]
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Fills templates without moves from the species' level-up learnset.
    #[must_use]
    pub fn with_learnsets(mut self, learnsets: &'a LearnsetTable) -> Self {
        self.learnsets = Some(learnsets);
        self
    }

    /// Replaces the generator. Searches run on it and every
    /// [`LockCandidate`] handed to the validator carries it.
    #[must_use]
    pub fn with_lcg(mut self, lcg: Lcg32) -> Self {
        self.lcg = lcg;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Generates an entity for `template` owned by `trainer`.
    ///
    /// # Errors
    ///
    /// - [`SeedError::InvalidRequest`] for unknown species or malformed criteria.
    /// - [`SeedError::SearchExhausted`] when every permitted search phase ran
    ///   out of attempts.
    pub fn generate<E: EntropySource + ?Sized>(
        &self,
        template: &EncounterTemplate,
        trainer: TrainerId,
        criteria: &EntityCriteria,
        entropy: &mut E,
    ) -> SeedResult<Entity> {
        criteria.validate()?;
        let info = self.species.require(template.species)?;
        let target = SearchTarget {
            id32: trainer.id32(),
            gender_ratio: info.gender_ratio,
        };
        let search = LockSearch::new(self.validator, self.config).with_lcg(self.lcg);

        tracing::debug!(
            species = template.species,
            level = template.level,
            fixed = template.uses_fixed_distribution(),
            "generating encounter"
        );

        let (pid, ivs, ability_slot) = match &template.kind {
            EncounterKind::EReader { chain } => {
                let hit = self.with_fallback(criteria, |criteria, phase| {
                    search.find_locked_pid(chain, criteria, target, phase, entropy)
                })?;
                (hit.pid, IvSet::ZERO, 0)
            },
            kind => {
                let chain = match kind {
                    EncounterKind::Shadow { chain } => Some(chain),
                    _ => None,
                };
                if let Some(ivs) = criteria.ivs.pinned() {
                    let (pid, ability_slot) =
                        self.from_pinned_ivs(ivs, chain, criteria, target, entropy);
                    (pid, ivs, ability_slot)
                } else {
                    let frame = self.with_fallback(criteria, |criteria, phase| {
                        search.find_frame(chain, criteria, target, phase, entropy)
                    })?;
                    (frame.pid, frame.ivs, frame.ability_slot)
                }
            },
        };

        let moves = self.moves_for(template);
        Ok(Entity::builder(template.species, template.level)
            .pid(pid)
            .ivs(ivs)
            .ability(ability_slot, info.ability(ability_slot))
            .gender_ratio(info.gender_ratio)
            .met_location(template.location)
            .trainer(trainer)
            .moves(moves)
            .ball(template.fixed_ball().unwrap_or(DEFAULT_BALL))
            .friendship(info.base_friendship)
            .build())
    }

    fn with_fallback<T>(
        &self,
        criteria: &EntityCriteria,
        mut run: impl FnMut(&EntityCriteria, SearchPhase) -> SeedResult<T>,
    ) -> SeedResult<T> {
        let attempts = match run(criteria, SearchPhase::Requested) {
            Err(SeedError::SearchExhausted { attempts, .. }) => attempts,
            other => return other,
        };

        if !self.config.fallback_to_unrestricted || criteria.is_unrestricted() {
            report_violation_to!(
                self.violation_observer,
                None,
                ViolationSeverity::Error,
                ViolationKind::SeedSearch,
                "search exhausted after {} attempts with no fallback",
                attempts
            );
            return Err(SeedError::SearchExhausted {
                attempts,
                phase: SearchPhase::Requested,
            });
        }

        report_violation_to!(
            self.violation_observer,
            None,
            ViolationSeverity::Warning,
            ViolationKind::SeedSearch,
            "requested criteria exhausted after {} attempts, retrying unrestricted",
            attempts
        );
        let result = run(&EntityCriteria::UNRESTRICTED, SearchPhase::Unrestricted);
        if let Err(SeedError::SearchExhausted { attempts, .. }) = &result {
            report_violation_to!(
                self.violation_observer,
                None,
                ViolationSeverity::Error,
                ViolationKind::SeedSearch,
                "unrestricted search exhausted after {} attempts",
                attempts
            );
        }
        result
    }

    /// Picks a frame reproducing `ivs`. Frames reachable through `chain`
    /// come first, then frames meeting the rest of the criteria. Returns the
    /// PID and ability slot.
    fn from_pinned_ivs<E: EntropySource + ?Sized>(
        &self,
        ivs: IvSet,
        chain: Option<&LockChain>,
        criteria: &EntityCriteria,
        target: SearchTarget,
        entropy: &mut E,
    ) -> (u32, u8) {
        let frames = search::recover_iv_frames(self.lcg, &ivs);
        let (locked, unlocked): (Vec<&CxdFrame>, Vec<&CxdFrame>) =
            frames.iter().partition(|frame| {
                chain.is_none_or(|chain| {
                    let candidate = LockCandidate::new(
                        frame.origin,
                        frame.origin,
                        frame.pid,
                        self.lcg,
                        &self.config,
                    );
                    self.validator.validate(&candidate, chain.locks())
                })
            });
        if chain.is_some() && locked.is_empty() {
            report_violation_to!(
                self.violation_observer,
                None,
                ViolationSeverity::Warning,
                ViolationKind::SeedSearch,
                "no frame with pinned IVs passes the lock chain ({} candidates)",
                frames.len()
            );
        }

        for pool in [&locked, &unlocked] {
            let preferred: Vec<&CxdFrame> = pool
                .iter()
                .copied()
                .filter(|frame| {
                    criteria.accepts(
                        frame.pid,
                        &frame.ivs,
                        frame.ability_slot,
                        target.id32,
                        target.gender_ratio,
                    )
                })
                .collect();
            if !preferred.is_empty() {
                let frame = preferred[entropy.gen_range(0..preferred.len())];
                return (frame.pid, frame.ability_slot);
            }
        }

        report_violation_to!(
            self.violation_observer,
            None,
            ViolationSeverity::Warning,
            ViolationKind::SeedSearch,
            "no frame with pinned IVs meets the remaining criteria ({} candidates)",
            frames.len()
        );
        let pool = if locked.is_empty() { &unlocked } else { &locked };
        let (mut pid, mut ability_slot) = if pool.is_empty() {
            (entropy.next_u32(), 0)
        } else {
            let frame = pool[entropy.gen_range(0..pool.len())];
            (frame.pid, frame.ability_slot)
        };
        if let Some(want_shiny) = criteria.shiny.forced() {
            let xor_type = entropy.gen_range(0..SQUARE_SHINY_THRESHOLD as usize) as u32;
            shiny::force_shiny_state(want_shiny, &mut pid, target.id32, xor_type);
        }
        if let AbilityRequest::Slot(slot) = criteria.ability {
            ability_slot = slot;
        }
        (pid, ability_slot)
    }

    fn moves_for(&self, template: &EncounterTemplate) -> [u16; MAX_MOVES] {
        if template.moves != [0; MAX_MOVES] {
            return template.moves;
        }
        self.learnsets
            .and_then(|table| table.get(template.species))
            .map_or(template.moves, |learnset| {
                learnset.default_moves(template.level)
            })
    }
}
