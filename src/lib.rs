//! # shadowseed
//!
//! Bit-exact emulation of the 32-bit linear congruential generator used by
//! handheld- and console-era monster games, and the searches built on it.
//!
//! - [`rng`]: invertible LCG parameter sets ([`XDRNG`], [`LCRNG`]) and entropy sources.
//! - [`shiny`]: shiny derivation and forcing.
//! - [`learnset`]: sorted learnsets and move-list validation.
//! - [`lock`]: team locks and the [`ReverseLockWalker`] validator.
//! - [`search`]: bounded seed searches.
//! - [`encounter`]: templates and the [`Generator`] that ties everything together.
//!
//! Every call owns its seed and draws from an [`EntropySource`] passed in by
//! the caller; nothing in the crate keeps global generator state. Replaying
//! the same entropy sequence reproduces the same [`Entity`].
//!
//! ```
//! use shadowseed::prelude::*;
//!
//! let seed = 0x1234_5678;
//! assert_eq!(XDRNG.prev(XDRNG.next(seed)), seed);
//!
//! let pid = force_shiny(true, 0xDEAD_BEEF, TrainerId::new(1, 2).id32(), 0);
//! assert!(is_shiny(TrainerId::new(1, 2).id32(), pid, SHINY_THRESHOLD));
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use config::SearchConfig;
pub use criteria::{AbilityRequest, EntityCriteria, IvCriteria, ShinyRequest};
pub use encounter::{EncounterCapabilities, EncounterKind, EncounterTemplate, Generator};
pub use entity::{Entity, EntityBuilder, Gender, IvSet, Nature};
pub use error::{InvalidRequestKind, SearchPhase, SeedError, SeedResult};
pub use learnset::{LearnEntry, Learnset, LearnsetTable, MoveListReport, SourceFlags};
pub use lock::{LockCandidate, LockChain, LockValidator, NpcLock, ReverseLockWalker};
pub use rng::{EntropySource, Lcg32, Pcg32, SeedCursor, SequenceEntropy, LCRNG, XDRNG};
pub use search::{CxdFrame, LockHit, LockSearch, PidPairing, SearchTarget};
pub use shiny::TrainerId;
pub use species::{PersonalInfo, SpeciesInfo, SpeciesTable};

pub mod config;
pub mod criteria;
pub mod encounter;
pub mod entity;
#[doc(hidden)]
pub mod error;
pub mod learnset;
pub mod lock;
pub mod prelude;
pub mod rng;
pub mod search;
pub mod shiny;
pub mod species;
pub mod telemetry;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_value_types_are_thread_safe() {
        assert_send_sync::<Entity>();
        assert_send_sync::<LearnsetTable>();
        assert_send_sync::<LockChain>();
        assert_send_sync::<SearchConfig>();
        assert_send_sync::<ReverseLockWalker>();
        assert_send_sync::<SpeciesTable>();
    }

    #[test]
    fn test_generator_shared_across_threads() {
        let species = SpeciesTable::new().with(
            1,
            PersonalInfo {
                gender_ratio: 31,
                base_friendship: 70,
                abilities: [65, 65],
            },
        );
        let walker = ReverseLockWalker;
        let template = EncounterTemplate::new(1, 5, 1);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4u64)
                .map(|i| {
                    let (species, walker, template) = (&species, &walker, &template);
                    scope.spawn(move || {
                        let generator = Generator::new(species, walker);
                        let mut entropy = Pcg32::seed_from_u64(i);
                        generator.generate(
                            template,
                            TrainerId::new(1, 1),
                            &EntityCriteria::UNRESTRICTED,
                            &mut entropy,
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });

        for (i, result) in results.into_iter().enumerate() {
            let entity = result.ok().and_then(Result::ok);
            let expected = Generator::new(&species, &walker)
                .generate(
                    &template,
                    TrainerId::new(1, 1),
                    &EntityCriteria::UNRESTRICTED,
                    &mut Pcg32::seed_from_u64(i as u64),
                )
                .ok();
            assert_eq!(entity, expected);
        }
    }
}
