//! Invariant tests.
//!
//! Public types that carry structural invariants implement
//! [`InvariantChecker`]; these tests drive them through their public
//! constructors and check the invariants hold, and that generated entities
//! stay internally consistent.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use shadowseed::prelude::*;
use shadowseed::telemetry::InvariantChecker;
use shadowseed::{InvalidRequestKind, SearchPhase};

use crate::common::{species_table, trainer, MILTANK, TAUROS};

#[test]
fn test_learnset_constructors_uphold_sort() {
    let entries = vec![
        LearnEntry::new(20, 1, SourceFlags::LEVEL_UP_A),
        LearnEntry::new(5, 2, SourceFlags::LEVEL_UP_A),
        LearnEntry::new(5, 3, SourceFlags::TUTOR),
        LearnEntry::new(1, 4, SourceFlags::EGG_B),
    ];
    let sorted = Learnset::from_unsorted(entries.clone());
    assert!(sorted.check_invariants().is_ok());
    assert_eq!(
        Learnset::new(entries).unwrap_err(),
        SeedError::from(InvalidRequestKind::LearnsetNotSorted { index: 1 })
    );
}

#[test]
fn test_lock_chain_never_empty() {
    let chain = LockChain::new([NpcLock::shadow(TAUROS)]).unwrap();
    assert!(chain.check_invariants().is_ok());
    assert!(!chain.is_empty());
    assert!(chain.preceding().is_empty());
    assert!(LockChain::new(Vec::new()).is_err());
}

#[test]
fn test_search_config_presets_validate() {
    for config in [
        SearchConfig::default(),
        SearchConfig::quick(),
        SearchConfig::exhaustive(),
    ] {
        config.validate().unwrap();
    }
}

#[test]
fn test_generated_entities_are_consistent() {
    let species = species_table();
    let walker = ReverseLockWalker;
    let generator = Generator::new(&species, &walker);
    let mut entropy = Pcg32::seed_from_u64(404);

    for level in 1..=50u8 {
        let entity = generator
            .generate(
                &EncounterTemplate::new(MILTANK, level, 1),
                trainer(),
                &EntityCriteria::UNRESTRICTED,
                &mut entropy,
            )
            .unwrap();
        assert_eq!(entity.level(), level);
        assert_eq!(entity.gender(), Gender::Female);
        assert_eq!(entity.nature(), Nature::from_pid(entity.pid()));
        assert!(entity.ivs().to_array().iter().all(|&iv| iv <= 31));
        assert!(entity.ability_slot() <= 1);
    }
}

#[test]
fn test_exhaustion_reports_attempt_ceiling() {
    let species = species_table();
    let walker = ReverseLockWalker;
    let config = SearchConfig {
        max_attempts: 64,
        fallback_to_unrestricted: false,
        ..SearchConfig::default()
    };
    let generator = Generator::new(&species, &walker).with_config(config).unwrap();
    let chain = LockChain::new([NpcLock::new(
        TAUROS,
        Nature::new(1).unwrap(),
        Some(Gender::Female),
        0,
    )])
    .unwrap();

    let err = generator
        .generate(
            &EncounterTemplate::new(TAUROS, 10, 1).with_kind(EncounterKind::EReader { chain }),
            trainer(),
            &EntityCriteria::UNRESTRICTED,
            &mut Pcg32::seed_from_u64(0),
        )
        .unwrap_err();
    assert_eq!(
        err,
        SeedError::SearchExhausted {
            attempts: 64,
            phase: SearchPhase::Requested,
        }
    );
}
