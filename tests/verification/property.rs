//! Property-based tests over the public API.
//!
//! # Properties Tested
//!
//! - Stepping a seed forward then back (either generator, any step count) is the identity
//! - The square shiny threshold is a subset of the default threshold
//! - Forcing shininess is idempotent and reversible
//! - `can_relearn` agrees with a full scan despite stopping early
//! - Generated entities derive nature, gender and shininess from their PID
//! - Generated entities satisfy the criteria they were requested with

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use proptest::prelude::*;
use shadowseed::prelude::*;
use shadowseed::shiny::{shiny_pid, SQUARE_SHINY_THRESHOLD};

use crate::common::{species_table, trainer, PIKACHU, UMBREON};

fn generator_strategy() -> impl Strategy<Value = Lcg32> {
    prop_oneof![Just(XDRNG), Just(LCRNG)]
}

fn learnset_strategy() -> impl Strategy<Value = Learnset> {
    prop::collection::vec(
        (1u8..=100, 1u16..=12, 0u8..=0x7F).prop_map(|(level, move_id, bits)| {
            LearnEntry::new(level, move_id, SourceFlags::from_bits_truncate(bits))
        }),
        0..32,
    )
    .prop_map(Learnset::from_unsorted)
}

fn criteria_strategy() -> impl Strategy<Value = EntityCriteria> {
    (
        prop::option::of(0u8..25),
        prop::option::of(prop_oneof![Just(Gender::Male), Just(Gender::Female)]),
        prop_oneof![
            Just(AbilityRequest::Any),
            Just(AbilityRequest::Slot(0)),
            Just(AbilityRequest::Slot(1))
        ],
    )
        .prop_map(|(nature, gender, ability)| EntityCriteria {
            nature: nature.and_then(Nature::new),
            gender,
            ability,
            ..EntityCriteria::UNRESTRICTED
        })
}

proptest! {
    #[test]
    fn prop_step_round_trip(lcg in generator_strategy(), seed: u32, steps in 0u32..64) {
        prop_assert_eq!(lcg.prev_n(lcg.next_n(seed, steps), steps), seed);
        prop_assert_eq!(lcg.next_n(lcg.prev_n(seed, steps), steps), seed);
        prop_assert_eq!(lcg.jump(lcg.jump(seed, steps as i32), -(steps as i32)), seed);
    }

    #[test]
    fn prop_cursor_rewinds_to_start(seed: u32, steps in 1usize..32) {
        let mut cursor = XDRNG.cursor(seed);
        for _ in 0..steps {
            cursor.advance();
        }
        for _ in 0..steps {
            cursor.rewind();
        }
        prop_assert_eq!(cursor.seed(), seed);
    }

    #[test]
    fn prop_square_shiny_is_subset(id32: u32, pid: u32) {
        prop_assert!(
            !is_shiny(id32, pid, SQUARE_SHINY_THRESHOLD) || is_shiny(id32, pid, SHINY_THRESHOLD)
        );
    }

    #[test]
    fn prop_shiny_pid_respects_threshold(tid: u16, sid: u16, pid: u32, xor_type in 0u32..8) {
        let id32 = TrainerId::new(tid, sid).id32();
        let forced = shiny_pid(tid, sid, pid, xor_type);
        prop_assert!(is_shiny(id32, forced, SQUARE_SHINY_THRESHOLD));
    }

    #[test]
    fn prop_force_shiny_state_idempotent(id32: u32, pid: u32, xor_type in 0u32..16) {
        let mut value = pid;
        force_shiny_state(true, &mut value, id32, xor_type);
        let once = value;
        force_shiny_state(true, &mut value, id32, xor_type);
        prop_assert_eq!(value, once);
        prop_assert!(is_shiny(id32, value, SHINY_THRESHOLD));

        force_shiny_state(false, &mut value, id32, xor_type);
        prop_assert!(!is_shiny(id32, value, SHINY_THRESHOLD));
    }

    #[test]
    fn prop_relearn_agrees_with_full_scan(
        learnset in learnset_strategy(),
        move_id in 1u16..=12,
        level in 1u8..=100,
    ) {
        let expected = learnset
            .entries()
            .iter()
            .any(|e| e.move_id == move_id && e.level <= level && e.sources.is_relearnable());
        prop_assert_eq!(learnset.can_relearn(move_id, level), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_entity_fields_follow_pid(seed: u64, species in prop_oneof![Just(PIKACHU), Just(UMBREON)]) {
        let table = species_table();
        let walker = ReverseLockWalker;
        let generator = Generator::new(&table, &walker);
        let mut entropy = Pcg32::seed_from_u64(seed);

        let entity = generator
            .generate(
                &EncounterTemplate::new(species, 10, 1),
                trainer(),
                &EntityCriteria::UNRESTRICTED,
                &mut entropy,
            )
            .unwrap();
        let ratio = table.personal(species).unwrap().gender_ratio;
        prop_assert_eq!(entity.nature(), Nature::from_pid(entity.pid()));
        prop_assert_eq!(entity.gender(), Gender::from_pid(entity.pid(), ratio));
        prop_assert_eq!(
            entity.is_shiny(),
            is_shiny(trainer().id32(), entity.pid(), SHINY_THRESHOLD)
        );
    }

    #[test]
    fn prop_generated_entity_meets_criteria(seed: u64, criteria in criteria_strategy()) {
        let table = species_table();
        let walker = ReverseLockWalker;
        let generator = Generator::new(&table, &walker);
        let mut entropy = Pcg32::seed_from_u64(seed);

        let entity = generator
            .generate(&EncounterTemplate::new(PIKACHU, 10, 1), trainer(), &criteria, &mut entropy)
            .unwrap();
        prop_assert!(criteria.accepts(
            entity.pid(),
            &entity.ivs(),
            entity.ability_slot(),
            trainer().id32(),
            127,
        ));
    }
}
