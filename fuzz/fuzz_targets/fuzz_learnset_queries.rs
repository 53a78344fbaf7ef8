//! Fuzz target for learnset queries and search configuration.
//!
//! Builds a learnset from arbitrary entries and throws arbitrary move lists
//! and levels at it, then validates an arbitrary [`SearchConfig`].
//!
//! # Safety Properties Tested
//! - No panics from any query on any learnset
//! - `validate` and `validate_move_list` agree on every slot both cover
//! - A relearnable move is always knowable at the same level
//! - Out-of-range configuration values are rejected, never accepted silently

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use shadowseed::{LearnEntry, Learnset, PidPairing, SearchConfig, SourceFlags};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    entries: Vec<(u8, u16, u8)>,
    moves: Vec<u16>,
    level: u8,
    buffer_len: u8,
    max_attempts: u32,
    max_rerolls: u32,
    prefix_frames: u32,
    pairing: (i8, i8),
}

fuzz_target!(|input: FuzzInput| {
    let entries = input
        .entries
        .iter()
        .map(|&(level, move_id, bits)| {
            LearnEntry::new(level, move_id, SourceFlags::from_bits_truncate(bits))
        })
        .collect();
    let learnset = Learnset::from_unsorted(entries);

    let mut flags = vec![false; usize::from(input.buffer_len % 8)];
    let all_valid = learnset.validate(&input.moves, input.level, &mut flags);

    if let Ok(report) = learnset.validate_move_list(&input.moves, input.level) {
        for (slot, flagged) in flags.iter().zip(report.flags.iter()) {
            assert_eq!(slot, flagged);
        }
        if flags.len() >= input.moves.len() {
            assert_eq!(report.all_valid, all_valid);
        }
    }

    for &move_id in &input.moves {
        if learnset.can_relearn(move_id, input.level) {
            assert!(learnset.can_know(move_id, input.level));
        }
    }
    let _ = learnset.default_moves(input.level);

    let config = SearchConfig {
        max_attempts: input.max_attempts,
        max_rerolls: input.max_rerolls,
        prefix_frames: input.prefix_frames,
        pid_pairing: PidPairing {
            high: input.pairing.0,
            low: input.pairing.1,
        },
        fallback_to_unrestricted: true,
    };
    if config.validate().is_ok() {
        assert!(config.max_attempts >= 1);
        assert!(config.max_rerolls <= 64);
    }
});
