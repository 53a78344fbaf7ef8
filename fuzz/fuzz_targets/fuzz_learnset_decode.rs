//! Fuzz target for packed learnset table decoding.
//!
//! # Safety Properties Tested
//! - No panics on arbitrary byte sequences
//! - A table that decodes re-encodes to bytes that decode to the same table
//! - Every decoded learnset is sorted by level

#![no_main]

use libfuzzer_sys::fuzz_target;
use shadowseed::telemetry::InvariantChecker;
use shadowseed::LearnsetTable;

fuzz_target!(|data: &[u8]| {
    let Ok(table) = LearnsetTable::from_bytes(data) else {
        return;
    };

    for species in table.species() {
        if let Some(learnset) = table.get(species) {
            assert!(learnset.check_invariants().is_ok());
        }
    }

    let bytes = table.to_bytes().expect("decoded table re-encodes");
    let again = LearnsetTable::from_bytes(&bytes).expect("re-encoded table decodes");
    assert_eq!(table, again);
});
