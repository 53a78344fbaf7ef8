//! Level-gated learnset tables and move-list validation.
//!
//! # Sort invariant
//!
//! Entries are kept in ascending level order. The constructors enforce it
//! once, and queries rely on it: [`Learnset::try_get_move`] returns the
//! lowest-level entry for a move, and [`Learnset::can_relearn`] stops at the
//! first entry above the query level.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::debug_check_invariants;
use crate::entity::MAX_MOVES;
use crate::error::{InvalidRequestKind, SeedError, SeedResult};
use crate::telemetry::{InvariantChecker, InvariantViolation};

/// Bit set of the ways a move can be obtained.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFlags(u8);

impl SourceFlags {
    /// No sources.
    pub const EMPTY: Self = Self(0);
    /// Level-up, variant A.
    pub const LEVEL_UP_A: Self = Self(1 << 0);
    /// Level-up, variant B.
    pub const LEVEL_UP_B: Self = Self(1 << 1);
    /// Level-up, variant C.
    pub const LEVEL_UP_C: Self = Self(1 << 2);
    /// Move tutor.
    pub const TUTOR: Self = Self(1 << 3);
    /// Egg move, variant A.
    pub const EGG_A: Self = Self(1 << 4);
    /// Egg move, variant B.
    pub const EGG_B: Self = Self(1 << 5);
    /// Event distribution.
    pub const EVENT: Self = Self(1 << 6);
    /// Any level-up variant.
    pub const LEVEL_UP: Self = Self(Self::LEVEL_UP_A.0 | Self::LEVEL_UP_B.0 | Self::LEVEL_UP_C.0);

    const ALL: u8 = 0x7F;

    /// Builds flags from raw bits, dropping undefined ones.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// A move is relearnable only through a level-up source.
    #[must_use]
    pub const fn is_relearnable(self) -> bool {
        self.intersects(Self::LEVEL_UP)
    }
}

impl BitOr for SourceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SourceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 7] = [
            "LEVEL_UP_A",
            "LEVEL_UP_B",
            "LEVEL_UP_C",
            "TUTOR",
            "EGG_A",
            "EGG_B",
            "EVENT",
        ];
        let mut set = f.debug_set();
        for (bit, name) in NAMES.iter().enumerate() {
            if self.0 & (1 << bit) != 0 {
                set.entry(name);
            }
        }
        set.finish()
    }
}

/// One row of a learnset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LearnEntry {
    /// Minimum level.
    pub level: u8,
    /// Move identifier.
    pub move_id: u16,
    /// How the move is obtained.
    pub sources: SourceFlags,
}

impl LearnEntry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(level: u8, move_id: u16, sources: SourceFlags) -> Self {
        Self {
            level,
            move_id,
            sources,
        }
    }
}

/// Result of [`Learnset::validate_move_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveListReport {
    /// `true` if no slot was flagged.
    pub all_valid: bool,
    /// One flag per supplied slot; `true` marks a move that cannot be known.
    pub flags: SmallVec<[bool; MAX_MOVES]>,
}

impl MoveListReport {
    /// Indices of flagged slots.
    pub fn flagged(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
    }
}

/// A learner's entries, sorted by ascending level.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LearnEntry>", into = "Vec<LearnEntry>")]
pub struct Learnset {
    entries: Vec<LearnEntry>,
}

impl Learnset {
    /// Creates a learnset from entries already sorted by level.
    ///
    /// # Errors
    /// [`InvalidRequestKind::LearnsetNotSorted`] names the first entry whose
    /// level is lower than the one before it.
    pub fn new(entries: Vec<LearnEntry>) -> SeedResult<Self> {
        if let Some(index) = first_unsorted(&entries) {
            return Err(InvalidRequestKind::LearnsetNotSorted { index }.into());
        }
        Ok(Self { entries })
    }

    /// Creates a learnset from entries in any order.
    ///
    /// The sort is stable, so entries sharing a level keep their relative order.
    #[must_use]
    pub fn from_unsorted(mut entries: Vec<LearnEntry>) -> Self {
        entries.sort_by_key(|entry| entry.level);
        let learnset = Self { entries };
        debug_check_invariants!(learnset, "Learnset::from_unsorted");
        learnset
    }

    /// Entries in level order.
    #[must_use]
    pub fn entries(&self) -> &[LearnEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First (lowest-level) entry for `move_id`.
    #[must_use]
    pub fn try_get_move(&self, move_id: u16) -> Option<&LearnEntry> {
        self.entries.iter().find(|entry| entry.move_id == move_id)
    }

    /// Returns `true` if `move_id` is learnable at or below `level`.
    #[must_use]
    pub fn can_know(&self, move_id: u16, level: u8) -> bool {
        self.try_get_move(move_id)
            .is_some_and(|entry| entry.level <= level)
    }

    /// Returns `true` if `move_id` has a level-up entry at or below `level`.
    #[must_use]
    pub fn can_relearn(&self, move_id: u16, level: u8) -> bool {
        for entry in &self.entries {
            if entry.level > level {
                return false;
            }
            if entry.move_id == move_id && entry.sources.is_relearnable() {
                return true;
            }
        }
        false
    }

    /// Entries learnable at or below `level`.
    pub fn moves_up_to(&self, level: u8) -> impl Iterator<Item = &LearnEntry> + '_ {
        self.entries
            .iter()
            .take_while(move |entry| entry.level <= level)
    }

    /// The last four distinct level-up moves at or below `level`, oldest first.
    ///
    /// Unused slots are zero.
    #[must_use]
    pub fn default_moves(&self, level: u8) -> [u16; MAX_MOVES] {
        let mut recent: SmallVec<[u16; MAX_MOVES]> = SmallVec::new();
        for entry in self.moves_up_to(level) {
            if !entry.sources.is_relearnable() || recent.contains(&entry.move_id) {
                continue;
            }
            if recent.len() == MAX_MOVES {
                recent.remove(0);
            }
            recent.push(entry.move_id);
        }

        let mut moves = [0; MAX_MOVES];
        for (slot, move_id) in moves.iter_mut().zip(recent) {
            *slot = move_id;
        }
        moves
    }

    /// Checks each known move in isolation.
    ///
    /// Sets `flags_out[i]` when `moves[i]` cannot be known at `level`; zero
    /// slots are never flagged. Stops early if `flags_out` is shorter than
    /// `moves`. Returns `true` if nothing was flagged.
    ///
    /// Combinations that are individually legal but mutually exclusive are
    /// not detected.
    pub fn validate(&self, moves: &[u16], level: u8, flags_out: &mut [bool]) -> bool {
        let mut all_valid = true;
        for (i, &move_id) in moves.iter().enumerate() {
            let Some(flag) = flags_out.get_mut(i) else {
                tracing::trace!(
                    moves = moves.len(),
                    flags = i,
                    "flag buffer shorter than move list"
                );
                break;
            };
            *flag = move_id != 0 && !self.can_know(move_id, level);
            if *flag {
                all_valid = false;
            }
        }
        all_valid
    }

    /// Validates a move list of at most four slots.
    ///
    /// # Errors
    /// [`InvalidRequestKind::MoveListTooLong`] if more than four moves are given.
    pub fn validate_move_list(&self, moves: &[u16], level: u8) -> SeedResult<MoveListReport> {
        if moves.len() > MAX_MOVES {
            return Err(InvalidRequestKind::MoveListTooLong {
                len: moves.len(),
                max: MAX_MOVES,
            }
            .into());
        }
        let mut flags: SmallVec<[bool; MAX_MOVES]> = SmallVec::from_elem(false, moves.len());
        let all_valid = self.validate(moves, level, &mut flags);
        Ok(MoveListReport { all_valid, flags })
    }
}

fn first_unsorted(entries: &[LearnEntry]) -> Option<usize> {
    entries
        .windows(2)
        .position(|pair| pair[1].level < pair[0].level)
        .map(|i| i + 1)
}

impl TryFrom<Vec<LearnEntry>> for Learnset {
    type Error = SeedError;

    fn try_from(entries: Vec<LearnEntry>) -> SeedResult<Self> {
        Self::new(entries)
    }
}

impl From<Learnset> for Vec<LearnEntry> {
    fn from(learnset: Learnset) -> Self {
        learnset.entries
    }
}

impl InvariantChecker for Learnset {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match first_unsorted(&self.entries) {
            None => Ok(()),
            Some(index) => Err(InvariantViolation::new(
                "Learnset",
                "entries sorted by ascending level",
            )
            .with_details(format!("entry {} is out of order", index))),
        }
    }
}

/// Learnsets keyed by species, as shipped in packed game data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LearnsetTable {
    learnsets: BTreeMap<u16, Learnset>,
}

impl LearnsetTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a species' learnset.
    pub fn insert(&mut self, species: u16, learnset: Learnset) -> Option<Learnset> {
        self.learnsets.insert(species, learnset)
    }

    /// Learnset for `species`.
    #[must_use]
    pub fn get(&self, species: u16) -> Option<&Learnset> {
        self.learnsets.get(&species)
    }

    /// Number of species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.learnsets.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.learnsets.is_empty()
    }

    /// Species with a learnset, ascending.
    pub fn species(&self) -> impl Iterator<Item = u16> + '_ {
        self.learnsets.keys().copied()
    }

    /// Shorthand for [`Learnset::can_relearn`]; unknown species learn nothing.
    #[must_use]
    pub fn can_relearn(&self, species: u16, move_id: u16, level: u8) -> bool {
        self.get(species)
            .is_some_and(|learnset| learnset.can_relearn(move_id, level))
    }

    /// Encodes the table in the packed binary format.
    pub fn to_bytes(&self) -> SeedResult<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|err| {
            SeedError::InternalError {
                context: format!("failed to encode learnset table: {}", err),
            }
        })
    }

    /// Decodes a packed table, rejecting unsorted learnsets and trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> SeedResult<Self> {
        let (table, consumed): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard()).map_err(
                |err| SeedError::Decode {
                    context: format!("learnset table: {}", err),
                },
            )?;
        if consumed != bytes.len() {
            return Err(SeedError::Decode {
                context: format!(
                    "learnset table: {} trailing bytes",
                    bytes.len() - consumed
                ),
            });
        }
        Ok(table)
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = LearnEntry> {
        (1u8..=100, 1u16..=20, 0u8..=0x7F).prop_map(|(level, move_id, bits)| {
            LearnEntry::new(level, move_id, SourceFlags::from_bits_truncate(bits))
        })
    }

    proptest! {
        #[test]
        fn prop_from_unsorted_sorts(entries in prop::collection::vec(entry_strategy(), 0..40)) {
            let learnset = Learnset::from_unsorted(entries.clone());
            prop_assert!(learnset.check_invariants().is_ok());
            prop_assert_eq!(learnset.len(), entries.len());
        }

        #[test]
        fn prop_relearn_implies_know(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            move_id in 1u16..=20,
            level in 1u8..=100,
        ) {
            let learnset = Learnset::from_unsorted(entries);
            if learnset.can_relearn(move_id, level) {
                prop_assert!(learnset.can_know(move_id, level));
            }
        }

        #[test]
        fn prop_relearn_matches_linear_scan(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            move_id in 1u16..=20,
            level in 1u8..=100,
        ) {
            let learnset = Learnset::from_unsorted(entries);
            let expected = learnset.entries().iter().any(|e| {
                e.move_id == move_id && e.level <= level && e.sources.is_relearnable()
            });
            prop_assert_eq!(learnset.can_relearn(move_id, level), expected);
        }

        #[test]
        fn prop_validate_result_matches_flags(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            moves in prop::collection::vec(0u16..=20, 0..=4),
            level in 1u8..=100,
        ) {
            let learnset = Learnset::from_unsorted(entries);
            let report = learnset.validate_move_list(&moves, level).unwrap();
            prop_assert_eq!(report.all_valid, report.flagged().next().is_none());
            for (i, &move_id) in moves.iter().enumerate() {
                prop_assert_eq!(report.flags[i], move_id != 0 && !learnset.can_know(move_id, level));
            }
        }
    }
}
