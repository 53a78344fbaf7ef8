//! Species metadata used while building entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidRequestKind, SeedResult};

/// Per-species data the generator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Gender-ratio byte (see [`crate::entity::Gender::from_pid`]).
    pub gender_ratio: u8,
    /// Starting friendship.
    pub base_friendship: u8,
    /// Abilities for slot 0 and slot 1.
    pub abilities: [u16; 2],
}

impl PersonalInfo {
    /// Ability for `slot`; any slot other than 1 resolves to slot 0.
    #[must_use]
    pub const fn ability(&self, slot: u8) -> u16 {
        if slot == 1 {
            self.abilities[1]
        } else {
            self.abilities[0]
        }
    }
}

/// Provides [`PersonalInfo`] for a species.
pub trait SpeciesInfo {
    /// Returns the species' data, or `None` if it is unknown.
    fn personal(&self, species: u16) -> Option<PersonalInfo>;

    /// Like [`SpeciesInfo::personal`], but unknown species are an error.
    fn require(&self, species: u16) -> SeedResult<PersonalInfo> {
        self.personal(species)
            .ok_or(InvalidRequestKind::UnknownSpecies { species }.into())
    }
}

/// In-memory species table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: BTreeMap<u16, PersonalInfo>,
}

impl SpeciesTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a species, returning the table for chaining.
    #[must_use]
    pub fn with(mut self, species: u16, info: PersonalInfo) -> Self {
        self.insert(species, info);
        self
    }

    /// Adds or replaces a species.
    pub fn insert(&mut self, species: u16, info: PersonalInfo) -> Option<PersonalInfo> {
        self.entries.insert(species, info)
    }

    /// Number of species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpeciesInfo for SpeciesTable {
    fn personal(&self, species: u16) -> Option<PersonalInfo> {
        self.entries.get(&species).copied()
    }
}

impl<S: SpeciesInfo + ?Sized> SpeciesInfo for &S {
    fn personal(&self, species: u16) -> Option<PersonalInfo> {
        (**self).personal(species)
    }
}
