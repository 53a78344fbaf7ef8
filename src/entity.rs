//! Identity values derived from a PID and the immutable [`Entity`] result.
//!
//! Generation never mutates caller storage. It produces an [`Entity`] through
//! an [`EntityBuilder`], and the caller copies the fields into whatever
//! record it owns. Nature, gender and shininess are always derived from the
//! final PID at build time, so they cannot drift out of sync with it.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidRequestKind, SeedResult};
use crate::shiny::{self, TrainerId};

/// Number of natures; a nature is `pid % NATURE_COUNT`.
pub const NATURE_COUNT: u8 = 25;

/// Highest value an individual value can take.
pub const MAX_IV: u8 = 31;

/// Number of move slots an entity has.
pub const MAX_MOVES: usize = 4;

/// Default ball when an encounter does not fix one.
pub const DEFAULT_BALL: u8 = 4;

/// Gender-ratio byte meaning "always male".
pub const RATIO_MALE_ONLY: u8 = 0;
/// Gender-ratio byte meaning "always female".
pub const RATIO_FEMALE_ONLY: u8 = 254;
/// Gender-ratio byte meaning "no gender".
pub const RATIO_GENDERLESS: u8 = 255;

const NATURE_NAMES: [&str; NATURE_COUNT as usize] = [
    "Hardy", "Lonely", "Brave", "Adamant", "Naughty", "Bold", "Docile", "Relaxed", "Impish",
    "Lax", "Timid", "Hasty", "Serious", "Jolly", "Naive", "Modest", "Mild", "Quiet", "Bashful",
    "Rash", "Calm", "Gentle", "Sassy", "Careful", "Quirky",
];

/// One of the 25 personality categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Nature(u8);

impl Nature {
    /// Creates a nature from its index, or `None` if the index is 25 or above.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < NATURE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Derives the nature encoded by a PID.
    #[must_use]
    pub const fn from_pid(pid: u32) -> Self {
        Self((pid % NATURE_COUNT as u32) as u8)
    }

    /// Index in `0..25`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// English name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        NATURE_NAMES[self.0 as usize]
    }
}

impl TryFrom<u8> for Nature {
    type Error = crate::SeedError;

    fn try_from(value: u8) -> SeedResult<Self> {
        Self::new(value).ok_or(InvalidRequestKind::NatureOutOfRange { value }.into())
    }
}

impl From<Nature> for u8 {
    fn from(nature: Nature) -> Self {
        nature.0
    }
}

impl std::fmt::Display for Nature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Gender as derived from a PID and the species' gender ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Species without gender.
    Genderless,
}

impl Gender {
    /// Derives gender from the low byte of the PID.
    ///
    /// Ratios 0, 254 and 255 are fixed (male, female, genderless); any other
    /// ratio yields female when `pid & 0xFF` is below it.
    #[must_use]
    pub const fn from_pid(pid: u32, ratio: u8) -> Self {
        match ratio {
            RATIO_MALE_ONLY => Self::Male,
            RATIO_FEMALE_ONLY => Self::Female,
            RATIO_GENDERLESS => Self::Genderless,
            _ => {
                if ((pid & 0xFF) as u8) < ratio {
                    Self::Female
                } else {
                    Self::Male
                }
            },
        }
    }
}

/// The six individual values, each in `0..=31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IvSet {
    /// Hit points.
    pub hp: u8,
    /// Attack.
    pub atk: u8,
    /// Defense.
    pub def: u8,
    /// Special attack.
    pub spa: u8,
    /// Special defense.
    pub spd: u8,
    /// Speed.
    pub spe: u8,
}

impl IvSet {
    /// All individual values zero (fixed-distribution encounters).
    pub const ZERO: Self = Self {
        hp: 0,
        atk: 0,
        def: 0,
        spa: 0,
        spd: 0,
        spe: 0,
    };

    /// Unpacks the two 15-bit halves the generator produces.
    ///
    /// The first half holds HP, Attack, Defense; the second Speed, Sp. Atk, Sp. Def,
    /// five bits each from the least significant end.
    #[must_use]
    pub const fn from_halves(first: u16, second: u16) -> Self {
        Self {
            hp: (first & 0x1F) as u8,
            atk: ((first >> 5) & 0x1F) as u8,
            def: ((first >> 10) & 0x1F) as u8,
            spe: (second & 0x1F) as u8,
            spa: ((second >> 5) & 0x1F) as u8,
            spd: ((second >> 10) & 0x1F) as u8,
        }
    }

    /// Packs back into the two 15-bit halves.
    #[must_use]
    pub const fn to_halves(&self) -> (u16, u16) {
        let first = (self.hp as u16) | ((self.atk as u16) << 5) | ((self.def as u16) << 10);
        let second = (self.spe as u16) | ((self.spa as u16) << 5) | ((self.spd as u16) << 10);
        (first, second)
    }

    /// Values in HP, Atk, Def, SpA, SpD, Spe order.
    #[must_use]
    pub const fn to_array(&self) -> [u8; 6] {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
    }

    /// Builds from HP, Atk, Def, SpA, SpD, Spe order, rejecting values above 31.
    pub fn try_from_array(values: [u8; 6]) -> SeedResult<Self> {
        if let Some((stat, &value)) = values.iter().enumerate().find(|(_, &v)| v > MAX_IV) {
            return Err(InvalidRequestKind::IvOutOfRange { stat, value }.into());
        }
        let [hp, atk, def, spa, spd, spe] = values;
        Ok(Self {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        })
    }
}

/// A fully generated individual. Immutable; build with [`EntityBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    species: u16,
    level: u8,
    pid: u32,
    ivs: IvSet,
    ability_slot: u8,
    ability: u16,
    nature: Nature,
    gender: Gender,
    shiny: bool,
    met_location: u16,
    trainer: TrainerId,
    moves: [u16; MAX_MOVES],
    ball: u8,
    friendship: u8,
}

impl Entity {
    /// Starts a builder for the given species and level.
    pub fn builder(species: u16, level: u8) -> EntityBuilder {
        EntityBuilder::new(species, level)
    }

    /// Species identifier.
    #[must_use]
    pub const fn species(&self) -> u16 {
        self.species
    }

    /// Level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Identity value.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Individual values.
    #[must_use]
    pub const fn ivs(&self) -> IvSet {
        self.ivs
    }

    /// Ability slot (0 or 1).
    #[must_use]
    pub const fn ability_slot(&self) -> u8 {
        self.ability_slot
    }

    /// Ability identifier resolved from the slot.
    #[must_use]
    pub const fn ability(&self) -> u16 {
        self.ability
    }

    /// Nature derived from the PID.
    #[must_use]
    pub const fn nature(&self) -> Nature {
        self.nature
    }

    /// Gender derived from the PID and gender ratio.
    #[must_use]
    pub const fn gender(&self) -> Gender {
        self.gender
    }

    /// Whether the PID is shiny for the original trainer.
    #[must_use]
    pub const fn is_shiny(&self) -> bool {
        self.shiny
    }

    /// Location the entity was met at.
    #[must_use]
    pub const fn met_location(&self) -> u16 {
        self.met_location
    }

    /// Original trainer.
    #[must_use]
    pub const fn trainer(&self) -> TrainerId {
        self.trainer
    }

    /// Move slots; 0 marks an empty slot.
    #[must_use]
    pub const fn moves(&self) -> [u16; MAX_MOVES] {
        self.moves
    }

    /// Ball the entity was caught in.
    #[must_use]
    pub const fn ball(&self) -> u8 {
        self.ball
    }

    /// Starting friendship.
    #[must_use]
    pub const fn friendship(&self) -> u8 {
        self.friendship
    }
}

/// Assembles an [`Entity`]. Derived fields are computed in [`EntityBuilder::build`].
#[derive(Debug, Clone)]
#[must_use = "EntityBuilder does nothing until build() is called"]
pub struct EntityBuilder {
    species: u16,
    level: u8,
    pid: u32,
    ivs: IvSet,
    ability_slot: u8,
    ability: u16,
    gender_ratio: u8,
    met_location: u16,
    trainer: TrainerId,
    moves: [u16; MAX_MOVES],
    ball: u8,
    friendship: u8,
}

impl EntityBuilder {
    /// Creates a builder with every other field zeroed and the default ball.
    pub fn new(species: u16, level: u8) -> Self {
        Self {
            species,
            level,
            pid: 0,
            ivs: IvSet::ZERO,
            ability_slot: 0,
            ability: 0,
            gender_ratio: RATIO_GENDERLESS,
            met_location: 0,
            trainer: TrainerId::default(),
            moves: [0; MAX_MOVES],
            ball: DEFAULT_BALL,
            friendship: 0,
        }
    }

    /// Sets the identity value.
    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Sets the individual values.
    pub fn ivs(mut self, ivs: IvSet) -> Self {
        self.ivs = ivs;
        self
    }

    /// Sets the ability slot and the ability it resolves to.
    pub fn ability(mut self, slot: u8, ability: u16) -> Self {
        self.ability_slot = slot;
        self.ability = ability;
        self
    }

    /// Sets the gender ratio used to derive gender from the PID.
    pub fn gender_ratio(mut self, ratio: u8) -> Self {
        self.gender_ratio = ratio;
        self
    }

    /// Sets the met location.
    pub fn met_location(mut self, location: u16) -> Self {
        self.met_location = location;
        self
    }

    /// Sets the original trainer.
    pub fn trainer(mut self, trainer: TrainerId) -> Self {
        self.trainer = trainer;
        self
    }

    /// Sets the move slots.
    pub fn moves(mut self, moves: [u16; MAX_MOVES]) -> Self {
        self.moves = moves;
        self
    }

    /// Sets the ball.
    pub fn ball(mut self, ball: u8) -> Self {
        self.ball = ball;
        self
    }

    /// Sets starting friendship.
    pub fn friendship(mut self, friendship: u8) -> Self {
        self.friendship = friendship;
        self
    }

    /// Finishes the entity, deriving nature, gender and shininess from the PID.
    #[must_use]
    pub fn build(self) -> Entity {
        Entity {
            species: self.species,
            level: self.level,
            pid: self.pid,
            ivs: self.ivs,
            ability_slot: self.ability_slot,
            ability: self.ability,
            nature: Nature::from_pid(self.pid),
            gender: Gender::from_pid(self.pid, self.gender_ratio),
            shiny: shiny::is_shiny(self.trainer.id32(), self.pid, shiny::SHINY_THRESHOLD),
            met_location: self.met_location,
            trainer: self.trainer,
            moves: self.moves,
            ball: self.ball,
            friendship: self.friendship,
        }
    }
}
