//! Convenient re-exports for common usage.
//!
//! ```rust
//! use shadowseed::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Generation**: [`Generator`], [`EncounterTemplate`], [`EncounterKind`], [`EncounterCapabilities`]
//! - **Results and criteria**: [`Entity`], [`EntityCriteria`], [`ShinyRequest`], [`AbilityRequest`], [`IvCriteria`]
//! - **Identity values**: [`Nature`], [`Gender`], [`IvSet`], [`TrainerId`]
//! - **Generators and entropy**: [`Lcg32`], [`XDRNG`], [`LCRNG`], [`EntropySource`], [`Pcg32`], [`SequenceEntropy`]
//! - **Shiny helpers**: [`is_shiny`], [`force_shiny`], [`force_shiny_state`], [`SHINY_THRESHOLD`]
//! - **Locks**: [`LockChain`], [`NpcLock`], [`LockValidator`], [`ReverseLockWalker`]
//! - **Learnsets**: [`Learnset`], [`LearnEntry`], [`LearnsetTable`], [`SourceFlags`]
//! - **Species data**: [`SpeciesInfo`], [`SpeciesTable`], [`PersonalInfo`]
//! - **Configuration and errors**: [`SearchConfig`], [`SeedError`], [`SeedResult`]

pub use crate::config::SearchConfig;
pub use crate::criteria::{AbilityRequest, EntityCriteria, IvCriteria, ShinyRequest};
pub use crate::encounter::{EncounterCapabilities, EncounterKind, EncounterTemplate, Generator};
pub use crate::entity::{Entity, Gender, IvSet, Nature};
pub use crate::error::{SeedError, SeedResult};
pub use crate::learnset::{LearnEntry, Learnset, LearnsetTable, SourceFlags};
pub use crate::lock::{LockChain, LockValidator, NpcLock, ReverseLockWalker};
pub use crate::rng::{EntropySource, Lcg32, Pcg32, SequenceEntropy, LCRNG, XDRNG};
pub use crate::shiny::{force_shiny, force_shiny_state, is_shiny, TrainerId, SHINY_THRESHOLD};
pub use crate::species::{PersonalInfo, SpeciesInfo, SpeciesTable};
