//! Common test infrastructure shared across integration tests.
//!
//! - `fixtures`: species table, trainer, counting entropy, and canned lock validators
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{species_table, CountingEntropy, RejectAll};
//! ```

pub mod fixtures;

// Not every suite uses every fixture.
#[allow(unused_imports)]
pub use fixtures::{
    init_tracing, species_table, trainer, CountingEntropy, RejectAll, MAGNEMITE, MILTANK,
    PIKACHU, TAUROS, UMBREON,
};
