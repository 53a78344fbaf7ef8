//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::cell::Cell;

use shadowseed::{
    EntropySource, LockCandidate, LockValidator, NpcLock, PersonalInfo, SpeciesTable, TrainerId,
};

/// Even gender split.
pub const PIKACHU: u16 = 25;
/// Male only.
pub const TAUROS: u16 = 128;
/// Female only.
pub const MILTANK: u16 = 241;
/// Genderless.
pub const MAGNEMITE: u16 = 81;
/// Mostly male (ratio 31).
pub const UMBREON: u16 = 197;

/// Species table covering every gender-ratio case.
pub fn species_table() -> SpeciesTable {
    let info = |gender_ratio, abilities| PersonalInfo {
        gender_ratio,
        base_friendship: 70,
        abilities,
    };
    SpeciesTable::new()
        .with(PIKACHU, info(127, [9, 9]))
        .with(TAUROS, info(0, [22, 83]))
        .with(MILTANK, info(254, [47, 113]))
        .with(MAGNEMITE, info(255, [42, 5]))
        .with(UMBREON, info(31, [28, 28]))
}

/// The trainer every suite generates for.
pub fn trainer() -> TrainerId {
    TrainerId::new(31121, 4242)
}

/// Installs a debug-level subscriber so search logs show up in failing tests.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();
    // Another test may already have installed one.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Wraps an entropy source and counts draws.
pub struct CountingEntropy<E> {
    inner: E,
    draws: u64,
}

impl<E: EntropySource> CountingEntropy<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, draws: 0 }
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl<E: EntropySource> EntropySource for CountingEntropy<E> {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }
}

/// Lock validator that rejects every candidate and counts how often it was asked.
#[derive(Default)]
pub struct RejectAll {
    calls: Cell<u64>,
}

impl RejectAll {
    pub fn calls(&self) -> u64 {
        self.calls.get()
    }
}

impl LockValidator for RejectAll {
    fn validate(&self, _candidate: &LockCandidate, _locks: &[NpcLock]) -> bool {
        self.calls.set(self.calls.get() + 1);
        false
    }
}
