//! Invertible 32-bit linear congruential generators and entropy sources.
//!
//! The games emulated here drive every random decision from a single 32-bit
//! seed advanced by `seed * M + A (mod 2^32)`. Because `M` is odd it has a
//! multiplicative inverse modulo `2^32`, so every step can be undone exactly:
//!
//! ```rust
//! use shadowseed::rng::XDRNG;
//!
//! let seed = 0x1234_5678;
//! assert_eq!(XDRNG.prev(XDRNG.next(seed)), seed);
//! assert_eq!(XDRNG.prev_n(XDRNG.next_n(seed, 5), 5), seed);
//! ```
//!
//! Seeds are plain `u32` values. No generator state is shared between calls:
//! a [`SeedCursor`] is a local, owned position in the sequence, and fresh
//! starting seeds come from an [`EntropySource`] that the caller passes in.
//!
//! ```rust
//! use shadowseed::rng::{EntropySource, Pcg32, SequenceEntropy};
//!
//! // Seeded source for reproducible runs
//! let mut entropy = Pcg32::seed_from_u64(12345);
//! let _seed = entropy.next_u32();
//!
//! // Replay a recorded sequence in tests
//! let mut replay = SequenceEntropy::new(vec![1, 2, 3]);
//! assert_eq!(replay.next_u32(), 1);
//! ```

use crate::{
    error::{InvalidRequestKind, SeedResult},
    report_violation,
    telemetry::{ViolationKind, ViolationSeverity},
};

/// Parameters of a 32-bit LCG together with its precomputed inverse.
///
/// The inverse constants are derived in `const` context, so a parameter set
/// declared as a `const` costs nothing at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lcg32 {
    mult: u32,
    add: u32,
    rmult: u32,
    radd: u32,
}

/// Generator used by the GameCube-era titles (Colosseum / XD).
pub const XDRNG: Lcg32 = Lcg32::from_odd(0x0003_43FD, 0x0026_9EC3);

/// Generator used by the handheld titles of the same era.
pub const LCRNG: Lcg32 = Lcg32::from_odd(0x41C6_4E6D, 0x0000_6073);

impl Lcg32 {
    /// Creates a parameter set for `seed * mult + add`.
    ///
    /// # Errors
    ///
    /// [`InvalidRequestKind::EvenMultiplier`] if `mult` is even; only odd
    /// multipliers are invertible modulo `2^32`.
    pub fn new(mult: u32, add: u32) -> SeedResult<Self> {
        if mult & 1 == 0 {
            return Err(InvalidRequestKind::EvenMultiplier { mult }.into());
        }
        Ok(Self::from_odd(mult, add))
    }

    /// `mult` is odd.
    const fn from_odd(mult: u32, add: u32) -> Self {
        let rmult = mod_inverse(mult);
        // x = y * rmult - add * rmult
        let radd = add.wrapping_mul(rmult).wrapping_neg();
        Self {
            mult,
            add,
            rmult,
            radd,
        }
    }

    /// Forward multiplier.
    #[must_use]
    pub const fn mult(&self) -> u32 {
        self.mult
    }

    /// Forward additive constant.
    #[must_use]
    pub const fn add(&self) -> u32 {
        self.add
    }

    /// Multiplier of the inverse step.
    #[must_use]
    pub const fn rmult(&self) -> u32 {
        self.rmult
    }

    /// Additive constant of the inverse step.
    #[must_use]
    pub const fn radd(&self) -> u32 {
        self.radd
    }

    /// Advances the seed by one step.
    #[inline]
    #[must_use]
    pub const fn next(&self, seed: u32) -> u32 {
        seed.wrapping_mul(self.mult).wrapping_add(self.add)
    }

    /// Reverses one step. `prev(next(s)) == s` for every `s`.
    #[inline]
    #[must_use]
    pub const fn prev(&self, seed: u32) -> u32 {
        seed.wrapping_mul(self.rmult).wrapping_add(self.radd)
    }

    /// Advances the seed by `n` steps.
    #[must_use]
    pub const fn next_n(&self, mut seed: u32, n: u32) -> u32 {
        let mut i = 0;
        while i < n {
            seed = self.next(seed);
            i += 1;
        }
        seed
    }

    /// Reverses `n` steps.
    #[must_use]
    pub const fn prev_n(&self, mut seed: u32, n: u32) -> u32 {
        let mut i = 0;
        while i < n {
            seed = self.prev(seed);
            i += 1;
        }
        seed
    }

    /// Reverses three steps.
    #[inline]
    #[must_use]
    pub const fn prev3(&self, seed: u32) -> u32 {
        self.prev(self.prev(self.prev(seed)))
    }

    /// Moves the seed by a signed number of steps (negative moves backwards).
    #[must_use]
    pub const fn jump(&self, seed: u32, steps: i32) -> u32 {
        if steps >= 0 {
            self.next_n(seed, steps.unsigned_abs())
        } else {
            self.prev_n(seed, steps.unsigned_abs())
        }
    }

    /// Advances the seed and returns the upper 16 bits of the new state,
    /// which is what the games actually consume.
    #[inline]
    #[must_use]
    pub const fn next16(&self, seed: u32) -> u32 {
        self.next(seed) >> 16
    }

    /// Returns a cursor positioned at `seed`.
    #[must_use]
    pub const fn cursor(self, seed: u32) -> SeedCursor {
        SeedCursor { lcg: self, seed }
    }
}

/// Multiplicative inverse of an odd `a` modulo `2^32` via Newton iteration.
///
/// `a * a == 1 (mod 8)` for odd `a`, so `a` is its own inverse to 3 bits;
/// each iteration doubles the number of correct bits (3, 6, 12, 24, 48).
const fn mod_inverse(a: u32) -> u32 {
    let mut x = a;
    let mut i = 0;
    while i < 4 {
        x = x.wrapping_mul(2u32.wrapping_sub(a.wrapping_mul(x)));
        i += 1;
    }
    x
}

/// An owned position in an LCG sequence.
///
/// Each generation call builds its own cursor, so concurrent calls never
/// share mutable generator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedCursor {
    lcg: Lcg32,
    seed: u32,
}

impl SeedCursor {
    /// Current seed.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Advances and returns the new seed.
    pub fn advance(&mut self) -> u32 {
        self.seed = self.lcg.next(self.seed);
        self.seed
    }

    /// Advances and returns the upper 16 bits of the new seed.
    pub fn advance16(&mut self) -> u16 {
        (self.advance() >> 16) as u16
    }

    /// Rewinds one step and returns the new seed.
    pub fn rewind(&mut self) -> u32 {
        self.seed = self.lcg.prev(self.seed);
        self.seed
    }

    /// Advances `n` steps without reading the intermediate values.
    pub fn skip(&mut self, n: u32) {
        self.seed = self.lcg.next_n(self.seed, n);
    }
}

/// Supplies fresh 32-bit starting seeds.
///
/// Passed explicitly into every search so tests can substitute a fixed
/// sequence and threads never contend on a shared generator.
pub trait EntropySource {
    /// Draws one uniformly distributed seed.
    fn next_u32(&mut self) -> u32;

    /// Picks an index in `range` without modulo bias.
    ///
    /// An empty range is reported as a configuration error and yields
    /// `range.start` without drawing.
    fn gen_range(&mut self, range: std::ops::Range<usize>) -> usize {
        let Some(len) = range.end.checked_sub(range.start).filter(|&len| len > 0) else {
            report_violation!(
                ViolationSeverity::Error,
                ViolationKind::Configuration,
                "cannot pick from empty range {}..{}",
                range.start,
                range.end
            );
            return range.start;
        };

        let len = u32::try_from(len).unwrap_or(u32::MAX);
        let reject_below = len.wrapping_neg() % len;
        loop {
            let draw = self.next_u32();
            if draw >= reject_below {
                return range.start + (draw % len) as usize;
            }
        }
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

const PCG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const PCG_STREAM: u64 = 1_442_695_040_888_963_407;

/// PCG-XSH-RR over a 64-bit state: the default [`EntropySource`].
///
/// Fast and well distributed, not cryptographically secure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    increment: u64,
}

impl Pcg32 {
    const fn bump(state: u64, increment: u64) -> u64 {
        state.wrapping_mul(PCG_MULTIPLIER).wrapping_add(increment)
    }

    /// Starts stream `stream` at `state`.
    #[must_use]
    pub const fn new(state: u64, stream: u64) -> Self {
        let increment = (stream << 1) | 1;
        let primed = Self::bump(0, increment).wrapping_add(state);
        Self {
            state: Self::bump(primed, increment),
            increment,
        }
    }

    /// Starts the default stream at `seed`.
    #[must_use]
    pub const fn seed_from_u64(seed: u64) -> Self {
        Self::new(seed, PCG_STREAM)
    }

    /// Seeds from the clock, the thread id and per-process hash keys.
    ///
    /// Not replayable; use [`Pcg32::seed_from_u64`] when a run must be.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seed_from_u64(timing_entropy_seed())
    }
}

impl EntropySource for Pcg32 {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::bump(old, self.increment);
        let mixed = (((old >> 18) ^ old) >> 27) as u32;
        mixed.rotate_right((old >> 59) as u32)
    }
}

/// Replays a recorded sequence of seeds, wrapping around at the end.
///
/// An empty sequence yields zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntropy {
    values: Vec<u32>,
    position: usize,
}

impl SequenceEntropy {
    /// Creates a source that yields `values` in order, then repeats.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Number of values drawn so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.position
    }
}

impl EntropySource for SequenceEntropy {
    fn next_u32(&mut self) -> u32 {
        if self.values.is_empty() {
            self.position += 1;
            return 0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

fn timing_entropy_seed() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    let clock = web_time::Instant::now();
    let mut hasher = RandomState::new().build_hasher();
    std::thread::current().id().hash(&mut hasher);
    clock.elapsed().as_nanos().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn test_xdrng_inverse_constants() {
        assert_eq!(XDRNG.rmult(), 0xB9B3_3155);
        assert_eq!(XDRNG.radd(), 0xA170_F641);
    }

    #[test]
    fn test_lcrng_inverse_constants() {
        assert_eq!(LCRNG.rmult(), 0xEEB9_EB65);
        assert_eq!(LCRNG.radd(), 0x0A35_61A1);
    }

    #[test]
    fn test_xdrng_golden_sequence() {
        // 0 * M + A, then (A * M + A) mod 2^32
        assert_eq!(XDRNG.next(0), 0x0026_9EC3);
        assert_eq!(
            XDRNG.next(0x0026_9EC3),
            0x0026_9EC3_u32
                .wrapping_mul(0x0003_43FD)
                .wrapping_add(0x0026_9EC3)
        );
    }

    #[test]
    fn test_wraparound_is_not_an_error() {
        let seed = u32::MAX;
        let forward = XDRNG.next(seed);
        assert_eq!(XDRNG.prev(forward), seed);
    }

    #[test]
    fn test_prev3_matches_prev_n() {
        let seed = 0xCAFE_BABE;
        assert_eq!(XDRNG.prev3(seed), XDRNG.prev_n(seed, 3));
        assert_eq!(XDRNG.next_n(XDRNG.prev3(seed), 3), seed);
    }

    #[test]
    fn test_jump_signed() {
        let seed = 0x0BAD_F00D;
        assert_eq!(XDRNG.jump(seed, 4), XDRNG.next_n(seed, 4));
        assert_eq!(XDRNG.jump(seed, -4), XDRNG.prev_n(seed, 4));
        assert_eq!(XDRNG.jump(seed, 0), seed);
    }

    #[test]
    fn test_even_multiplier_rejected() {
        assert_eq!(
            Lcg32::new(0x1000, 1).unwrap_err(),
            crate::SeedError::from(InvalidRequestKind::EvenMultiplier { mult: 0x1000 })
        );

        let lcg = Lcg32::new(0x1001, 1).unwrap();
        assert_eq!(lcg.mult(), 0x1001);
        assert_eq!(lcg.prev(lcg.next(77)), 77);
        assert_eq!(Lcg32::new(XDRNG.mult(), XDRNG.add()).unwrap(), XDRNG);
    }

    #[test]
    fn test_cursor_advance_and_rewind() {
        let mut cursor = XDRNG.cursor(42);
        let a = cursor.advance();
        let b = cursor.advance();
        assert_eq!(a, XDRNG.next(42));
        assert_eq!(b, XDRNG.next(a));
        assert_eq!(cursor.rewind(), a);
        assert_eq!(cursor.rewind(), 42);
        cursor.skip(2);
        assert_eq!(cursor.seed(), b);
    }

    #[test]
    fn test_cursor_advance16_takes_upper_bits() {
        let mut cursor = XDRNG.cursor(0x1357_9BDF);
        let expected = (XDRNG.next(0x1357_9BDF) >> 16) as u16;
        assert_eq!(cursor.advance16(), expected);
    }

    #[test]
    fn test_pcg32_reference_output() {
        let mut pcg = Pcg32::seed_from_u64(0);
        let first: Vec<u32> = (0..5).map(|_| pcg.next_u32()).collect();
        assert_eq!(
            first,
            [0x348a_463f, 0x4f20_5a1b, 0x2946_c488, 0x805e_36de, 0x79f9_94a9]
        );
    }

    #[test]
    fn test_pcg32_streams_differ() {
        let mut a = Pcg32::new(7, 1);
        let mut b = Pcg32::new(7, 2);
        let a: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let b: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequence_entropy_wraps() {
        let mut entropy = SequenceEntropy::new(vec![5, 6]);
        assert_eq!(entropy.next_u32(), 5);
        assert_eq!(entropy.next_u32(), 6);
        assert_eq!(entropy.next_u32(), 5);
        assert_eq!(entropy.drawn(), 3);
    }

    #[test]
    fn test_sequence_entropy_empty_yields_zero() {
        let mut entropy = SequenceEntropy::new(Vec::new());
        assert_eq!(entropy.next_u32(), 0);
        assert_eq!(entropy.drawn(), 1);
    }

    #[test]
    fn test_gen_range_single_value_draws_once() {
        let mut entropy = SequenceEntropy::new(vec![u32::MAX, 3]);
        assert_eq!(entropy.gen_range(4..5), 4);
        assert_eq!(entropy.drawn(), 1);
    }

    #[test]
    fn test_gen_range_empty_draws_nothing() {
        let mut entropy = SequenceEntropy::new(vec![1]);
        assert_eq!(entropy.gen_range(7..7), 7);
        #[allow(clippy::reversed_empty_ranges)]
        let backwards = entropy.gen_range(9..3);
        assert_eq!(backwards, 9);
        assert_eq!(entropy.drawn(), 0);
    }

    #[test]
    fn test_gen_range_rejects_biased_tail() {
        // For a span of 3, draws below 2^32 % 3 == 1 are rejected.
        let mut entropy = SequenceEntropy::new(vec![0, 5]);
        assert_eq!(entropy.gen_range(0..3), 2);
        assert_eq!(entropy.drawn(), 2);
    }

    #[test]
    fn test_entropy_through_mut_ref() {
        let mut entropy = SequenceEntropy::new(vec![9, 8]);
        let by_ref = &mut entropy;
        fn draw<E: EntropySource>(mut e: E) -> u32 {
            e.next_u32()
        }
        assert_eq!(draw(by_ref), 9);
        assert_eq!(entropy.next_u32(), 8);
    }

    #[test]
    fn test_from_entropy_yields_values() {
        let mut pcg = Pcg32::from_entropy();
        let draws: Vec<u32> = (0..8).map(|_| pcg.next_u32()).collect();
        assert!(draws.windows(2).any(|pair| pair[0] != pair[1]));
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: prev undoes next and next undoes prev for every seed.
        #[test]
        fn prop_xdrng_inverse_law(seed in any::<u32>()) {
            prop_assert_eq!(XDRNG.prev(XDRNG.next(seed)), seed);
            prop_assert_eq!(XDRNG.next(XDRNG.prev(seed)), seed);
        }

        /// Property: the inverse law holds for the handheld generator too.
        #[test]
        fn prop_lcrng_inverse_law(seed in any::<u32>()) {
            prop_assert_eq!(LCRNG.prev(LCRNG.next(seed)), seed);
            prop_assert_eq!(LCRNG.next(LCRNG.prev(seed)), seed);
        }

        /// Property: any odd multiplier yields a working inverse.
        #[test]
        fn prop_arbitrary_parameters_invert(mult in any::<u32>(), add in any::<u32>(), seed in any::<u32>()) {
            let lcg = Lcg32::new(mult | 1, add).unwrap();
            prop_assert_eq!(lcg.mult().wrapping_mul(lcg.rmult()), 1);
            prop_assert_eq!(lcg.prev(lcg.next(seed)), seed);
        }

        /// Property: n steps forward then n back returns the original seed.
        #[test]
        fn prop_multi_step_round_trip(seed in any::<u32>(), n in 0u32..64) {
            prop_assert_eq!(XDRNG.prev_n(XDRNG.next_n(seed, n), n), seed);
            prop_assert_eq!(XDRNG.next_n(XDRNG.prev_n(seed, n), n), seed);
        }

        /// Property: picked indices stay inside the requested range.
        #[test]
        fn prop_gen_range_in_range(seed in any::<u64>(), start in 0usize..1000, len in 1usize..1000) {
            let mut pcg = Pcg32::seed_from_u64(seed);
            for _ in 0..50 {
                prop_assert!((start..start + len).contains(&pcg.gen_range(start..start + len)));
            }
        }

        /// Property: a cloned source replays the original's draws.
        #[test]
        fn prop_pcg_clone_replays(seed in any::<u64>(), skip in 0usize..32) {
            let mut original = Pcg32::seed_from_u64(seed);
            for _ in 0..skip {
                original.next_u32();
            }
            let mut copy = original.clone();
            for _ in 0..64 {
                prop_assert_eq!(original.next_u32(), copy.next_u32());
            }
        }
    }
}
