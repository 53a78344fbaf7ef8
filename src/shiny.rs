//! Shiny derivation and forcing.
//!
//! A PID is shiny for a trainer when the XOR of its two halves with the
//! trainer's two ID halves falls under a threshold. The legacy 16-bit DV
//! check is an unrelated formula and stays separate.

use serde::{Deserialize, Serialize};

use crate::report_violation;
use crate::telemetry::{ViolationKind, ViolationSeverity};

/// Default (looser) shiny threshold.
pub const SHINY_THRESHOLD: u32 = 16;

/// Stricter "square" shiny threshold.
pub const SQUARE_SHINY_THRESHOLD: u32 = 8;

/// Bit flipped to take a shiny PID out of the shiny range.
pub const UNSHINY_FLIP_BIT: u32 = 0x1000_0000;

/// Public and secret halves of a trainer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TrainerId {
    /// Public trainer ID (low 16 bits of the combined ID).
    pub tid: u16,
    /// Secret ID (high 16 bits of the combined ID).
    pub sid: u16,
}

impl TrainerId {
    /// Creates a trainer identity from its public and secret halves.
    #[must_use]
    pub const fn new(tid: u16, sid: u16) -> Self {
        Self { tid, sid }
    }

    /// Splits a combined 32-bit ID.
    #[must_use]
    pub const fn from_id32(id32: u32) -> Self {
        Self {
            tid: id32 as u16,
            sid: (id32 >> 16) as u16,
        }
    }

    /// Combined 32-bit ID: `sid << 16 | tid`.
    #[must_use]
    pub const fn id32(&self) -> u32 {
        ((self.sid as u32) << 16) | self.tid as u32
    }
}

/// Folds `pid ^ id32` into 16 bits by XOR-ing its halves.
#[must_use]
pub const fn shiny_xor(pid: u32, id32: u32) -> u32 {
    let xor = pid ^ id32;
    (xor ^ (xor >> 16)) & 0xFFFF
}

/// Returns `true` if the folded XOR is below `threshold`.
///
/// `threshold` is normally [`SHINY_THRESHOLD`] or [`SQUARE_SHINY_THRESHOLD`].
#[must_use]
pub const fn is_shiny(id32: u32, pid: u32, threshold: u32) -> bool {
    shiny_xor(pid, id32) < threshold
}

/// Rebuilds `pid` so it is shiny for `tid`/`sid`, keeping the low half.
///
/// The resulting folded XOR equals `xor_type`, so any `xor_type` below the
/// threshold in use yields a shiny PID.
#[must_use]
pub const fn shiny_pid(tid: u16, sid: u16, pid: u32, xor_type: u32) -> u32 {
    let low = pid & 0xFFFF;
    let high = (xor_type ^ tid as u32 ^ sid as u32 ^ low) & 0xFFFF;
    (high << 16) | low
}

/// Forces `pid` into or out of the shiny state in place.
///
/// Does nothing when `pid` already has the wanted state, so repeated calls
/// with the same `want_shiny` are no-ops after the first.
pub fn force_shiny_state(want_shiny: bool, pid: &mut u32, id32: u32, xor_type: u32) {
    if xor_type >= SHINY_THRESHOLD {
        report_violation!(
            ViolationSeverity::Warning,
            ViolationKind::Configuration,
            "xor_type {} can never produce a shiny PID",
            xor_type
        );
    }

    let shiny = is_shiny(id32, *pid, SHINY_THRESHOLD);
    if want_shiny && !shiny {
        let trainer = TrainerId::from_id32(id32);
        *pid = shiny_pid(trainer.tid, trainer.sid, *pid, xor_type);
    } else if !want_shiny && shiny {
        *pid ^= UNSHINY_FLIP_BIT;
    }
}

/// Value-returning form of [`force_shiny_state`].
#[must_use]
pub fn force_shiny(want_shiny: bool, pid: u32, id32: u32, xor_type: u32) -> u32 {
    let mut pid = pid;
    force_shiny_state(want_shiny, &mut pid, id32, xor_type);
    pid
}

/// Shiny check for the packed 16-bit DV encoding of the oldest games.
#[must_use]
pub const fn is_shiny_legacy(dv16: u16) -> bool {
    (dv16 & 0x2FFF) == 0x2AAA
}
