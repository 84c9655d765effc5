//! Tablebase collaborator interface (spec §6).
//!
//! Probed at the root when the piece count is at or below the
//! collaborator's supported size, and optionally inside search for early
//! cutoffs (not implemented in the core, per spec: "inside search for early
//! cutoffs when implemented").

use crate::board::Board;
use crate::types::Move;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Wdl {
    Win,
    Draw,
    Loss,
}

/// Distance to zeroing, as reported by the tablebase; signed, with the
/// sign carrying the same meaning as the accompanying `Wdl`.
pub type Dtz = i32;

pub trait Tablebase {
    /// Maximum total piece count (both sides, including kings) this
    /// collaborator has data for.
    fn max_pieces(&self) -> u32;

    fn probe_wdl(&self, board: &Board) -> Option<Wdl>;

    fn probe_root(&self, board: &Board) -> Option<(Move, Dtz)>;
}

/// The collaborator used when no `SyzygyPath` is configured, or the probe
/// failed to load -- treated as a permanent miss (spec §7, error kind 5),
/// never fatal.
#[derive(Default)]
pub struct NoTablebase;

impl Tablebase for NoTablebase {
    fn max_pieces(&self) -> u32 {
        0
    }

    fn probe_wdl(&self, _board: &Board) -> Option<Wdl> {
        None
    }

    fn probe_root(&self, _board: &Board) -> Option<(Move, Dtz)> {
        None
    }
}
