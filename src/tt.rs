//! Transposition table (spec §4.E).
//!
//! A fixed-capacity, open-addressed array indexed by the low bits of the
//! Zobrist key. Collisions are resolved by storing the full 64-bit key in
//! each entry and comparing on probe -- the index alone is never trusted.

use crate::types::{Move, MAX_PLY};

const MATE_SCORE_THRESHOLD: i32 = 30_000 - MAX_PLY as i32;

/// How the stored score relates to the search window it was computed in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy)]
struct Entry {
    key: u64,
    best_move: Move,
    depth: i16,
    score: i32,
    bound: Bound,
    generation: u8,
    is_pv: bool,
}

impl Entry {
    const EMPTY: Entry = Entry {
        key: 0,
        best_move: Move::null(),
        depth: -1,
        score: 0,
        bound: Bound::Exact,
        generation: 0,
        is_pv: false,
    };
}

/// A probe hit, with the mate-distance adjustment already applied for the
/// calling ply (spec §4.E).
#[derive(Clone, Copy, Debug)]
pub struct TtHit {
    pub best_move: Move,
    pub depth: i16,
    pub score: i32,
    pub bound: Bound,
    pub is_pv: bool,
}

/// Adjust a mate-distance-independent score for storage: mate scores are
/// stored as distance-to-mate-from-the-current-node, not from the root, so
/// that a later probe at a different ply can re-derive the correct distance
/// (spec §4.E).
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE_THRESHOLD {
        score + ply
    } else if score <= -MATE_SCORE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE_THRESHOLD {
        score - ply
    } else if score <= -MATE_SCORE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

pub struct TranspositionTable {
    entries: Vec<Entry>,
    mask: usize,
    generation: u8,
}

impl TranspositionTable {
    /// Build a table sized to `hash_mb` megabytes, rounded down to a power
    /// of two number of entries so the index can be a mask instead of a
    /// modulo.
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Entry>();
        let requested = (hash_mb * 1024 * 1024 / entry_size).max(1);
        let capacity = requested.next_power_of_two() / 2;
        let capacity = capacity.max(1024);
        Self { entries: vec![Entry::EMPTY; capacity], mask: capacity - 1, generation: 0 }
    }

    #[must_use]
    pub fn size_mb(&self) -> usize {
        self.entries.len() * std::mem::size_of::<Entry>() / (1024 * 1024)
    }

    pub fn clear(&mut self) {
        self.entries.fill(Entry::EMPTY);
        self.generation = 0;
    }

    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    #[must_use]
    pub fn probe(&self, key: u64, ply: i32) -> Option<TtHit> {
        let entry = &self.entries[self.index(key)];
        if entry.key != key || entry.depth < 0 {
            return None;
        }
        Some(TtHit {
            best_move: entry.best_move,
            depth: entry.depth,
            score: score_from_tt(entry.score, ply),
            bound: entry.bound,
            is_pv: entry.is_pv,
        })
    }

    /// Always replace an empty slot, a slot from an earlier generation, or
    /// one storing a shallower search; otherwise keep the stronger entry.
    /// PV-node entries are always preferred over non-PV ones when depth
    /// ties (spec §4.E).
    pub fn store(
        &mut self,
        key: u64,
        best_move: Move,
        depth: i16,
        score: i32,
        bound: Bound,
        ply: i32,
        is_pv: bool,
    ) {
        let generation = self.generation;
        let idx = self.index(key);
        let slot = &mut self.entries[idx];

        let replace = slot.depth < 0
            || slot.generation != generation
            || depth >= slot.depth
            || (is_pv && !slot.is_pv);
        if !replace {
            return;
        }

        let stored_move = if best_move.is_null() && slot.key == key { slot.best_move } else { best_move };

        *slot = Entry {
            key,
            best_move: stored_move,
            depth,
            score: score_to_tt(score, ply),
            bound,
            generation,
            is_pv,
        };
    }

    #[must_use]
    pub fn hashfull_permille(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.entries[..sample]
            .iter()
            .filter(|e| e.depth >= 0 && e.generation == self.generation)
            .count();
        (used * 1000 / sample) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    #[test]
    fn store_then_probe_round_trips() {
        let mut tt = TranspositionTable::new(1);
        let key = 0xDEAD_BEEF_0000_0001;
        let mv = crate::types::Move::quiet(Square::new(1, 4), Square::new(3, 4));
        tt.store(key, mv, 5, 123, Bound::Exact, 0, true);
        let hit = tt.probe(key, 0).unwrap();
        assert_eq!(hit.best_move, mv);
        assert_eq!(hit.score, 123);
        assert_eq!(hit.depth, 5);
    }

    #[test]
    fn probe_rejects_key_mismatch() {
        let mut tt = TranspositionTable::new(1);
        let mv = crate::types::Move::quiet(Square::new(1, 4), Square::new(3, 4));
        tt.store(1, mv, 5, 123, Bound::Exact, 0, false);
        assert!(tt.probe(2, 0).is_none() || tt.probe(2, 0).unwrap().depth < 0);
    }

    #[test]
    fn mate_distance_is_rebased_from_storage_ply() {
        let mut tt = TranspositionTable::new(1);
        let mv = crate::types::Move::null();
        let mate_in_three_from_node = 30_000 - 3;
        tt.store(42, mv, 10, mate_in_three_from_node, Bound::Exact, 5, true);
        let hit = tt.probe(42, 5).unwrap();
        assert_eq!(hit.score, mate_in_three_from_node);
    }
}
