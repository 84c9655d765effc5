//! Chess position representation: piece placement, make/undo, FEN, and draw
//! detection (spec §4.B).

pub(crate) mod attack_tables;
mod fen;
mod make_unmake;
pub(crate) mod masks;
pub mod movegen;
mod uci_move;

#[cfg(test)]
mod tests;

use crate::types::{
    castle_bit, Bitboard, CastlingRights, Color, Move, Piece, Square, ALL_CASTLING_RIGHTS,
};
use crate::zobrist;

pub use fen::START_FEN;
pub use make_unmake::UndoInfo;

/// One entry per ply since the position was set up; used to detect
/// threefold repetition and to bound the fifty-move scan (spec §4.B).
#[derive(Clone, Copy, Debug)]
struct HistoryEntry {
    hash: u64,
    /// true if this ply's move was irreversible (pawn move, capture,
    /// castle, or promotion) — the repetition scan need not look past it.
    irreversible: bool,
}

/// The authoritative game state. Cloning a `Board` is cheap (no heap
/// allocation beyond the history `Vec`, which is pre-reserved).
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) white_to_move: bool,
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) hash: u64,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    history: Vec<HistoryEntry>,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_fen(START_FEN).expect("start FEN is well-formed")
    }

    pub(crate) fn empty() -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            white_to_move: true,
            en_passant: None,
            castling_rights: CastlingRights::none(),
            hash: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::with_capacity(256),
        }
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[must_use]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[must_use]
    pub fn all_occupancy(&self) -> Bitboard {
        self.all_occupied
    }

    #[must_use]
    pub fn pieces_of(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces[color.index()][Piece::King.index()]
            .lsb()
            .expect("every quiescent position has exactly one king per side")
    }

    /// The piece on `sq`, if any, with its color.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.all_occupied.contains(sq) {
            return None;
        }
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                if self.pieces[color.index()][piece.index()].contains(sq) {
                    return Some((color, piece));
                }
            }
        }
        None
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        self.pieces[color.index()][piece.index()] = self.pieces[color.index()][piece.index()].set(sq);
        self.occupied[color.index()] = self.occupied[color.index()].set(sq);
        self.all_occupied = self.all_occupied.set(sq);
        self.hash ^= zobrist::piece_key(piece, color, sq);
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        self.pieces[color.index()][piece.index()] = self.pieces[color.index()][piece.index()].clear(sq);
        self.occupied[color.index()] = self.occupied[color.index()].clear(sq);
        self.all_occupied = self.all_occupied.clear(sq);
        self.hash ^= zobrist::piece_key(piece, color, sq);
    }

    /// Recompute the Zobrist hash from scratch (used after FEN parsing).
    pub(crate) fn recompute_hash(&mut self) {
        let mut hash = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in self.pieces[color.index()][piece.index()] {
                    hash ^= zobrist::piece_key(piece, color, sq);
                }
            }
        }
        if !self.white_to_move {
            hash ^= zobrist::side_key();
        }
        hash ^= zobrist::castling_key(self.castling_rights.0);
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }
        self.hash = hash;
    }

    /// Whether `color`'s king currently sits on an attacked square.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        let king_sq = self.king_square(color);
        self.is_attacked_by(king_sq, color.opponent())
    }

    /// Whether `attacker` attacks `sq`, given the current occupancy.
    #[must_use]
    pub(crate) fn is_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        self.attackers_to(sq, attacker, self.all_occupied) != Bitboard::EMPTY
    }

    /// All squares, occupied by pieces of `attacker`, that attack `sq` given
    /// `occupied` as the blocker set (callers may pass a modified occupancy,
    /// e.g. with the king removed, to test squares the king may not step
    /// onto per spec §4.C).
    #[must_use]
    pub(crate) fn attackers_to(&self, sq: Square, attacker: Color, occupied: Bitboard) -> Bitboard {
        use crate::board::attack_tables::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
        let idx = sq.index();
        let mut result = Bitboard::EMPTY;

        let pawns = self.pieces[attacker.index()][Piece::Pawn.index()];
        result |= Bitboard(pawn_attacks(!attacker.is_white(), idx)) & pawns;

        let knights = self.pieces[attacker.index()][Piece::Knight.index()];
        result |= Bitboard(knight_attacks(idx)) & knights;

        let king = self.pieces[attacker.index()][Piece::King.index()];
        result |= Bitboard(king_attacks(idx)) & king;

        let bishops_queens =
            self.pieces[attacker.index()][Piece::Bishop.index()] | self.pieces[attacker.index()][Piece::Queen.index()];
        result |= Bitboard(bishop_attacks(idx, occupied.0)) & bishops_queens;

        let rooks_queens =
            self.pieces[attacker.index()][Piece::Rook.index()] | self.pieces[attacker.index()][Piece::Queen.index()];
        result |= Bitboard(rook_attacks(idx, occupied.0)) & rooks_queens;

        result
    }

    /// Game phase in `0..=256`: 256 at the start, decreasing toward 0 as
    /// non-pawn material leaves the board (spec §4.B, Open Question #2).
    #[must_use]
    pub fn game_phase(&self) -> i32 {
        const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
        const MAX_PHASE: i32 = PHASE_WEIGHT[1] * 4 + PHASE_WEIGHT[2] * 4 + PHASE_WEIGHT[3] * 4 + PHASE_WEIGHT[4] * 2;
        let mut phase = 0i32;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                phase += PHASE_WEIGHT[piece.index()] * self.pieces[color.index()][piece.index()].popcount() as i32;
            }
        }
        phase = phase.min(MAX_PHASE);
        (256 * phase / MAX_PHASE).clamp(0, 256)
    }

    /// Index of the history entry produced by the last irreversible move
    /// (pawn push, capture, castle, or promotion), or `0` if none has
    /// happened yet. That entry's own position is included in the
    /// repetition scan: it is the earliest position that could possibly
    /// recur.
    fn last_irreversible_index(&self) -> usize {
        self.history.iter().rposition(|e| e.irreversible).unwrap_or(0)
    }

    /// True at a quiescent position iff the fifty-move rule is exceeded,
    /// the current position is a draw by insufficient material, or the
    /// current hash has occurred three times since the last irreversible
    /// move (spec §4.B, Open Question #4: scan back to the last
    /// irreversible move rather than a fixed window).
    #[must_use]
    pub fn is_draw(&self) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }
        if self.is_insufficient_material() {
            return true;
        }
        // `history`'s last entry is the current position itself (pushed by
        // `make`/`make_null` after updating the hash), so no separate "+1"
        // is needed here.
        let floor = self.last_irreversible_index();
        let occurrences = self.history[floor..].iter().filter(|e| e.hash == self.hash).count();
        occurrences >= 3
    }

    /// Open Question #3: only KvK, K+minor vs K, and KB vs KB with
    /// same-colored bishops are declared draws. K+N+N vs K is excluded —
    /// it is drawable with best defense but not forced.
    #[must_use]
    fn is_insufficient_material(&self) -> bool {
        for color in [Color::White, Color::Black] {
            if !self.pieces[color.index()][Piece::Pawn.index()].is_empty()
                || !self.pieces[color.index()][Piece::Rook.index()].is_empty()
                || !self.pieces[color.index()][Piece::Queen.index()].is_empty()
            {
                return false;
            }
        }
        let minor_count = |c: Color| {
            self.pieces[c.index()][Piece::Knight.index()].popcount()
                + self.pieces[c.index()][Piece::Bishop.index()].popcount()
        };
        let (w, b) = (minor_count(Color::White), minor_count(Color::Black));
        match (w, b) {
            (0, 0) => true,
            (1, 0) | (0, 1) => true,
            (1, 1) => {
                let wb = self.pieces[Color::White.index()][Piece::Bishop.index()];
                let bb = self.pieces[Color::Black.index()][Piece::Bishop.index()];
                if wb.popcount() == 1 && bb.popcount() == 1 {
                    let is_dark = |sq: Square| (sq.rank() + sq.file()) % 2 == 0;
                    wb.lsb().map(is_dark) == bb.lsb().map(is_dark)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Whether any castling right for `color` is still held.
    #[must_use]
    pub fn can_castle(&self, color: Color, kingside: bool) -> bool {
        self.castling_rights.has(castle_bit(color, kingside))
    }

    pub(crate) fn clear_castling_right(&mut self, right: u8) {
        if self.castling_rights.has(right) {
            self.hash ^= zobrist::castling_key(self.castling_rights.0);
            self.castling_rights = self.castling_rights.remove(right);
            self.hash ^= zobrist::castling_key(self.castling_rights.0);
        }
    }

    pub(crate) fn push_history(&mut self, irreversible: bool) {
        self.history.push(HistoryEntry { hash: self.hash, irreversible });
    }

    pub(crate) fn pop_history(&mut self) {
        self.history.pop();
    }

    /// Checks the five structural invariants from spec §4.B. Only compiled
    /// with `debug_assertions`; a violation is a search-layer bug, not
    /// user-facing input (spec §7, error kind 2).
    #[cfg(debug_assertions)]
    pub(crate) fn debug_assert_consistent(&self) {
        let mut union = Bitboard::EMPTY;
        for color in [Color::White, Color::Black] {
            let mut color_union = Bitboard::EMPTY;
            for piece in Piece::ALL {
                let bb = self.pieces[color.index()][piece.index()];
                debug_assert!((bb & color_union).is_empty(), "overlapping piece bitboards");
                color_union |= bb;
            }
            debug_assert_eq!(color_union, self.occupied[color.index()]);
            union |= color_union;
        }
        debug_assert_eq!(union, self.all_occupied);
        debug_assert!((self.occupied[0] & self.occupied[1]).is_empty());
        debug_assert_eq!(self.pieces[0][Piece::King.index()].popcount(), 1);
        debug_assert_eq!(self.pieces[1][Piece::King.index()].popcount(), 1);

        let mut expected = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in Piece::ALL {
                for sq in self.pieces[color.index()][piece.index()] {
                    expected ^= zobrist::piece_key(piece, color, sq);
                }
            }
        }
        if !self.white_to_move {
            expected ^= zobrist::side_key();
        }
        expected ^= zobrist::castling_key(self.castling_rights.0);
        if let Some(ep) = self.en_passant {
            expected ^= zobrist::en_passant_key(ep.file());
        }
        debug_assert_eq!(expected, self.hash, "zobrist hash drifted from position");
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_assert_consistent(&self) {}
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

pub(crate) const _ALL_CASTLING_RIGHTS_USED: u8 = ALL_CASTLING_RIGHTS;
