//! Legal move generation (spec §4.C).
//!
//! Pin and check detection run once per call via [`CheckInfo`]; each
//! per-piece generator (in the sibling modules) then masks its pseudo-legal
//! destinations against it instead of doing a generate-then-filter pass.
//! This avoids the make/undo-per-move legality check the naive approach
//! needs and keeps `generate_moves` allocation-free (writes into a
//! caller-sized [`MoveList`]).

mod kings;
mod knights;
mod pawns;
mod sliders;

use crate::types::{Bitboard, Color, Move, MoveList, Piece, Square};

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::masks::{between, line_through};
use super::Board;

/// Which moves to generate: all legal moves, or only captures and queen
/// promotions (quiescence search, spec §4.G).
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum GenMode {
    All,
    CapturesAndQueenPromotions,
}

/// Pin/check state for the side to move, computed once per [`Board::generate_moves`] call.
pub(crate) struct CheckInfo {
    pub(crate) king_sq: Square,
    pub(crate) checkers: Bitboard,
    pub(crate) pinned: Bitboard,
    /// Squares a non-king move must land on: everywhere when not in check,
    /// `checker | squares-between-king-and-checker` under single check, and
    /// empty under double check (only king moves are legal then).
    pub(crate) check_mask: Bitboard,
}

impl CheckInfo {
    /// The ray a pinned piece on `sq` may move along; only valid to call
    /// when `self.pinned.contains(sq)`.
    pub(crate) fn pin_ray(&self, sq: Square) -> Bitboard {
        line_through(self.king_sq, sq)
    }

    pub(crate) fn in_double_check(&self) -> bool {
        self.checkers.popcount() >= 2
    }
}

fn aligned_diagonally(a: Square, b: Square) -> bool {
    let dr = (a.rank() as i32 - b.rank() as i32).abs();
    let df = (a.file() as i32 - b.file() as i32).abs();
    dr == df && dr != 0
}

fn aligned_orthogonally(a: Square, b: Square) -> bool {
    (a.rank() == b.rank()) != (a.file() == b.file())
}

impl Board {
    pub(crate) fn compute_check_info(&self, us: Color) -> CheckInfo {
        let them = us.opponent();
        let king_sq = self.king_square(us);
        let checkers = self.attackers_to(king_sq, them, self.all_occupied);

        let mut pinned = Bitboard::EMPTY;
        let diag_sliders = self.pieces[them.index()][Piece::Bishop.index()]
            | self.pieces[them.index()][Piece::Queen.index()];
        let ortho_sliders = self.pieces[them.index()][Piece::Rook.index()]
            | self.pieces[them.index()][Piece::Queen.index()];

        for sq in diag_sliders {
            if aligned_diagonally(king_sq, sq) {
                mark_pin(self, king_sq, sq, us, &mut pinned);
            }
        }
        for sq in ortho_sliders {
            if aligned_orthogonally(king_sq, sq) {
                mark_pin(self, king_sq, sq, us, &mut pinned);
            }
        }

        let check_mask = match checkers.popcount() {
            0 => Bitboard::ALL,
            1 => {
                let checker_sq = checkers.lsb().expect("one checker");
                checkers | between(king_sq, checker_sq)
            }
            _ => Bitboard::EMPTY,
        };

        CheckInfo { king_sq, checkers, pinned, check_mask }
    }

    /// All legal moves for the side to move.
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        self.generate(GenMode::All)
    }

    /// Captures and queen promotions only, for quiescence search.
    #[must_use]
    pub fn generate_captures(&self) -> MoveList {
        self.generate(GenMode::CapturesAndQueenPromotions)
    }

    fn generate(&self, mode: GenMode) -> MoveList {
        let us = self.side_to_move();
        let info = self.compute_check_info(us);
        let mut moves = MoveList::new();

        self.generate_king_moves(us, &info, mode, &mut moves);
        if !info.in_double_check() {
            self.generate_pawn_moves(us, &info, mode, &mut moves);
            self.generate_knight_moves(us, &info, mode, &mut moves);
            self.generate_slider_moves(us, Piece::Bishop, &info, mode, &mut moves);
            self.generate_slider_moves(us, Piece::Rook, &info, mode, &mut moves);
            self.generate_slider_moves(us, Piece::Queen, &info, mode, &mut moves);
        }
        moves
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.side_to_move()) && self.generate_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.side_to_move()) && self.generate_moves().is_empty()
    }

    /// Leaf-node count of the legal-move tree to `depth` (spec §8).
    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0u64;
        for &mv in &moves {
            let undo = self.make_move(mv);
            nodes += self.perft(depth - 1);
            self.unmake_move(mv, undo);
        }
        nodes
    }
}

fn mark_pin(board: &Board, king_sq: Square, slider_sq: Square, us: Color, pinned: &mut Bitboard) {
    let between_bb = between(king_sq, slider_sq);
    let blockers = between_bb & board.all_occupied;
    if blockers.popcount() == 1 && (blockers & board.occupancy(us)) == blockers {
        if let Some(sq) = blockers.lsb() {
            *pinned |= Bitboard::from_square(sq);
        }
    }
}

/// Attack set of a sliding piece, dispatched by kind (bishop/rook share the
/// hyperbola-quintessence tables; queen is their union).
pub(crate) fn slider_attack_set(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Bishop => Bitboard(bishop_attacks(sq.index(), occupied.0)),
        Piece::Rook => Bitboard(rook_attacks(sq.index(), occupied.0)),
        Piece::Queen => {
            Bitboard(bishop_attacks(sq.index(), occupied.0)) | Bitboard(rook_attacks(sq.index(), occupied.0))
        }
        _ => unreachable!("slider_attack_set called with a non-slider"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn start_position_has_twenty_moves() {
        let board = Board::new();
        assert_eq!(board.generate_moves().len(), 20);
    }

    #[test]
    fn perft_depth_three_matches_known_value() {
        let mut board = Board::new();
        assert_eq!(board.perft(3), 8_902);
    }

    #[test]
    fn double_check_only_yields_king_moves() {
        // White king on e1, black rook gives check along the e-file, black
        // knight also gives check from d3 -- only the king may move.
        let mut board =
            Board::from_fen("4k3/8/8/8/8/3n4/8/4K2r w - - 0 1").unwrap();
        let info = board.compute_check_info(Color::White);
        assert!(info.in_double_check());
        let moves = board.generate_moves();
        for &mv in &moves {
            assert_eq!(mv.from(), board.king_square(Color::White));
        }
        let _ = &mut board;
    }
}
