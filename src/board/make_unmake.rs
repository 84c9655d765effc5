//! Incremental make/undo of moves (spec §4.B).
//!
//! `make_move` mutates piece placement, castling rights, en-passant target,
//! halfmove clock, side to move, and the Zobrist hash in place, and returns
//! an [`UndoInfo`] sufficient for `unmake_move` to restore the position
//! byte-for-byte and hash-for-hash (spec §3's "make/undo correctness
//! invariant").

use crate::types::{castle_bit, CastlingRights, Color, Move, Piece, Square};
use crate::zobrist;

use super::Board;

/// Everything `unmake_move` needs that cannot be recovered by inspecting the
/// post-move position: the undo record of spec §3.
#[derive(Clone, Copy, Debug)]
pub struct UndoInfo {
    prior_hash: u64,
    prior_castling: CastlingRights,
    prior_en_passant: Option<Square>,
    prior_halfmove_clock: u32,
    captured: Option<Piece>,
    moved_piece: Piece,
}

/// Undo record for `make_null`/`unmake_null` (spec §4.B): only the
/// en-passant square can change, and the halfmove clock is left untouched.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NullUndo {
    prior_en_passant: Option<Square>,
}

fn castle_rook_squares(color: Color, kingside: bool) -> (Square, Square) {
    let rank = if color.is_white() { 0 } else { 7 };
    if kingside {
        (Square::new(rank, 7), Square::new(rank, 5))
    } else {
        (Square::new(rank, 0), Square::new(rank, 3))
    }
}

impl Board {
    /// Mutate the position by playing `mv`, which must be pseudo-legal for
    /// the side to move. Returns the undo record to pass to `unmake_move`.
    pub fn make_move(&mut self, mv: Move) -> UndoInfo {
        let us = self.side_to_move();
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        let prior_hash = self.hash;
        let prior_castling = self.castling_rights;
        let prior_en_passant = self.en_passant;
        let prior_halfmove_clock = self.halfmove_clock;

        let moved_piece = self
            .piece_at(from)
            .map(|(_, p)| p)
            .expect("make_move: no piece on from-square");

        if let Some(ep) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = None;

        let captured = if mv.is_en_passant() {
            let captured_sq = Square::new(from.rank(), to.file());
            self.remove_piece(captured_sq, them, Piece::Pawn);
            Some(Piece::Pawn)
        } else if mv.is_castling() {
            None
        } else {
            self.piece_at(to).map(|(_, p)| p)
        };
        if let Some(cap) = captured {
            if !mv.is_en_passant() {
                self.remove_piece(to, them, cap);
            }
        }

        self.remove_piece(from, us, moved_piece);
        if let Some(promo) = mv.promotion_piece() {
            self.set_piece(to, us, promo);
        } else {
            self.set_piece(to, us, moved_piece);
        }

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(us, mv.is_castle_kingside());
            self.remove_piece(rook_from, us, Piece::Rook);
            self.set_piece(rook_to, us, Piece::Rook);
        }

        if mv.is_double_pawn_push() {
            let ep_sq = Square::new((from.rank() + to.rank()) / 2, from.file());
            self.en_passant = Some(ep_sq);
            self.hash ^= zobrist::en_passant_key(ep_sq.file());
        }

        self.update_castling_rights_for_move(us, moved_piece, from, to, captured);

        if moved_piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if !us.is_white() {
            self.fullmove_number += 1;
        }

        self.hash ^= zobrist::side_key();
        self.white_to_move = !self.white_to_move;

        let irreversible =
            moved_piece == Piece::Pawn || captured.is_some() || mv.is_castling() || mv.is_promotion();
        self.push_history(irreversible);

        self.debug_assert_consistent();

        UndoInfo {
            prior_hash,
            prior_castling,
            prior_en_passant,
            prior_halfmove_clock,
            captured,
            moved_piece,
        }
    }

    /// Restore the position to exactly the state before the corresponding
    /// `make_move(mv)` call.
    pub fn unmake_move(&mut self, mv: Move, undo: UndoInfo) {
        self.pop_history();

        self.white_to_move = !self.white_to_move;
        let us = self.side_to_move();
        let them = us.opponent();
        let from = mv.from();
        let to = mv.to();

        if !us.is_white() {
            self.fullmove_number -= 1;
        }

        if mv.is_castling() {
            let (rook_from, rook_to) = castle_rook_squares(us, mv.is_castle_kingside());
            self.pieces[us.index()][Piece::Rook.index()] =
                self.pieces[us.index()][Piece::Rook.index()].clear(rook_to).set(rook_from);
            self.occupied[us.index()] = self.occupied[us.index()].clear(rook_to).set(rook_from);
        }

        let placed_piece = mv.promotion_piece().unwrap_or(undo.moved_piece);
        self.pieces[us.index()][placed_piece.index()] =
            self.pieces[us.index()][placed_piece.index()].clear(to);
        self.occupied[us.index()] = self.occupied[us.index()].clear(to);
        self.pieces[us.index()][undo.moved_piece.index()] =
            self.pieces[us.index()][undo.moved_piece.index()].set(from);
        self.occupied[us.index()] = self.occupied[us.index()].set(from);

        if let Some(cap) = undo.captured {
            let captured_sq = if mv.is_en_passant() {
                Square::new(from.rank(), to.file())
            } else {
                to
            };
            self.pieces[them.index()][cap.index()] = self.pieces[them.index()][cap.index()].set(captured_sq);
            self.occupied[them.index()] = self.occupied[them.index()].set(captured_sq);
        }

        self.all_occupied = self.occupied[0] | self.occupied[1];

        self.castling_rights = undo.prior_castling;
        self.en_passant = undo.prior_en_passant;
        self.halfmove_clock = undo.prior_halfmove_clock;
        self.hash = undo.prior_hash;

        self.debug_assert_consistent();
    }

    /// Switch side to move and clear en-passant, for null-move pruning
    /// (spec §4.G). The halfmove clock is left unchanged per spec §4.B.
    pub(crate) fn make_null(&mut self) -> NullUndo {
        let prior_en_passant = self.en_passant;
        if let Some(ep) = prior_en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = None;
        self.hash ^= zobrist::side_key();
        self.white_to_move = !self.white_to_move;
        self.push_history(true);
        NullUndo { prior_en_passant }
    }

    pub(crate) fn unmake_null(&mut self, undo: NullUndo) {
        self.pop_history();
        self.white_to_move = !self.white_to_move;
        self.hash ^= zobrist::side_key();
        if let Some(ep) = undo.prior_en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = undo.prior_en_passant;
    }

    /// Update castling rights when a king or rook moves from its original
    /// square, or when a rook is captured on its original square.
    fn update_castling_rights_for_move(
        &mut self,
        us: Color,
        moved_piece: Piece,
        from: Square,
        to: Square,
        captured: Option<Piece>,
    ) {
        let home_rank = if us.is_white() { 0 } else { 7 };
        if moved_piece == Piece::King {
            self.clear_castling_right(castle_bit(us, true));
            self.clear_castling_right(castle_bit(us, false));
        } else if moved_piece == Piece::Rook && from.rank() == home_rank {
            if from.file() == 7 {
                self.clear_castling_right(castle_bit(us, true));
            } else if from.file() == 0 {
                self.clear_castling_right(castle_bit(us, false));
            }
        }
        if captured == Some(Piece::Rook) {
            let them = us.opponent();
            let their_home_rank = if them.is_white() { 0 } else { 7 };
            if to.rank() == their_home_rank {
                if to.file() == 7 {
                    self.clear_castling_right(castle_bit(them, true));
                } else if to.file() == 0 {
                    self.clear_castling_right(castle_bit(them, false));
                }
            }
        }
    }
}


/// Property tests for spec §8's make/undo-hash and FEN round-trip
/// invariants, driven by random walks through the legal-move tree rather
/// than fixed positions (grounded on the teacher's `perft`-style legality
/// checks, extended here to also assert reversibility).
#[cfg(test)]
mod proptests {
    use super::*;
    use crate::board::Board;
    use proptest::prelude::*;

    /// Play `choices.len()` legal moves from the starting position, picking
    /// each one by `choices[i] % legal_move_count`, asserting after every
    /// single move that undoing it restores the exact hash and FEN of the
    /// position before the move.
    fn walk_and_check_single_move_roundtrip(choices: &[u8]) -> Result<(), TestCaseError> {
        let mut board = Board::new();
        for &choice in choices {
            let legal = board.generate_moves();
            if legal.is_empty() {
                break;
            }
            let mv = legal.as_slice()[choice as usize % legal.len()];
            let before_hash = board.hash();
            let before_fen = board.to_fen();
            let undo = board.make_move(mv);
            board.unmake_move(mv, undo);
            prop_assert_eq!(board.hash(), before_hash);
            prop_assert_eq!(board.to_fen(), before_fen);
            board.make_move(mv);
        }
        Ok(())
    }

    /// Same walk, but checks that the hash recomputed from scratch after
    /// each *played* move (not undone) agrees with the incrementally
    /// updated one, catching any Zobrist-update drift over a longer game.
    fn walk_and_check_incremental_hash(choices: &[u8]) -> Result<(), TestCaseError> {
        let mut board = Board::new();
        for &choice in choices {
            let legal = board.generate_moves();
            if legal.is_empty() {
                break;
            }
            let mv = legal.as_slice()[choice as usize % legal.len()];
            board.make_move(mv);
            let incremental = board.hash();
            let recomputed = Board::from_fen(&board.to_fen()).unwrap().hash();
            prop_assert_eq!(incremental, recomputed);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn make_then_unmake_restores_hash_and_fen(choices in prop::collection::vec(any::<u8>(), 1..40)) {
            walk_and_check_single_move_roundtrip(&choices)?;
        }

        #[test]
        fn incremental_hash_matches_hash_recomputed_from_fen(choices in prop::collection::vec(any::<u8>(), 1..40)) {
            walk_and_check_incremental_hash(&choices)?;
        }

        #[test]
        fn fen_round_trips_after_random_play(choices in prop::collection::vec(any::<u8>(), 1..40)) {
            let mut board = Board::new();
            for choice in choices {
                let legal = board.generate_moves();
                if legal.is_empty() {
                    break;
                }
                let mv = legal.as_slice()[choice as usize % legal.len()];
                board.make_move(mv);
            }
            let fen = board.to_fen();
            let reparsed = Board::from_fen(&fen).unwrap();
            prop_assert_eq!(reparsed.to_fen(), fen);
            prop_assert_eq!(reparsed.hash(), board.hash());
        }
    }
}
