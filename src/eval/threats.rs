//! Hanging pieces and minor-piece mutual attacks (spec §4.D.6).
//!
//! Grounded on the teacher's `eval_terms::hanging` term: a piece attacked
//! and undefended, or attacked by an enemy pawn at all, is penalized by a
//! fixed per-piece-type amount; a bishop and knight eyeing each other adds a
//! small symmetric bonus for the attacker.

use crate::board::Board;
use crate::eval::context::AttackContext;
use crate::types::{Bitboard, Color, Piece};

const HANGING_PENALTY: [i32; 6] = [10, 40, 40, 60, 80, 0];
const MINOR_ON_MINOR: i32 = 8;

#[must_use]
pub(crate) fn evaluate(board: &Board, ctx: &AttackContext) -> i32 {
    let mut score = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color.is_white() { 1 } else { -1 };
        let our_attacks = ctx.attacks(color);
        let their_attacks = ctx.attacks(color.opponent());
        let their_pawn_attacks = ctx.pawn_attacks(color.opponent());

        for piece in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            for sq in board.pieces_of(color, piece) {
                let attacked_undefended = their_attacks.contains(sq) && !our_attacks.contains(sq);
                let attacked_by_pawn = their_pawn_attacks.contains(sq);
                if attacked_undefended || attacked_by_pawn {
                    score -= sign * HANGING_PENALTY[piece.index()];
                }
            }
        }
    }

    let white_knights = board.pieces_of(Color::White, Piece::Knight);
    let white_bishops = board.pieces_of(Color::White, Piece::Bishop);
    let black_knights = board.pieces_of(Color::Black, Piece::Knight);
    let black_bishops = board.pieces_of(Color::Black, Piece::Bishop);
    let occ = board.all_occupancy().0;

    for sq in white_bishops {
        if !(Bitboard(crate::board::attack_tables::bishop_attacks(sq.index(), occ)) & black_knights).is_empty() {
            score += MINOR_ON_MINOR;
        }
    }
    for sq in white_knights {
        if !(Bitboard(crate::board::attack_tables::knight_attacks(sq.index())) & black_bishops).is_empty() {
            score += MINOR_ON_MINOR;
        }
    }
    for sq in black_bishops {
        if !(Bitboard(crate::board::attack_tables::bishop_attacks(sq.index(), occ)) & white_knights).is_empty() {
            score -= MINOR_ON_MINOR;
        }
    }
    for sq in black_knights {
        if !(Bitboard(crate::board::attack_tables::knight_attacks(sq.index())) & white_bishops).is_empty() {
            score -= MINOR_ON_MINOR;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_no_threats() {
        let board = Board::new();
        let ctx = AttackContext::compute(&board);
        assert_eq!(evaluate(&board, &ctx), 0);
    }

    #[test]
    fn undefended_attacked_knight_is_penalized() {
        let board = Board::from_fen("4k3/8/8/3n4/8/1B6/8/4K3 w - - 0 1").unwrap();
        let ctx = AttackContext::compute(&board);
        assert!(evaluate(&board, &ctx) > 0);
    }
}
