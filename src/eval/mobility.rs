//! Mobility and minor-piece outpost evaluation (spec §4.D.4).
//!
//! Grounded on the teacher's `eval_terms::mobility` term: count safe
//! destination squares per non-pawn piece and look the count up in a
//! per-piece tapered bonus table.

use crate::board::attack_tables::{bishop_attacks, queen_attacks, rook_attacks, knight_attacks};
use crate::board::Board;
use crate::eval::context::AttackContext;
use crate::types::{Bitboard, Color, Piece};

const KNIGHT_MOB_MG: [i32; 9] = [-28, -14, -2, 4, 8, 12, 17, 21, 25];
const KNIGHT_MOB_EG: [i32; 9] = [-28, -18, -8, 0, 6, 10, 14, 18, 22];
const BISHOP_MOB_MG: [i32; 14] = [-30, -18, -8, 0, 6, 12, 17, 21, 24, 27, 29, 31, 33, 35];
const BISHOP_MOB_EG: [i32; 14] = [-30, -18, -8, 0, 6, 10, 14, 17, 20, 22, 24, 26, 28, 30];
const ROOK_MOB_MG: [i32; 15] = [-14, -8, -3, 0, 3, 6, 9, 12, 14, 16, 18, 20, 21, 22, 23];
const ROOK_MOB_EG: [i32; 15] = [-28, -16, -8, 0, 6, 12, 17, 21, 25, 28, 31, 34, 36, 38, 40];
const QUEEN_MOB_MG: [i32; 28] = [
    -14, -10, -6, -3, 0, 2, 4, 6, 8, 10, 11, 12, 13, 14, 15, 16, 16, 17, 17, 18, 18, 19, 19, 20, 20, 20, 21, 21,
];
const QUEEN_MOB_EG: [i32; 28] = [
    -28, -18, -10, -4, 0, 4, 8, 11, 14, 17, 19, 21, 23, 25, 26, 27, 28, 29, 30, 31, 32, 32, 33, 33, 34, 34, 35, 35,
];

const KNIGHT_OUTPOST_MG: i32 = 20;
const KNIGHT_OUTPOST_EG: i32 = 15;
const BISHOP_OUTPOST_MG: i32 = 10;
const BISHOP_OUTPOST_EG: i32 = 8;

/// True if `color`'s half of the board (the enemy half, from the attacking
/// outpost's point of view) contains `rank`.
fn in_enemy_half(rank: usize, color: Color) -> bool {
    if color.is_white() {
        rank >= 4
    } else {
        rank <= 3
    }
}

#[must_use]
pub(crate) fn evaluate(board: &Board, ctx: &AttackContext) -> (i32, i32) {
    let mut mg = 0;
    let mut eg = 0;
    let occ = board.all_occupancy().0;

    for color in [Color::White, Color::Black] {
        let sign = if color.is_white() { 1 } else { -1 };
        let own = board.occupancy(color);
        let enemy_pawn_attacks = ctx.pawn_attacks(color.opponent());
        let own_pawn_attacks = ctx.pawn_attacks(color);
        let enemy_pawns = board.pieces_of(color.opponent(), Piece::Pawn);

        for sq in board.pieces_of(color, Piece::Knight) {
            let moves = Bitboard(knight_attacks(sq.index()));
            let safe = moves & !enemy_pawn_attacks & !own;
            let count = (safe.popcount() as usize).min(8);
            mg += sign * KNIGHT_MOB_MG[count];
            eg += sign * KNIGHT_MOB_EG[count];

            if in_enemy_half(sq.rank(), color)
                && own_pawn_attacks.contains(sq)
                && (Bitboard(knight_attacks(sq.index())) & enemy_pawns).is_empty()
                && !pawn_can_attack(sq, color, enemy_pawns)
            {
                mg += sign * KNIGHT_OUTPOST_MG;
                eg += sign * KNIGHT_OUTPOST_EG;
            }
        }

        for sq in board.pieces_of(color, Piece::Bishop) {
            let moves = Bitboard(bishop_attacks(sq.index(), occ));
            let safe = moves & !enemy_pawn_attacks & !own;
            let count = (safe.popcount() as usize).min(13);
            mg += sign * BISHOP_MOB_MG[count];
            eg += sign * BISHOP_MOB_EG[count];

            if in_enemy_half(sq.rank(), color) && own_pawn_attacks.contains(sq) && !pawn_can_attack(sq, color, enemy_pawns) {
                mg += sign * BISHOP_OUTPOST_MG;
                eg += sign * BISHOP_OUTPOST_EG;
            }
        }

        for sq in board.pieces_of(color, Piece::Rook) {
            let moves = Bitboard(rook_attacks(sq.index(), occ));
            let safe = moves & !own;
            let count = (safe.popcount() as usize).min(14);
            mg += sign * ROOK_MOB_MG[count];
            eg += sign * ROOK_MOB_EG[count];
        }

        for sq in board.pieces_of(color, Piece::Queen) {
            let moves = Bitboard(queen_attacks(sq.index(), occ));
            let safe = moves & !enemy_pawn_attacks & !own;
            let count = (safe.popcount() as usize).min(27);
            mg += sign * QUEEN_MOB_MG[count];
            eg += sign * QUEEN_MOB_EG[count];
        }
    }

    (mg, eg)
}

/// True if any enemy pawn could ever capture onto `sq` (now or after
/// advancing on an adjacent file) -- the "can't be attacked by an enemy
/// pawn" half of the outpost condition.
fn pawn_can_attack(sq: crate::types::Square, color: Color, enemy_pawns: Bitboard) -> bool {
    let file = sq.file();
    let rank = sq.rank();
    let adjacent_files = [file.checked_sub(1), (file < 7).then_some(file + 1)];
    for adj in adjacent_files.into_iter().flatten() {
        let file_bb = 0x0101_0101_0101_0101u64 << adj;
        let behind = if color.is_white() {
            file_bb & !(!0u64 << (rank * 8))
        } else {
            file_bb & (!0u64 << ((rank + 1) * 8))
        };
        if behind & enemy_pawns.0 != 0 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::context::AttackContext;

    #[test]
    fn starting_position_mobility_is_symmetric() {
        let board = Board::new();
        let ctx = AttackContext::compute(&board);
        let (mg, eg) = evaluate(&board, &ctx);
        assert_eq!(mg, 0);
        assert_eq!(eg, 0);
    }

    #[test]
    fn centralized_knight_has_more_mobility_than_cornered() {
        let center = Board::from_fen("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let corner = Board::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        let center_ctx = AttackContext::compute(&center);
        let corner_ctx = AttackContext::compute(&corner);
        let (center_mg, _) = evaluate(&center, &center_ctx);
        let (corner_mg, _) = evaluate(&corner, &corner_ctx);
        assert!(center_mg > corner_mg);
    }

    #[test]
    fn protected_knight_on_enemy_outpost_square_is_rewarded() {
        let board = Board::from_fen("4k3/8/8/3N4/2P5/8/8/4K3 w - - 0 1").unwrap();
        let ctx = AttackContext::compute(&board);
        let (mg, _) = evaluate(&board, &ctx);
        assert!(mg > 0);
    }
}
