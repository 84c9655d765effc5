//! Static position evaluation (spec §4.D).
//!
//! Grounded on the teacher's `board::eval` orchestrator: accumulate
//! middlegame/endgame scores from each term, taper by game phase, add a
//! tempo bonus, and return the score from the side-to-move's perspective.
//! The teacher's ~20 separate `eval_terms::*` files are consolidated here
//! into one module per spec contribution: [`material`], [`pawns`],
//! [`mobility`], [`king_safety`], [`threats`].

mod context;
mod king_safety;
mod material;
mod mobility;
mod pawns;
mod threats;

pub use pawns::PawnHashTable;

use crate::board::Board;
use crate::types::Color;
use context::AttackContext;

/// Side-to-move bonus (spec §4.D.7).
const TEMPO_BONUS: i32 = 19;

/// Evaluate `board` from the side-to-move's perspective, in centipawns.
/// `pawn_cache` is the caller-owned pawn-hash table (spec's pawn-cache
/// contract); reused across calls within a search.
#[must_use]
pub fn evaluate(board: &Board, pawn_cache: &mut PawnHashTable) -> i32 {
    let ctx = AttackContext::compute(board);

    let (white_mat_mg, white_mat_eg) = material::material_and_pst(board, Color::White);
    let (black_mat_mg, black_mat_eg) = material::material_and_pst(board, Color::Black);
    let mut mg = white_mat_mg - black_mat_mg;
    let mut eg = white_mat_eg - black_mat_eg;

    let (pawn_mg, pawn_eg) = pawn_cache.probe_or_compute(board);
    mg += pawn_mg;
    eg += pawn_eg;

    let (mob_mg, mob_eg) = mobility::evaluate(board, &ctx);
    mg += mob_mg;
    eg += mob_eg;

    let (ks_mg, ks_eg) = king_safety::evaluate(board, &ctx);
    mg += ks_mg;
    eg += ks_eg;
    let (shield_mg, shield_eg) = king_safety::evaluate_shield(board);
    mg += shield_mg;
    eg += shield_eg;

    let threats = threats::evaluate(board, &ctx);
    mg += threats;
    eg += threats;

    let phase = board.game_phase();
    let mut score = (mg * (256 - phase) + eg * phase) / 256;
    score += TEMPO_BONUS;

    if board.side_to_move() == Color::White {
        score
    } else {
        -score
    }
}

/// Fast evaluation for quiescence/pruning: material + PST only, no mobility,
/// king safety, or threats terms. Grounded on the teacher's
/// `evaluate_simple`.
#[must_use]
pub fn evaluate_simple(board: &Board) -> i32 {
    let (white_mg, white_eg) = material::material_and_pst(board, Color::White);
    let (black_mg, black_eg) = material::material_and_pst(board, Color::Black);
    let mg = white_mg - black_mg;
    let eg = white_eg - black_eg;

    let phase = board.game_phase();
    let score = (mg * (256 - phase) + eg * phase) / 256 + TEMPO_BONUS;

    if board.side_to_move() == Color::White {
        score
    } else {
        -score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_near_zero_plus_tempo() {
        let board = Board::new();
        let mut cache = PawnHashTable::new(1024);
        let score = evaluate(&board, &mut cache);
        assert_eq!(score, TEMPO_BONUS);
    }

    #[test]
    fn material_advantage_is_rewarded() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut cache = PawnHashTable::new(1024);
        let score = evaluate(&board, &mut cache);
        assert!(score > 400);
    }

    #[test]
    fn evaluate_simple_agrees_in_sign_with_full_evaluate() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let mut cache = PawnHashTable::new(1024);
        let full = evaluate(&board, &mut cache);
        let simple = evaluate_simple(&board);
        assert!(full > 0);
        assert!(simple > 0);
    }
}
