//! Quiescence search: the capture-only leaf extension (spec §4.G).
//!
//! Grounded on the teacher's `board::search::simple::quiescence::quiesce`:
//! stand-pat with fail-soft bounds, tactical-only move generation, MVV-LVA
//! ordering via [`score_moves`] restricted to captures/promotions, delta
//! pruning, and SEE pruning that tightens with depth.

use crate::board::Board;
use crate::eval::evaluate_simple;
use crate::ordering::{score_moves, OrderingContext};
use crate::see::{piece_value, see};
use crate::types::Piece;

use super::{SearchState, MATE_SCORE};

/// Stand-pat deltas below this value don't need a capture-by-capture
/// check; used to seed the delta-pruning margin (spec §4.G "delta-prune").
const DELTA_MARGIN: i32 = 200;

/// Beyond this many plies into quiescence, give up and return the static
/// eval rather than risk unbounded recursion in positions with long forced
/// capture sequences.
const MAX_QDEPTH: i32 = 16;

pub(crate) fn quiescence(board: &mut Board, state: &mut SearchState, mut alpha: i32, beta: i32, ply: i32, qdepth: i32) -> i32 {
    state.nodes += 1;
    if ply > state.seldepth {
        state.seldepth = ply;
    }

    if board.is_draw() {
        return 0;
    }

    let in_check = board.is_in_check(board.side_to_move());
    let stand_pat = if in_check { -MATE_SCORE + ply } else { evaluate_simple(board) };

    if !in_check {
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if qdepth >= MAX_QDEPTH {
            return stand_pat;
        }
    }

    let moves = if in_check { board.generate_moves() } else { board.generate_captures() };
    if moves.is_empty() {
        return if in_check { -MATE_SCORE + ply } else { stand_pat };
    }

    let ctx = OrderingContext {
        tt_move: None,
        killers: [crate::types::Move::null(); 2],
        counter_move: None,
        followup_move: None,
        history: &state.tables.history,
    };
    let mut scored = score_moves(board, moves.as_slice(), &ctx);

    let mut best = if in_check { -MATE_SCORE + ply } else { stand_pat };
    let mut searched_any = false;

    for i in 0..scored.len() {
        let Some(candidate) = scored.pick_best(i) else { break };
        let mv = candidate.mv;

        if !in_check {
            // Delta pruning: even winning the captured piece outright
            // (plus a safety margin) can't reach alpha.
            let captured_value = if mv.is_en_passant() {
                piece_value(Piece::Pawn)
            } else {
                board.piece_at(mv.to()).map_or(0, |(_, p)| piece_value(p))
            };
            let promo_gain = mv.promotion_piece().map_or(0, |p| piece_value(p) - piece_value(Piece::Pawn));
            if stand_pat + captured_value + promo_gain + DELTA_MARGIN < alpha {
                continue;
            }
            if mv.is_capture() && see(board, mv) < 0 {
                continue;
            }
        }

        searched_any = true;
        let undo = board.make_move(mv);
        let score = -quiescence(board, state, -beta, -alpha, ply + 1, qdepth + 1);
        board.unmake_move(mv, undo);

        if state.stop.load(std::sync::atomic::Ordering::Relaxed) {
            return best;
        }

        if score > best {
            best = score;
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }
    }

    if in_check && !searched_any {
        return -MATE_SCORE + ply;
    }

    best
}
