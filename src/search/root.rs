//! Root search: aspiration windows around the previous iteration's score,
//! widened asymmetrically on fail-high/fail-low (spec §4.G "Top-level
//! iterative deepening").
//!
//! Grounded on the teacher's `iterative_deepening_multipv` aspiration-window
//! loop (beta widened ×1.5 on fail-high, alpha widened ×2 on fail-low,
//! falling back to the full window once the margin exceeds a threshold).

use std::sync::atomic::Ordering;

use crate::board::Board;
use crate::tt::Bound;
use crate::types::{Move, Piece};

use super::negamax::negamax;
use super::{SearchState, INFINITY};

pub(crate) struct IterationResult {
    pub(crate) best_move: Move,
    pub(crate) score: i32,
}

const INITIAL_WINDOW: i32 = 20;
const WINDOW_GIVEUP: i32 = 800;

/// Search the root position to `depth`, re-searching with a widened window
/// whenever the result falls outside the current aspiration bounds.
/// `root_order` is re-sorted by the caller between iterations (best move
/// first); this function leaves it untouched.
pub(crate) fn search_depth(
    board: &mut Board,
    state: &mut SearchState,
    depth: i32,
    root_order: &mut [Move],
    prev_score: Option<i32>,
) -> Option<IterationResult> {
    let (mut alpha, mut beta) = match prev_score {
        Some(s) if depth >= 4 => ((s - INITIAL_WINDOW).max(-INFINITY), (s + INITIAL_WINDOW).min(INFINITY)),
        _ => (-INFINITY, INFINITY),
    };
    let mut delta = INITIAL_WINDOW;

    loop {
        let result = search_root_window(board, state, depth, root_order, alpha, beta);
        let Some((best_move, score)) = result else {
            return None;
        };

        if score <= alpha && alpha > -INFINITY {
            beta = (alpha + beta) / 2;
            alpha = (score - delta).max(-INFINITY);
            delta += delta / 2;
        } else if score >= beta && beta < INFINITY {
            beta = (score + delta).min(INFINITY);
            delta += delta / 2;
        } else {
            state.tt.store(board.hash(), best_move, depth as i16, score, Bound::Exact, 0, true);
            return Some(IterationResult { best_move, score });
        }

        if delta > WINDOW_GIVEUP {
            alpha = -INFINITY;
            beta = INFINITY;
        }
    }
}

fn search_root_window(
    board: &mut Board,
    state: &mut SearchState,
    depth: i32,
    root_order: &[Move],
    mut alpha: i32,
    beta: i32,
) -> Option<(Move, i32)> {
    state.extension_budget = (depth * 2).max(16);

    let mut best_move = Move::null();
    let mut best_score = -INFINITY;

    for (idx, &mv) in root_order.iter().enumerate() {
        let piece = board.piece_at(mv.from()).map_or(Piece::Pawn, |(_, p)| p);
        let undo = board.make_move(mv);
        state.previous_move[0] = mv;
        state.previous_piece[0] = Some(piece);

        let score = if idx == 0 {
            -negamax(board, state, depth - 1, -beta, -alpha, 1, true, false)
        } else {
            let mut s = -negamax(board, state, depth - 1, -alpha - 1, -alpha, 1, false, true);
            if s > alpha && s < beta {
                s = -negamax(board, state, depth - 1, -beta, -alpha, 1, true, false);
            }
            s
        };

        board.unmake_move(mv, undo);

        if state.stop.load(Ordering::Relaxed) {
            return if best_move.is_null() { None } else { Some((best_move, best_score)) };
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break;
        }
    }

    if best_move.is_null() {
        None
    } else {
        Some((best_move, best_score))
    }
}
