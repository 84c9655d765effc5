//! Interior-node negamax with PVS, pruning, and extensions (spec §4.G).
//!
//! Grounded on the teacher's `board::search::simple::{search_moves,
//! compute_lmr_reduction}` for the move loop and LMR formula, and
//! `simple::pruning::{try_null_move_pruning, try_reverse_futility_pruning,
//! try_probcut}` for the pre-move-loop pruning family.

use once_cell::sync::Lazy;
use std::sync::atomic::Ordering;

use crate::board::Board;
use crate::eval::evaluate;
use crate::ordering::{score_moves, OrderingContext};
use crate::see::see;
use crate::tt::Bound;
use crate::types::{Color, Move, Piece};

use super::quiescence::quiescence;
use super::{SearchState, MATE_SCORE, MATE_THRESHOLD};

const RAZOR_DEPTH: i32 = 3;
const NULL_MOVE_MIN_DEPTH: i32 = 2;
const RFP_MAX_DEPTH: i32 = 8;
const RFP_MARGIN_PER_PLY: i32 = 85;
const PROBCUT_MIN_DEPTH: i32 = 5;
const PROBCUT_MARGIN: i32 = 150;
const IID_MIN_DEPTH: i32 = 6;
const LMP_MAX_DEPTH: i32 = 8;
const FUTILITY_MAX_DEPTH: i32 = 6;
const FUTILITY_MARGIN_PER_PLY: i32 = 140;
const SINGULAR_MIN_DEPTH: i32 = 8;
const LMR_MIN_DEPTH: i32 = 3;
const LMR_FULL_MOVES: usize = 3;

fn razor_margin(depth: i32) -> i32 {
    200 + 180 * depth
}

fn late_move_count(depth: i32) -> usize {
    (4 + depth * depth) as usize
}

/// Reduction table indexed by `[depth][move_index]`, both clamped to 63.
/// Formula matches the teacher's `compute_lmr_reduction`: a logarithmic
/// curve in both depth and move index, rounded down and never negative.
static LMR_TABLE: Lazy<[[i32; 64]; 64]> = Lazy::new(|| {
    let mut table = [[0i32; 64]; 64];
    for (d, row) in table.iter_mut().enumerate() {
        for (i, cell) in row.iter_mut().enumerate() {
            if d < 1 || i < 1 {
                *cell = 0;
                continue;
            }
            let r = 0.53 + (d as f64).ln() * (i as f64).ln() / 2.44;
            *cell = r.max(0.0) as i32;
        }
    }
    table
});

fn lmr_reduction(depth: i32, move_index: usize, improving: bool, is_pv: bool) -> i32 {
    let d = (depth as usize).min(63);
    let i = move_index.min(63);
    let mut r = LMR_TABLE[d][i];
    if is_pv {
        r -= 1;
    }
    if !improving {
        r += 1;
    }
    r.max(0)
}

fn has_non_pawn_material(board: &Board, side: Color) -> bool {
    Piece::ALL.iter().any(|&p| {
        p != Piece::Pawn && p != Piece::King && !board.pieces_of(side, p).is_empty()
    })
}

/// Search `board` to `depth` from the given `alpha`/`beta` window, returning
/// a fail-soft score from the side-to-move's perspective.
pub(crate) fn negamax(
    board: &mut Board,
    state: &mut SearchState,
    depth: i32,
    mut alpha: i32,
    beta: i32,
    ply: i32,
    is_pv: bool,
    cut_node: bool,
) -> i32 {
    if depth <= 0 {
        return quiescence(board, state, alpha, beta, ply, 0);
    }

    state.nodes += 1;
    if ply > state.seldepth {
        state.seldepth = ply;
    }

    if ply > 0 && board.is_draw() {
        return 0;
    }
    if (ply as usize) >= state.eval_history.len() - 1 {
        return evaluate(board, state.pawn_cache);
    }

    let alpha_orig = alpha;
    let us = board.side_to_move();
    let in_check = board.is_in_check(us);

    let tt_hit = state.tt.probe(board.hash(), ply);
    let tt_move = tt_hit.map(|h| h.best_move).filter(|m| !m.is_null());
    if !is_pv {
        if let Some(hit) = tt_hit {
            if hit.depth as i32 >= depth {
                let usable = match hit.bound {
                    Bound::Exact => true,
                    Bound::Lower => hit.score >= beta,
                    Bound::Upper => hit.score <= alpha,
                };
                if usable {
                    return hit.score;
                }
            }
        }
    }

    let static_eval = if in_check { -MATE_SCORE + ply } else { evaluate(board, state.pawn_cache) };
    state.eval_history[ply as usize] = static_eval;
    let improving = !in_check && ply >= 2 && static_eval > state.eval_history[ply as usize - 2];

    if !is_pv && !in_check {
        if depth <= RAZOR_DEPTH && static_eval + razor_margin(depth) <= alpha {
            let score = quiescence(board, state, alpha, beta, ply, 0);
            if score <= alpha {
                return score;
            }
        }

        if depth <= RFP_MAX_DEPTH
            && beta.abs() < MATE_THRESHOLD
            && static_eval - RFP_MARGIN_PER_PLY * depth >= beta
        {
            return static_eval;
        }

        if depth >= NULL_MOVE_MIN_DEPTH
            && ply > 0
            && has_non_pawn_material(board, us)
            && static_eval >= beta
        {
            let r = 3 + depth / 6;
            let reduced = (depth - 1 - r).max(0);
            let undo = board.make_null();
            let score = -negamax(board, state, reduced, -beta, -beta + 1, ply + 1, false, !cut_node);
            board.unmake_null(undo);
            if state.stop.load(Ordering::Relaxed) {
                return alpha;
            }
            if score >= beta {
                return beta;
            }
        }

        if depth >= PROBCUT_MIN_DEPTH && beta.abs() < MATE_THRESHOLD {
            let pc_beta = beta + PROBCUT_MARGIN;
            let captures = board.generate_captures();
            for &mv in captures.as_slice() {
                if see(board, mv) < 0 {
                    continue;
                }
                let undo = board.make_move(mv);
                let score = -negamax(board, state, depth - 4, -pc_beta, -pc_beta + 1, ply + 1, false, true);
                board.unmake_move(mv, undo);
                if state.stop.load(Ordering::Relaxed) {
                    return alpha;
                }
                if score >= pc_beta {
                    return pc_beta;
                }
            }
        }
    }

    let mut tt_move = tt_move;
    if is_pv && depth >= IID_MIN_DEPTH && tt_move.is_none() {
        negamax(board, state, depth - 2, alpha, beta, ply, is_pv, cut_node);
        tt_move = state.tt.probe(board.hash(), ply).map(|h| h.best_move).filter(|m| !m.is_null());
    }

    let moves = board.generate_moves();
    if moves.is_empty() {
        return if in_check { -MATE_SCORE + ply } else { 0 };
    }

    let counter_move = if ply > 0 {
        let prev = state.previous_move[ply as usize - 1];
        let prev_piece = state.previous_piece[ply as usize - 1];
        (!prev.is_null()).then(|| prev_piece.map(|p| state.tables.counters.get(p, prev.to()))).flatten()
    } else {
        None
    };
    let followup_move = if ply > 1 {
        let gp = state.previous_move[ply as usize - 2];
        let gp_piece = state.previous_piece[ply as usize - 2];
        (!gp.is_null()).then(|| gp_piece.map(|p| state.tables.followups.get(p, gp.to()))).flatten()
    } else {
        None
    };
    let killers = state.tables.killers.get(ply as usize);

    let ctx = OrderingContext {
        tt_move,
        killers,
        counter_move,
        followup_move,
        history: &state.tables.history,
    };
    let mut scored = score_moves(board, moves.as_slice(), &ctx);

    let mut best_score = -MATE_SCORE - 1;
    let mut best_move = Move::null();
    let mut quiets_searched: Vec<(Piece, Move)> = Vec::new();
    let mut move_index = 0usize;
    let mut quiet_count = 0usize;

    for i in 0..scored.len() {
        let Some(candidate) = scored.pick_best(i) else { break };
        let mv = candidate.mv;
        let is_capture_or_promo = mv.is_capture() || mv.promotion_piece() == Some(Piece::Queen);
        let gives_check = {
            let undo = board.make_move(mv);
            let check = board.is_in_check(board.side_to_move());
            board.unmake_move(mv, undo);
            check
        };

        // Singular extension: the tt_move at sufficient depth, backed by a
        // lower-bound tt score, is extended one ply if every other move
        // fails to approach it under a reduced, margin-shifted search
        // (spec §4.G).
        let mut extension = 0;
        if gives_check && state.extension_budget > 0 {
            extension = 1;
        } else if Some(mv) == tt_move
            && depth >= SINGULAR_MIN_DEPTH
            && state.extension_budget > 0
            && matches!(tt_hit.map(|h| h.bound), Some(Bound::Lower))
            && tt_hit.map_or(false, |h| (h.depth as i32) >= depth - 3)
        {
            let tt_score = tt_hit.unwrap().score;
            let s_beta = tt_score - 2 * depth;
            let s_depth = (depth - 1) / 2;
            let mut all_fail_low = true;
            for j in 0..scored.len() {
                let other = scored.as_slice()[j].mv;
                if other == mv {
                    continue;
                }
                let undo = board.make_move(other);
                let score = -negamax(board, state, s_depth, -s_beta - 1, -s_beta, ply + 1, false, true);
                board.unmake_move(other, undo);
                if score >= s_beta {
                    all_fail_low = false;
                    break;
                }
            }
            if all_fail_low {
                extension = 1;
            }
        }
        if extension > 0 {
            state.extension_budget -= 1;
        }

        if !is_pv && !in_check && !gives_check && !is_capture_or_promo && best_score > -MATE_THRESHOLD {
            if depth <= LMP_MAX_DEPTH && quiet_count >= late_move_count(depth) {
                move_index += 1;
                quiet_count += 1;
                continue;
            }
            if depth <= FUTILITY_MAX_DEPTH && static_eval + FUTILITY_MARGIN_PER_PLY * depth <= alpha {
                move_index += 1;
                quiet_count += 1;
                continue;
            }
        }

        let piece = board.piece_at(mv.from()).map_or(Piece::Pawn, |(_, p)| p);
        let undo = board.make_move(mv);
        state.previous_move[ply as usize] = mv;
        state.previous_piece[ply as usize] = Some(piece);

        let new_depth = depth - 1 + extension;
        let mut score;

        if move_index == 0 {
            score = -negamax(board, state, new_depth, -beta, -alpha, ply + 1, is_pv, false);
        } else {
            let mut reduction = 0;
            if depth >= LMR_MIN_DEPTH
                && move_index >= LMR_FULL_MOVES
                && !is_capture_or_promo
                && !gives_check
                && mv != killers[0]
                && mv != killers[1]
            {
                reduction = lmr_reduction(depth, move_index, improving, is_pv);
                if cut_node {
                    reduction += 1;
                }
                reduction = reduction.min(new_depth - 1);
            }

            score = -negamax(board, state, new_depth - reduction, -alpha - 1, -alpha, ply + 1, false, !cut_node);
            if reduction > 0 && score > alpha {
                score = -negamax(board, state, new_depth, -alpha - 1, -alpha, ply + 1, false, !cut_node);
            }
            if is_pv && score > alpha && score < beta {
                score = -negamax(board, state, new_depth, -beta, -alpha, ply + 1, true, false);
            }
        }

        board.unmake_move(mv, undo);

        if state.stop.load(Ordering::Relaxed) {
            return if best_move.is_null() { alpha } else { best_score };
        }

        if !is_capture_or_promo {
            quiets_searched.push((piece, mv));
            quiet_count += 1;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if score > alpha {
                alpha = score;
                if alpha >= beta {
                    if !is_capture_or_promo {
                        state.tables.killers.update(ply as usize, mv);
                        state.tables.history.update(us, piece, mv, depth, &quiets_searched[..quiets_searched.len() - 1]);
                        if ply > 0 {
                            if let Some(prev_piece) = state.previous_piece[ply as usize - 1] {
                                let prev_to = state.previous_move[ply as usize - 1].to();
                                state.tables.counters.update(prev_piece, prev_to, mv);
                            }
                        }
                        if ply >= 2 {
                            if let Some(gp_piece) = state.previous_piece[ply as usize - 2] {
                                let gp_to = state.previous_move[ply as usize - 2].to();
                                state.tables.followups.update(gp_piece, gp_to, mv);
                            }
                        }
                    }
                    break;
                }
            }
        }

        move_index += 1;
    }

    let bound = if best_score <= alpha_orig {
        Bound::Upper
    } else if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    state.tt.store(board.hash(), best_move, depth as i16, best_score, bound, ply, is_pv);

    best_score
}
