//! Iterative-deepening alpha-beta search (spec §4.G).
//!
//! Grounded on the teacher's `search.rs` driver (`iterative_deepening_with_sink`,
//! `time_limited_search_with_sink`, progressive aspiration windows,
//! `run_root_search`) and the more elaborate (if unwired) `src/search/*`
//! split for pruning/extension/LMR formulas, consolidated here into three
//! files: this driver, [`negamax`] for interior nodes, and [`quiescence`]
//! for the capture-only leaf search.

mod negamax;
mod quiescence;
mod root;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::board::Board;
use crate::eval::PawnHashTable;
use crate::ordering::{CounterMoveTable, FollowupMoveTable, HistoryTable, KillerTable};
use crate::tt::TranspositionTable;
use crate::types::{Move, MAX_PLY};

/// Mate scores are encoded as `MATE_SCORE - ply`; anything at or above
/// `MATE_SCORE - MAX_PLY` is treated as a forced mate for aspiration and
/// UCI `score mate` reporting.
pub(crate) const MATE_SCORE: i32 = 30_000;
pub(crate) const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;
const INFINITY: i32 = MATE_SCORE * 2;

/// Per-game persistent move-ordering state (spec §4.F): survives across
/// searches within a game, aged rather than cleared between `go` commands
/// (the teacher's `OrderingContext` plays the same role).
#[derive(Default)]
pub struct OrderingTables {
    pub history: HistoryTable,
    pub killers: KillerTable,
    pub counters: CounterMoveTable,
    pub followups: FollowupMoveTable,
}

impl OrderingTables {
    #[must_use]
    pub fn new() -> Self {
        OrderingTables::default()
    }

    pub fn new_game(&mut self) {
        self.history.clear();
        self.killers.clear();
        self.counters.clear();
        self.followups.clear();
    }

    /// Age history and drop killers/counters between searches within the
    /// same game (spec §4.F note: history persists, scaled down, rather
    /// than a hard clear).
    pub fn new_search(&mut self) {
        self.history.age();
        self.killers.clear();
    }
}

/// Inputs the time manager hands the search: when to stop looking deeper.
/// A depth/node cap is absolute; `soft_deadline`/`hard_deadline` bound wall
/// clock (spec §4.H hands these down already resolved).
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub max_depth: i32,
    pub soft_deadline: Option<Instant>,
    pub hard_deadline: Option<Instant>,
    pub node_limit: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits { max_depth: 64, soft_deadline: None, hard_deadline: None, node_limit: None }
    }
}

/// One iteration's worth of reportable state, handed to the caller's
/// `info` sink (spec §4.I `info` lines).
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub depth: i32,
    pub seldepth: i32,
    pub score_cp: Option<i32>,
    pub score_mate: Option<i32>,
    pub nodes: u64,
    pub elapsed: std::time::Duration,
    pub pv: Vec<Move>,
    pub hashfull: u32,
}

pub struct SearchResult {
    pub best_move: Option<Move>,
    pub ponder_move: Option<Move>,
    pub score: i32,
    pub depth: i32,
    pub nodes: u64,
}

/// Shared mutable search state threaded through every node (spec §4.G).
pub(crate) struct SearchState<'a> {
    pub(crate) tt: &'a mut TranspositionTable,
    pub(crate) pawn_cache: &'a mut PawnHashTable,
    pub(crate) tables: &'a mut OrderingTables,
    pub(crate) stop: &'a AtomicBool,
    pub(crate) nodes: u64,
    pub(crate) seldepth: i32,
    pub(crate) node_limit: Option<u64>,
    pub(crate) hard_deadline: Option<Instant>,
    pub(crate) extension_budget: i32,
    /// Static eval recorded at each ply, to test "improving" (spec §4.G
    /// LMR formula input) against the same side's eval two plies back.
    pub(crate) eval_history: Vec<i32>,
    /// The move made to reach ply `i + 1`, with the piece that made it --
    /// threaded down the recursion so a child node can look up counter-move
    /// and follow-up-move table entries (spec §4.F) without a parent
    /// pointer.
    pub(crate) previous_move: Vec<Move>,
    pub(crate) previous_piece: Vec<Option<crate::types::Piece>>,
}

impl<'a> SearchState<'a> {
    fn should_stop(&mut self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(limit) = self.node_limit {
            if self.nodes >= limit {
                return true;
            }
        }
        if self.nodes % 2048 == 0 {
            if let Some(deadline) = self.hard_deadline {
                if Instant::now() >= deadline {
                    self.stop.store(true, Ordering::Relaxed);
                    return true;
                }
            }
        }
        false
    }
}

/// Run iterative deepening from the current position until a limit is hit
/// or `stop` is raised, reporting each completed iteration through
/// `on_info`.
#[must_use]
pub fn search(
    board: &mut Board,
    tt: &mut TranspositionTable,
    pawn_cache: &mut PawnHashTable,
    tables: &mut OrderingTables,
    limits: &SearchLimits,
    stop: &AtomicBool,
    mut on_info: impl FnMut(SearchInfo),
) -> SearchResult {
    tables.new_search();
    let start = Instant::now();

    let mut state = SearchState {
        tt,
        pawn_cache,
        tables,
        stop,
        nodes: 0,
        seldepth: 0,
        node_limit: limits.node_limit,
        hard_deadline: limits.hard_deadline,
        extension_budget: (limits.max_depth * 2).max(16),
        eval_history: vec![0; MAX_PLY + 1],
        previous_move: vec![Move::null(); MAX_PLY + 1],
        previous_piece: vec![None; MAX_PLY + 1],
    };

    let root_moves = board.generate_moves();
    if root_moves.is_empty() {
        return SearchResult { best_move: None, ponder_move: None, score: 0, depth: 0, nodes: 0 };
    }
    if root_moves.len() == 1 {
        let mv = *root_moves.as_slice().first().unwrap();
        return SearchResult { best_move: Some(mv), ponder_move: None, score: 0, depth: 1, nodes: 0 };
    }

    let mut best_move = None;
    let mut best_score = 0;
    let mut completed_depth = 0;
    let mut prev_score: Option<i32> = None;
    let mut root_order: Vec<Move> = root_moves.as_slice().to_vec();
    let mut stability = crate::time::Stability::new();

    for depth in 1..=limits.max_depth {
        state.tt.new_search();
        if state.should_stop() {
            break;
        }
        // Once past the soft deadline, only a genuinely unstable root
        // (best move still flip-flopping, or its score just dropped) earns
        // another iteration; a settled search stops here (spec §4.H
        // stability-based early stopping).
        if let Some(soft) = limits.soft_deadline {
            if Instant::now() >= soft && completed_depth > 0 && stability.should_stop_at_soft(best_score) {
                break;
            }
        }

        let result = root::search_depth(board, &mut state, depth, &mut root_order, prev_score);
        let Some(iteration) = result else {
            break;
        };

        best_move = Some(iteration.best_move);
        best_score = iteration.score;
        completed_depth = depth;
        prev_score = Some(iteration.score);
        stability.record(iteration.best_move, iteration.score);

        if let Some(pos) = root_order.iter().position(|m| *m == iteration.best_move) {
            root_order.swap(0, pos);
        }

        let pv = extract_pv(board, state.tt, depth);
        let score_mate = (iteration.score.abs() >= MATE_THRESHOLD)
            .then(|| (MATE_SCORE - iteration.score.abs() + 1) / 2 * iteration.score.signum());
        on_info(SearchInfo {
            depth,
            seldepth: state.seldepth,
            score_cp: score_mate.is_none().then_some(iteration.score),
            score_mate,
            nodes: state.nodes,
            elapsed: start.elapsed(),
            pv: pv.clone(),
            hashfull: state.tt.hashfull_permille(),
        });

        if iteration.score.abs() >= MATE_THRESHOLD && depth >= 4 {
            break;
        }
    }

    let ponder_move = best_move.and_then(|bm| {
        let pv = extract_pv(board, state.tt, completed_depth.max(2));
        (pv.len() >= 2 && pv[0] == bm).then(|| pv[1])
    });

    SearchResult { best_move, ponder_move, score: best_score, depth: completed_depth, nodes: state.nodes }
}

/// Follow the TT's best-move chain from the current position to build a PV
/// line, the way the teacher's `build_pv_from_tt` does, generalized to walk
/// the whole line instead of stopping after one move (guarded against
/// repetition/depth so a corrupted or cyclic TT chain can't loop forever).
fn extract_pv(board: &Board, tt: &TranspositionTable, max_len: i32) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut scratch = board.clone();
    let mut seen_hashes = Vec::new();

    for _ in 0..max_len.max(1) {
        let Some(hit) = tt.probe(scratch.hash(), 0) else { break };
        if hit.best_move.is_null() {
            break;
        }
        if !scratch.generate_moves().contains(hit.best_move) {
            break;
        }
        if seen_hashes.contains(&scratch.hash()) {
            break;
        }
        seen_hashes.push(scratch.hash());
        pv.push(hit.best_move);
        scratch.make_move(hit.best_move);
    }

    pv
}
