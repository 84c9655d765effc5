//! Time management: turning UCI `go` parameters into soft/hard wall-clock
//! deadlines, and deciding between iterations whether to keep searching
//! (spec §4.H).
//!
//! Grounded on the teacher's `engine::time::{TimeConfig, TimeControl,
//! compute_incremental_limits}`: a percentage-of-remaining-time budget with
//! a movestogo estimate, a panic-mode allowance when the best score drops,
//! and stability-based early stopping between iterations.

use std::time::{Duration, Instant};

use crate::types::Color;

/// Tunables, analogous to the teacher's `TimeConfig`.
#[derive(Clone, Copy, Debug)]
pub struct TimeConfig {
    pub move_overhead_ms: u64,
    pub soft_time_percent: u64,
    pub hard_time_percent: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig { move_overhead_ms: 50, soft_time_percent: 70, hard_time_percent: 90 }
    }
}

/// The mode a `go` command requests (spec §6 `go` parameters).
#[derive(Clone, Copy, Debug, Default)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub movetime: Option<u64>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
}

/// Resolved limits handed to [`crate::search::SearchLimits`].
#[derive(Clone, Copy, Debug)]
pub struct ResolvedLimits {
    pub max_depth: i32,
    pub soft_deadline: Option<Instant>,
    pub hard_deadline: Option<Instant>,
    pub node_limit: Option<u64>,
}

const LONG_MOVES_ESTIMATE: u32 = 40;
const MEDIUM_MOVES_ESTIMATE: u32 = 30;
const SHORT_MOVES_ESTIMATE: u32 = 25;
const LONG_TIME_THRESHOLD_MS: u64 = 300_000;
const MEDIUM_TIME_THRESHOLD_MS: u64 = 60_000;

/// Resolve `params` for the side to move into concrete deadlines, relative
/// to `now`.
#[must_use]
pub fn resolve(params: &GoParams, side: Color, config: &TimeConfig, now: Instant) -> ResolvedLimits {
    let max_depth = params.depth.unwrap_or(64).clamp(1, 64);

    if params.infinite || params.ponder {
        return ResolvedLimits { max_depth, soft_deadline: None, hard_deadline: None, node_limit: params.nodes };
    }

    if let Some(movetime) = params.movetime {
        let hard = now + Duration::from_millis(movetime.saturating_sub(config.move_overhead_ms).max(1));
        return ResolvedLimits { max_depth, soft_deadline: Some(hard), hard_deadline: Some(hard), node_limit: params.nodes };
    }

    let remaining = match side {
        Color::White => params.wtime,
        Color::Black => params.btime,
    };
    let inc = match side {
        Color::White => params.winc,
        Color::Black => params.binc,
    }
    .unwrap_or(0);

    let Some(remaining) = remaining else {
        // No time control at all (e.g. `go depth N`): bound only by depth/nodes.
        return ResolvedLimits { max_depth, soft_deadline: None, hard_deadline: None, node_limit: params.nodes };
    };

    let remaining = remaining.saturating_sub(config.move_overhead_ms).max(1);
    let mtg = params.movestogo.unwrap_or_else(|| estimate_movestogo(remaining));

    let soft_cap = remaining * config.soft_time_percent / 100;
    let soft_budget = (remaining / u64::from(mtg.max(1))) + (inc * 8 / 10);
    let soft_ms = soft_cap.min(soft_budget).max(1);

    let hard_cap = remaining * config.hard_time_percent / 100;
    let hard_ms = hard_cap.min(soft_ms.saturating_mul(3)).max(soft_ms);

    ResolvedLimits {
        max_depth,
        soft_deadline: Some(now + Duration::from_millis(soft_ms)),
        hard_deadline: Some(now + Duration::from_millis(hard_ms)),
        node_limit: params.nodes,
    }
}

/// Estimate the number of moves remaining when the UCI client didn't supply
/// `movestogo`, tiered by how much time is left (spec §4.H).
fn estimate_movestogo(remaining_ms: u64) -> u32 {
    if remaining_ms >= LONG_TIME_THRESHOLD_MS {
        LONG_MOVES_ESTIMATE
    } else if remaining_ms >= MEDIUM_TIME_THRESHOLD_MS {
        MEDIUM_MOVES_ESTIMATE
    } else {
        SHORT_MOVES_ESTIMATE
    }
}

/// Tracks root-best-move stability and score trend across iterations, to
/// decide whether the soft deadline should be respected or extended (spec
/// §4.H "panic" allowance).
#[derive(Default)]
pub struct Stability {
    last_best: Option<crate::types::Move>,
    stable_iterations: u32,
    last_score: Option<i32>,
}

const STABILITY_ITERATIONS_TO_STOP: u32 = 4;
const SCORE_DROP_THRESHOLD: i32 = 50;

impl Stability {
    #[must_use]
    pub fn new() -> Self {
        Stability::default()
    }

    pub fn record(&mut self, best_move: crate::types::Move, score: i32) {
        if self.last_best == Some(best_move) {
            self.stable_iterations += 1;
        } else {
            self.stable_iterations = 0;
        }
        self.last_best = Some(best_move);
        self.last_score = Some(score);
    }

    /// Whether the engine should stop now that `elapsed >= soft`, given how
    /// stable the best move has been and whether the score just dropped
    /// (spec §4.H: a score drop can justify borrowing time up to `hard`).
    #[must_use]
    pub fn should_stop_at_soft(&self, latest_score: i32) -> bool {
        let score_dropped = self.last_score.is_some_and(|prev| latest_score < prev - SCORE_DROP_THRESHOLD);
        if score_dropped {
            return false;
        }
        self.stable_iterations >= STABILITY_ITERATIONS_TO_STOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_is_used_directly() {
        let params = GoParams { movetime: Some(500), ..Default::default() };
        let now = Instant::now();
        let limits = resolve(&params, Color::White, &TimeConfig::default(), now);
        assert!(limits.hard_deadline.is_some());
        assert_eq!(limits.soft_deadline, limits.hard_deadline);
    }

    #[test]
    fn infinite_has_no_deadline() {
        let params = GoParams { infinite: true, ..Default::default() };
        let now = Instant::now();
        let limits = resolve(&params, Color::White, &TimeConfig::default(), now);
        assert!(limits.soft_deadline.is_none());
        assert!(limits.hard_deadline.is_none());
    }

    #[test]
    fn incremental_budget_scales_with_remaining_time() {
        let now = Instant::now();
        let short = resolve(&GoParams { wtime: Some(5_000), ..Default::default() }, Color::White, &TimeConfig::default(), now);
        let long = resolve(&GoParams { wtime: Some(500_000), ..Default::default() }, Color::White, &TimeConfig::default(), now);
        assert!(long.hard_deadline.unwrap() > short.hard_deadline.unwrap());
    }

    #[test]
    fn stability_requires_several_matching_iterations() {
        let mut stability = Stability::new();
        let mv = crate::types::Move::quiet(crate::types::Square::new(1, 4), crate::types::Square::new(3, 4));
        for _ in 0..STABILITY_ITERATIONS_TO_STOP {
            stability.record(mv, 10);
        }
        assert!(stability.should_stop_at_soft(10));
    }

    #[test]
    fn score_drop_prevents_early_stop() {
        let mut stability = Stability::new();
        let mv = crate::types::Move::quiet(crate::types::Square::new(1, 4), crate::types::Square::new(3, 4));
        for _ in 0..STABILITY_ITERATIONS_TO_STOP {
            stability.record(mv, 100);
        }
        assert!(!stability.should_stop_at_soft(10));
    }
}
