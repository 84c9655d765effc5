//! End-to-end UCI scenarios from spec §8, driven through the public
//! `EngineController` API (the same surface the `uci` wire-protocol loop
//! drives) rather than through raw stdin/stdout, since `EngineController`
//! is the crate's public seam and the line-protocol parsing is already
//! covered by `uci::tests`.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use talon::board::Board;
use talon::engine::EngineController;
use talon::time::GoParams;

fn run_go(engine: &mut EngineController, params: GoParams) -> talon::search::SearchResult {
    let (tx, rx) = mpsc::channel();
    engine.go(params, |_info| {}, move |result| {
        let _ = tx.send(result);
    });
    rx.recv_timeout(Duration::from_secs(30)).expect("search did not report a bestmove in time")
}

/// S1 — Fool's-mate detection: Black has a forced mate in one after
/// `f2f3 e7e5 g2g4`.
#[test]
fn fools_mate_is_found() {
    let mut engine = EngineController::new();
    let moves = ["f2f3", "e7e5", "g2g4"].iter().map(|s| s.to_string()).collect::<Vec<_>>();
    engine.set_position(None, &moves).unwrap();

    let result = run_go(&mut engine, GoParams { depth: Some(6), ..Default::default() });
    let best = result.best_move.expect("a mating move exists");
    assert_eq!(best.to_string(), "d8h4");
}

/// S5 — Stop: after `go infinite`, `stop` must produce exactly one
/// `bestmove` within a small bounded delay, and the controller must report
/// it is no longer searching afterward.
#[test]
fn stop_after_infinite_returns_promptly() {
    let mut engine = EngineController::new();
    engine.set_position(None, &[]).unwrap();

    let (tx, rx) = mpsc::channel();
    engine.go(GoParams { infinite: true, ..Default::default() }, |_info| {}, move |result| {
        let _ = tx.send(result);
    });

    // Give the search thread a moment to actually start before stopping it.
    std::thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    engine.stop_and_wait();

    let result = rx.recv_timeout(Duration::from_millis(500)).expect("exactly one bestmove after stop");
    assert!(result.best_move.is_some());
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!engine.is_searching());
}

/// S6 — Insufficient material: bare kings must not crash the search and
/// must return a legal king move.
#[test]
fn insufficient_material_position_returns_a_legal_move() {
    let mut engine = EngineController::new();
    engine.set_position(Some("4k3/8/8/8/8/8/8/4K3 w - - 0 1"), &[]).unwrap();

    let result = run_go(&mut engine, GoParams { depth: Some(2), ..Default::default() });
    let best = result.best_move.expect("some legal king move exists");

    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(board.generate_moves().contains(best));
}

/// Exercises the same "exactly one `bestmove` per `go`" contract as S4/S5
/// but bounded by `movetime` instead of `stop`, matching spec §5's ordering
/// guarantee.
#[test]
fn movetime_bounded_search_completes_within_budget() {
    let mut engine = EngineController::new();
    engine.set_position(None, &[]).unwrap();

    let started = Instant::now();
    let result = run_go(&mut engine, GoParams { movetime: Some(200), ..Default::default() });
    assert!(result.best_move.is_some());
    assert!(started.elapsed() < Duration::from_secs(2));
}
