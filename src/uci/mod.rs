//! UCI boundary: reads stdin, writes `info`/`bestmove` to stdout (spec §4.I,
//! §6). Stdin is read on its own dedicated thread whose sole job is to
//! forward lines to this loop over a channel (spec §5: "the UCI boundary
//! runs on a separate logical thread ... whose sole job is to read stdin and
//! set control flags"); this loop itself drives the engine and, while a
//! search is running, keeps polling that same channel so `stop`/`quit`
//! arriving mid-search are handled immediately instead of only after the
//! next blocking read.

mod command;

pub use command::{parse_uci_command, UciCommand};

use std::io::{self, BufRead, BufReader, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::engine::EngineController;
use crate::search::{SearchInfo, SearchResult};

const ENGINE_NAME: &str = "Talon";
const ENGINE_AUTHOR: &str = "the Talon contributors";

/// How often the `go` loop re-checks for an incoming stdin line while a
/// search is running.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Run the UCI loop to completion (i.e. until `quit` or EOF on stdin).
pub fn run() {
    run_on(BufReader::new(io::stdin()), io::stdout())
}

/// Whether the outer loop should keep reading commands after a `go` returns.
enum GoOutcome {
    Continue,
    Quit,
}

fn run_on(input: impl BufRead + Send + 'static, mut output: impl Write) {
    let mut engine = EngineController::new();

    // Dedicated reader thread: the only thing that ever blocks on stdin.
    // Every other part of this loop only ever blocks on this channel, so a
    // running search never prevents `stop`/`quit` from being observed.
    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in input.lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });

    loop {
        let line = match line_rx.recv() {
            Ok(line) => line,
            Err(_) => break, // stdin closed with nothing further queued
        };
        match parse_uci_command(&line) {
            UciCommand::Uci => {
                writeln!(output, "id name {ENGINE_NAME}").ok();
                writeln!(output, "id author {ENGINE_AUTHOR}").ok();
                print_options(&mut output);
                writeln!(output, "uciok").ok();
            }
            UciCommand::IsReady => {
                engine.stop_and_wait();
                writeln!(output, "readyok").ok();
            }
            UciCommand::UciNewGame => {
                engine.new_game();
            }
            UciCommand::Position { fen, moves } => {
                if let Err(e) = engine.set_position(fen.as_deref(), &moves) {
                    writeln!(output, "info string {e}").ok();
                }
            }
            UciCommand::Go(params) => {
                if let GoOutcome::Quit = run_go(&mut engine, params, &mut output, &line_rx) {
                    break;
                }
            }
            UciCommand::Stop => {
                engine.stop_and_wait();
            }
            UciCommand::PonderHit => {
                // The core search doesn't distinguish a pondering search
                // from a normal one once started (spec §6): time limits
                // are computed fresh on the next `go`, so there is nothing
                // further to do here beyond acknowledging the transition.
            }
            UciCommand::SetOption { name, value } => {
                apply_option(&mut engine, &name, value.as_deref(), &mut output);
            }
            UciCommand::Quit => break,
            UciCommand::Unknown(line) => {
                if !line.is_empty() {
                    writeln!(output, "info string unknown command: {line}").ok();
                }
            }
        }
    }
    engine.stop_and_wait();
}

fn print_options(output: &mut impl Write) {
    writeln!(output, "option name Hash type spin default 64 min 1 max 4096").ok();
    writeln!(output, "option name Threads type spin default 1 min 1 max 1").ok();
    writeln!(output, "option name Contempt type spin default 0 min -100 max 100").ok();
    writeln!(output, "option name SyzygyPath type string default <empty>").ok();
    writeln!(output, "option name UCI_Chess960 type check default false").ok();
    writeln!(output, "option name Ponder type check default true").ok();
    writeln!(output, "option name Move Overhead type spin default 50 min 0 max 5000").ok();
    writeln!(output, "option name Soft Time Percent type spin default 70 min 1 max 100").ok();
    writeln!(output, "option name Hard Time Percent type spin default 90 min 1 max 100").ok();
}

fn apply_option(engine: &mut EngineController, name: &str, value: Option<&str>, output: &mut impl Write) {
    match name {
        "Hash" => {
            if let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) {
                engine.set_hash_mb(mb);
            }
        }
        "Threads" => {
            if let Some(n) = value.and_then(|v| v.parse::<usize>().ok()) {
                engine.set_threads(n);
            }
        }
        "Move Overhead" => {
            if let Some(ms) = value.and_then(|v| v.parse::<u64>().ok()) {
                engine.set_move_overhead_ms(ms);
            }
        }
        "Soft Time Percent" => {
            if let Some(pct) = value.and_then(|v| v.parse::<u64>().ok()) {
                engine.set_soft_time_percent(pct);
            }
        }
        "Hard Time Percent" => {
            if let Some(pct) = value.and_then(|v| v.parse::<u64>().ok()) {
                engine.set_hard_time_percent(pct);
            }
        }
        // Contempt, SyzygyPath, UCI_Chess960, Ponder are accepted but not
        // yet wired to engine behavior beyond the zero-contempt,
        // no-tablebase core contract (spec §6's collaborator interfaces are
        // optional out-of-core extensions).
        _ => {
            writeln!(output, "info string unsupported option '{name}'").ok();
        }
    }
}

/// Run one `go`: start the search, then block on *both* its reporting
/// channels and the stdin-line channel until a `bestmove` has been emitted.
/// Returns [`GoOutcome::Quit`] if a `quit` (or stdin EOF) was observed while
/// the search was still running, so the caller can stop reading further
/// commands.
fn run_go(
    engine: &mut EngineController,
    params: crate::time::GoParams,
    output: &mut impl Write,
    line_rx: &Receiver<String>,
) -> GoOutcome {
    let (info_tx, info_rx) = mpsc::channel::<SearchInfo>();
    let (best_tx, best_rx) = mpsc::channel::<SearchResult>();

    engine.go(
        params,
        move |info| {
            let _ = info_tx.send(info);
        },
        move |result| {
            let _ = best_tx.send(result);
        },
    );

    loop {
        while let Ok(info) = info_rx.try_recv() {
            print_info(output, &info);
        }
        match best_rx.try_recv() {
            Ok(result) => {
                while let Ok(info) = info_rx.try_recv() {
                    print_info(output, &info);
                }
                print_bestmove(output, &result);
                return GoOutcome::Continue;
            }
            Err(TryRecvError::Disconnected) => {
                // The search thread dropped its sender without reporting a
                // result (spec §7 error kind 2: treated as the fatal-in-release
                // case, surfaced rather than left to hang).
                log::error!("search thread ended without reporting a result");
                finish_with_fallback(output, &info_rx, &best_rx);
                return GoOutcome::Continue;
            }
            Err(TryRecvError::Empty) => {}
        }

        match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match parse_uci_command(&line) {
                UciCommand::Stop => {
                    engine.stop_and_wait();
                    finish_with_fallback(output, &info_rx, &best_rx);
                    return GoOutcome::Continue;
                }
                UciCommand::Quit => {
                    engine.stop_and_wait();
                    finish_with_fallback(output, &info_rx, &best_rx);
                    return GoOutcome::Quit;
                }
                UciCommand::IsReady => {
                    writeln!(output, "readyok").ok();
                }
                UciCommand::PonderHit => {
                    // Acknowledged implicitly; see the top-level comment.
                }
                _ => {
                    // Per spec §5 the GUI won't send anything else before
                    // seeing this go's bestmove; surfaced rather than
                    // silently dropped if it happens anyway.
                    writeln!(output, "info string command ignored while searching: {line}").ok();
                }
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // stdin closed mid-search: stop, report what we have, exit.
                engine.stop_and_wait();
                finish_with_fallback(output, &info_rx, &best_rx);
                return GoOutcome::Quit;
            }
        }
    }
}

/// Drain any pending `info` lines and emit the final `bestmove`, falling
/// back to `bestmove 0000` if the search thread never reported a result
/// (spec §7 error kind 2).
fn finish_with_fallback(output: &mut impl Write, info_rx: &Receiver<SearchInfo>, best_rx: &Receiver<SearchResult>) {
    while let Ok(info) = info_rx.try_recv() {
        print_info(output, &info);
    }
    match best_rx.try_recv() {
        Ok(result) => print_bestmove(output, &result),
        Err(_) => {
            writeln!(output, "info string no result from search thread").ok();
            writeln!(output, "bestmove 0000").ok();
        }
    }
}

fn print_info(output: &mut impl Write, info: &SearchInfo) {
    let nps = if info.elapsed.as_millis() > 0 {
        info.nodes * 1000 / info.elapsed.as_millis() as u64
    } else {
        0
    };
    let score = match (info.score_cp, info.score_mate) {
        (_, Some(mate)) => format!("mate {mate}"),
        (Some(cp), _) => format!("cp {cp}"),
        _ => "cp 0".to_string(),
    };
    let pv = info.pv.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
    writeln!(
        output,
        "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
        info.depth,
        info.seldepth,
        score,
        info.nodes,
        nps,
        info.hashfull,
        info.elapsed.as_millis(),
        pv
    )
    .ok();
}

fn print_bestmove(output: &mut impl Write, result: &SearchResult) {
    match result.best_move {
        Some(mv) => match result.ponder_move {
            Some(ponder) => writeln!(output, "bestmove {mv} ponder {ponder}").ok(),
            None => writeln!(output, "bestmove {mv}").ok(),
        },
        None => writeln!(output, "bestmove 0000").ok(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uci_handshake_emits_id_and_uciok() {
        let input = b"uci\nquit\n".as_slice();
        let mut output = Vec::new();
        run_on(input, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("id name"));
        assert!(text.contains("uciok"));
    }

    #[test]
    fn go_depth_emits_exactly_one_bestmove() {
        let input = b"position startpos\ngo depth 2\nquit\n".as_slice();
        let mut output = Vec::new();
        run_on(input, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("bestmove").count(), 1);
    }

    #[test]
    fn unknown_command_does_not_stop_the_loop() {
        let input = b"nonsense\nisready\nquit\n".as_slice();
        let mut output = Vec::new();
        run_on(input, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("readyok"));
    }

    /// Regression test for the wire-loop hang: `go infinite` must not block
    /// the stdin reader from observing a subsequent `stop`, and must emit
    /// exactly one `bestmove` shortly after (spec §8 S5).
    #[test]
    fn stop_after_infinite_unblocks_the_wire_loop() {
        let input = b"position startpos\ngo infinite\nstop\nquit\n".as_slice();
        let mut output = Vec::new();
        run_on(input, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("bestmove").count(), 1);
    }

    /// `quit` arriving mid-search must also unblock the loop instead of
    /// waiting for the search to hit its own (nonexistent, for `infinite`)
    /// deadline.
    #[test]
    fn quit_during_infinite_search_terminates_the_loop() {
        let input = b"position startpos\ngo infinite\nquit\n".as_slice();
        let mut output = Vec::new();
        run_on(input, &mut output);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("bestmove").count(), 1);
    }
}
