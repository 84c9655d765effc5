//! UCI command-line parsing (spec §6).
//!
//! Grounded on the teacher's `uci::command::{UciCommand, parse_uci_command,
//! parse_go_params}`: a line is split on whitespace and dispatched on its
//! first token; unrecognized lines become [`UciCommand::Unknown`] rather
//! than an error, since spec §7 error kind 1 says malformed input is
//! reported and ignored, never fatal.

use crate::time::GoParams;

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position { fen: Option<String>, moves: Vec<String> },
    Go(GoParams),
    SetOption { name: String, value: Option<String> },
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

/// Parse one line of UCI input. Never fails: anything unrecognized becomes
/// [`UciCommand::Unknown`] carrying the original line for diagnostics.
#[must_use]
pub fn parse_uci_command(line: &str) -> UciCommand {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return UciCommand::Unknown(String::new());
    };

    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        "position" => parse_position(parts.collect()),
        "go" => UciCommand::Go(parse_go_params(parts.collect())),
        "setoption" => parse_setoption(parts.collect()),
        _ => UciCommand::Unknown(line.to_string()),
    }
}

fn parse_position(tokens: Vec<&str>) -> UciCommand {
    let mut idx = 0;
    let fen = match tokens.first() {
        Some(&"startpos") => {
            idx = 1;
            None
        }
        Some(&"fen") => {
            idx = 1;
            let mut fields = Vec::new();
            while idx < tokens.len() && tokens[idx] != "moves" {
                fields.push(tokens[idx]);
                idx += 1;
            }
            Some(fields.join(" "))
        }
        _ => None,
    };

    let moves = if idx < tokens.len() && tokens[idx] == "moves" {
        tokens[idx + 1..].iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    };

    UciCommand::Position { fen, moves }
}

fn parse_go_params(tokens: Vec<&str>) -> GoParams {
    let mut params = GoParams::default();
    let mut iter = tokens.into_iter();
    while let Some(tok) = iter.next() {
        match tok {
            "wtime" => params.wtime = next_u64(&mut iter),
            "btime" => params.btime = next_u64(&mut iter),
            "winc" => params.winc = next_u64(&mut iter),
            "binc" => params.binc = next_u64(&mut iter),
            "movestogo" => params.movestogo = next_u64(&mut iter).map(|v| v as u32),
            "movetime" => params.movetime = next_u64(&mut iter),
            "depth" => params.depth = next_u64(&mut iter).map(|v| v as i32),
            "nodes" => params.nodes = next_u64(&mut iter),
            "infinite" => params.infinite = true,
            "ponder" => params.ponder = true,
            _ => {}
        }
    }
    params
}

fn next_u64<'a>(iter: &mut impl Iterator<Item = &'a str>) -> Option<u64> {
    iter.next().and_then(|v| v.parse().ok())
}

fn parse_setoption(tokens: Vec<&str>) -> UciCommand {
    let Some(name_idx) = tokens.iter().position(|&t| t == "name") else {
        return UciCommand::Unknown("setoption".to_string());
    };
    let value_idx = tokens.iter().position(|&t| t == "value");
    let name_end = value_idx.unwrap_or(tokens.len());
    let name = tokens[name_idx + 1..name_end].join(" ");
    let value = value_idx.map(|vi| tokens[vi + 1..].join(" "));
    UciCommand::SetOption { name, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_startpos_with_moves() {
        let cmd = parse_uci_command("position startpos moves e2e4 e7e5");
        match cmd {
            UciCommand::Position { fen, moves } => {
                assert!(fen.is_none());
                assert_eq!(moves, vec!["e2e4", "e7e5"]);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parses_fen_position() {
        let cmd = parse_uci_command("position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves a1a2");
        match cmd {
            UciCommand::Position { fen, moves } => {
                assert_eq!(fen.as_deref(), Some("8/8/8/8/8/8/8/K6k w - - 0 1"));
                assert_eq!(moves, vec!["a1a2"]);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parses_go_with_time_controls() {
        let cmd = parse_uci_command("go wtime 1000 btime 2000 winc 10 binc 20 movestogo 30");
        match cmd {
            UciCommand::Go(params) => {
                assert_eq!(params.wtime, Some(1000));
                assert_eq!(params.btime, Some(2000));
                assert_eq!(params.movestogo, Some(30));
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parses_setoption_hash() {
        let cmd = parse_uci_command("setoption name Hash value 128");
        match cmd {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Hash");
                assert_eq!(value.as_deref(), Some("128"));
            }
            _ => panic!("expected SetOption"),
        }
    }

    #[test]
    fn parses_setoption_with_multi_word_name() {
        let cmd = parse_uci_command("setoption name Move Overhead value 100");
        match cmd {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Move Overhead");
                assert_eq!(value.as_deref(), Some("100"));
            }
            _ => panic!("expected SetOption"),
        }
    }

    #[test]
    fn unrecognized_line_is_unknown_not_an_error() {
        let cmd = parse_uci_command("wobble");
        assert!(matches!(cmd, UciCommand::Unknown(_)));
    }
}
