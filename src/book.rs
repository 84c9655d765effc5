//! Opening book collaborator interface (spec §6).
//!
//! The core only defines the seam: a book is anything that can answer "do
//! you have a move for this position". The engine controller consults it
//! before search runs at the root (spec §6: "on hit, the book's move is
//! emitted directly as `bestmove`").

use std::collections::HashMap;

use crate::board::Board;
use crate::types::Move;

/// Queried with the position's Zobrist hash; a miss is never an error
/// (spec §7, error kind 5) -- just `None`.
pub trait OpeningBook {
    fn probe(&self, zobrist: u64) -> Option<Move>;
}

/// A book that never has a move; the default when no book is configured.
#[derive(Default)]
pub struct NoBook;

impl OpeningBook for NoBook {
    fn probe(&self, _zobrist: u64) -> Option<Move> {
        None
    }
}

/// A handful of well-known main lines, keyed by the Zobrist hash of the
/// position reached after each prefix of moves. Spec §1 calls online
/// opening-book fetching a non-goal; this is the "small built-in set"
/// variant instead, built once at construction by replaying each line's UCI
/// moves against a fresh board rather than hand-transcribing hash values
/// (which nothing here can verify against the real key schedule).
pub struct MainLineBook {
    moves_by_hash: HashMap<u64, Move>,
}

/// UCI move sequences for a few standard openings, starting from the
/// initial position. Deliberately shallow (opening theory, not a full
/// repertoire) -- the book is meant to save a few plies of search at known
/// positions, not to play the rest of the game.
const MAIN_LINES: &[&[&str]] = &[
    // Ruy Lopez
    &["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"],
    // Italian Game
    &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4"],
    // Sicilian Defense, Open
    &["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4"],
    // French Defense
    &["e2e4", "e7e6", "d2d4", "d7d5"],
    // Caro-Kann Defense
    &["e2e4", "c7c6", "d2d4", "d7d5"],
    // Queen's Gambit
    &["d2d4", "d7d5", "c2c4"],
    // Queen's Gambit Declined
    &["d2d4", "d7d5", "c2c4", "e7e6"],
    // King's Indian Defense
    &["d2d4", "g8f6", "c2c4", "g7g6"],
    // Nimzo-Indian Defense
    &["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4"],
    // English Opening
    &["c2c4", "e7e5"],
];

impl MainLineBook {
    #[must_use]
    pub fn new() -> Self {
        let mut moves_by_hash = HashMap::new();
        for line in MAIN_LINES {
            let mut board = Board::new();
            for notation in *line {
                let hash_before = board.hash();
                let Ok(mv) = board.parse_move(notation) else { break };
                moves_by_hash.entry(hash_before).or_insert(mv);
                board.make_move(mv);
            }
        }
        log::debug!("opening book loaded: {} positions from {} main lines", moves_by_hash.len(), MAIN_LINES.len());
        MainLineBook { moves_by_hash }
    }
}

impl Default for MainLineBook {
    fn default() -> Self {
        MainLineBook::new()
    }
}

impl OpeningBook for MainLineBook {
    fn probe(&self, zobrist: u64) -> Option<Move> {
        self.moves_by_hash.get(&zobrist).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_book_always_misses() {
        assert!(NoBook.probe(0).is_none());
        assert!(NoBook.probe(u64::MAX).is_none());
    }

    #[test]
    fn main_line_book_answers_the_starting_position() {
        let book = MainLineBook::new();
        let board = Board::new();
        let mv = book.probe(board.hash()).expect("at least one main line starts from startpos");
        assert!(board.generate_moves().contains(mv));
    }

    #[test]
    fn main_line_book_follows_a_known_line() {
        let book = MainLineBook::new();
        let mut board = Board::new();
        for notation in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            let mv = board.parse_move(notation).unwrap();
            board.make_move(mv);
        }
        let reply = book.probe(board.hash()).expect("ruy lopez / italian prefix is in the book");
        assert!(board.generate_moves().contains(reply));
    }

    #[test]
    fn main_line_book_misses_off_book_positions() {
        let book = MainLineBook::new();
        let mut board = Board::new();
        for notation in ["a2a3", "a7a6", "h2h3", "h7h6"] {
            let mv = board.parse_move(notation).unwrap();
            board.make_move(mv);
        }
        assert!(book.probe(board.hash()).is_none());
    }
}
