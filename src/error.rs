//! Crate-wide error types.
//!
//! Every error here is recoverable by a caller at the UCI boundary (spec
//! §7): malformed input is reported and the offending line is ignored, the
//! position is left at its last consistent state. Nothing in this module
//! panics.

use std::fmt;

/// A malformed square notation (e.g. `"i9"`, `"e"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::InvalidNotation { notation } => {
                write!(f, "invalid square notation '{notation}'")
            }
        }
    }
}
impl std::error::Error for SquareError {}

/// FEN parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    TooFewParts { found: usize },
    InvalidPiece { ch: char },
    InvalidRank { rank: usize, found: usize },
    TooManyFiles { rank: usize },
    InvalidSideToMove { found: String },
    InvalidCastling { ch: char },
    InvalidEnPassant { found: String },
    InvalidClock { field: &'static str, found: String },
    MultipleKings { color: &'static str },
    MissingKing { color: &'static str },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewParts { found } => {
                write!(f, "FEN needs at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { ch } => write!(f, "invalid piece character '{ch}' in FEN"),
            FenError::InvalidRank { rank, found } => {
                write!(f, "rank {rank} has {found} squares, expected 8")
            }
            FenError::TooManyFiles { rank } => write!(f, "rank {rank} overflows 8 files"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { ch } => {
                write!(f, "invalid castling character '{ch}'")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en-passant square '{found}'")
            }
            FenError::InvalidClock { field, found } => {
                write!(f, "invalid {field} '{found}'")
            }
            FenError::MultipleKings { color } => write!(f, "{color} has more than one king"),
            FenError::MissingKing { color } => write!(f, "{color} has no king"),
        }
    }
}
impl std::error::Error for FenError {}

/// UCI-notation move parsing failure against a specific board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    InvalidLength { len: usize },
    InvalidSquare(SquareError),
    InvalidPromotion { ch: char },
    NoPieceOnFromSquare { notation: String },
    NotLegal { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "move notation must be 4 or 5 characters, got {len}")
            }
            MoveParseError::InvalidSquare(e) => write!(f, "{e}"),
            MoveParseError::InvalidPromotion { ch } => {
                write!(f, "invalid promotion piece '{ch}'")
            }
            MoveParseError::NoPieceOnFromSquare { notation } => {
                write!(f, "no piece on the source square of '{notation}'")
            }
            MoveParseError::NotLegal { notation } => {
                write!(f, "'{notation}' is not a legal move in this position")
            }
        }
    }
}
impl std::error::Error for MoveParseError {}

impl From<SquareError> for MoveParseError {
    fn from(e: SquareError) -> Self {
        MoveParseError::InvalidSquare(e)
    }
}

/// Top-level UCI command parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    InvalidFen(FenError),
    InvalidMove { notation: String, error: MoveParseError },
    MissingParts { command: &'static str },
    UnknownCommand { line: String },
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            UciError::InvalidMove { notation, error } => {
                write!(f, "invalid move '{notation}': {error}")
            }
            UciError::MissingParts { command } => {
                write!(f, "'{command}' is missing required arguments")
            }
            UciError::UnknownCommand { line } => write!(f, "unknown command: {line}"),
        }
    }
}
impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}
