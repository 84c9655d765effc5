//! FEN parsing and serialization (spec §4.B, §6).

use crate::error::FenError;
use crate::types::{castle_bit, CastlingRights, Color, Piece, Square};

use super::Board;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a FEN string, rejecting malformed input rather than panicking
    /// (spec §7, error kind 1).
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewParts { found: fields.len() });
        }

        let mut board = Board::empty();
        parse_placement(&mut board, fields[0])?;

        board.white_to_move = match fields[1] {
            "w" => true,
            "b" => false,
            other => return Err(FenError::InvalidSideToMove { found: other.to_string() }),
        };

        board.castling_rights = parse_castling(fields[2])?;

        board.en_passant = parse_en_passant(fields[3])?;

        board.halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        board.fullmove_number = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        if board.pieces[Color::White.index()][Piece::King.index()].popcount() != 1 {
            return Err(if board.pieces[Color::White.index()][Piece::King.index()].popcount() > 1 {
                FenError::MultipleKings { color: "white" }
            } else {
                FenError::MissingKing { color: "white" }
            });
        }
        if board.pieces[Color::Black.index()][Piece::King.index()].popcount() != 1 {
            return Err(if board.pieces[Color::Black.index()][Piece::King.index()].popcount() > 1 {
                FenError::MultipleKings { color: "black" }
            } else {
                FenError::MissingKing { color: "black" }
            });
        }

        board.recompute_hash();
        board.push_history(true);
        Ok(board)
    }

    /// Emit canonical FEN for the current position.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut s = String::new();
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            s.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let ch = piece.to_char();
                        s.push(if color.is_white() { ch.to_ascii_uppercase() } else { ch });
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                s.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                s.push('/');
            }
        }

        s.push(' ');
        s.push(if self.white_to_move { 'w' } else { 'b' });

        s.push(' ');
        let rights = self.castling_rights;
        if rights.0 == 0 {
            s.push('-');
        } else {
            if rights.has(castle_bit(Color::White, true)) {
                s.push('K');
            }
            if rights.has(castle_bit(Color::White, false)) {
                s.push('Q');
            }
            if rights.has(castle_bit(Color::Black, true)) {
                s.push('k');
            }
            if rights.has(castle_bit(Color::Black, false)) {
                s.push('q');
            }
        }

        s.push(' ');
        match self.en_passant {
            Some(sq) => s.push_str(&sq.to_string()),
            None => s.push('-'),
        }

        s.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        s
    }
}

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidRank { rank: ranks.len(), found: ranks.len() });
    }
    for (rank_from_top, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_from_top;
        let mut file = 0usize;
        for ch in rank_str.chars() {
            if let Some(empty) = ch.to_digit(10) {
                file += empty as usize;
                if file > 8 {
                    return Err(FenError::TooManyFiles { rank });
                }
            } else {
                let piece = Piece::from_char(ch).ok_or(FenError::InvalidPiece { ch })?;
                let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
                if file >= 8 {
                    return Err(FenError::TooManyFiles { rank });
                }
                board.set_piece(Square::new(rank, file), color, piece);
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::InvalidRank { rank, found: file });
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::none());
    }
    let mut mask = 0u8;
    for ch in field.chars() {
        mask |= match ch {
            'K' => castle_bit(Color::White, true),
            'Q' => castle_bit(Color::White, false),
            'k' => castle_bit(Color::Black, true),
            'q' => castle_bit(Color::Black, false),
            _ => return Err(FenError::InvalidCastling { ch }),
        };
    }
    Ok(CastlingRights(mask))
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    field
        .parse::<Square>()
        .map(Some)
        .map_err(|_| FenError::InvalidEnPassant { found: field.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_fen_round_trips() {
        let board = Board::from_fen(START_FEN).unwrap();
        assert_eq!(board.to_fen(), START_FEN);
    }

    #[test]
    fn kiwipete_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.to_fen(), fen);
    }

    #[test]
    fn rejects_too_few_fields() {
        assert!(matches!(Board::from_fen("8/8/8/8/8/8/8/8"), Err(FenError::TooFewParts { .. })));
    }

    #[test]
    fn rejects_missing_king() {
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenError::MissingKing { color: "black" })
        ));
    }

    #[test]
    fn defaults_missing_clocks() {
        let board = Board::from_fen("8/8/8/8/8/8/8/4K2k w - -").unwrap();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }
}
