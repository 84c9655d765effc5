//! Zobrist hashing for chess positions.
//!
//! Open question (spec §9): the en-passant key is file-indexed (8 keys),
//! not square-indexed — the common convention, and the one applied
//! uniformly by `Board::new`, FEN parsing, `make_move`/`unmake_move`.

use once_cell::sync::Lazy;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::types::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece][color][square]`
    piece_keys: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    /// `castling_keys[bit]` for each of the 16 possible castling-rights masks
    castling_keys: [u64; 16],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        // Fixed seed: hashes must be reproducible across runs for the
        // perft/search test suite and for TT determinism.
        let mut rng = StdRng::seed_from_u64(0x5A0B_1575_u64);
        let mut piece_keys = [[[0u64; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        let black_to_move = rng.gen();
        let mut castling_keys = [0u64; 16];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.gen();
        }
        ZobristKeys {
            piece_keys,
            black_to_move,
            castling_keys,
            en_passant_file,
        }
    }
}

static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(piece: Piece, color: Color, sq: Square) -> u64 {
    ZOBRIST.piece_keys[piece.index()][color.index()][sq.index()]
}

#[inline]
pub(crate) fn side_key() -> u64 {
    ZOBRIST.black_to_move
}

/// `rights` is the 4-bit castling-rights mask (0-15); the full mask is its
/// own key so toggling individual rights is a single XOR against the
/// previous-mask key followed by the new-mask key (see `Board::make_move`).
#[inline]
pub(crate) fn castling_key(rights: u8) -> u64 {
    ZOBRIST.castling_keys[rights as usize]
}

#[inline]
pub(crate) fn en_passant_key(file: usize) -> u64 {
    ZOBRIST.en_passant_file[file]
}
