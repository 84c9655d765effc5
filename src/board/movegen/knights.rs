//! Knight move generation.

use crate::types::{Bitboard, Color, Move, MoveList, Piece};

use super::super::attack_tables::knight_attacks;
use super::{CheckInfo, GenMode};
use crate::board::Board;

impl Board {
    pub(crate) fn generate_knight_moves(
        &self,
        us: Color,
        info: &CheckInfo,
        mode: GenMode,
        moves: &mut MoveList,
    ) {
        let knights = self.pieces[us.index()][Piece::Knight.index()];
        let own = self.occupancy(us);
        let enemy = self.occupancy(us.opponent());

        for from in knights {
            // A pinned knight can never move: no destination keeps it on
            // the pin ray while still attacking from a knight's-move away.
            if info.pinned.contains(from) {
                continue;
            }
            let attacks = Bitboard(knight_attacks(from.index())) & !own & info.check_mask;
            for to in attacks {
                let mv = if enemy.contains(to) { Move::capture(from, to) } else { Move::quiet(from, to) };
                if mode == GenMode::All || mv.is_capture() {
                    moves.push(mv);
                }
            }
        }
    }
}
