//! Bishop, rook, and queen move generation (sliding pieces).

use crate::types::{Color, Move, MoveList, Piece};

use super::{slider_attack_set, CheckInfo, GenMode};
use crate::board::Board;

impl Board {
    pub(crate) fn generate_slider_moves(
        &self,
        us: Color,
        piece: Piece,
        info: &CheckInfo,
        mode: GenMode,
        moves: &mut MoveList,
    ) {
        let pieces = self.pieces[us.index()][piece.index()];
        let own = self.occupancy(us);
        let enemy = self.occupancy(us.opponent());

        for from in pieces {
            let mut dest_mask = !own & info.check_mask;
            if info.pinned.contains(from) {
                dest_mask &= info.pin_ray(from);
            }
            let attacks = slider_attack_set(piece, from, self.all_occupancy()) & dest_mask;
            for to in attacks {
                let mv = if enemy.contains(to) { Move::capture(from, to) } else { Move::quiet(from, to) };
                if mode == GenMode::All || mv.is_capture() {
                    moves.push(mv);
                }
            }
        }
    }
}
