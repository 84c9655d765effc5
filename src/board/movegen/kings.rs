//! King moves, including castling.

use crate::types::{Bitboard, Color, Move, MoveList, Square};

use super::super::attack_tables::king_attacks;
use super::{CheckInfo, GenMode};
use crate::board::Board;

impl Board {
    pub(crate) fn generate_king_moves(
        &self,
        us: Color,
        info: &CheckInfo,
        mode: GenMode,
        moves: &mut MoveList,
    ) {
        let them = us.opponent();
        let from = info.king_sq;
        let own = self.occupancy(us);
        let enemy = self.occupancy(them);

        // Remove the king from occupancy so a slider it currently blocks
        // doesn't appear to stop attacking the square behind it (spec §4.C:
        // "computed with the king removed from occupancy to avoid
        // shielding itself against sliders").
        let occ_without_king = self.all_occupied.clear(from);

        let attacks = Bitboard(king_attacks(from.index())) & !own;
        for to in attacks {
            if self.attackers_to(to, them, occ_without_king).is_empty() {
                let mv = if enemy.contains(to) { Move::capture(from, to) } else { Move::quiet(from, to) };
                if mode == GenMode::All || mv.is_capture() {
                    moves.push(mv);
                }
            }
        }

        if mode == GenMode::All && info.checkers.is_empty() {
            self.generate_castles(us, from, moves);
        }
    }

    fn generate_castles(&self, us: Color, from: Square, moves: &mut MoveList) {
        let them = us.opponent();
        let rank = from.rank();

        if self.can_castle(us, true) {
            let f = Square::new(rank, 5);
            let g = Square::new(rank, 6);
            let path_clear = !self.all_occupied.contains(f) && !self.all_occupied.contains(g);
            if path_clear
                && self.attackers_to(f, them, self.all_occupied).is_empty()
                && self.attackers_to(g, them, self.all_occupied).is_empty()
            {
                moves.push(Move::castle_kingside(from, g));
            }
        }
        if self.can_castle(us, false) {
            let d = Square::new(rank, 3);
            let c = Square::new(rank, 2);
            let b = Square::new(rank, 1);
            let path_clear =
                !self.all_occupied.contains(d) && !self.all_occupied.contains(c) && !self.all_occupied.contains(b);
            if path_clear
                && self.attackers_to(d, them, self.all_occupied).is_empty()
                && self.attackers_to(c, them, self.all_occupied).is_empty()
            {
                moves.push(Move::castle_queenside(from, c));
            }
        }
    }
}
