//! Board-level invariant and perft tests (spec §8).

use super::Board;
use crate::types::{Color, Square};

#[test]
fn insufficient_material_kvk_is_draw() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(board.is_draw());
}

#[test]
fn king_and_knight_vs_king_is_draw() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/3NK3 w - - 0 1").unwrap();
    assert!(board.is_draw());
}

#[test]
fn king_and_two_knights_vs_king_is_not_declared_draw() {
    // Open Question #3: drawable with best defense, but not forced, so the
    // engine must not declare it.
    let board = Board::from_fen("4k3/8/8/8/8/8/8/2NNK3 w - - 0 1").unwrap();
    assert!(!board.is_draw());
}

#[test]
fn same_color_bishops_vs_bishops_is_draw() {
    // b8 (dark) and c1 (dark).
    let board = Board::from_fen("1b2k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
    assert!(board.is_draw());
}

#[test]
fn opposite_color_bishops_vs_bishops_is_not_draw() {
    // b8 (dark) and b1 (light).
    let board = Board::from_fen("1b2k3/8/8/8/8/8/1B2K3/8 w - - 0 1").unwrap();
    assert!(!board.is_draw());
}

#[test]
fn fifty_move_rule_triggers_draw() {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 99 50").unwrap();
    let mv = board
        .generate_moves()
        .iter()
        .find(|m| !m.is_capture())
        .copied()
        .unwrap();
    board.make_move(mv);
    assert!(board.is_draw());
}

#[test]
fn threefold_repetition_is_detected() {
    let mut board = Board::new();
    let ng1 = crate::types::Move::quiet(Square::new(0, 6), Square::new(2, 5));
    let ng8 = crate::types::Move::quiet(Square::new(7, 6), Square::new(5, 5));
    let back1 = crate::types::Move::quiet(Square::new(2, 5), Square::new(0, 6));
    let back8 = crate::types::Move::quiet(Square::new(5, 5), Square::new(7, 6));
    for _ in 0..2 {
        board.make_move(ng1);
        board.make_move(ng8);
        board.make_move(back1);
        board.make_move(back8);
    }
    assert!(board.is_draw());
}

#[test]
fn is_in_check_detects_simple_check() {
    let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
    assert!(board.is_in_check(Color::White));
    assert!(!board.is_in_check(Color::Black));
}

#[test]
fn perft_initial_position() {
    let mut board = Board::new();
    assert_eq!(board.perft(1), 20);
    assert_eq!(board.perft(2), 400);
    assert_eq!(board.perft(3), 8_902);
    assert_eq!(board.perft(4), 197_281);
}

#[test]
fn perft_kiwipete() {
    let mut board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(board.perft(1), 48);
    assert_eq!(board.perft(2), 2_039);
    assert_eq!(board.perft(3), 97_862);
}

#[test]
fn perft_endgame_position() {
    let mut board = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    assert_eq!(board.perft(1), 14);
    assert_eq!(board.perft(2), 191);
    assert_eq!(board.perft(3), 2_812);
}

#[test]
fn perft_promotion_and_en_passant_torture() {
    let mut board =
        Board::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1").unwrap();
    assert_eq!(board.perft(1), 6);
    assert_eq!(board.perft(2), 264);
    assert_eq!(board.perft(3), 9_467);
}

#[test]
fn game_phase_is_max_at_start_and_zero_when_bare_kings() {
    let start = Board::new();
    assert_eq!(start.game_phase(), 256);
    let bare = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(bare.game_phase(), 0);
}
