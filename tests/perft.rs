//! Perft node-count properties from spec §8, run as integration tests
//! against the crate's public API rather than `#[cfg(test)]` units inside
//! `board/`, since these exercise the whole move generator/make-unmake
//! pipeline end to end rather than one module in isolation.
//!
//! The deeper counts (d=5, d=6 for the initial position) visit tens to
//! hundreds of millions of nodes; they're kept as `#[ignore]`d so a normal
//! `cargo test` run stays fast, the same tradeoff most engine repos make
//! for their slowest perft cases.

use talon::board::Board;

#[test]
fn perft_initial_position_shallow() {
    let mut board = Board::new();
    assert_eq!(board.perft(1), 20);
    assert_eq!(board.perft(2), 400);
    assert_eq!(board.perft(3), 8_902);
    assert_eq!(board.perft(4), 197_281);
}

#[test]
#[ignore = "visits ~4.9M nodes; run with --ignored for the full perft sweep"]
fn perft_initial_position_depth_five() {
    let mut board = Board::new();
    assert_eq!(board.perft(5), 4_865_609);
}

#[test]
#[ignore = "visits ~119M nodes; run with --ignored for the full perft sweep"]
fn perft_initial_position_depth_six() {
    let mut board = Board::new();
    assert_eq!(board.perft(6), 119_060_324);
}

#[test]
fn perft_kiwipete() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(1), 48);
    assert_eq!(board.perft(2), 2_039);
    assert_eq!(board.perft(3), 97_862);
}

#[test]
#[ignore = "visits ~4M nodes"]
fn perft_kiwipete_depth_four() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(4), 4_085_603);
}

#[test]
fn perft_endgame_position() {
    let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(1), 14);
    assert_eq!(board.perft(2), 191);
    assert_eq!(board.perft(3), 2_812);
    assert_eq!(board.perft(4), 43_238);
}

#[test]
#[ignore = "visits ~675K nodes"]
fn perft_endgame_position_depth_five() {
    let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(5), 674_624);
}

#[test]
fn perft_promotion_and_en_passant_torture() {
    let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(1), 6);
    assert_eq!(board.perft(2), 264);
    assert_eq!(board.perft(3), 9_467);
}

#[test]
#[ignore = "visits ~422K nodes"]
fn perft_promotion_and_en_passant_torture_depth_four() {
    let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    let mut board = Board::from_fen(fen).unwrap();
    assert_eq!(board.perft(4), 422_333);
}
