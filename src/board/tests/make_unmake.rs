//! Make/unmake round-trip and key coherence tests.

use rand::prelude::*;

use super::{find_move, sq};
use crate::board::types::piece::{Color, Piece};
use crate::board::Board;

#[test]
fn test_simple_move_round_trip() {
    let mut board = Board::new();
    let fen_before = board.get_fen();
    let keys_before = (board.hashkey(), board.pawnkey(), board.materialkey());

    let mv = find_move(&board, "e2e4");
    board.do_move(mv);
    board.undo_move();

    assert_eq!(board.get_fen(), fen_before);
    assert_eq!(
        (board.hashkey(), board.pawnkey(), board.materialkey()),
        keys_before
    );
}

#[test]
fn test_capture_round_trip() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2").unwrap();
    let fen_before = board.get_fen();

    let mv = find_move(&board, "e4d5");
    board.do_move(mv);
    assert_eq!(board.piece_on(sq("d5")), Some(Piece::Pawn));
    assert_eq!(board.owner(sq("d5")), Color::White);
    board.undo_move();

    assert_eq!(board.get_fen(), fen_before);
}

#[test]
fn test_en_passant_round_trip() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
    let fen_before = board.get_fen();

    let mv = find_move(&board, "e5f6");
    assert!(mv.is_en_passant());
    board.do_move(mv);
    // The captured pawn vanishes from f5.
    assert_eq!(board.piece_on(sq("f5")), None);
    assert_eq!(board.piece_on(sq("f6")), Some(Piece::Pawn));
    board.undo_move();

    assert_eq!(board.get_fen(), fen_before);
}

#[test]
fn test_castling_round_trip_both_sides() {
    for (text, rook_to) in [("e1g1", "f1"), ("e1c1", "d1")] {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let fen_before = board.get_fen();

        let mv = find_move(&board, text);
        assert!(mv.is_castling());
        board.do_move(mv);
        assert_eq!(board.piece_on(sq(rook_to)), Some(Piece::Rook));
        board.undo_move();

        assert_eq!(board.get_fen(), fen_before);
    }
}

#[test]
fn test_promotion_round_trip() {
    let mut board = Board::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
    let fen_before = board.get_fen();

    let mv = find_move(&board, "a7a8q");
    board.do_move(mv);
    assert_eq!(board.piece_on(sq("a8")), Some(Piece::Queen));
    assert_eq!(board.piece_count(Color::White, Piece::Pawn), 0);
    assert_eq!(board.piece_count(Color::White, Piece::Queen), 1);
    board.undo_move();

    assert_eq!(board.get_fen(), fen_before);
    assert_eq!(board.piece_count(Color::White, Piece::Pawn), 1);
}

#[test]
fn test_null_move_round_trip() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
    let hash_before = board.hashkey();
    let side_before = board.turn();

    board.do_nullmove();
    assert_ne!(board.hashkey(), hash_before);
    assert_ne!(board.turn(), side_before);
    // The en-passant square is gone after a null move.
    assert_eq!(board.ep_square(), crate::board::types::square::SQUARE_NONE);

    board.undo_nullmove();
    assert_eq!(board.hashkey(), hash_before);
    assert_eq!(board.turn(), side_before);
}

#[test]
fn test_keys_match_recompute_along_random_game() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut played = 0;

    for _ in 0..120 {
        let moves = board.generate_legal();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.do_move(mv);
        played += 1;

        let (hash, pawn, material) = board.compute_keys();
        assert_eq!(board.hashkey(), hash);
        assert_eq!(board.pawnkey(), pawn);
        assert_eq!(board.materialkey(), material);
    }

    for _ in 0..played {
        board.undo_move();
        let (hash, pawn, material) = board.compute_keys();
        assert_eq!(board.hashkey(), hash);
        assert_eq!(board.pawnkey(), pawn);
        assert_eq!(board.materialkey(), material);
    }

    assert_eq!(board.get_fen(), Board::new().get_fen());
}

#[test]
fn test_round_trip_every_legal_move_kiwipete() {
    let mut board =
        Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let fen_before = board.get_fen();
    let hash_before = board.hashkey();

    let moves = board.generate_legal();
    for &mv in moves.iter() {
        board.do_move(mv);
        board.undo_move();
        assert_eq!(board.get_fen(), fen_before, "after {mv}");
        assert_eq!(board.hashkey(), hash_before, "after {mv}");
    }
}

#[test]
fn test_castling_rights_monotonic() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut rights = board.castle_rights();

    for _ in 0..60 {
        let moves = board.generate_legal();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.do_move(mv);
        let new_rights = board.castle_rights();
        // Once lost, never regained.
        assert_eq!(new_rights & !rights, 0);
        rights = new_rights;
    }
}

#[test]
fn test_rook_capture_clears_castling_rights() {
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/6b1/R3K2R b KQkq - 0 1").unwrap();
    let mv = find_move(&board, "g2h1");
    board.do_move(mv);
    // White can no longer castle short without the h1 rook.
    assert_eq!(
        board.castle_rights() & crate::board::state::WHITE_SHORT,
        0
    );
    assert_ne!(board.castle_rights() & crate::board::state::WHITE_LONG, 0);
}
