//! Move generation, validity and legality tests.

use super::{find_move, sq};
use crate::board::types::moves::{Move, CASTLING, NORMAL};
use crate::board::types::piece::Color;
use crate::board::{Board, GenType};

#[test]
fn test_startpos_has_twenty_moves() {
    let board = Board::new();
    assert_eq!(board.generate_legal().len(), 20);
    // Nothing to capture yet.
    assert_eq!(board.generate(GenType::Captures).len(), 0);
    assert_eq!(board.generate(GenType::Quiets).len(), 20);
}

#[test]
fn test_legal_is_subset_of_pseudo_legal() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "4k3/8/8/8/8/8/3r4/4K3 w - - 0 1",
    ];

    for fen in fens {
        let board = Board::from_fen(fen).unwrap();
        let pseudo = board.generate_all();
        let legal = board.generate_legal();

        assert!(legal.len() <= pseudo.len());
        for &mv in legal.iter() {
            assert!(pseudo.contains(mv), "{fen}: {mv} legal but not generated");
            // Every legal move also passes the cheap validity test.
            assert!(board.is_valid(mv), "{fen}: legal {mv} fails is_valid");
        }
    }
}

#[test]
fn test_check_consistency() {
    let in_check = Board::from_fen("4k3/8/8/8/8/8/3r4/4K3 w - - 0 1").unwrap();
    assert!(in_check.in_check());
    assert!(in_check.sq_attacked(in_check.king_square(Color::White), Color::Black));

    let quiet = Board::new();
    assert!(!quiet.in_check());
    assert!(!quiet.sq_attacked(quiet.king_square(Color::White), Color::Black));
}

#[test]
fn test_pinned_piece_moves_stay_on_line() {
    // The e-file knight is pinned by the rook: it has no legal move.
    let board = Board::from_fen("4r1k1/8/8/8/8/4N3/8/4K3 w - - 0 1").unwrap();
    for &mv in board.generate_legal().iter() {
        assert_ne!(mv.from_sq(), sq("e3"), "pinned knight moved: {mv}");
    }

    // A pinned rook may still slide along the pin line.
    let board = Board::from_fen("4r1k1/8/8/8/8/4R3/8/4K3 w - - 0 1").unwrap();
    let legal = board.generate_legal();
    assert!(legal.contains(find_move(&board, "e3e4")));
    assert!(legal.contains(find_move(&board, "e3e8")));
    assert!(!legal
        .iter()
        .any(|m| m.from_sq() == sq("e3") && m.to_sq() == sq("a3")));
}

#[test]
fn test_en_passant_revealing_pin_is_illegal() {
    // Capturing en passant would clear both pawns off the fifth rank and
    // expose the king to the h5 rook.
    let pinned = Board::from_fen("8/8/8/KPp4r/5p1k/8/4P1P1/8 w - c6 0 2").unwrap();
    assert!(pinned.parse_move("b5c6").is_err());

    // Without the rook the same capture is perfectly fine.
    let free = Board::from_fen("8/8/8/KPp5/5p1k/8/4P1P1/8 w - c6 0 2").unwrap();
    assert!(free.parse_move("b5c6").is_ok());
}

#[test]
fn test_evasion_generation() {
    // Rook gives check along the e-file; the king has to step aside.
    let board = Board::from_fen("4k3/8/8/8/4r3/8/3P4/R3K3 w - - 0 1").unwrap();
    assert!(board.in_check());
    let legal = board.generate_legal();

    assert!(legal.contains(find_move(&board, "e1d1")));
    assert!(legal.contains(find_move(&board, "e1f1")));
    assert!(legal.contains(find_move(&board, "e1f2")));
    // The pawn cannot block and may not move.
    assert!(!legal.iter().any(|m| m.from_sq() == sq("d2")));

    // With a blocker available, blocking is generated too.
    let board = Board::from_fen("4k3/8/8/8/4r3/8/2NP4/4K3 w - - 0 1").unwrap();
    assert!(board.generate_legal().contains(find_move(&board, "c2e3")));
}

#[test]
fn test_double_check_only_king_moves() {
    // Knight and rook both give check.
    let board = Board::from_fen("4k3/8/8/8/4r3/5n2/3P4/4K3 w - - 0 1").unwrap();
    assert_eq!(board.checkers().count_ones(), 2);
    for &mv in board.generate_legal().iter() {
        assert_eq!(mv.from_sq(), board.king_square(Color::White));
    }
}

#[test]
fn test_promotions_generate_all_four_pieces() {
    let board = Board::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
    let promos: Vec<Move> = board
        .generate_legal()
        .iter()
        .copied()
        .filter(|m| m.is_promotion())
        .collect();
    assert_eq!(promos.len(), 4);
}

#[test]
fn test_underpromotion_capture() {
    let board = Board::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let mv = find_move(&board, "a7b8n");
    assert!(mv.is_promotion());
    assert!(board.is_capture(mv));
}

#[test]
fn test_castling_validity_rules() {
    // All rights, clear paths: both castlings are legal.
    let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(board.parse_move("e1g1").is_ok());
    assert!(board.parse_move("e1c1").is_ok());

    // A piece in the way blocks it.
    let blocked = Board::from_fen("r3k2r/8/8/8/8/8/8/R2QK2R w KQkq - 0 1").unwrap();
    assert!(blocked.parse_move("e1c1").is_err());
    assert!(blocked.parse_move("e1g1").is_ok());

    // Castling through an attacked square is illegal.
    let through_check = Board::from_fen("r3k2r/8/8/8/8/5r2/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(through_check.parse_move("e1g1").is_err());
    // The queenside path is not attacked here.
    assert!(through_check.parse_move("e1c1").is_ok());

    // No castling while in check.
    let in_check = Board::from_fen("r3k2r/8/8/8/8/4r3/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(in_check.parse_move("e1g1").is_err());
    assert!(in_check.parse_move("e1c1").is_err());
}

#[test]
fn test_is_valid_rejects_garbage_moves() {
    let board = Board::new();
    // From an empty square.
    assert!(!board.is_valid(Move::new(sq("e4"), sq("e5"), NORMAL)));
    // Moving the opponent's piece.
    assert!(!board.is_valid(Move::new(sq("e7"), sq("e5"), NORMAL)));
    // Capturing an own piece.
    assert!(!board.is_valid(Move::new(sq("d1"), sq("d2"), NORMAL)));
    // A knight to an unreachable square.
    assert!(!board.is_valid(Move::new(sq("b1"), sq("b3"), NORMAL)));
    // Castling without the path being free.
    assert!(!board.is_valid(Move::new(sq("e1"), sq("g1"), CASTLING)));
    // Pawn "capture" to an empty square.
    assert!(!board.is_valid(Move::new(sq("e2"), sq("d3"), NORMAL)));
}

#[test]
fn test_is_valid_in_check() {
    let board = Board::from_fen("4k3/8/8/8/4r3/8/3P4/4K3 w - - 0 1").unwrap();
    for &mv in board.generate_legal().iter() {
        assert!(board.is_valid(mv), "{mv}");
    }
    // A move that ignores the check is invalid.
    assert!(!board.is_valid(Move::new(sq("d2"), sq("d3"), NORMAL)));
    // So is a king step that stays on the checking line.
    assert!(!board.is_valid(Move::new(sq("e1"), sq("e2"), NORMAL)));
}

#[test]
fn test_gives_check_direct_and_discovered() {
    // Rook lift gives a direct check.
    let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    assert!(board.gives_check(find_move(&board, "a1a8")));
    assert!(!board.gives_check(find_move(&board, "a1b1")));

    // Moving the bishop discovers the rook behind it.
    let board = Board::from_fen("4k3/8/8/8/8/4B3/8/K3R3 w - - 0 1").unwrap();
    assert!(board.gives_check(find_move(&board, "e3d4")));

    // The same bishop move without a slider behind it checks nothing.
    let board = Board::from_fen("4k3/8/8/8/8/4B3/8/K7 w - - 0 1").unwrap();
    assert!(!board.gives_check(find_move(&board, "e3d4")));
}

#[test]
fn test_stalemate_no_moves_not_in_check() {
    let board = Board::from_fen("k7/8/K7/8/8/8/1R6/8 b - - 0 1").unwrap();
    assert_eq!(board.generate_legal().len(), 0);
    assert!(!board.in_check());
}

#[test]
fn test_checkmate_no_moves_in_check() {
    let board = Board::from_fen("7k/7Q/7K/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(board.generate_legal().len(), 0);
    assert!(board.in_check());
}
