//! End-to-end search tests through the thread pool.

use std::sync::Arc;

use delocto::board::Board;
use delocto::search::SearchLimits;
use delocto::threads::ThreadPool;
use delocto::tt::TranspositionTable;

fn search_position(fen: &str, depth: i32, threads: usize) -> (String, u64) {
    delocto::init();
    let tt = Arc::new(TranspositionTable::new(16));
    let mut pool = ThreadPool::new(threads, tt);
    let board = Board::from_fen(fen).expect("valid FEN");

    let limits = SearchLimits {
        depth,
        ..SearchLimits::default()
    };
    pool.start_search(&board, limits, 0);
    pool.wait();

    (pool.best_move().to_string(), pool.nodes())
}

#[test]
fn test_finds_mate_in_one() {
    let (best, _) = search_position("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", 3, 1);
    assert_eq!(best, "a1a8");
}

#[test]
fn test_finds_back_rank_mate_as_black() {
    let (best, _) = search_position("r5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1", 3, 1);
    assert_eq!(best, "a8a1");
}

#[test]
fn test_takes_hanging_queen() {
    let (best, _) = search_position("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1", 4, 1);
    assert_eq!(best, "e4d5");
}

#[test]
fn test_mate_reports_none() {
    // Black is already checkmated; there is no move to report.
    let (best, _) = search_position("7k/7Q/7K/8/8/8/8/8 b - - 0 1", 3, 1);
    assert_eq!(best, "none");
}

#[test]
fn test_stalemate_reports_none() {
    let (best, _) = search_position("k7/8/K7/8/8/8/1R6/8 b - - 0 1", 3, 1);
    assert_eq!(best, "none");
}

#[test]
fn test_depth_one_returns_legal_move() {
    delocto::init();
    let board = Board::new();
    let (best, _) = search_position(&board.get_fen(), 1, 1);
    assert!(board.parse_move(&best).is_ok(), "illegal best move {best}");
}

#[test]
fn test_node_limit_respected() {
    delocto::init();
    let tt = Arc::new(TranspositionTable::new(16));
    let mut pool = ThreadPool::new(1, tt);
    let board = Board::new();

    let limits = SearchLimits {
        nodes: 5000,
        ..SearchLimits::default()
    };
    pool.start_search(&board, limits, 0);
    pool.wait();

    // The poll interval allows a modest overshoot, nothing more.
    assert!(pool.nodes() < 200_000, "searched {} nodes", pool.nodes());
}

#[test]
fn test_smp_search_completes() {
    let (best, nodes) = search_position(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        5,
        3,
    );
    assert_ne!(best, "none");
    assert!(nodes > 0);
}

#[test]
fn test_deeper_search_prefers_promotion_push() {
    let (best, _) = search_position("8/5P2/8/8/8/1k6/8/1K6 w - - 0 1", 6, 1);
    assert_eq!(best, "f7f8q");
}
