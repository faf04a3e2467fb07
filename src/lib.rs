//! Delocto, a UCI chess engine.
//!
//! Bitboard board representation with magic slider attacks, a
//! hand-crafted (midgame, endgame) evaluation with pawn and material
//! caches, a principal-variation alpha-beta search with the usual
//! pruning arsenal, and a lazy-SMP worker pool sharing one lock-free
//! transposition table.

pub mod bench;
pub mod board;
pub mod eval;
pub mod perft;
pub mod search;
pub mod threads;
pub mod tt;
pub mod uci;

/// Build every precomputed table. Call once at startup; everything is
/// lazily initialized anyway, this just front-loads the cost.
pub fn init() {
    board::init();
    eval::init();
    search::init();
}
