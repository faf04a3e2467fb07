//! Board-level test suites.

mod make_unmake;
mod movegen;
mod perft;

use super::Board;
use super::types::moves::Move;
use super::types::square::square_from_name;

/// Find a legal move by coordinates, panicking when absent.
pub(crate) fn find_move(board: &Board, text: &str) -> Move {
    board
        .parse_move(text)
        .unwrap_or_else(|e| panic!("move {text} not found: {e}"))
}

pub(crate) fn sq(name: &str) -> usize {
    square_from_name(name).unwrap()
}
