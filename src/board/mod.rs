//! Board representation and legal move machinery.
//!
//! Bitboard based with magic-multiplier slider attacks, incremental
//! zobrist hashing and make/unmake with a full undo stack.
//!
//! # Example
//! ```
//! use delocto::board::Board;
//!
//! let board = Board::new();
//! let moves = board.generate_legal();
//! assert_eq!(moves.len(), 20);
//! ```

pub mod bitboards;
pub mod error;
mod fen;
pub mod magics;
mod make_unmake;
pub mod movegen;
mod see;
mod state;
pub mod types;
pub mod zobrist;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError};
pub use movegen::GenType;
pub use see::SEE_VALUES;
pub use state::{Board, StateInfo, INITIAL_POSITION_FEN};
pub use types::{Bitboard, Color, Move, MoveList, Piece, Score, Square};

/// Build every precomputed table. Called once at startup.
pub fn init() {
    zobrist::init();
    bitboards::init();
}
