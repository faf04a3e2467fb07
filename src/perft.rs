//! Perft: exhaustive move-generation counting.
//!
//! Walks the legal move tree to a fixed depth and counts the leaves.
//! The per-root-move breakdown ("divide") makes generator bugs easy to
//! localize.

use crate::board::Board;

/// Count leaf nodes of the legal move tree below `board`.
#[must_use]
pub fn perft(board: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.generate_legal();

    // At the frontier the move count is the answer.
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut total = 0;
    for &mv in moves.iter() {
        board.do_move(mv);
        total += perft(board, depth - 1);
        board.undo_move();
    }

    total
}

/// Run perft on a FEN and print the per-root-move breakdown.
pub fn run(fen: &str, depth: usize) -> u64 {
    let Ok(mut board) = Board::from_fen(fen) else {
        println!("info string Error: invalid FEN for perft");
        return 0;
    };

    let moves = board.generate_legal();
    let mut total = 0;

    for &mv in moves.iter() {
        let nodes = if depth == 0 {
            0
        } else {
            board.do_move(mv);
            let nodes = perft(&mut board, depth - 1);
            board.undo_move();
            nodes
        };
        total += nodes;
        println!("{mv}: {nodes}");
    }

    println!("Depth({depth}): {total}");
    total
}
