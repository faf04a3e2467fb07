//! Playing and unplaying moves.
//!
//! Every mutation keeps the three zobrist keys, the piece-square and
//! material terms and the check information current. `undo_move` restores
//! the previous `StateInfo` wholesale from the undo stack, so only the
//! piece placement has to be rewound by hand.

use crate::eval::pst::{material_value, psqt};

use super::state::{Board, StateInfo};
use super::types::bitboard::bit;
use super::types::moves::{Move, CASTLING, ENPASSANT, NORMAL};
use super::types::piece::{Color, Piece};
use super::types::square::{
    down, file, up, Square, SQUARE_NONE, SQ_G1, SQ_G8,
};
use super::zobrist;

/// Castling rights that survive a move touching each square. Both the
/// from- and to-square masks are applied, so moving a king or rook and
/// capturing a rook on its home square all drop the right.
#[rustfmt::skip]
const CASTLE_MASK: [u8; 64] = [
    14, 15, 15, 12, 15, 15, 15, 13,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    11, 15, 15,  3, 15, 15, 15,  7,
];

impl Board {
    #[inline]
    fn hash_piece(&mut self, color: Color, pt: Piece, sq: Square) {
        self.state.hash_key ^= zobrist::piece_key(color, pt, sq);
    }

    #[inline]
    fn hash_pawn(&mut self, color: Color, sq: Square) {
        self.state.pawn_key ^= zobrist::pawn_key(color, sq);
    }

    #[inline]
    fn hash_castling(&mut self) {
        self.state.hash_key ^= zobrist::castling_key(self.state.castling);
    }

    #[inline]
    fn hash_turn(&mut self) {
        self.state.hash_key ^= zobrist::turn_key(self.stm);
    }

    #[inline]
    fn hash_en_passant(&mut self) {
        if self.state.en_passant != SQUARE_NONE {
            self.state.hash_key ^= zobrist::en_passant_key(file(self.state.en_passant));
        }
    }

    #[inline]
    fn hash_material(&mut self, color: Color, pt: Piece) {
        self.state.material_key ^= zobrist::material_key(
            color,
            pt,
            self.piece_counts[color.index()][pt.index()] as usize,
        );
    }

    /// Compute all three keys from scratch for the current placement.
    #[must_use]
    pub fn compute_keys(&self) -> (u64, u64, u64) {
        let mut hash = 0u64;
        let mut pawn = 0u64;
        let mut material = 0u64;

        for sq in 0..64 {
            if let Some(pt) = self.piece_on[sq] {
                let color = self.owner(sq);
                hash ^= zobrist::piece_key(color, pt, sq);
                if pt == Piece::Pawn {
                    pawn ^= zobrist::pawn_key(color, sq);
                }
            }
        }

        for color in [Color::White, Color::Black] {
            for pt in crate::board::types::piece::ALL_PIECES {
                material ^= zobrist::material_key(
                    color,
                    pt,
                    self.piece_counts[color.index()][pt.index()] as usize,
                );
            }
        }

        if self.state.en_passant != SQUARE_NONE {
            hash ^= zobrist::en_passant_key(file(self.state.en_passant));
        }
        hash ^= zobrist::castling_key(self.state.castling);
        hash ^= zobrist::turn_key(self.stm);

        (hash, pawn, material)
    }

    pub(crate) fn calc_keys(&mut self) {
        let (hash, pawn, material) = self.compute_keys();
        self.state.hash_key = hash;
        self.state.pawn_key = pawn;
        self.state.material_key = material;
    }

    /// Refresh king blockers and the checkers bitboard.
    pub(crate) fn update_check_info(&mut self) {
        self.state.king_blockers[Color::White.index()] =
            self.slider_blockers(self.pieces(Color::Black), self.king_square(Color::White));
        self.state.king_blockers[Color::Black.index()] =
            self.slider_blockers(self.pieces(Color::White), self.king_square(Color::Black));
        self.state.checkers =
            self.sq_attackers(!self.stm, self.king_square(self.stm), self.all_pieces());
    }

    fn add_piece(&mut self, color: Color, pt: Piece, sq: Square) {
        self.hash_material(color, pt);

        self.bb_colors[color.index()] |= bit(sq);
        self.bb_pieces[pt.index()] |= bit(sq);
        self.piece_on[sq] = Some(pt);
        self.piece_counts[color.index()][pt.index()] += 1;

        self.state.material[color.index()] += material_value(pt);
        self.state.pst[color.index()] += psqt(color, pt, sq);

        self.hash_material(color, pt);
        self.hash_piece(color, pt, sq);
        if pt == Piece::Pawn {
            self.hash_pawn(color, sq);
        }
    }

    fn remove_piece(&mut self, sq: Square) {
        let color = self.owner(sq);
        let pt = self.piece_on[sq].expect("remove_piece on empty square");

        self.hash_material(color, pt);

        self.bb_colors[color.index()] ^= bit(sq);
        self.bb_pieces[pt.index()] ^= bit(sq);
        self.piece_on[sq] = None;
        self.piece_counts[color.index()][pt.index()] -= 1;

        self.state.material[color.index()] -= material_value(pt);
        self.state.pst[color.index()] -= psqt(color, pt, sq);

        self.hash_material(color, pt);
        self.hash_piece(color, pt, sq);
        if pt == Piece::Pawn {
            self.hash_pawn(color, sq);
        }
    }

    fn move_piece(&mut self, from_sq: Square, to_sq: Square) {
        let color = self.owner(from_sq);
        let pt = self.piece_on[from_sq].expect("move_piece on empty square");

        self.bb_colors[color.index()] ^= bit(from_sq) | bit(to_sq);
        self.bb_pieces[pt.index()] ^= bit(from_sq) | bit(to_sq);
        self.piece_on[from_sq] = None;
        self.piece_on[to_sq] = Some(pt);

        self.state.pst[color.index()] -= psqt(color, pt, from_sq);
        self.state.pst[color.index()] += psqt(color, pt, to_sq);

        self.hash_piece(color, pt, from_sq);
        self.hash_piece(color, pt, to_sq);
        if pt == Piece::Pawn {
            self.hash_pawn(color, from_sq);
            self.hash_pawn(color, to_sq);
        }
    }

    /// Play a move. The move must be valid and legal.
    pub fn do_move(&mut self, mv: Move) {
        debug_assert!(mv != super::types::moves::MOVE_NONE);
        debug_assert!(self.is_valid(mv));
        debug_assert!(self.is_legal(mv));

        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();
        let move_type = mv.move_type();
        let piece = self.piece_on[from_sq].expect("no piece on from-square");
        let captured = self.piece_on[to_sq];

        self.states.push(self.state.clone());
        self.played.push(mv);

        // Hash out the state-dependent keys before changing them.
        self.hash_en_passant();
        self.hash_castling();

        self.state.captured = captured;
        self.state.checkers = 0;
        self.state.en_passant = SQUARE_NONE;
        self.state.fifty_moves += 1;

        if captured.is_some() {
            self.remove_piece(to_sq);
            self.state.fifty_moves = 0;
        }

        self.move_piece(from_sq, to_sq);
        self.state.castling &= CASTLE_MASK[from_sq] & CASTLE_MASK[to_sq];

        match move_type {
            NORMAL => {
                if piece == Piece::Pawn {
                    self.state.fifty_moves = 0;
                    if (from_sq as i32 - to_sq as i32).abs() == 16 {
                        let push_sq = (from_sq as i32 + up(self.stm)) as Square;
                        // Record the ep square only if an enemy pawn can use it.
                        if super::bitboards::pawn_attacks(self.stm, push_sq)
                            & self.colored(!self.stm, Piece::Pawn)
                            != 0
                        {
                            self.state.en_passant = push_sq;
                            self.hash_en_passant();
                        }
                    }
                }
            }
            CASTLING => {
                let (rook_from, rook_to) = if to_sq == SQ_G1 || to_sq == SQ_G8 {
                    (to_sq - 1, to_sq + 1)
                } else {
                    (to_sq + 2, to_sq - 1)
                };
                self.move_piece(rook_from, rook_to);
            }
            ENPASSANT => {
                let cap_sq = (to_sq as i32 + down(self.stm)) as Square;
                self.remove_piece(cap_sq);
                self.state.fifty_moves = 0;
            }
            _ => {
                // Promotion: swap the pawn for the promoted piece.
                self.remove_piece(to_sq);
                self.add_piece(self.stm, mv.promotion_piece(), to_sq);
                self.state.fifty_moves = 0;
            }
        }

        self.hash_castling();

        self.hash_turn();
        self.stm = !self.stm;
        self.hash_turn();

        self.bb_colors[2] =
            self.bb_colors[Color::White.index()] | self.bb_colors[Color::Black.index()];

        self.update_check_info();
        self.ply += 1;
    }

    /// Undo the last played move.
    pub fn undo_move(&mut self) {
        let mv = self.played.pop().expect("undo_move with no move played");

        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();

        self.move_piece(to_sq, from_sq);

        if let Some(captured) = self.state.captured {
            self.add_piece(self.stm, captured, to_sq);
        }

        match mv.move_type() {
            NORMAL => {}
            CASTLING => {
                let (rook_from, rook_to) = if to_sq == SQ_G1 || to_sq == SQ_G8 {
                    (to_sq - 1, to_sq + 1)
                } else {
                    (to_sq + 2, to_sq - 1)
                };
                self.move_piece(rook_to, rook_from);
            }
            ENPASSANT => {
                let cap_sq = (to_sq as i32 + down(!self.stm)) as Square;
                self.add_piece(self.stm, Piece::Pawn, cap_sq);
            }
            _ => {
                self.remove_piece(from_sq);
                self.add_piece(!self.stm, Piece::Pawn, from_sq);
            }
        }

        self.bb_colors[2] =
            self.bb_colors[Color::White.index()] | self.bb_colors[Color::Black.index()];

        self.stm = !self.stm;
        self.ply -= 1;

        self.state = self.states.pop().expect("state stack underflow");
    }

    /// Pass the turn. Only the side to move, the ep square and the keys
    /// change; used by null-move pruning.
    pub fn do_nullmove(&mut self) {
        self.states.push(self.state.clone());

        self.hash_en_passant();
        self.state.en_passant = SQUARE_NONE;

        self.hash_turn();
        self.stm = !self.stm;
        self.hash_turn();

        self.update_check_info();
        self.ply += 1;
    }

    pub fn undo_nullmove(&mut self) {
        self.stm = !self.stm;
        self.ply -= 1;
        self.state = self.states.pop().expect("state stack underflow");
    }

    /// The undo record that would be restored by `undo_move`.
    #[must_use]
    pub fn previous_state(&self) -> Option<&StateInfo> {
        self.states.last()
    }

    /// The most recently played move, if any.
    #[must_use]
    pub fn last_move(&self) -> Option<Move> {
        self.played.last().copied()
    }
}
