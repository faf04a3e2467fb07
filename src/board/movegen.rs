//! Pseudo-legal move generation, validity and legality tests.
//!
//! Generation is split by category (quiets, captures, evasions); the
//! legality filter is applied separately so the search can defer it to
//! the moment a move is actually tried.

use super::bitboards;
use super::magics;
use super::state::{Board, BLACK_LONG, BLACK_SHORT, WHITE_LONG, WHITE_SHORT};
use super::types::bitboard::{bit, lsb_index, pop_lsb, shift_down, shift_up, Bitboard};
use super::types::moves::{
    Move, MoveList, CASTLING, ENPASSANT, NORMAL, PROMOTION_BISHOP, PROMOTION_KNIGHT,
    PROMOTION_QUEEN, PROMOTION_ROOK,
};
use super::types::piece::{Color, Piece};
use super::types::square::{
    relative_rank, up, Square, SQUARE_NONE, SQ_A1, SQ_A8, SQ_B1, SQ_B8, SQ_C1, SQ_C8, SQ_D1,
    SQ_D8, SQ_E1, SQ_E8, SQ_F1, SQ_F8, SQ_G1, SQ_G8, SQ_H1, SQ_H8,
};

/// Move generation categories.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GenType {
    Quiets,
    Captures,
    Evasions,
}

pub const CASTLE_SHORT: usize = 0;
pub const CASTLE_LONG: usize = 1;

pub const CASTLE_TYPES: [[u8; 2]; 2] = [
    [WHITE_SHORT, WHITE_LONG],
    [BLACK_SHORT, BLACK_LONG],
];

pub const KING_INITIAL_SQUARE: [Square; 2] = [SQ_E1, SQ_E8];
pub const CASTLE_KING_TARGET: [[Square; 2]; 2] = [[SQ_G1, SQ_C1], [SQ_G8, SQ_C8]];
pub const CASTLE_ROOK_ORIGIN: [[Square; 2]; 2] = [[SQ_H1, SQ_A1], [SQ_H8, SQ_A8]];

/// Squares that must be empty for each castling.
pub const CASTLE_PATH: [[Bitboard; 2]; 2] = [
    [
        (1 << SQ_F1) | (1 << SQ_G1),
        (1 << SQ_B1) | (1 << SQ_C1) | (1 << SQ_D1),
    ],
    [
        (1 << SQ_F8) | (1 << SQ_G8),
        (1 << SQ_B8) | (1 << SQ_C8) | (1 << SQ_D8),
    ],
];

/// The two encoded castling moves per color.
pub const CASTLE_MOVES: [[Move; 2]; 2] = [
    [
        Move::new(SQ_E1, SQ_G1, CASTLING),
        Move::new(SQ_E1, SQ_C1, CASTLING),
    ],
    [
        Move::new(SQ_E8, SQ_G8, CASTLING),
        Move::new(SQ_E8, SQ_C8, CASTLING),
    ],
];

fn push_promotions(list: &mut MoveList, from_sq: Square, mut targets: Bitboard) {
    while targets != 0 {
        let to_sq = pop_lsb(&mut targets);
        list.push(Move::new(from_sq, to_sq, PROMOTION_QUEEN));
        list.push(Move::new(from_sq, to_sq, PROMOTION_ROOK));
        list.push(Move::new(from_sq, to_sq, PROMOTION_BISHOP));
        list.push(Move::new(from_sq, to_sq, PROMOTION_KNIGHT));
    }
}

impl Board {
    /// Pseudo-legal destination set for a piece on `sq`, own pieces
    /// removed. Used by the cheap validity check.
    fn piece_attacks(&self, pt: Piece, color: Color, sq: Square) -> Bitboard {
        let attacks = match pt {
            Piece::Bishop => magics::bishop_attacks(sq, self.all_pieces()),
            Piece::Rook => magics::rook_attacks(sq, self.all_pieces()),
            Piece::Queen => magics::queen_attacks(sq, self.all_pieces()),
            Piece::Knight => bitboards::knight_attacks(sq),
            Piece::Pawn => bitboards::pawn_attacks(color, sq),
            Piece::King => bitboards::king_attacks(sq),
        };
        attacks & !self.pieces(color)
    }

    fn gen_promotions(&self, list: &mut MoveList, color: Color, targets: Bitboard, captures: bool) {
        // Pawns one step from promotion sit on the opponent's start rank.
        let mut pawns =
            self.colored(color, Piece::Pawn) & bitboards::PAWN_STARTRANK[(!color).index()];
        while pawns != 0 {
            let from_sq = pop_lsb(&mut pawns);
            if captures {
                push_promotions(list, from_sq, bitboards::pawn_attacks(color, from_sq) & targets);
            } else {
                let push = bit((from_sq as i32 + up(color)) as Square);
                push_promotions(list, from_sq, push & targets);
            }
        }
    }

    fn gen_enpassants(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        let ep_sq = self.ep_square();
        if ep_sq != SQUARE_NONE && bit(ep_sq) & targets != 0 {
            let mut pawns =
                bitboards::pawn_attacks(!color, ep_sq) & self.colored(color, Piece::Pawn);
            while pawns != 0 {
                list.push(Move::new(pop_lsb(&mut pawns), ep_sq, ENPASSANT));
            }
        }
    }

    fn gen_pawn_quiets(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        let pawns =
            self.colored(color, Piece::Pawn) & !bitboards::PAWN_STARTRANK[(!color).index()];
        let pushes = shift_up(pawns, color) & !self.all_pieces();
        let mut single = pushes & targets;
        let mut double =
            shift_up(pushes & bitboards::PAWN_FIRST_PUSH_RANK[color.index()], color)
                & !self.all_pieces()
                & targets;

        while single != 0 {
            let to_sq = pop_lsb(&mut single);
            let from_sq = lsb_index(shift_down(bit(to_sq), color));
            list.push(Move::new(from_sq, to_sq, NORMAL));
        }
        while double != 0 {
            let to_sq = pop_lsb(&mut double);
            let from_sq = lsb_index(shift_down(shift_down(bit(to_sq), color), color));
            list.push(Move::new(from_sq, to_sq, NORMAL));
        }
    }

    fn gen_pawn_captures(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        let mut pawns =
            self.colored(color, Piece::Pawn) & !bitboards::PAWN_STARTRANK[(!color).index()];
        while pawns != 0 {
            let from_sq = pop_lsb(&mut pawns);
            let mut attacks = bitboards::pawn_attacks(color, from_sq) & targets;
            while attacks != 0 {
                list.push(Move::new(from_sq, pop_lsb(&mut attacks), NORMAL));
            }
        }
    }

    fn gen_piece_moves(&self, list: &mut MoveList, color: Color, pt: Piece, targets: Bitboard) {
        let mut pieces = self.colored(color, pt);
        while pieces != 0 {
            let from_sq = pop_lsb(&mut pieces);
            let mut moves = match pt {
                Piece::Knight => bitboards::knight_attacks(from_sq),
                Piece::Bishop => magics::bishop_attacks(from_sq, self.all_pieces()),
                Piece::Rook => magics::rook_attacks(from_sq, self.all_pieces()),
                Piece::Queen => magics::queen_attacks(from_sq, self.all_pieces()),
                _ => unreachable!("pawns and kings have dedicated generators"),
            } & targets;
            while moves != 0 {
                list.push(Move::new(from_sq, pop_lsb(&mut moves), NORMAL));
            }
        }
    }

    fn gen_king_moves(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        let from_sq = self.king_square(color);
        let mut moves = bitboards::king_attacks(from_sq) & targets;
        while moves != 0 {
            list.push(Move::new(from_sq, pop_lsb(&mut moves), NORMAL));
        }
    }

    fn gen_quiet_pieces(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        self.gen_piece_moves(list, color, Piece::Knight, targets);
        self.gen_piece_moves(list, color, Piece::Bishop, targets);
        self.gen_piece_moves(list, color, Piece::Rook, targets);
        self.gen_piece_moves(list, color, Piece::Queen, targets);
        self.gen_pawn_quiets(list, color, targets);
        self.gen_king_moves(list, color, !self.all_pieces());
    }

    fn gen_capture_pieces(&self, list: &mut MoveList, color: Color, targets: Bitboard) {
        self.gen_king_moves(list, color, self.pieces(!color));
        self.gen_pawn_captures(list, color, targets);
        self.gen_piece_moves(list, color, Piece::Knight, targets);
        self.gen_piece_moves(list, color, Piece::Bishop, targets);
        self.gen_piece_moves(list, color, Piece::Rook, targets);
        self.gen_piece_moves(list, color, Piece::Queen, targets);
    }

    fn gen_castlings(&self, list: &mut MoveList, color: Color) {
        if self.is_castling_valid(CASTLE_SHORT) {
            list.push(CASTLE_MOVES[color.index()][CASTLE_SHORT]);
        }
        if self.is_castling_valid(CASTLE_LONG) {
            list.push(CASTLE_MOVES[color.index()][CASTLE_LONG]);
        }
    }

    /// Generate pseudo-legal moves of one category for the side to move.
    #[must_use]
    pub fn generate(&self, gen: GenType) -> MoveList {
        let color = self.stm;
        let mut list = MoveList::new();

        match gen {
            GenType::Quiets => {
                let targets = !self.all_pieces();
                self.gen_promotions(&mut list, color, targets, false);
                self.gen_castlings(&mut list, color);
                self.gen_quiet_pieces(&mut list, color, targets);
            }
            GenType::Captures => {
                let targets = self.pieces(!color);
                self.gen_promotions(&mut list, color, targets, true);
                self.gen_capture_pieces(&mut list, color, targets);
                self.gen_enpassants(&mut list, color, bit(self.ep_square()));
            }
            GenType::Evasions => {
                debug_assert!(self.checkers() != 0);

                let checkers = self.checkers();
                if checkers.count_ones() >= 2 {
                    // Double check: only the king can move.
                    self.gen_king_moves(&mut list, color, !self.pieces(color));
                    return list;
                }

                let king_sq = self.king_square(color);
                let checker_sq = lsb_index(checkers);

                // Blocking squares between checker and king. For contact
                // checks (knight, pawn) the ray is empty and only the
                // capture of the checker remains.
                let block_targets = bitboards::ray(checker_sq, king_sq) & !self.all_pieces();

                self.gen_promotions(&mut list, color, block_targets, false);
                self.gen_quiet_pieces(&mut list, color, block_targets);
                self.gen_promotions(&mut list, color, checkers, true);
                self.gen_capture_pieces(&mut list, color, checkers);
                if checkers & self.colored(!color, Piece::Pawn) != 0 {
                    self.gen_enpassants(&mut list, color, bit(self.ep_square()));
                }
            }
        }

        list
    }

    /// All pseudo-legal moves (quiets then captures), or all evasions
    /// when in check.
    #[must_use]
    pub fn generate_all(&self) -> MoveList {
        if self.in_check() {
            return self.generate(GenType::Evasions);
        }
        let mut list = self.generate(GenType::Quiets);
        let captures = self.generate(GenType::Captures);
        list.extend(&captures);
        list
    }

    /// All legal moves for the side to move.
    #[must_use]
    pub fn generate_legal(&self) -> MoveList {
        let mut legal = MoveList::new();
        for &mv in self.generate_all().iter() {
            if self.is_legal(mv) {
                legal.push(mv);
            }
        }
        legal
    }

    /// True if castling `side` (0 = short, 1 = long) is currently
    /// possible: rights held, king and rook at home, path empty, and the
    /// king not in check. Attacks on the traversed squares are the
    /// legality test's business.
    #[must_use]
    pub fn is_castling_valid(&self, side: usize) -> bool {
        if self.checkers() != 0 {
            return false;
        }
        let color = self.stm.index();
        self.state.castling & CASTLE_TYPES[color][side] != 0
            && self.colored(self.stm, Piece::King) & bit(KING_INITIAL_SQUARE[color]) != 0
            && self.colored(self.stm, Piece::Rook) & bit(CASTLE_ROOK_ORIGIN[color][side]) != 0
            && self.all_pieces() & CASTLE_PATH[color][side] == 0
    }

    /// Cheap pseudo-legality test for a move that may come from the
    /// transposition table, a killer slot or the countermove table, i.e.
    /// from an arbitrary 16-bit pattern.
    #[must_use]
    pub fn is_valid(&self, mv: Move) -> bool {
        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();

        let Some(pt) = self.piece_on[from_sq] else {
            return false;
        };
        if self.owner(from_sq) != self.stm || bit(to_sq) & self.pieces(self.stm) != 0 {
            return false;
        }

        let move_type = mv.move_type();

        if move_type == NORMAL {
            if pt == Piece::Pawn {
                // A pawn reaching the final rank must be a promotion.
                if relative_rank(self.stm, to_sq) == 7 {
                    return false;
                }

                let push_sq = from_sq as i32 + up(self.stm);
                let diagonal = bit(to_sq)
                    & bitboards::pawn_attacks(self.stm, from_sq)
                    & self.pieces(!self.stm)
                    != 0;
                let single = push_sq == to_sq as i32 && self.is_sq_empty(to_sq);
                let double = relative_rank(self.stm, from_sq) == 1
                    && from_sq as i32 + 2 * up(self.stm) == to_sq as i32
                    && self.is_sq_empty(push_sq as Square)
                    && self.is_sq_empty(to_sq);
                if !diagonal && !single && !double {
                    return false;
                }
            } else if bit(to_sq) & self.piece_attacks(pt, self.stm, from_sq) == 0 {
                return false;
            }
        } else if move_type == CASTLING {
            let color = self.stm.index();
            let side = if to_sq == CASTLE_KING_TARGET[color][CASTLE_SHORT] {
                CASTLE_SHORT
            } else if to_sq == CASTLE_KING_TARGET[color][CASTLE_LONG] {
                CASTLE_LONG
            } else {
                return false;
            };
            return pt == Piece::King && from_sq == KING_INITIAL_SQUARE[color]
                && self.is_castling_valid(side);
        } else if move_type == ENPASSANT {
            return to_sq == self.ep_square() && pt == Piece::Pawn;
        } else if !mv.is_promotion() {
            // Leftover bit patterns that encode no move type at all.
            return false;
        } else {
            let moves = {
                let push_sq = from_sq as i32 + up(self.stm);
                let push = if self.is_sq_empty(push_sq as Square) {
                    bit(push_sq as Square)
                } else {
                    0
                };
                push | (bitboards::pawn_attacks(self.stm, from_sq) & self.pieces(!self.stm))
            };
            if pt != Piece::Pawn
                || bit(to_sq) & bitboards::PAWN_FINALRANK[self.stm.index()] == 0
                || bit(to_sq) & moves == 0
            {
                return false;
            }
        }

        // When in check the move must resolve the check.
        if self.checkers() != 0 {
            if bit(from_sq) != self.colored(self.stm, Piece::King) {
                let king_sq = self.king_square(self.stm);
                if self.checkers().count_ones() >= 2 {
                    return false;
                }
                let checker_sq = lsb_index(self.checkers());
                if (bitboards::ray(checker_sq, king_sq) | self.checkers()) & bit(to_sq) == 0 {
                    return false;
                }
            } else if self
                .sq_attackers(!self.stm, to_sq, self.all_pieces() ^ bit(from_sq))
                != 0
            {
                return false;
            }
        }

        true
    }

    /// Full legality test: the move must not leave the own king attacked.
    /// Assumes pseudo-legality.
    #[must_use]
    pub fn is_legal(&self, mv: Move) -> bool {
        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();
        let king_sq = self.king_square(self.stm);

        // En passant can expose the king on the rank of both pawns.
        if mv.move_type() == ENPASSANT {
            let cap_sq = (to_sq as i32 - up(self.stm)) as Square;
            let occupied = (self.all_pieces() ^ bit(from_sq) ^ bit(cap_sq)) | bit(to_sq);
            return self.slider_attackers_colored(king_sq, occupied, !self.stm) == 0;
        }

        // No square the king crosses may be attacked.
        if mv.move_type() == CASTLING {
            let step: i32 = if to_sq > from_sq { -1 } else { 1 };
            let mut sq = to_sq as i32;
            while sq != from_sq as i32 {
                if self.sq_attacked(sq as Square, !self.stm) {
                    return false;
                }
                sq += step;
            }
        }

        if from_sq == king_sq {
            return !self.sq_attacked_noking(to_sq, !self.stm);
        }

        // A pinned piece may only move along the pin line.
        bit(from_sq) & self.king_blockers(self.stm) == 0
            || bit(to_sq) & bitboards::line(king_sq, from_sq) != 0
    }

    /// Does this move give check? Detects direct attacks from the
    /// destination square and discovered slider attacks, with the
    /// occupancy rebuilt as the post-move board.
    #[must_use]
    pub fn gives_check(&self, mv: Move) -> bool {
        let from_sq = mv.from_sq();
        let to_sq = mv.to_sq();
        let enemy_king = self.king_square(!self.stm);

        let Some(pt) = self.piece_on[from_sq] else {
            return false;
        };

        if bit(to_sq) & self.check_squares(pt) != 0 {
            return true;
        }

        self.slider_attackers_discovered(self.stm, enemy_king, from_sq, to_sq) != 0
    }

    /// Squares from which a piece of type `pt` owned by the side to move
    /// would attack the enemy king, given the current occupancy.
    fn check_squares(&self, pt: Piece) -> Bitboard {
        let enemy_king = self.king_square(!self.stm);
        match pt {
            Piece::Pawn => bitboards::pawn_attacks(!self.stm, enemy_king),
            Piece::Knight => bitboards::knight_attacks(enemy_king),
            Piece::Bishop => magics::bishop_attacks(enemy_king, self.all_pieces()),
            Piece::Rook => magics::rook_attacks(enemy_king, self.all_pieces()),
            Piece::Queen => magics::queen_attacks(enemy_king, self.all_pieces()),
            Piece::King => 0,
        }
    }
}
