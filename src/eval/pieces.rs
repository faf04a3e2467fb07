//! Per-piece evaluation: mobility, outposts, file control and the
//! attack bookkeeping king safety relies on.

use crate::board::bitboards::{self, king_distance, line, CENTRAL_FILES, CENTRAL_SQUARES};
use crate::board::magics;
use crate::board::types::bitboard::{
    bit, pop_lsb, shift_down, Bitboard, BB_RANK_3, BB_RANK_4, BB_RANK_5, BB_RANK_6, FILES,
};
use crate::board::types::piece::{Color, Piece};
use crate::board::types::score::{s, Score};
use crate::board::types::square::{file, relative_rank};
use crate::board::Board;

use super::EvalInfo;

/// Mobility bonus by piece and number of reachable mobility-area squares.
#[rustfmt::skip]
pub(crate) const MOBILITY: [[Score; 28]; 4] = [
    // Knights
    [
        s(-29, -35), s(-22, -25), s(-5, -12), s(-2, -6), s(2, 4), s(6, 8), s(9, 11), s(12, 14),
        s(14, 15), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0),
    ],
    // Bishops
    [
        s(-21, -32), s(-9, -11), s(8, 1), s(12, 6), s(17, 11), s(21, 16), s(24, 23), s(29, 27),
        s(30, 31), s(32, 34), s(37, 36), s(38, 39), s(41, 40), s(44, 43), s(0, 0), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0),
    ],
    // Rooks
    [
        s(-27, -36), s(-13, -8), s(-7, 12), s(-4, 19), s(-3, 25), s(-1, 36), s(4, 45), s(8, 47),
        s(12, 53), s(12, 57), s(14, 63), s(15, 65), s(17, 67), s(20, 68), s(23, 68), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0), s(0, 0),
        s(0, 0), s(0, 0), s(0, 0), s(0, 0),
    ],
    // Queens
    [
        s(-25, -40), s(-8, -2), s(0, 6), s(1, 9), s(5, 18), s(8, 23), s(12, 28), s(15, 32),
        s(16, 34), s(19, 38), s(21, 42), s(24, 45), s(25, 46), s(27, 46), s(27, 49), s(28, 51),
        s(29, 52), s(30, 54), s(32, 56), s(34, 58), s(35, 62), s(39, 66), s(40, 70), s(40, 75),
        s(41, 79), s(43, 81), s(44, 83), s(45, 84),
    ],
];

/// Weight a piece type adds per attacker when it eyes the enemy king
/// ring (pawns and kings add nothing).
pub(crate) const ATTACKER_WEIGHT: [i32; 5] = [0, 36, 26, 21, 5];

const OUTPOST_RANKS: [Bitboard; 2] = [
    BB_RANK_3 | BB_RANK_4 | BB_RANK_5,
    BB_RANK_6 | BB_RANK_5 | BB_RANK_4,
];
// Index 0 for knights, 1 for bishops.
const OUTPOST_BONUS: [Score; 2] = [s(34, 11), s(17, 6)];
const OUTPOST_REACHABLE_BONUS: [Score; 2] = [s(17, 6), s(8, 3)];

const MINOR_PAWN_SHIELD: Score = s(8, 1);
const KING_PROTECTOR_DISTANCE_PENALTY: Score = s(3, 4);

const BISHOP_PAWNS_SAME_COLOR_PENALTY: Score = s(1, 3);
const BISHOP_CENTER_ALIGN_BONUS: Score = s(21, 0);

const ROOK_OPEN_FILE_BONUS: Score = s(19, 9);
const ROOK_SEMI_OPEN_FILE_BONUS: Score = s(6, 4);
const ROOK_PAWN_ALIGN_BONUS: Score = s(3, 12);
const ROOK_TRAPPED_PENALTY: Score = s(22, 2);

const UNSAFE_QUEEN: Score = s(23, 7);

/// Fold a piece's move set into the attack maps and the king attack
/// counters of the enemy king.
pub(crate) fn update_attack_info(color: Color, pt: Piece, moves: Bitboard, info: &mut EvalInfo) {
    let us = color.index();
    let them = (!color).index();

    info.piece_attacks[us][pt.index()] |= moves;
    info.multi_attacks[us] |= info.color_attacks[us] & moves;
    info.color_attacks[us] |= moves;

    let king_attacks = moves & info.king_ring[them];
    if king_attacks != 0 {
        info.king_attackers_weight[them] += ATTACKER_WEIGHT[pt.index()];
        info.king_attackers_num[them] += 1;
        info.king_ring_attacks[them] += king_attacks.count_ones() as i32;
    }
}

pub(crate) fn evaluate_knights(board: &Board, color: Color, info: &mut EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let mut knights = board.colored(color, Piece::Knight);
    while knights != 0 {
        let sq = pop_lsb(&mut knights);
        let mut moves = bitboards::knight_attacks(sq);
        if board.king_blockers(color) & bit(sq) != 0 {
            moves &= line(sq, info.king_sq[color.index()]);
        }

        let outposts = OUTPOST_RANKS[color.index()]
            & info.piece_attacks[color.index()][Piece::Pawn.index()]
            & !info.pawn_attack_span[(!color).index()];
        if outposts & bit(sq) != 0 {
            value += OUTPOST_BONUS[0];
        } else if outposts & moves & !board.pieces(color) != 0 {
            value += OUTPOST_REACHABLE_BONUS[0];
        }

        if bit(sq) & shift_down(board.pieces_of(Piece::Pawn), color) != 0 {
            value += MINOR_PAWN_SHIELD;
        }

        value -= KING_PROTECTOR_DISTANCE_PENALTY * king_distance(sq, info.king_sq[color.index()]);

        info.mobility[color.index()] +=
            MOBILITY[0][(moves & info.mobility_area[color.index()]).count_ones() as usize];
        update_attack_info(color, Piece::Knight, moves, info);
    }

    value
}

pub(crate) fn evaluate_bishops(board: &Board, color: Color, info: &mut EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let mut bishops = board.colored(color, Piece::Bishop);
    while bishops != 0 {
        let sq = pop_lsb(&mut bishops);
        // Queens are transparent so batteries count their full reach.
        let mut moves =
            magics::bishop_attacks(sq, board.all_pieces() & !board.pieces_of(Piece::Queen));
        if board.king_blockers(color) & bit(sq) != 0 {
            moves &= line(sq, info.king_sq[color.index()]);
        }

        let outposts = OUTPOST_RANKS[color.index()]
            & info.piece_attacks[color.index()][Piece::Pawn.index()]
            & !info.pawn_attack_span[(!color).index()];
        if outposts & bit(sq) != 0 {
            value += OUTPOST_BONUS[1];
        } else if outposts & moves & !board.pieces(color) != 0 {
            value += OUTPOST_REACHABLE_BONUS[1];
        }

        if bit(sq) & shift_down(board.pieces_of(Piece::Pawn), color) != 0 {
            value += MINOR_PAWN_SHIELD;
        }

        let pawns_same_color = board.same_colored_squares(sq) & board.colored(color, Piece::Pawn);
        value -= BISHOP_PAWNS_SAME_COLOR_PENALTY
            * pawns_same_color.count_ones() as i32
            * (1 + (info.blocked_pawns[color.index()] & CENTRAL_FILES).count_ones() as i32);

        // A long-diagonal bishop biting into the center.
        if (magics::bishop_attacks(sq, board.pieces_of(Piece::Pawn)) & *CENTRAL_SQUARES)
            .count_ones()
            > 1
        {
            value += BISHOP_CENTER_ALIGN_BONUS;
        }

        value -= KING_PROTECTOR_DISTANCE_PENALTY * king_distance(sq, info.king_sq[color.index()]);

        info.mobility[color.index()] +=
            MOBILITY[1][(moves & info.mobility_area[color.index()]).count_ones() as usize];
        update_attack_info(color, Piece::Bishop, moves, info);
    }

    value
}

pub(crate) fn evaluate_rooks(board: &Board, color: Color, info: &mut EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let mut rooks = board.colored(color, Piece::Rook);
    while rooks != 0 {
        let sq = pop_lsb(&mut rooks);
        // Friendly majors are transparent for batteries and x-rays.
        let mut moves = magics::rook_attacks(sq, board.all_pieces() & !board.majors());
        if board.king_blockers(color) & bit(sq) != 0 {
            moves &= line(sq, info.king_sq[color.index()]);
        }

        let f = file(sq);
        let mob = (moves & info.mobility_area[color.index()]).count_ones() as usize;

        if FILES[f] & board.pieces_of(Piece::Pawn) == 0 {
            value += ROOK_OPEN_FILE_BONUS;
        } else if FILES[f] & board.colored(color, Piece::Pawn) == 0 {
            value += ROOK_SEMI_OPEN_FILE_BONUS;
        } else {
            // Boxed in by the own king with nowhere to go.
            let king_file = file(info.king_sq[color.index()]) as i32;
            if mob <= 3 && (king_file > 3) == (f as i32 > king_file) {
                value -= ROOK_TRAPPED_PENALTY;
            }
        }

        if relative_rank(color, sq) >= 4 {
            value += ROOK_PAWN_ALIGN_BONUS
                * (moves & board.colored(!color, Piece::Pawn)).count_ones() as i32;
        }

        info.mobility[color.index()] += MOBILITY[2][mob];
        update_attack_info(color, Piece::Rook, moves, info);
    }

    value
}

pub(crate) fn evaluate_queens(board: &Board, color: Color, info: &mut EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let mut queens = board.colored(color, Piece::Queen);
    while queens != 0 {
        let sq = pop_lsb(&mut queens);
        let mut moves = magics::queen_attacks(sq, board.all_pieces());
        if board.king_blockers(color) & bit(sq) != 0 {
            moves &= line(sq, info.king_sq[color.index()]);
        }

        // A queen in the line of a discovered attack is a tactical target.
        if board.slider_blockers(
            board.colored(!color, Piece::Bishop) | board.colored(!color, Piece::Rook),
            sq,
        ) != 0
        {
            value -= UNSAFE_QUEEN;
        }

        info.mobility[color.index()] +=
            MOBILITY[3][(moves & info.mobility_area[color.index()]).count_ones() as usize];
        update_attack_info(color, Piece::Queen, moves, info);
    }

    value
}
