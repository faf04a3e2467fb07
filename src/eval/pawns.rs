//! Pawn structure and passed pawn evaluation.

use crate::board::bitboards::{
    self, front_file, king_distance, passed_pawn_mask, pawn_attack_span, ADJ_FILES,
};
use crate::board::types::bitboard::{bit, lsb_index, most_backward, pop_lsb, shift_up, RANKS};
use crate::board::types::piece::{Color, Piece};
use crate::board::types::score::{s, Score};
use crate::board::types::square::{down, file, rank, relative_rank, up, Square};
use crate::board::Board;

use super::EvalInfo;

const DOUBLED_PENALTY: Score = s(8, 14);
const ISOLATED_PENALTY: [Score; 2] = [s(11, 12), s(5, 7)];
const BACKWARD_PENALTY: [Score; 2] = [s(17, 11), s(10, 5)];
const LEVER_BONUS: [Score; 8] = [
    s(0, 0),
    s(0, 0),
    s(0, 0),
    s(0, 0),
    s(7, 6),
    s(13, 13),
    s(0, 0),
    s(0, 0),
];
const CONNECTED_BONUS: [i32; 8] = [0, 3, 4, 6, 14, 23, 40, 0];
const PHALANX_BONUS: [[Score; 8]; 2] = [
    [
        s(0, 0),
        s(8, 0),
        s(9, 0),
        s(16, 2),
        s(37, 18),
        s(57, 43),
        s(105, 105),
        s(0, 0),
    ],
    [
        s(0, 0),
        s(4, 0),
        s(4, 0),
        s(9, 1),
        s(18, 9),
        s(29, 21),
        s(52, 52),
        s(0, 0),
    ],
];

const PASSED_RANK_BONUS: [Score; 8] = [
    s(0, 0),
    s(4, 13),
    s(8, 15),
    s(7, 19),
    s(29, 34),
    s(79, 83),
    s(130, 122),
    s(0, 0),
];
const PASSED_FILE_PENALTY: [Score; 8] = [
    s(0, 0),
    s(5, 4),
    s(10, 8),
    s(15, 12),
    s(15, 12),
    s(10, 8),
    s(5, 4),
    s(0, 0),
];
const PASSED_NO_ATTACKS: Score = s(16, 18);
const PASSED_SAFE_PATH: Score = s(9, 11);
const PASSED_SAFE_PUSH: Score = s(4, 6);
const PASSED_BLOCKSQ_DEFENDED: Score = s(2, 3);

/// Evaluate the pawn structure for one color. Also records the passed
/// pawn set and the attack spans into `info` for the later stages.
pub(crate) fn evaluate_pawns(board: &Board, color: Color, info: &mut EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let own_pawns = board.colored(color, Piece::Pawn);
    let opp_pawns = board.colored(!color, Piece::Pawn);

    let mut pawns = own_pawns;
    while pawns != 0 {
        let sq = pop_lsb(&mut pawns);
        let f = file(sq);
        let r = relative_rank(color, sq);

        let front = front_file(color, sq);
        let neighbours = ADJ_FILES[f] & own_pawns;
        let stoppers = passed_pawn_mask(color, sq) & opp_pawns;
        let lever = bitboards::pawn_attacks(color, sq) & opp_pawns;

        info.pawn_attack_span[color.index()] |= pawn_attack_span(color, sq);

        let doubled = front & own_pawns != 0;
        let opposed = usize::from(front & opp_pawns != 0);
        let isolated = neighbours == 0;
        // No stopper except those we can capture right now.
        let passed = stoppers ^ lever == 0;
        let supported = neighbours & RANKS[rank((sq as i32 + down(color)) as Square)];
        let phalanx = neighbours & RANKS[rank(sq)];

        // A pawn is backward if its neighbours are all ahead of it and
        // the square in front is covered by an enemy pawn.
        let mut backward = false;
        if !isolated && phalanx == 0 && r <= 4 && lever == 0 {
            let back_rank =
                RANKS[rank(lsb_index(most_backward(color, neighbours | stoppers)))];
            backward = (back_rank | shift_up(ADJ_FILES[f] & back_rank, color)) & stoppers != 0;
        }

        if doubled {
            value -= DOUBLED_PENALTY;
        } else if passed {
            info.passed_pawns |= bit(sq);
        }

        if phalanx != 0 || supported != 0 {
            let connected = CONNECTED_BONUS[r] * (if phalanx != 0 { 3 } else { 2 })
                / (if opposed != 0 { 2 } else { 1 })
                + 8 * supported.count_ones() as i32;
            value += s(connected, connected * (r as i32 - 2) / 4);
        }

        if phalanx != 0 {
            value += PHALANX_BONUS[opposed][r];
        } else if isolated {
            value -= ISOLATED_PENALTY[opposed];
        } else if backward {
            value -= BACKWARD_PENALTY[opposed];
        }

        if lever != 0 {
            value += LEVER_BONUS[r];
        }
    }

    value
}

/// Evaluate the passed pawns recorded by the pawn stage.
pub(crate) fn evaluate_passers(board: &Board, color: Color, info: &EvalInfo) -> Score {
    let mut value = Score::ZERO;

    let mut passers = info.passed_pawns & board.pieces(color);
    while passers != 0 {
        let sq = pop_lsb(&mut passers);
        let block_sq = (sq as i32 + up(color)) as Square;
        let r = relative_rank(color, sq) as i32;
        let f = file(sq);
        let rfactor = (r - 2) * (r - 1) / 2;

        // King proximity matters more the closer the pawn is to queening.
        value += s(
            0,
            (5 * king_distance(info.king_sq[(!color).index()], block_sq)
                - 2 * king_distance(info.king_sq[color.index()], block_sq))
                * rfactor,
        );

        if r > 2 && bit(block_sq) & board.all_pieces() == 0 {
            let mut bonus = Score::ZERO;

            let path = front_file(color, sq);
            let behind = front_file(!color, sq);
            let mut attacked = passed_pawn_mask(color, sq);

            let majors_behind = behind & board.majors();

            // An enemy major behind the pawn attacks the whole path.
            if majors_behind & board.pieces(!color) == 0 {
                attacked &= info.color_attacks[(!color).index()];
            }

            if info.color_attacks[color.index()] & bit(block_sq) != 0
                || majors_behind & board.pieces(color) != 0
            {
                bonus += PASSED_BLOCKSQ_DEFENDED;
            }

            if attacked == 0 {
                bonus += PASSED_NO_ATTACKS;
            } else if attacked & path == 0 {
                bonus += PASSED_SAFE_PATH;
            } else if attacked & bit(block_sq) == 0 {
                bonus += PASSED_SAFE_PUSH;
            }

            value += bonus * rfactor;
        }

        value += PASSED_RANK_BONUS[r as usize] - PASSED_FILE_PENALTY[f];
    }

    // Passed pawns never count against their owner.
    s(value.mg.max(0), value.eg.max(0))
}
