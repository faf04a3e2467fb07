//! Positional evaluation.
//!
//! Produces a static score in centipawns from the side to move's
//! perspective. Accumulation happens in paired (midgame, endgame) terms
//! which are folded down with the game-phase scale at the very end.
//! Pawn structure and material imbalance are cached per worker.

pub mod cache;
mod king;
mod pawns;
mod pieces;
pub mod pst;
mod threats;

use crate::board::bitboards::{king_attacks, king_ring};
use crate::board::types::bitboard::{shift_down, Bitboard, ALL_SQUARES, BB_RANK_2, BB_RANK_3, BB_RANK_6, BB_RANK_7};
use crate::board::types::piece::{Color, Piece};
use crate::board::types::score::Score;
use crate::board::types::square::Square;
use crate::board::types::{Value, VALUE_DRAW};
use crate::board::Board;

pub use cache::{EvalCaches, PawnEntry};

/// Small constant edge for the player whose turn it is.
pub const TEMPO_BONUS: Value = 12;

/// Scratch state shared by the evaluation stages.
#[derive(Default)]
pub struct EvalInfo {
    pub mobility_area: [Bitboard; 2],
    pub piece_attacks: [[Bitboard; 6]; 2],
    pub color_attacks: [Bitboard; 2],
    pub multi_attacks: [Bitboard; 2],
    pub blocked_pawns: [Bitboard; 2],
    pub king_attackers_weight: [i32; 2],
    pub king_attackers_num: [i32; 2],
    pub king_ring_attacks: [i32; 2],
    pub king_sq: [Square; 2],
    pub king_ring: [Bitboard; 2],
    pub passed_pawns: Bitboard,
    pub pawn_attack_span: [Bitboard; 2],
    pub mobility: [Score; 2],
}

fn init_eval_info(board: &Board, info: &mut EvalInfo) {
    let w = Color::White.index();
    let b = Color::Black.index();
    let pawn = Piece::Pawn.index();
    let king = Piece::King.index();

    // Mobility area: everywhere except our king and queens, pawns that
    // are blocked or still at home, and squares covered by enemy pawns.
    info.mobility_area[w] = ALL_SQUARES
        & !((board.colored(Color::White, Piece::King) | board.colored(Color::White, Piece::Queen))
            | (board.colored(Color::White, Piece::Pawn)
                & (shift_down(board.all_pieces(), Color::White) | BB_RANK_2 | BB_RANK_3))
            | info.piece_attacks[b][pawn]);
    info.mobility_area[b] = ALL_SQUARES
        & !((board.colored(Color::Black, Piece::King) | board.colored(Color::Black, Piece::Queen))
            | (board.colored(Color::Black, Piece::Pawn)
                & (shift_down(board.all_pieces(), Color::Black) | BB_RANK_7 | BB_RANK_6))
            | info.piece_attacks[w][pawn]);

    info.king_sq[w] = board.king_square(Color::White);
    info.king_sq[b] = board.king_square(Color::Black);

    info.king_ring[w] = king_ring(Color::White, info.king_sq[w]);
    info.king_ring[b] = king_ring(Color::Black, info.king_sq[b]);

    info.piece_attacks[w][king] = king_attacks(info.king_sq[w]);
    info.piece_attacks[b][king] = king_attacks(info.king_sq[b]);

    info.color_attacks[w] |= info.piece_attacks[w][king] | info.piece_attacks[w][pawn];
    info.color_attacks[b] |= info.piece_attacks[b][king] | info.piece_attacks[b][pawn];

    info.multi_attacks[w] = info.piece_attacks[w][king] & info.piece_attacks[w][pawn];
    info.multi_attacks[b] = info.piece_attacks[b][king] & info.piece_attacks[b][pawn];

    // Seed the attacker counts with pawns already poking at the ring.
    info.king_attackers_num[w] =
        (info.piece_attacks[w][king] & info.piece_attacks[b][pawn]).count_ones() as i32;
    info.king_attackers_num[b] =
        (info.piece_attacks[b][king] & info.piece_attacks[w][pawn]).count_ones() as i32;

    info.blocked_pawns[w] =
        shift_down(board.all_pieces(), Color::Black) & board.colored(Color::White, Piece::Pawn);
    info.blocked_pawns[b] =
        shift_down(board.all_pieces(), Color::White) & board.colored(Color::Black, Piece::Pawn);
}

/// Fold a paired score into centipawns using the game-phase scale
/// (0 = full board, 256 = bare endgame).
#[inline]
#[must_use]
pub fn scaled_eval(scale: i32, value: Score) -> Value {
    (value.mg * (256 - scale) + value.eg * scale) / 256
}

/// Evaluate the position from the side to move's perspective.
pub fn evaluate(board: &Board, caches: &mut EvalCaches) -> Value {
    if board.is_material_draw() {
        return VALUE_DRAW;
    }

    let mut value = Score::ZERO;
    let mut info = EvalInfo::default();

    let w = Color::White.index();
    let b = Color::Black.index();
    let pawn = Piece::Pawn.index();

    let pawn_hit = caches.pawn.probe(board.pawnkey()).copied();
    if let Some(entry) = pawn_hit {
        value += entry.value;
        info.passed_pawns = entry.passed_pawns;
        info.piece_attacks[w][pawn] = entry.pawn_attacks[w];
        info.piece_attacks[b][pawn] = entry.pawn_attacks[b];
        info.pawn_attack_span = entry.attack_span;
    } else {
        info.piece_attacks[w][pawn] = board.pawn_attacks_bb(Color::White);
        info.piece_attacks[b][pawn] = board.pawn_attacks_bb(Color::Black);
    }

    init_eval_info(board, &mut info);

    value += board.material(Color::White) - board.material(Color::Black);
    value += board.pst(Color::White) - board.pst(Color::Black);

    if pawn_hit.is_none() {
        let pawn_value = pawns::evaluate_pawns(board, Color::White, &mut info)
            - pawns::evaluate_pawns(board, Color::Black, &mut info);
        caches.pawn.store(PawnEntry {
            key: board.pawnkey(),
            value: pawn_value,
            pawn_attacks: [info.piece_attacks[w][pawn], info.piece_attacks[b][pawn]],
            passed_pawns: info.passed_pawns,
            attack_span: info.pawn_attack_span,
        });
        value += pawn_value;
    }

    value += pieces::evaluate_knights(board, Color::White, &mut info);
    value += pieces::evaluate_bishops(board, Color::White, &mut info);
    value += pieces::evaluate_rooks(board, Color::White, &mut info);
    value += pieces::evaluate_queens(board, Color::White, &mut info);

    value -= pieces::evaluate_knights(board, Color::Black, &mut info);
    value -= pieces::evaluate_bishops(board, Color::Black, &mut info);
    value -= pieces::evaluate_rooks(board, Color::Black, &mut info);
    value -= pieces::evaluate_queens(board, Color::Black, &mut info);

    value += info.mobility[w] - info.mobility[b];

    value += king::evaluate_king_safety(board, Color::White, &info);
    value -= king::evaluate_king_safety(board, Color::Black, &info);

    value += pawns::evaluate_passers(board, Color::White, &info);
    value -= pawns::evaluate_passers(board, Color::Black, &info);

    value += threats::evaluate_threats(board, Color::White, &info);
    value -= threats::evaluate_threats(board, Color::Black, &info);

    let imbalance = match caches.material.probe(board.materialkey()) {
        Some(cached) => cached,
        None => {
            let computed = threats::evaluate_imbalances(board, Color::White)
                - threats::evaluate_imbalances(board, Color::Black);
            caches.material.store(board.materialkey(), computed);
            computed
        }
    };
    value += imbalance;

    let folded = scaled_eval(board.scale(), value);

    (if board.turn() == Color::White {
        folded
    } else {
        -folded
    }) + TEMPO_BONUS
}

/// Per-term evaluation breakdown for the `eval` debug command.
#[must_use]
pub fn trace(board: &Board) -> String {
    use std::fmt::Write;

    let mut info = EvalInfo::default();
    let w = Color::White.index();
    let b = Color::Black.index();
    let pawn = Piece::Pawn.index();

    info.piece_attacks[w][pawn] = board.pawn_attacks_bb(Color::White);
    info.piece_attacks[b][pawn] = board.pawn_attacks_bb(Color::Black);
    init_eval_info(board, &mut info);

    let material_psqt = [
        board.material(Color::White) + board.pst(Color::White),
        board.material(Color::Black) + board.pst(Color::Black),
    ];
    let pawns_term = [
        pawns::evaluate_pawns(board, Color::White, &mut info),
        pawns::evaluate_pawns(board, Color::Black, &mut info),
    ];
    let knights = [
        pieces::evaluate_knights(board, Color::White, &mut info),
        pieces::evaluate_knights(board, Color::Black, &mut info),
    ];
    let bishops = [
        pieces::evaluate_bishops(board, Color::White, &mut info),
        pieces::evaluate_bishops(board, Color::Black, &mut info),
    ];
    let rooks = [
        pieces::evaluate_rooks(board, Color::White, &mut info),
        pieces::evaluate_rooks(board, Color::Black, &mut info),
    ];
    let queens = [
        pieces::evaluate_queens(board, Color::White, &mut info),
        pieces::evaluate_queens(board, Color::Black, &mut info),
    ];
    let king_safety = [
        king::evaluate_king_safety(board, Color::White, &info),
        king::evaluate_king_safety(board, Color::Black, &info),
    ];
    let passers = [
        pawns::evaluate_passers(board, Color::White, &info),
        pawns::evaluate_passers(board, Color::Black, &info),
    ];
    let threats_term = [
        threats::evaluate_threats(board, Color::White, &info),
        threats::evaluate_threats(board, Color::Black, &info),
    ];
    let imbalance = [
        threats::evaluate_imbalances(board, Color::White),
        threats::evaluate_imbalances(board, Color::Black),
    ];

    let mut out = String::new();
    for (name, side) in [("White", 0usize), ("Black", 1usize)] {
        let _ = writeln!(out, "({name})");
        for (label, term) in [
            ("Material & Psqt", material_psqt[side]),
            ("Imbalance", imbalance[side]),
            ("Pawns", pawns_term[side]),
            ("Knights", knights[side]),
            ("Bishops", bishops[side]),
            ("Rooks", rooks[side]),
            ("Queens", queens[side]),
            ("Mobility", info.mobility[side]),
            ("Passed Pawns", passers[side]),
            ("King Safety", king_safety[side]),
            ("Threats", threats_term[side]),
        ] {
            let _ = writeln!(out, "{label:<16}: {} | {}", term.mg, term.eg);
        }
        let _ = writeln!(out);
    }

    let mut total = Score::ZERO;
    for side_terms in [
        material_psqt, imbalance, pawns_term, knights, bishops, rooks, queens,
        [info.mobility[0], info.mobility[1]], passers, king_safety, threats_term,
    ] {
        total += side_terms[0] - side_terms[1];
    }

    let _ = writeln!(
        out,
        "Total (for White): {}",
        scaled_eval(board.scale(), total)
    );
    out
}

pub fn init() {
    pst::init();
}
