//! Staged move picker.
//!
//! A small state machine handing out one move per `pick()` call, in the
//! order: transposition move, winning captures, killers, countermove,
//! history-sorted quiets, losing captures. In quiescence only captures
//! (or evasions while in check) are produced. Generation is deferred
//! until a stage is actually reached, so a cutoff on the hash move never
//! pays for move generation at all.

use crate::board::types::moves::{Move, ScoredMoveList, MOVE_NONE};
use crate::board::{Board, GenType};

use super::history::HistoryTable;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    TtMove,
    GenCaptures,
    GoodCaptures,
    FirstKiller,
    SecondKiller,
    Counter,
    GenQuiets,
    Quiets,
    LosingCaptures,
    TtMoveQs,
    GenEvasions,
    Evasions,
    GenCapturesQs,
    CapturesQs,
    Done,
}

pub struct MovePicker {
    phase: Phase,
    tt_move: Move,
    killers: [Move; 2],
    pub counter_move: Move,
    moves: ScoredMoveList,
    bad_captures: ScoredMoveList,
}

impl MovePicker {
    /// Picker for an interior search node.
    #[must_use]
    pub fn new(tt_move: Move, killers: [Move; 2], counter_move: Move) -> Self {
        let phase = if tt_move != MOVE_NONE {
            Phase::TtMove
        } else {
            Phase::GenCaptures
        };

        MovePicker {
            phase,
            tt_move,
            killers,
            counter_move,
            moves: ScoredMoveList::new(),
            bad_captures: ScoredMoveList::new(),
        }
    }

    /// Picker for a quiescence node. The hash move is only tried when it
    /// recaptures on the square the previous move went to.
    #[must_use]
    pub fn new_qsearch(board: &Board, last_move: Move, tt_move: Move) -> Self {
        let tt_move = if last_move != MOVE_NONE
            && tt_move != MOVE_NONE
            && last_move.to_sq() == tt_move.to_sq()
        {
            tt_move
        } else {
            MOVE_NONE
        };

        let phase = if tt_move != MOVE_NONE {
            Phase::TtMoveQs
        } else if board.in_check() {
            Phase::GenEvasions
        } else {
            Phase::GenCapturesQs
        };

        MovePicker {
            phase,
            tt_move,
            killers: [MOVE_NONE; 2],
            counter_move: MOVE_NONE,
            moves: ScoredMoveList::new(),
            bad_captures: ScoredMoveList::new(),
        }
    }

    fn score_captures(&mut self, board: &Board) {
        for i in 0..self.moves.len() {
            let score = board.mvvlva(self.moves.move_at(i));
            self.moves.set_score(i, score);
        }
    }

    fn score_quiets(&mut self, board: &Board, history: &HistoryTable) {
        for i in 0..self.moves.len() {
            let mv = self.moves.move_at(i);
            let pt = board.piece_on(mv.from_sq()).expect("generated move");
            self.moves
                .set_score(i, history.get(board.turn(), pt, mv.to_sq()));
        }
    }

    fn score_evasions(&mut self, board: &Board, history: &HistoryTable) {
        for i in 0..self.moves.len() {
            let mv = self.moves.move_at(i);
            let score = if board.is_capture(mv) {
                board.mvvlva(mv)
            } else {
                let pt = board.piece_on(mv.from_sq()).expect("generated move");
                history.get(board.turn(), pt, mv.to_sq())
            };
            self.moves.set_score(i, score);
        }
    }

    /// Hand out the next candidate move, `MOVE_NONE` when exhausted.
    /// Legality is the caller's business.
    pub fn pick(&mut self, board: &Board, history: &HistoryTable) -> Move {
        loop {
            match self.phase {
                Phase::TtMove | Phase::TtMoveQs => {
                    self.phase = if self.phase == Phase::TtMove {
                        Phase::GenCaptures
                    } else if board.in_check() {
                        Phase::GenEvasions
                    } else {
                        Phase::GenCapturesQs
                    };
                    if self.tt_move != MOVE_NONE && board.is_valid(self.tt_move) {
                        return self.tt_move;
                    }
                }

                Phase::GenCaptures => {
                    self.moves = ScoredMoveList::from_moves(&board.generate(GenType::Captures));
                    self.score_captures(board);
                    self.phase = Phase::GoodCaptures;
                }

                Phase::GoodCaptures => {
                    while let Some((mv, _)) = self.moves.pick_best() {
                        self.moves.advance();
                        if mv == self.tt_move {
                            continue;
                        }
                        // Captures that lose material wait until the end.
                        if board.see(mv) < 0 {
                            self.bad_captures.push(mv, board.mvvlva(mv));
                            continue;
                        }
                        return mv;
                    }
                    self.phase = Phase::FirstKiller;
                }

                Phase::FirstKiller => {
                    self.phase = Phase::SecondKiller;
                    let killer = self.killers[0];
                    // A killer may have been picked already as a capture.
                    if killer != self.tt_move
                        && killer != MOVE_NONE
                        && !board.is_capture(killer)
                        && board.is_valid(killer)
                    {
                        return killer;
                    }
                }

                Phase::SecondKiller => {
                    self.phase = Phase::Counter;
                    let killer = self.killers[1];
                    if killer != self.tt_move
                        && killer != MOVE_NONE
                        && !board.is_capture(killer)
                        && board.is_valid(killer)
                    {
                        return killer;
                    }
                }

                Phase::Counter => {
                    self.phase = Phase::GenQuiets;
                    let counter = self.counter_move;
                    if counter != self.tt_move
                        && counter != MOVE_NONE
                        && counter != self.killers[0]
                        && counter != self.killers[1]
                        && !board.is_capture(counter)
                        && board.is_valid(counter)
                    {
                        return counter;
                    }
                }

                Phase::GenQuiets => {
                    self.moves = ScoredMoveList::from_moves(&board.generate(GenType::Quiets));
                    self.score_quiets(board, history);
                    self.phase = Phase::Quiets;
                }

                Phase::Quiets => {
                    while let Some((mv, _)) = self.moves.pick_best() {
                        self.moves.advance();
                        if mv != self.tt_move
                            && mv != self.killers[0]
                            && mv != self.killers[1]
                            && mv != self.counter_move
                        {
                            return mv;
                        }
                    }
                    self.phase = Phase::LosingCaptures;
                }

                Phase::LosingCaptures => {
                    while let Some((mv, _)) = self.bad_captures.pick_best() {
                        self.bad_captures.advance();
                        if mv != self.tt_move && mv != self.killers[0] && mv != self.killers[1] {
                            return mv;
                        }
                    }
                    self.phase = Phase::Done;
                }

                Phase::GenEvasions => {
                    debug_assert!(board.in_check());
                    self.moves = ScoredMoveList::from_moves(&board.generate(GenType::Evasions));
                    self.score_evasions(board, history);
                    self.phase = Phase::Evasions;
                }

                Phase::Evasions => {
                    while let Some((mv, _)) = self.moves.pick_best() {
                        self.moves.advance();
                        if mv != self.tt_move {
                            return mv;
                        }
                    }
                    // Every way out of check has been handed out.
                    self.phase = Phase::Done;
                }

                Phase::GenCapturesQs => {
                    self.moves = ScoredMoveList::from_moves(&board.generate(GenType::Captures));
                    self.score_captures(board);
                    self.phase = Phase::CapturesQs;
                }

                Phase::CapturesQs => {
                    if let Some((mv, _)) = self.moves.pick_best() {
                        self.moves.advance();
                        if mv == self.tt_move {
                            continue;
                        }
                        return mv;
                    }
                    self.phase = Phase::Done;
                }

                Phase::Done => return MOVE_NONE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::moves::MOVE_NONE;

    fn drain(board: &Board, mut picker: MovePicker, history: &HistoryTable) -> Vec<Move> {
        let mut out = Vec::new();
        loop {
            let mv = picker.pick(board, history);
            if mv == MOVE_NONE {
                break;
            }
            out.push(mv);
        }
        out
    }

    #[test]
    fn test_picker_yields_all_pseudo_legal_moves_once() {
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let history = HistoryTable::new();
        let picker = MovePicker::new(MOVE_NONE, [MOVE_NONE; 2], MOVE_NONE);
        let picked = drain(&board, picker, &history);

        let generated = board.generate_all();
        assert_eq!(picked.len(), generated.len());
        for mv in &picked {
            assert!(generated.contains(*mv), "{mv} missing from generator");
        }
        // No duplicates.
        let mut dedup = picked.clone();
        dedup.sort_by_key(|m| m.as_u16());
        dedup.dedup();
        assert_eq!(dedup.len(), picked.len());
    }

    #[test]
    fn test_picker_tt_move_first() {
        let board = Board::new();
        let history = HistoryTable::new();
        let tt_move = board.parse_move("g1f3").unwrap();
        let picker = MovePicker::new(tt_move, [MOVE_NONE; 2], MOVE_NONE);
        let picked = drain(&board, picker, &history);
        assert_eq!(picked[0], tt_move);
        assert_eq!(picked.iter().filter(|&&m| m == tt_move).count(), 1);
    }

    #[test]
    fn test_picker_killer_before_plain_quiets() {
        let board = Board::new();
        let history = HistoryTable::new();
        let killer = board.parse_move("a2a3").unwrap();
        let picker = MovePicker::new(MOVE_NONE, [killer, MOVE_NONE], MOVE_NONE);
        let picked = drain(&board, picker, &history);
        // No captures in the start position, so the killer leads.
        assert_eq!(picked[0], killer);
    }

    #[test]
    fn test_picker_good_captures_before_quiets() {
        // White can capture a pawn on d5 or play many quiets.
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let history = HistoryTable::new();
        let picker = MovePicker::new(MOVE_NONE, [MOVE_NONE; 2], MOVE_NONE);
        let picked = drain(&board, picker, &history);
        assert_eq!(picked[0], board.parse_move("e4d5").unwrap());
    }

    #[test]
    fn test_picker_evasions_when_in_check() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert!(board.in_check());
        let history = HistoryTable::new();
        let picker = MovePicker::new_qsearch(&board, MOVE_NONE, MOVE_NONE);
        let picked = drain(&board, picker, &history);
        // Every legal way out of the check is produced.
        for &mv in board.generate_legal().iter() {
            assert!(picked.contains(&mv), "{mv} missing from evasions");
        }
    }

    #[test]
    fn test_qsearch_picker_only_captures() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let history = HistoryTable::new();
        let picker = MovePicker::new_qsearch(&board, MOVE_NONE, MOVE_NONE);
        let picked = drain(&board, picker, &history);
        for mv in picked {
            assert!(board.is_capture(mv), "{mv} is not a capture");
        }
    }
}
