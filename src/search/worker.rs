//! A single search worker: iterative deepening at the root and the
//! full-width alpha-beta with quiescence below it.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use crate::board::types::moves::{Move, MoveList, MOVE_NONE};
use crate::board::types::{
    Depth, Value, DEPTH_MAX, DEPTH_NONE, MAX_MOVES, VALUE_DRAW, VALUE_INFINITE, VALUE_MATE,
    VALUE_MATE_MAX, VALUE_NONE,
};
use crate::board::Board;
use crate::eval::pst::material_value;
use crate::eval::{self, EvalCaches};
use crate::threads::SharedSearch;
use crate::tt::{value_from_tt, value_to_tt, Bound};
use crate::uci;

use super::history::{CounterMoveTable, HistoryTable, KillerMoves};
use super::movepick::MovePicker;
use super::time::{elapsed_ms, TimeManager};
use super::{lmr_reduction, PrincipalVariation, DELTA_MARGIN, FUTILITY_MARGIN, RAZOR_MARGIN};

const PLY_SLOTS: usize = DEPTH_MAX as usize + 1;

#[inline]
const fn mated_value(plies: usize) -> Value {
    -VALUE_MATE + plies as Value
}

#[inline]
const fn mate_value(plies: usize) -> Value {
    VALUE_MATE - plies as Value
}

/// Per-worker search state. Each worker owns its board copy, its
/// evaluation caches and its move ordering tables; only the
/// transposition table and the stop flag are shared.
pub struct Worker {
    pub index: usize,
    pub board: Board,
    caches: EvalCaches,
    killers: KillerMoves,
    history: HistoryTable,
    counter_moves: CounterMoveTable,
    shared: Option<Arc<SharedSearch>>,

    nodes: u64,
    start: Instant,
    time: TimeManager,

    depth: Depth,
    sel_depth: usize,
    multi_pv: usize,
    pv_stability: i32,

    eval_stack: [Value; PLY_SLOTS],
    current_move: [Move; PLY_SLOTS],
    value_stack: [Value; PLY_SLOTS],
    best_move_stack: [Move; PLY_SLOTS],
    multi_pv_moves: [Move; MAX_MOVES],
}

impl Worker {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Worker {
            index,
            board: Board::new(),
            caches: EvalCaches::new(),
            killers: KillerMoves::new(),
            history: HistoryTable::new(),
            counter_moves: CounterMoveTable::new(),
            shared: None,
            nodes: 0,
            start: Instant::now(),
            time: TimeManager::default(),
            depth: 0,
            sel_depth: 0,
            multi_pv: 0,
            pv_stability: 0,
            eval_stack: [VALUE_NONE; PLY_SLOTS],
            current_move: [MOVE_NONE; PLY_SLOTS],
            value_stack: [0; PLY_SLOTS],
            best_move_stack: [MOVE_NONE; PLY_SLOTS],
            multi_pv_moves: [MOVE_NONE; MAX_MOVES],
        }
    }

    /// Point the worker at a new search: copy the root position, attach
    /// the shared state and wipe the per-search ordering tables.
    pub fn prepare(&mut self, board: &Board, shared: Arc<SharedSearch>) {
        self.board = board.clone();
        self.board.reset_plies();
        self.shared = Some(shared);
        self.nodes = 0;
        self.sel_depth = 0;
        self.pv_stability = 0;
        self.killers.clear();
        self.history.clear();
        self.counter_moves.clear();
        self.eval_stack = [VALUE_NONE; PLY_SLOTS];
        self.current_move = [MOVE_NONE; PLY_SLOTS];
        self.value_stack = [0; PLY_SLOTS];
        self.best_move_stack = [MOVE_NONE; PLY_SLOTS];
        self.multi_pv_moves = [MOVE_NONE; MAX_MOVES];
    }

    /// Full reset for `ucinewgame`, including the evaluation caches.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.caches.clear();
        self.killers.clear();
        self.history.clear();
        self.counter_moves.clear();
        self.nodes = 0;
    }

    #[inline]
    fn shared(&self) -> &SharedSearch {
        self.shared.as_ref().expect("worker not prepared")
    }

    #[inline]
    fn is_main(&self) -> bool {
        self.index == 0
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.shared().has_stopped()
    }

    #[inline]
    fn add_node(&mut self) {
        self.nodes += 1;
        self.shared().publish_nodes(self.index, self.nodes);
    }

    #[inline]
    fn evaluate(&mut self) -> Value {
        eval::evaluate(&self.board, &mut self.caches)
    }

    /// Main-thread poll: flip the shared stop flag once the clock or the
    /// node budget runs out.
    fn check_finished(&self) {
        let shared = self.shared();
        let limits = &shared.limits;
        let time_up = self.time.is_active() && self.time.is_exceeded(elapsed_ms(self.start));
        let nodes_up = limits.nodes > 0 && shared.total_nodes() >= limits.nodes;
        if time_up || nodes_up {
            shared.stop_searching();
        }
    }

    fn multipv_played(&self, mv: Move) -> bool {
        self.multi_pv_moves[..self.multi_pv].contains(&mv)
    }

    /// Iterative deepening driver. The main worker reports progress and
    /// emits the final `bestmove`; helpers only feed the shared tables.
    pub fn iterate(&mut self) -> Move {
        self.start = Instant::now();
        let limits = self.shared().limits.clone();
        self.time = TimeManager::new(&limits, self.shared().move_overhead);

        let is_main = self.is_main();
        let mut pv = PrincipalVariation::new();
        let mut best_move = MOVE_NONE;
        let mut alpha = -VALUE_INFINITE;
        let mut beta = VALUE_INFINITE;
        let mut value = 0;

        let root_moves = self.board.generate_legal();
        let multi_pv_count = limits.multi_pv.min(root_moves.len());

        let mut depth: Depth = 1;
        while depth <= limits.depth && !self.stopped() {
            self.depth = depth;

            for multi_pv in 0..multi_pv_count {
                if self.stopped() {
                    break;
                }

                self.board.reset_plies();
                self.sel_depth = 0;
                self.multi_pv = multi_pv;

                let mut delta = 25;

                // Aspiration window around the previous score.
                if depth > 5 {
                    alpha = (value - delta).max(-VALUE_INFINITE);
                    beta = (value + delta).min(VALUE_INFINITE);
                }

                loop {
                    pv.reset();
                    let new_value =
                        self.search(alpha, beta, depth, 0, false, true, MOVE_NONE, &mut pv);

                    if self.stopped() {
                        break;
                    }
                    value = new_value;

                    if is_main
                        && limits.multi_pv == 1
                        && (value <= alpha || value >= beta)
                        && elapsed_ms(self.start) > 3000
                    {
                        self.report_pv(value, &pv, alpha, beta);
                    }

                    if value <= alpha {
                        debug!(
                            "depth {depth}: fail low at {value}, widening [{alpha}, {beta}]"
                        );
                        beta = (alpha + beta) / 2;
                        alpha = (value - delta).max(-VALUE_INFINITE);
                    } else if value >= beta {
                        debug!(
                            "depth {depth}: fail high at {value}, widening [{alpha}, {beta}]"
                        );
                        beta = (value + delta).min(VALUE_INFINITE);
                    } else {
                        break;
                    }

                    delta += delta / 4;
                }

                self.value_stack[depth as usize] = value;

                if is_main {
                    if !self.stopped() {
                        self.report_pv(value, &pv, alpha, beta);
                    }

                    // Mate and stalemate leave an empty pv.
                    if !pv.is_empty() {
                        self.multi_pv_moves[multi_pv] = pv.best();
                        if multi_pv == 0 {
                            best_move = pv.best();
                            self.best_move_stack[depth as usize] = best_move;
                        }
                    }

                    self.update_time_management(depth);

                    if limits.time > 0
                        && self
                            .time
                            .should_stop(elapsed_ms(self.start), self.pv_stability)
                    {
                        debug!(
                            "time budget spent after depth {depth} ({} ms, stability {})",
                            elapsed_ms(self.start),
                            self.pv_stability
                        );
                        self.shared().stop_searching();
                    }
                }
            }

            depth += 1;
        }

        if is_main {
            debug!(
                "search finished: best {best_move} after {} nodes in {} ms",
                self.shared().total_nodes(),
                elapsed_ms(self.start)
            );
            self.shared().publish_best_move(best_move);
            self.shared().stop_searching();
            uci::send_bestmove(best_move);
        }

        best_move
    }

    fn update_time_management(&mut self, depth: Depth) {
        if depth > 5 {
            let d = depth as usize;
            self.time
                .update(self.value_stack[d], self.value_stack[d - 1]);

            self.pv_stability = (self.pv_stability - 1).max(0);
            if self.best_move_stack[d - 1] != self.best_move_stack[d] {
                self.pv_stability = 8;
            }
        }
    }

    fn report_pv(&self, value: Value, pv: &PrincipalVariation, alpha: Value, beta: Value) {
        uci::send_pv(&uci::PvReport {
            depth: self.depth,
            sel_depth: self.sel_depth,
            multi_pv: if self.shared().limits.multi_pv > 1 {
                Some(self.multi_pv + 1)
            } else {
                None
            },
            value,
            alpha,
            beta,
            nodes: self.shared().total_nodes(),
            elapsed: elapsed_ms(self.start),
            hashfull: self.shared().tt.hashfull(),
            moves: pv.iter().collect(),
        });
    }

    /// Full-width alpha-beta.
    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        mut alpha: Value,
        mut beta: Value,
        depth: Depth,
        plies: usize,
        cut_node: bool,
        pruning: bool,
        excluded: Move,
        pv: &mut PrincipalVariation,
    ) -> Value {
        if self.is_main() && (self.nodes & 1023) == 1023 {
            self.check_finished();
        }

        // Horizon reached: resolve tactics first.
        if depth <= 0 {
            return self.qsearch(alpha, beta, 0, plies);
        }

        debug_assert!(alpha >= -VALUE_INFINITE && beta <= VALUE_INFINITE && alpha < beta);

        self.add_node();
        self.sel_depth = self.sel_depth.max(plies + 1);

        let root_node = plies == 0;
        let pv_node = beta - alpha != 1;
        let in_check = self.board.in_check();

        if !root_node {
            if self.stopped() {
                return VALUE_DRAW;
            }

            if self.board.check_draw() {
                return VALUE_DRAW;
            }

            if plies >= DEPTH_MAX as usize {
                return if in_check { VALUE_DRAW } else { self.evaluate() };
            }

            // Mate distance pruning.
            alpha = alpha.max(mated_value(plies));
            beta = beta.min(mate_value(plies + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let mut child_pv = PrincipalVariation::new();
        let mut quiet_moves = MoveList::new();
        let mut best_value = -VALUE_INFINITE;
        let mut best_move = MOVE_NONE;
        let mut value;
        let mut tt_move = MOVE_NONE;
        let mut tt_value = VALUE_NONE;
        let mut tt_entry = None;
        let mut eval = VALUE_NONE;
        let excluded_active = excluded != MOVE_NONE;

        self.eval_stack[plies] = VALUE_NONE;
        self.current_move[plies] = MOVE_NONE;
        self.killers.clear_ply(plies + 1);

        // No table probing inside a singular verification search.
        if !excluded_active {
            if let Some(data) = self.shared().tt.probe(self.board.hashkey()) {
                tt_entry = Some(data);
                tt_move = data.mv;
                tt_value = value_from_tt(data.value, plies as Depth);

                if !pv_node && data.depth >= depth && tt_value != VALUE_NONE {
                    match data.bound {
                        Bound::Exact => return tt_value,
                        Bound::Upper if tt_value <= alpha => return tt_value,
                        Bound::Lower if tt_value >= beta => return tt_value,
                        _ => {}
                    }
                }
            }
        }

        // Static evaluation, reusing a cached one when available.
        if !in_check {
            match tt_entry {
                Some(data) => {
                    eval = if data.eval != VALUE_NONE {
                        data.eval
                    } else {
                        self.evaluate()
                    };
                }
                None => {
                    eval = self.evaluate();
                    self.shared().tt.store(
                        self.board.hashkey(),
                        DEPTH_NONE,
                        VALUE_NONE,
                        eval,
                        MOVE_NONE,
                        Bound::None,
                    );
                }
            }

            self.eval_stack[plies] = eval;
        }

        if pruning {
            // Razoring: a hopeless static eval one ply from the horizon
            // drops straight into quiescence.
            if !root_node && depth == 1 && !in_check && eval + RAZOR_MARGIN <= alpha {
                return self.qsearch(alpha, beta, 0, plies);
            }

            // Null move pruning with a dynamic reduction.
            if !pv_node
                && depth >= 2
                && !in_check
                && self.board.minors_and_majors(self.board.turn()) != 0
                && eval >= beta
            {
                let reduction = 2 + (32 * depth + (eval - beta).min(512)) / 128;

                self.board.do_nullmove();
                value = -self.search(
                    -beta,
                    -beta + 1,
                    depth - reduction,
                    plies + 1,
                    !cut_node,
                    false,
                    MOVE_NONE,
                    &mut child_pv,
                );
                self.board.undo_nullmove();

                if value >= beta {
                    trace!(
                        "null move cutoff at ply {plies}, depth {depth} (R = {reduction})"
                    );
                    // Mate scores from a null search are not to be trusted.
                    if value >= VALUE_MATE_MAX {
                        value = beta;
                    }
                    if beta.abs() < VALUE_MATE_MAX {
                        return value;
                    }
                }
            }
        }

        // Internal iterative deepening: a PV node without a hash move is
        // worth a shallow search just to get one.
        if pv_node && !in_check && tt_move == MOVE_NONE && depth >= 6 {
            self.search(
                alpha,
                beta,
                depth - 2,
                plies + 1,
                cut_node,
                pruning,
                MOVE_NONE,
                &mut child_pv,
            );

            if let Some(data) = self.shared().tt.probe(self.board.hashkey()) {
                tt_entry = Some(data);
                tt_move = data.mv;
            }
        }

        let killers = [self.killers.first(plies), self.killers.second(plies)];
        let counter = if plies > 0 && self.current_move[plies - 1] != MOVE_NONE {
            let prev_to = self.current_move[plies - 1].to_sq();
            match self.board.piece_on(prev_to) {
                Some(pt) => self.counter_moves.get(self.board.owner(prev_to), pt, prev_to),
                None => MOVE_NONE,
            }
        } else {
            MOVE_NONE
        };

        let mut picker = MovePicker::new(tt_move, killers, counter);
        let mut moves_count = 0usize;

        loop {
            let mv = picker.pick(&self.board, &self.history);
            if mv == MOVE_NONE {
                break;
            }

            // Skip the excluded move of a singular verification search
            // and root moves already searched by earlier MultiPV passes.
            if mv == excluded {
                continue;
            }
            if root_node && self.multipv_played(mv) {
                continue;
            }
            if !self.board.is_legal(mv) {
                continue;
            }

            moves_count += 1;

            let capture = self.board.is_capture(mv);
            let gives_check = self.board.gives_check(mv);
            let promotion = mv.is_promotion();
            let quiet = !capture && !promotion;

            if quiet {
                quiet_moves.push(mv);
            }

            // Futility pruning of late quiet moves near the horizon.
            if quiet
                && !gives_check
                && !pv_node
                && !in_check
                && moves_count > 1
                && depth <= 5
                && eval + FUTILITY_MARGIN[depth as usize] <= alpha
            {
                continue;
            }

            let mut extension: Depth = 0;

            // Singular extension: if every alternative fails well below
            // the hash move's score, the hash move is the position's
            // only idea and deserves a full extra ply.
            let singular_candidate = depth >= 8
                && mv == tt_move
                && excluded == MOVE_NONE
                && !root_node
                && tt_value != VALUE_NONE
                && tt_entry
                    .map(|e| e.bound == Bound::Lower && e.depth >= depth - 3)
                    .unwrap_or(false);

            if singular_candidate {
                let rbeta = (tt_value - 2 * depth).max(-VALUE_MATE);
                let verification = self.search(
                    rbeta - 1,
                    rbeta,
                    depth / 2,
                    plies + 1,
                    cut_node,
                    false,
                    mv,
                    &mut child_pv,
                );
                if verification < rbeta {
                    trace!("singular extension for {mv} at ply {plies}, depth {depth}");
                    extension = 1;
                }
            } else if in_check && self.board.see(mv) >= 0 {
                extension = 1;
            }

            let new_depth = depth - 1 + extension;

            self.board.do_move(mv);
            self.current_move[plies] = mv;
            child_pv.reset();

            if root_node && self.is_main() && elapsed_ms(self.start) > 5000 {
                uci::send_currmove(mv, moves_count);
            }

            // Late move reductions for quiet moves far down the list.
            let mut reductions = 0;
            if moves_count > 1 && depth >= 3 && quiet {
                reductions = lmr_reduction(depth, moves_count);
                reductions -= i32::from(pv_node);
                reductions += i32::from(cut_node);
                reductions -= i32::from(
                    mv == killers[0] || mv == killers[1] || mv == picker.counter_move,
                );
                reductions -= i32::from(in_check);
                // Moves with a good history record keep their depth.
                let moved = self.board.piece_on(mv.to_sq()).expect("just moved");
                reductions -=
                    (self.history.get(!self.board.turn(), moved, mv.to_sq()) / 512).clamp(-1, 1);
                reductions = reductions.clamp(0, depth - 2);
            }

            // Principal variation search: probe with a zero window,
            // re-search on every surprise.
            value = 0;
            if reductions > 0 {
                value = -self.search(
                    -alpha - 1,
                    -alpha,
                    new_depth - reductions,
                    plies + 1,
                    true,
                    pruning,
                    MOVE_NONE,
                    &mut child_pv,
                );
            }

            if reductions > 0 && value > alpha {
                trace!("re-search {mv} at full depth after reduction {reductions}");
            }

            if (reductions > 0 && value > alpha)
                || (reductions == 0 && !(pv_node && moves_count == 1))
            {
                value = -self.search(
                    -alpha - 1,
                    -alpha,
                    new_depth,
                    plies + 1,
                    !cut_node,
                    pruning,
                    MOVE_NONE,
                    &mut child_pv,
                );
            }

            if pv_node && (moves_count == 1 || (value > alpha && (root_node || value < beta))) {
                value = -self.search(
                    -beta,
                    -alpha,
                    new_depth,
                    plies + 1,
                    false,
                    pruning,
                    MOVE_NONE,
                    &mut child_pv,
                );
            }

            self.board.undo_move();

            if self.stopped() {
                return VALUE_DRAW;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    alpha = value;
                    best_move = mv;
                    pv.update(best_move, &child_pv);
                    if value >= beta {
                        break;
                    }
                }
            }
        }

        if moves_count == 0 {
            if excluded_active {
                return alpha;
            }
            return if in_check {
                mated_value(plies)
            } else {
                VALUE_DRAW
            };
        }

        if best_value >= beta && !best_move.is_promotion() && !self.board.is_capture(best_move) {
            self.update_quiet_stats(plies, depth, &quiet_moves, best_move);
        }

        // No store during singular verification, and never overwrite the
        // first line's entry from a later MultiPV pass.
        if !excluded_active && !(root_node && self.multi_pv > 0) {
            let bound = if best_value >= beta {
                Bound::Lower
            } else if pv_node && best_move != MOVE_NONE {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.shared().tt.store(
                self.board.hashkey(),
                depth,
                value_to_tt(best_value, plies as Depth),
                eval,
                best_move,
                bound,
            );
        }

        debug_assert!(best_value > -VALUE_INFINITE && best_value < VALUE_INFINITE);
        best_value
    }

    /// Quiescence search: captures only (all evasions in check), with
    /// stand pat, delta pruning and SEE pruning.
    fn qsearch(&mut self, mut alpha: Value, beta: Value, depth: Depth, plies: usize) -> Value {
        debug_assert!(alpha >= -VALUE_INFINITE && beta <= VALUE_INFINITE && alpha < beta);

        self.add_node();
        self.sel_depth = self.sel_depth.max(plies);

        if self.is_main() && (self.nodes & 1023) == 1023 {
            self.check_finished();
        }

        let in_check = self.board.in_check();

        if self.stopped() || self.board.check_draw() {
            return VALUE_DRAW;
        }

        if plies >= DEPTH_MAX as usize {
            return if in_check { VALUE_DRAW } else { self.evaluate() };
        }

        let pv_node = beta - alpha != 1;
        let old_alpha = alpha;
        // Quiescence entries share one of two depth tags so they stay
        // comparable across visits.
        let tt_depth: Depth = if in_check || depth >= 0 { 0 } else { -1 };

        self.current_move[plies] = MOVE_NONE;

        let tt_entry = self.shared().tt.probe(self.board.hashkey());
        let mut tt_move = MOVE_NONE;

        if let Some(data) = tt_entry {
            if !pv_node && data.depth >= tt_depth {
                let tt_value = value_from_tt(data.value, plies as Depth);
                tt_move = data.mv;

                if tt_value != VALUE_NONE {
                    match data.bound {
                        Bound::Exact => return tt_value,
                        Bound::Upper if tt_value <= alpha => return tt_value,
                        Bound::Lower if tt_value >= beta => return tt_value,
                        _ => {}
                    }
                }
            }
        }

        let mut best_value;
        let mut delta_base;
        let eval;

        if in_check {
            eval = VALUE_NONE;
            best_value = -VALUE_INFINITE;
            delta_base = -VALUE_INFINITE;
        } else {
            eval = match tt_entry {
                Some(data) if data.eval != VALUE_NONE => data.eval,
                _ => self.evaluate(),
            };

            self.eval_stack[plies] = eval;
            best_value = eval;

            // Stand pat.
            if best_value >= beta {
                return best_value;
            }
            if pv_node && best_value > alpha {
                alpha = best_value;
            }

            delta_base = best_value + DELTA_MARGIN;
        }

        let mut moves_count = 0usize;
        let mut best_move = MOVE_NONE;

        let last_move = if plies > 0 {
            self.current_move[plies - 1]
        } else {
            MOVE_NONE
        };
        let mut picker = MovePicker::new_qsearch(&self.board, last_move, tt_move);

        loop {
            let mv = picker.pick(&self.board, &self.history);
            if mv == MOVE_NONE {
                break;
            }

            if !self.board.is_legal(mv) {
                continue;
            }

            moves_count += 1;

            let gives_check = self.board.gives_check(mv);

            // Delta pruning: even winning this victim plus a margin will
            // not lift the score to alpha.
            if !in_check && !gives_check && !self.board.is_dangerous_pawn_push(mv) {
                let victim_gain = match self.board.piece_on(mv.to_sq()) {
                    Some(victim) => material_value(victim).eg,
                    None => 0,
                };
                let delta_value = delta_base + victim_gain;

                if delta_value <= alpha {
                    best_value = best_value.max(delta_value);
                    continue;
                }

                if delta_base <= alpha && self.board.see(mv) <= 0 {
                    best_value = best_value.max(delta_base);
                    continue;
                }
            }

            // Losing captures resolve nothing at the horizon.
            if !in_check && self.board.see(mv) < 0 {
                continue;
            }

            self.board.do_move(mv);
            self.current_move[plies] = mv;
            let value = -self.qsearch(-beta, -alpha, depth - 1, plies + 1);
            self.board.undo_move();

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if pv_node && value < beta {
                        alpha = value;
                    } else {
                        break;
                    }
                }
            }
        }

        // Every evasion was illegal or none exist: checkmate.
        if in_check && moves_count == 0 {
            return mated_value(plies);
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if pv_node && best_value > old_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.shared().tt.store(
            self.board.hashkey(),
            tt_depth,
            value_to_tt(best_value, plies as Depth),
            eval,
            best_move,
            bound,
        );

        debug_assert!(best_value > -VALUE_INFINITE && best_value < VALUE_INFINITE);
        best_value
    }

    fn update_quiet_stats(
        &mut self,
        plies: usize,
        depth: Depth,
        quiet_moves: &MoveList,
        best_move: Move,
    ) {
        self.killers.update(plies, best_move);

        // Remember the refutation of the move that led here.
        if plies > 0 && self.current_move[plies - 1] != MOVE_NONE {
            let prev_to = self.current_move[plies - 1].to_sq();
            if let Some(pt) = self.board.piece_on(prev_to) {
                self.counter_moves
                    .set(self.board.owner(prev_to), pt, prev_to, best_move);
            }
        }

        let bonus = (depth * depth).min(400);

        // Reward the cutoff move, tax every quiet tried before it.
        for &mv in quiet_moves.iter() {
            let delta = if mv == best_move { bonus } else { -bonus };
            if let Some(pt) = self.board.piece_on(mv.from_sq()) {
                self.history
                    .update(self.board.turn(), pt, mv.to_sq(), delta);
            }
        }
    }
}
