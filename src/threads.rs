//! Lazy-SMP worker pool.
//!
//! Every worker searches the same root independently; cooperation
//! happens through the shared transposition table and an atomic stop
//! flag. Worker state (board copy, evaluation caches, move ordering
//! tables) is parked in the pool between searches and moved into a
//! freshly spawned thread for each `go`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::board::types::moves::{Move, MOVE_NONE};
use crate::board::Board;
use crate::search::{SearchLimits, Worker};
use crate::tt::TranspositionTable;

/// Stack size for search threads; the recursion gets deep.
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// State shared by every worker of one search.
pub struct SharedSearch {
    pub tt: Arc<TranspositionTable>,
    pub limits: SearchLimits,
    pub move_overhead: u64,
    stop: AtomicBool,
    nodes: Vec<AtomicU64>,
    best_move: Mutex<Move>,
}

impl SharedSearch {
    #[must_use]
    pub fn new(
        tt: Arc<TranspositionTable>,
        limits: SearchLimits,
        move_overhead: u64,
        thread_count: usize,
    ) -> Self {
        SharedSearch {
            tt,
            limits,
            move_overhead,
            stop: AtomicBool::new(false),
            nodes: (0..thread_count).map(|_| AtomicU64::new(0)).collect(),
            best_move: Mutex::new(MOVE_NONE),
        }
    }

    #[inline]
    #[must_use]
    pub fn has_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Ask every worker to unwind at its next poll.
    pub fn stop_searching(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Publish a worker's node count for the main thread to sum.
    #[inline]
    pub fn publish_nodes(&self, index: usize, nodes: u64) {
        self.nodes[index].store(nodes, Ordering::Relaxed);
    }

    #[must_use]
    pub fn total_nodes(&self) -> u64 {
        self.nodes.iter().map(|n| n.load(Ordering::Relaxed)).sum()
    }

    /// Record the main worker's best root move.
    pub fn publish_best_move(&self, mv: Move) {
        *self.best_move.lock() = mv;
    }

    #[must_use]
    pub fn best_move(&self) -> Move {
        *self.best_move.lock()
    }
}

pub struct ThreadPool {
    tt: Arc<TranspositionTable>,
    workers: Vec<Option<Box<Worker>>>,
    handles: Vec<JoinHandle<Box<Worker>>>,
    shared: Option<Arc<SharedSearch>>,
}

impl ThreadPool {
    #[must_use]
    pub fn new(thread_count: usize, tt: Arc<TranspositionTable>) -> Self {
        let workers = (0..thread_count.max(1))
            .map(|index| Some(Box::new(Worker::new(index))))
            .collect();
        ThreadPool {
            tt,
            workers,
            handles: Vec::new(),
            shared: None,
        }
    }

    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Change the worker count. Any running search is finished first.
    pub fn resize(&mut self, thread_count: usize) {
        self.stop_searching();
        self.wait();
        let count = thread_count.max(1);
        self.workers = (0..count)
            .map(|index| Some(Box::new(Worker::new(index))))
            .collect();
    }

    /// Swap in a new transposition table (the `Hash` option changed).
    pub fn set_tt(&mut self, tt: Arc<TranspositionTable>) {
        self.stop_searching();
        self.wait();
        self.tt = tt;
    }

    /// Reset every worker's long-lived state for a new game.
    pub fn reset(&mut self) {
        self.stop_searching();
        self.wait();
        for slot in &mut self.workers {
            if let Some(worker) = slot.as_mut() {
                worker.reset();
            }
        }
    }

    /// True when no search is running (or the current one is unwinding).
    #[must_use]
    pub fn has_stopped(&self) -> bool {
        match &self.shared {
            Some(shared) => shared.has_stopped(),
            None => true,
        }
    }

    pub fn stop_searching(&self) {
        if let Some(shared) = &self.shared {
            shared.stop_searching();
        }
    }

    /// Block until every worker thread has returned and park their state
    /// back into the pool.
    pub fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Ok(worker) = handle.join() {
                let index = worker.index;
                self.workers[index] = Some(worker);
            }
        }
    }

    /// Best move published by the main worker of the current search.
    #[must_use]
    pub fn best_move(&self) -> Move {
        match &self.shared {
            Some(shared) => shared.best_move(),
            None => MOVE_NONE,
        }
    }

    /// Total nodes searched by all workers of the current search.
    #[must_use]
    pub fn nodes(&self) -> u64 {
        match &self.shared {
            Some(shared) => shared.total_nodes(),
            None => 0,
        }
    }

    /// Launch a search on every worker. The caller must have waited for
    /// any previous search. The main worker (index 0) reports progress
    /// and prints `bestmove` when it finishes.
    pub fn start_search(&mut self, board: &Board, limits: SearchLimits, move_overhead: u64) {
        debug_assert!(self.handles.is_empty());

        self.tt.new_search();

        let shared = Arc::new(SharedSearch::new(
            Arc::clone(&self.tt),
            limits,
            move_overhead,
            self.workers.len(),
        ));
        self.shared = Some(Arc::clone(&shared));

        for slot in &mut self.workers {
            let mut worker = slot.take().expect("worker parked");
            worker.prepare(board, Arc::clone(&shared));

            let handle = std::thread::Builder::new()
                .name(format!("search-{}", worker.index))
                .stack_size(SEARCH_STACK_SIZE)
                .spawn(move || {
                    worker.iterate();
                    worker
                })
                .expect("failed to spawn search worker");

            self.handles.push(handle);
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.stop_searching();
        self.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::DEPTH_MAX;

    fn quiet_limits(depth: i32) -> SearchLimits {
        SearchLimits {
            depth: depth.min(DEPTH_MAX),
            ..SearchLimits::default()
        }
    }

    #[test]
    fn test_pool_runs_and_counts_nodes() {
        let tt = Arc::new(TranspositionTable::new(1));
        let mut pool = ThreadPool::new(1, tt);
        let board = Board::new();

        pool.start_search(&board, quiet_limits(3), 0);
        pool.wait();

        assert!(pool.has_stopped());
        assert!(pool.nodes() > 0);
    }

    #[test]
    fn test_pool_stop_is_idempotent() {
        let tt = Arc::new(TranspositionTable::new(1));
        let mut pool = ThreadPool::new(2, tt);
        let board = Board::new();

        pool.start_search(&board, quiet_limits(3), 0);
        pool.stop_searching();
        pool.stop_searching();
        pool.wait();
        assert!(pool.has_stopped());
    }

    #[test]
    fn test_pool_resize_between_searches() {
        let tt = Arc::new(TranspositionTable::new(1));
        let mut pool = ThreadPool::new(1, tt);
        assert_eq!(pool.thread_count(), 1);
        pool.resize(3);
        assert_eq!(pool.thread_count(), 3);

        let board = Board::new();
        pool.start_search(&board, quiet_limits(2), 0);
        pool.wait();
        assert!(pool.nodes() > 0);
    }
}
