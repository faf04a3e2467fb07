//! UCI front end.
//!
//! Parses the command stream from the GUI, keeps the current position,
//! owns the transposition table and the worker pool, and prints all
//! engine output. Malformed input is reported with `info string` and
//! otherwise ignored; a bad `position` command leaves the previous
//! position untouched.

use std::io::BufRead;
use std::sync::Arc;

use log::debug;

use crate::board::types::moves::{Move, MOVE_NONE};
use crate::board::types::{Depth, Value, DEPTH_MAX, VALUE_MATE, VALUE_MATE_MAX};
use crate::board::{Board, Color};
use crate::search::SearchLimits;
use crate::threads::ThreadPool;
use crate::tt::TranspositionTable;
use crate::{bench, eval, perft};

pub const ENGINE_NAME: &str = "Delocto";
pub const ENGINE_VERSION: &str = "0.6";

const HASH_DEFAULT: usize = 64;
const HASH_MIN: usize = 1;
const HASH_MAX: usize = 4096;
const THREADS_DEFAULT: usize = 1;
const THREADS_MIN: usize = 1;
const THREADS_MAX: usize = 4;
const MOVE_OVERHEAD_DEFAULT: u64 = 100;
const MOVE_OVERHEAD_MAX: u64 = 10_000;
const MULTI_PV_DEFAULT: usize = 1;
const MULTI_PV_MAX: usize = 100;

/// Everything `info ... pv` needs for one report line.
pub struct PvReport {
    pub depth: Depth,
    pub sel_depth: usize,
    pub multi_pv: Option<usize>,
    pub value: Value,
    pub alpha: Value,
    pub beta: Value,
    pub nodes: u64,
    pub elapsed: u64,
    pub hashfull: u32,
    pub moves: Vec<Move>,
}

/// Print a search progress line.
pub fn send_pv(report: &PvReport) {
    let mut line = format!("info depth {} seldepth {}", report.depth, report.sel_depth);

    if let Some(index) = report.multi_pv {
        line.push_str(&format!(" multipv {index}"));
    }

    if report.value.abs() >= VALUE_MATE_MAX {
        let plies = if report.value > 0 {
            VALUE_MATE - report.value + 1
        } else {
            -VALUE_MATE - report.value
        };
        line.push_str(&format!(" score mate {}", plies / 2));
    } else {
        line.push_str(&format!(" score cp {}", report.value));
    }

    if report.value >= report.beta {
        line.push_str(" lowerbound");
    } else if report.value <= report.alpha {
        line.push_str(" upperbound");
    }

    let nps = if report.elapsed > 0 {
        report.nodes * 1000 / report.elapsed
    } else {
        report.nodes
    };

    line.push_str(&format!(
        " nodes {} time {} nps {} hashfull {}",
        report.nodes, report.elapsed, nps, report.hashfull
    ));

    if !report.moves.is_empty() {
        line.push_str(" pv");
        for mv in &report.moves {
            line.push_str(&format!(" {mv}"));
        }
    }

    println!("{line}");
}

pub fn send_currmove(mv: Move, index: usize) {
    println!("info currmove {mv} currmovenumber {index}");
}

/// `bestmove` terminates every search; mate and stalemate report "none".
pub fn send_bestmove(mv: Move) {
    if mv == MOVE_NONE {
        println!("bestmove none");
    } else {
        println!("bestmove {mv}");
    }
}

pub fn send_string(message: &str) {
    println!("info string {message}");
}

struct Options {
    hash_mb: usize,
    threads: usize,
    move_overhead: u64,
    multi_pv: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            hash_mb: HASH_DEFAULT,
            threads: THREADS_DEFAULT,
            move_overhead: MOVE_OVERHEAD_DEFAULT,
            multi_pv: MULTI_PV_DEFAULT,
        }
    }
}

pub struct Uci {
    board: Board,
    tt: Arc<TranspositionTable>,
    pool: ThreadPool,
    options: Options,
}

impl Uci {
    #[must_use]
    pub fn new() -> Self {
        let options = Options::default();
        let tt = Arc::new(TranspositionTable::new(options.hash_mb));
        let pool = ThreadPool::new(options.threads, Arc::clone(&tt));
        Uci {
            board: Board::new(),
            tt,
            pool,
            options,
        }
    }

    /// Run the command loop. With arguments, execute them as a single
    /// command line and return (handy for `delocto bench`).
    pub fn run(&mut self, args: &[String]) {
        if !args.is_empty() {
            let line = args.join(" ");
            self.handle_line(&line);
            self.pool.stop_searching();
            self.pool.wait();
            return;
        }

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if self.handle_line(&line) {
                break;
            }
        }
    }

    /// Dispatch one input line. Returns true on `quit`.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            return false;
        };

        debug!("uci input: {line}");

        match command {
            "uci" => self.show_identity(),
            "isready" => println!("readyok"),
            "ucinewgame" => self.new_game(),
            "setoption" => self.handle_setoption(&parts),
            "position" => self.handle_position(&parts),
            "go" => self.handle_go(&parts),
            "stop" => self.pool.stop_searching(),
            "eval" => print!("{}", eval::trace(&self.board)),
            "perft" => {
                let depth = parts.get(1).and_then(|p| p.parse().ok()).unwrap_or(1);
                self.stop_and_wait();
                perft::run(&self.board.get_fen(), depth);
            }
            "bench" => {
                self.stop_and_wait();
                bench::benchmark(&mut self.pool, &self.tt, bench::BENCH_DEPTH);
            }
            "quit" => {
                self.stop_and_wait();
                return true;
            }
            _ => send_string(&format!("Unknown command: {command}")),
        }

        false
    }

    fn show_identity(&self) {
        println!("id name {ENGINE_NAME} {ENGINE_VERSION}");
        println!("id author the {ENGINE_NAME} developers");
        println!();
        println!(
            "option name Hash type spin default {HASH_DEFAULT} min {HASH_MIN} max {HASH_MAX}"
        );
        println!(
            "option name Threads type spin default {THREADS_DEFAULT} min {THREADS_MIN} max {THREADS_MAX}"
        );
        println!("option name Clear Hash type button");
        println!(
            "option name MoveOverhead type spin default {MOVE_OVERHEAD_DEFAULT} min 0 max {MOVE_OVERHEAD_MAX}"
        );
        println!(
            "option name MultiPV type spin default {MULTI_PV_DEFAULT} min 1 max {MULTI_PV_MAX}"
        );
        println!("uciok");
    }

    fn stop_and_wait(&mut self) {
        self.pool.stop_searching();
        self.pool.wait();
    }

    fn new_game(&mut self) {
        self.stop_and_wait();
        self.board = Board::new();
        self.tt.clear();
        self.pool.reset();
    }

    fn handle_setoption(&mut self, parts: &[&str]) {
        let mut name_words: Vec<&str> = Vec::new();
        let mut value_words: Vec<&str> = Vec::new();
        let mut section = "";

        for &part in &parts[1..] {
            match part {
                "name" => section = "name",
                "value" => section = "value",
                _ => match section {
                    "name" => name_words.push(part),
                    "value" => value_words.push(part),
                    _ => {}
                },
            }
        }

        let name = name_words.join(" ").to_ascii_lowercase();
        let value = value_words.join(" ");

        match name.as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(mb) if (HASH_MIN..=HASH_MAX).contains(&mb) => {
                    self.options.hash_mb = mb;
                    let tt = Arc::new(TranspositionTable::new(mb));
                    self.pool.set_tt(Arc::clone(&tt));
                    self.tt = tt;
                }
                _ => send_string(&format!("Error: invalid value for option Hash: {value}")),
            },
            "threads" => match value.parse::<usize>() {
                Ok(threads) if (THREADS_MIN..=THREADS_MAX).contains(&threads) => {
                    self.options.threads = threads;
                    self.pool.resize(threads);
                }
                _ => send_string(&format!("Error: invalid value for option Threads: {value}")),
            },
            "clear hash" => self.tt.clear(),
            "moveoverhead" => match value.parse::<u64>() {
                Ok(ms) if ms <= MOVE_OVERHEAD_MAX => self.options.move_overhead = ms,
                _ => send_string(&format!(
                    "Error: invalid value for option MoveOverhead: {value}"
                )),
            },
            "multipv" => match value.parse::<usize>() {
                Ok(count) if (1..=MULTI_PV_MAX).contains(&count) => {
                    self.options.multi_pv = count;
                }
                _ => send_string(&format!("Error: invalid value for option MultiPV: {value}")),
            },
            _ => send_string(&format!("Error: no option named \"{name}\"")),
        }
    }

    fn handle_position(&mut self, parts: &[&str]) {
        let mut scratch = Board::new();
        let mut index = 1;

        match parts.get(index) {
            Some(&"startpos") => {
                index += 1;
            }
            Some(&"fen") => {
                index += 1;
                let mut fen_words: Vec<&str> = Vec::new();
                while index < parts.len() && parts[index] != "moves" {
                    fen_words.push(parts[index]);
                    index += 1;
                }
                if let Err(error) = scratch.set_fen(&fen_words.join(" ")) {
                    send_string(&format!("Error: {error}"));
                    return;
                }
            }
            _ => {
                send_string("Error: position needs startpos or fen");
                return;
            }
        }

        if parts.get(index) == Some(&"moves") {
            for &text in &parts[index + 1..] {
                match scratch.parse_move(text) {
                    Ok(mv) => scratch.do_move(mv),
                    Err(error) => {
                        send_string(&format!("Error: {error}"));
                        return;
                    }
                }
            }
        }

        self.board = scratch;
    }

    fn handle_go(&mut self, parts: &[&str]) {
        let mut limits = SearchLimits {
            multi_pv: self.options.multi_pv,
            ..SearchLimits::default()
        };

        let stm = self.board.turn();
        let mut index = 1;
        while index < parts.len() {
            let consumed = match parts[index] {
                "infinite" => {
                    limits.infinite = true;
                    break;
                }
                "depth" => {
                    if let Some(depth) = parts.get(index + 1).and_then(|p| p.parse::<Depth>().ok())
                    {
                        limits.depth = depth.clamp(1, DEPTH_MAX);
                    }
                    break;
                }
                "nodes" => {
                    if let Some(nodes) = parts.get(index + 1).and_then(|p| p.parse::<u64>().ok()) {
                        limits.nodes = nodes.max(1);
                    }
                    break;
                }
                "movetime" => {
                    if let Some(ms) = parts.get(index + 1).and_then(|p| p.parse::<u64>().ok()) {
                        limits.move_time = ms;
                    }
                    break;
                }
                "wtime" | "btime" => {
                    let matches_stm = (parts[index] == "wtime") == (stm == Color::White);
                    if matches_stm {
                        if let Some(ms) = parts.get(index + 1).and_then(|p| p.parse::<u64>().ok())
                        {
                            limits.time = ms;
                        }
                    }
                    2
                }
                "winc" | "binc" => {
                    let matches_stm = (parts[index] == "winc") == (stm == Color::White);
                    if matches_stm {
                        if let Some(ms) = parts.get(index + 1).and_then(|p| p.parse::<u64>().ok())
                        {
                            limits.increment = ms;
                        }
                    }
                    2
                }
                _ => 1,
            };
            index += consumed;
        }

        self.stop_and_wait();
        self.pool
            .start_search(&self.board, limits, self.options.move_overhead);
    }
}

impl Default for Uci {
    fn default() -> Self {
        Uci::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_startpos_with_moves() {
        let mut uci = Uci::new();
        uci.handle_line("position startpos moves e2e4 e7e5 g1f3");
        assert_eq!(
            uci.board.get_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
    }

    #[test]
    fn test_position_bad_move_keeps_previous() {
        let mut uci = Uci::new();
        uci.handle_line("position startpos moves e2e4");
        let before = uci.board.get_fen();
        // e7e6 is fine, the follow-up is illegal: the whole load aborts.
        uci.handle_line("position startpos moves e2e4 e7e6 a1a5");
        assert_eq!(uci.board.get_fen(), before);
    }

    #[test]
    fn test_position_fen() {
        let mut uci = Uci::new();
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        uci.handle_line(&format!("position fen {fen}"));
        assert_eq!(uci.board.get_fen(), fen);
    }

    #[test]
    fn test_position_bad_fen_keeps_previous() {
        let mut uci = Uci::new();
        let before = uci.board.get_fen();
        uci.handle_line("position fen not a real fen at all 1");
        assert_eq!(uci.board.get_fen(), before);
    }

    #[test]
    fn test_go_depth_and_quit() {
        let mut uci = Uci::new();
        uci.handle_line("position startpos");
        uci.handle_line("go depth 2");
        assert!(uci.handle_line("quit"));
    }

    #[test]
    fn test_setoption_roundtrip() {
        let mut uci = Uci::new();
        uci.handle_line("setoption name MultiPV value 3");
        assert_eq!(uci.options.multi_pv, 3);
        uci.handle_line("setoption name MultiPV value 9999");
        assert_eq!(uci.options.multi_pv, 3);
        uci.handle_line("setoption name MoveOverhead value 250");
        assert_eq!(uci.options.move_overhead, 250);
        uci.handle_line("setoption name Threads value 2");
        assert_eq!(uci.options.threads, 2);
    }

    #[test]
    fn test_unknown_input_is_not_fatal() {
        let mut uci = Uci::new();
        assert!(!uci.handle_line("flibbertigibbet"));
        assert!(!uci.handle_line(""));
        assert!(!uci.handle_line("setoption name NoSuchOption value 1"));
    }
}
