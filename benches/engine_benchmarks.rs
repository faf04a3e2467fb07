//! Criterion benchmarks for the hot paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use delocto::board::Board;
use delocto::eval::{evaluate, EvalCaches};
use delocto::perft::perft;
use delocto::search::SearchLimits;
use delocto::threads::ThreadPool;
use delocto::tt::TranspositionTable;
use std::sync::Arc;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn bench_perft(c: &mut Criterion) {
    delocto::init();
    let mut group = c.benchmark_group("perft");

    let mut startpos = Board::new();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut startpos, black_box(depth)))
        });
    }

    let mut kiwipete = Board::from_fen(KIWIPETE).unwrap();
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| perft(&mut kiwipete, black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    delocto::init();
    let mut group = c.benchmark_group("movegen");

    for (name, fen) in [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("kiwipete", KIWIPETE),
    ] {
        let board = Board::from_fen(fen).unwrap();
        group.bench_function(name, |b| b.iter(|| black_box(board.generate_legal())));
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    delocto::init();
    let mut group = c.benchmark_group("eval");

    for (name, fen) in [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", KIWIPETE),
        ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1"),
    ] {
        let board = Board::from_fen(fen).unwrap();
        let mut caches = EvalCaches::new();
        group.bench_function(name, |b| {
            b.iter(|| black_box(evaluate(&board, &mut caches)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    delocto::init();
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    for depth in [4, 6] {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| {
                let tt = Arc::new(TranspositionTable::new(16));
                let mut pool = ThreadPool::new(1, tt);
                let board = Board::new();
                let limits = SearchLimits {
                    depth,
                    ..SearchLimits::default()
                };
                pool.start_search(&board, limits, 0);
                pool.wait();
                black_box(pool.nodes())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_eval, bench_search);
criterion_main!(benches);
