use criterion::{black_box, criterion_group, criterion_main, Criterion};
use montebot::board::cozy::Position;
use montebot::search::mcts::{Mcts, SearchSettings};
use std::time::Duration;

fn bench_playouts(c: &mut Criterion) {
    c.bench_function("mcts_2000_playouts_startpos", |ben| {
        ben.iter(|| {
            let settings = SearchSettings {
                seed: Some(1),
                max_playouts: 2_000,
                ..SearchSettings::default()
            };
            let mut searcher = Mcts::new(settings);
            let mut pos = Position::startpos();
            let res = searcher.search(black_box(&mut pos), Duration::from_secs(600));
            black_box(res.playouts)
        })
    });
}

criterion_group!(benches, bench_playouts);
criterion_main!(benches);
