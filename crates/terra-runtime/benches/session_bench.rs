use criterion::{black_box, criterion_group, criterion_main, Criterion};
use terra_runtime::{GameConfig, GameSession};

fn bench_session_hour(c: &mut Criterion) {
    c.bench_function("session 1h virtual time", |b| {
        b.iter(|| {
            let mut s = GameSession::with_seed(GameConfig::classic(), 42).unwrap();
            s.start();
            black_box(s.advance(3600))
        })
    });
}

fn bench_play_loop(c: &mut Criterion) {
    let mut s = GameSession::with_seed(GameConfig::currency_only(), 7).unwrap();
    s.start();
    c.bench_function("action + tick", |b| {
        b.iter(|| {
            let _ = black_box(s.perform_action("clean", terra_core::TerritoryId(6)));
            black_box(s.tick())
        })
    });
}

criterion_group!(benches, bench_session_hour, bench_play_loop);
criterion_main!(benches);
