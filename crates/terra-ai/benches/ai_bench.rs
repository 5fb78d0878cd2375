use criterion::{black_box, criterion_group, criterion_main, Criterion};
use terra_ai::{default_roster, simulate, CompetitorParams};
use terra_core::{seed_territories, SeededRandom, TerritoryRegistry};

fn bench_competitor_tick(c: &mut Criterion) {
    let params = CompetitorParams::default();
    let registry = TerritoryRegistry::new(seed_territories()).unwrap();
    let roster = default_roster();
    c.bench_function("competitor tick x 100", |b| {
        b.iter(|| {
            let mut reg = registry.clone();
            let mut roster = roster.clone();
            let mut rng = SeededRandom::new(42);
            for _ in 0..100 {
                let _ = black_box(simulate(&mut roster, &mut reg, &params, &mut rng));
            }
        })
    });
}

criterion_group!(benches, bench_competitor_tick);
criterion_main!(benches);
