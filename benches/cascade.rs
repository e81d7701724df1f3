use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_cascade::core::{find_matches, BoosterActivator, Match3Engine, SpawnWeights};
use tile_cascade::types::{BoosterKind, Position, TileKind};

fn bench_generate(c: &mut Criterion) {
    let weights = SpawnWeights::first_kinds(5);
    let mut engine = Match3Engine::new(12345);

    c.bench_function("generate_8x8", |b| {
        b.iter(|| {
            engine.generate(black_box(8), black_box(8), &weights);
        })
    });
}

fn bench_find_matches(c: &mut Criterion) {
    let mut engine = Match3Engine::new(12345);
    engine.generate(8, 8, &SpawnWeights::first_kinds(5));

    c.bench_function("find_matches_8x8", |b| {
        b.iter(|| find_matches(black_box(engine.grid())))
    });
}

fn bench_has_valid_moves(c: &mut Criterion) {
    let mut engine = Match3Engine::new(12345);
    engine.generate(8, 8, &SpawnWeights::first_kinds(6));

    c.bench_function("has_valid_moves_8x8", |b| {
        b.iter(|| engine.has_valid_moves())
    });
}

fn bench_full_cascade(c: &mut Criterion) {
    let single = SpawnWeights::from_pairs(&[(TileKind::Fuel, 1)]);

    c.bench_function("cascade_to_cap_8x8", |b| {
        b.iter(|| {
            let mut engine = Match3Engine::new(7);
            engine.generate(8, 8, &single);
            engine.process_turn()
        })
    });
}

fn bench_booster_combo(c: &mut Criterion) {
    let mut engine = Match3Engine::new(12345);
    engine.generate(8, 8, &SpawnWeights::first_kinds(5));
    for (pos, booster) in [
        (Position::new(3, 3), BoosterKind::Area),
        (Position::new(3, 4), BoosterKind::LineRow),
    ] {
        if let Some(tile) = engine.grid_mut().get_mut(pos) {
            tile.booster = Some(booster);
        }
    }
    let a = *engine.grid().tile(Position::new(3, 3));
    let b = *engine.grid().tile(Position::new(3, 4));

    c.bench_function("booster_combo_area_row", |bench| {
        bench.iter(|| BoosterActivator::new(engine.grid()).activate_booster_combo(black_box(&a), &b))
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_find_matches,
    bench_has_valid_moves,
    bench_full_cascade,
    bench_booster_combo
);
criterion_main!(benches);
