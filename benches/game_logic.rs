use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tile_blast::core::{analyze_full, plan_reshuffle, Board, GridState, Rules, Scratch, SimpleRng};
use tile_blast::level::LevelDefinition;
use tile_blast::types::Position;

fn started(seed: u32) -> GridState {
    let rules = Rules {
        seed,
        ..Rules::with_size(10, 10)
    };
    let level = LevelDefinition::random(&rules);
    let mut state = GridState::new(rules.clone()).unwrap();
    state
        .initialize_board(rules.width, rules.height, &level.spawns(0).unwrap())
        .unwrap();
    state.drain_events();
    state
}

fn checkerboard(size: u16) -> Board {
    let rows: Vec<String> = (0..size)
        .map(|y| (0..size).map(|x| if (x + y) % 2 == 0 { '0' } else { '1' }).collect())
        .collect();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    Board::from_rows(&refs).unwrap()
}

fn bench_full_scan(c: &mut Criterion) {
    let state = started(12345);
    let tiers = state.rules().tiers;
    let mut scratch = Scratch::new();

    c.bench_function("analyze_full_10x10", |b| {
        b.iter(|| analyze_full(black_box(state.board()), tiers, &mut scratch))
    });
}

fn bench_incremental_scan(c: &mut Criterion) {
    let mut state = started(12345);
    state.remove_tile(Position::new(4, 4)).unwrap();

    c.bench_function("analyze_incremental_column", |b| {
        b.iter(|| state.analyze(black_box(false)))
    });
}

fn bench_reshuffle(c: &mut Criterion) {
    let board = checkerboard(10);
    let mut scratch = Scratch::new();
    let analysis = analyze_full(&board, Rules::default().tiers, &mut scratch);
    let mut rng = SimpleRng::new(7);

    c.bench_function("plan_reshuffle_checkerboard", |b| {
        b.iter(|| {
            plan_reshuffle(
                black_box(&board),
                &analysis.matchable_cells,
                &analysis.kind_counts,
                &mut rng,
                &mut scratch,
            )
            .unwrap()
        })
    });
}

fn bench_pop_cycle(c: &mut Criterion) {
    let mut state = started(12345);

    c.bench_function("pop_group_and_settle", |b| {
        b.iter(|| {
            let seed = state.last_analysis().playable_groups().next().map(|g| g.seed);
            if let Some(pos) = seed {
                state.pop_group(black_box(pos)).unwrap();
            }
            state.drain_events();
        })
    });
}

criterion_group!(
    benches,
    bench_full_scan,
    bench_incremental_scan,
    bench_reshuffle,
    bench_pop_cycle
);
criterion_main!(benches);
