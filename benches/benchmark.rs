// Build and query benchmarks over synthetic catalogs
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use simrec_core::{Catalog, Engine, EngineConfig, Item, TokenizerDialect};

const GENRES: &[&str] = &[
    "Action", "Adventure", "Animation", "Children", "Comedy", "Crime", "Documentary",
    "Drama", "Fantasy", "Film-Noir", "Horror", "IMAX", "Musical", "Mystery", "Romance",
    "Sci-Fi", "Thriller", "War", "Western",
];

fn generate_catalog(size: usize) -> Catalog {
    let mut rng = StdRng::seed_from_u64(42);
    let items = (0..size)
        .map(|i| {
            let count = rng.random_range(1..=4);
            let tags = GENRES
                .choose_multiple(&mut rng, count)
                .copied()
                .collect::<Vec<_>>()
                .join("|");
            Item::new(i as i64 + 1, format!("Movie {}", i), tags, '|')
        })
        .collect();
    Catalog::from_items(items)
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [100, 1000, 5000].iter() {
        let catalog = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("whitespace", size), &catalog, |b, catalog| {
            b.iter(|| Engine::build(black_box(catalog.clone()), EngineConfig::default()).unwrap());
        });

        let config = EngineConfig::default().with_dialect(TokenizerDialect::Delimited);
        group.bench_with_input(BenchmarkId::new("delimited", size), &catalog, |b, catalog| {
            b.iter(|| Engine::build(black_box(catalog.clone()), config.clone()).unwrap());
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let engine = Engine::build(generate_catalog(5000), EngineConfig::default()).unwrap();
    let titles = engine.titles();
    let mut rng = StdRng::seed_from_u64(7);

    for k in [5, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("top_n", k), k, |b, &k| {
            b.iter(|| {
                let title = &titles[rng.random_range(0..titles.len())];
                engine.recommend(black_box(title), k).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_recommend);
criterion_main!(benches);
