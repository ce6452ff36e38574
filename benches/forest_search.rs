use canopy::store::search;
use canopy::{Fields, Forest, RecordStore};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Forest of `width` roots, each a chain `depth` records deep
fn build(width: usize, depth: usize) -> Forest {
    let mut forest = Forest::new();
    for _ in 0..width {
        let mut parent = forest.create(Fields::new(), None).unwrap();
        for _ in 0..depth {
            parent = forest.create(Fields::new(), Some(parent.as_str())).unwrap();
        }
    }
    forest
}

fn bench_search(c: &mut Criterion) {
    let forest = build(100, 20);
    let last_leaf = search::ids(forest.roots()).pop().unwrap();

    c.bench_function("find_last_leaf", |b| {
        b.iter(|| search::find(forest.roots(), black_box(&last_leaf)))
    });
    c.bench_function("find_missing", |b| {
        b.iter(|| search::find(forest.roots(), black_box("missing")))
    });
    c.bench_function("locate_last_leaf", |b| {
        b.iter(|| search::locate(forest.roots(), black_box(&last_leaf)))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
