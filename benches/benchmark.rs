use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use eavclad::construct::Database;
use eavclad::settings::PersistenceMode;

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut db = Database::new(PersistenceMode::InMemory).unwrap();
    for n in 0..1000 {
        let entity = format!("Entity{n}");
        db.set_attribute(&entity, "name", entity.as_str()).unwrap();
        db.set_attribute(&entity, "rank", n as i64).unwrap();
    }
    c.bench_function("get hit 1k", |b| {
        b.iter(|| db.get_attribute(black_box("Entity500"), black_box("rank")))
    });
    c.bench_function("get miss 1k", |b| {
        b.iter(|| db.get_attribute(black_box("Entity500"), black_box("email")))
    });
    c.bench_function("list 1k", |b| b.iter(|| db.list_entities()));
    c.bench_function("overwrite in memory", |b| {
        b.iter(|| db.set_attribute("Entity1", "rank", black_box(42)).unwrap())
    });

    let dir = tempfile::tempdir().unwrap();
    let mut durable = Database::new(PersistenceMode::File(dir.path().join("bench.db"))).unwrap();
    c.bench_function("overwrite write-through", |b| {
        b.iter(|| durable.set_attribute("Entity1", "rank", black_box(42)).unwrap())
    });
    durable.close().unwrap();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
