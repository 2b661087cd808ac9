use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use presence::cache::CandidateCache;
use rand::prelude::*;

fn random_embedding(rng: &mut impl Rng, dim: usize) -> Vec<f64> {
    (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("Nearest");
    let mut rng = rand::rng();
    let query = random_embedding(&mut rng, 128);

    for n in [100, 1000, 10000] {
        let mut cache = CandidateCache::new();
        for id in 0..n {
            cache.insert(id as i64, random_embedding(&mut rng, 128));
        }

        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &cache, |b, cache| {
            b.iter(|| cache.nearest(black_box(&query)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nearest);
criterion_main!(benches);
