use std::hint::black_box;
use std::num::NonZeroUsize;
use std::sync::Arc;

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use house_cache::builder::{CacheFactory, CachePolicy, PolicyCache};
use house_cache::interceptor::CachingInterceptor;
use house_cache::traits::{Cache, Identified};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

const CAPACITY: usize = 1024;
const OPS: usize = 8192;
const POLICIES: [CachePolicy; 2] = [CachePolicy::Lru, CachePolicy::Lfu];

/// 80% of accesses go to the first 20% of `universe`.
fn hotset_keys(universe: u64, count: usize, seed: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let hot = universe / 5;
    (0..count)
        .map(|_| {
            if rng.random_bool(0.8) {
                rng.random_range(0..hot)
            } else {
                rng.random_range(hot..universe)
            }
        })
        .collect()
}

fn uniform_keys(universe: u64, count: usize, seed: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count).map(|_| rng.random_range(0..universe)).collect()
}

/// Zipf(1.0) over `[0, universe)`; low keys dominate.
fn zipf_keys(universe: u64, count: usize, seed: u64) -> Vec<u64> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let zipf = Zipf::new(universe as f64, 1.0).unwrap();
    (0..count).map(|_| zipf.sample(&mut rng) as u64 - 1).collect()
}

fn filled(policy: CachePolicy) -> PolicyCache<u64, u64> {
    let mut cache = PolicyCache::new(policy, NonZeroUsize::new(CAPACITY).unwrap());
    for i in 0..CAPACITY as u64 {
        cache.put(i, i);
    }
    cache
}

fn bench_get_or_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_or_put");
    group.throughput(Throughput::Elements(OPS as u64));

    for (workload, keys) in [
        ("hotset", hotset_keys(CAPACITY as u64 * 4, OPS, 7)),
        ("uniform", uniform_keys(CAPACITY as u64 * 4, OPS, 7)),
        ("zipf", zipf_keys(CAPACITY as u64 * 4, OPS, 7)),
    ] {
        for policy in POLICIES {
            group.bench_with_input(BenchmarkId::new(policy.name(), workload), &keys, |b, keys| {
                b.iter_batched(
                    || filled(policy),
                    |mut cache| {
                        for &key in keys {
                            if cache.get(&key).is_none() {
                                cache.put(key, key);
                            }
                        }
                        black_box(cache.len())
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_churn");
    group.throughput(Throughput::Elements(OPS as u64));

    for policy in POLICIES {
        group.bench_function(policy.name(), |b| {
            b.iter_batched(
                || filled(policy),
                |mut cache| {
                    for i in 0..OPS as u64 {
                        cache.put(black_box(i + 100_000), i);
                    }
                    cache
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

#[derive(Clone)]
struct Row {
    id: u64,
}

impl Identified<u64> for Row {
    fn id(&self) -> u64 {
        self.id
    }
}

fn bench_interceptor_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("interceptor_read");
    group.throughput(Throughput::Elements(OPS as u64));
    let keys = hotset_keys(CAPACITY as u64 * 2, OPS, 11);

    for policy in POLICIES {
        let factory = CacheFactory::new(NonZeroUsize::new(CAPACITY).unwrap(), policy);
        group.bench_with_input(BenchmarkId::from_parameter(policy), &keys, |b, keys| {
            b.iter_batched(
                || CachingInterceptor::<u64, Row>::from_factory("row", &factory),
                |rows| {
                    for key in keys {
                        let row: Arc<Row> = rows.read(key, |&id| Ok::<_, ()>(Row { id })).unwrap();
                        black_box(row);
                    }
                    rows.stats()
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_get_or_put,
    bench_eviction_churn,
    bench_interceptor_read
);
criterion_main!(benches);
