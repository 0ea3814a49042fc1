use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use shadow_hashmap::ShadowHashMap;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s >> 16)
    })
}

const N: u64 = 100_000;

// Keys 0..N with values drawn from 0..N, so most values have a few keys.
fn filled() -> ShadowHashMap<u64, u64> {
    let mut m = ShadowHashMap::new();
    for (k, x) in lcg(1).take(N as usize).enumerate() {
        m.insert(k as u64, x % N);
    }
    m
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("shadow_hashmap_insert_100k", |b| {
        b.iter_batched(
            ShadowHashMap::<u64, u64>::new,
            |mut m| {
                for (k, x) in lcg(1).take(N as usize).enumerate() {
                    m.insert(k as u64, x % N);
                }
                black_box(m)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_get(c: &mut Criterion) {
    c.bench_function("shadow_hashmap_get_hit", |b| {
        let m = filled();
        let mut it = (0..N).cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(&k));
        })
    });
}

fn bench_get_keys(c: &mut Criterion) {
    c.bench_function("shadow_hashmap_get_keys", |b| {
        let m = filled();
        let mut it = (0..N).cycle();
        b.iter(|| {
            let v = it.next().unwrap();
            black_box(m.get_keys(&v));
        })
    });
}

fn bench_get_first_key(c: &mut Criterion) {
    c.bench_function("shadow_hashmap_get_first_key", |b| {
        let m = filled();
        let mut it = (0..N).cycle();
        b.iter(|| {
            let v = it.next().unwrap();
            black_box(m.get_first_key(&v));
        })
    });
}

fn bench_remove_reinsert(c: &mut Criterion) {
    c.bench_function("shadow_hashmap_remove_reinsert", |b| {
        let mut m = filled();
        let mut it = (0..N).cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let v = m.remove(&k).unwrap();
            m.insert(k, black_box(v));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get, bench_get_keys, bench_get_first_key, bench_remove_reinsert
}
criterion_main!(benches);
