use criterion::{criterion_group, criterion_main, Criterion};
use vecfixed::VecFixed;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("ordered_insert", |b| {
        b.iter(|| {
            let mut v = VecFixed::<32, u64>::new();
            for i in 0..1000u64 {
                let key = (i * 2654435761) % 1000;
                let at = v.position(|&x| x > key).unwrap_or(v.len());
                v.insert(at, key);
            }

            v.first().copied()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
