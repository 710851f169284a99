use commonware_bitset::SparseBitSet;
use commonware_codec::{Decode, Encode};
use criterion::{criterion_group, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

fn bench_codec(c: &mut Criterion) {
    for size in [1 << 10, 1 << 14, 1 << 18] {
        let mut rng = StdRng::seed_from_u64(size);
        let set: SparseBitSet = (0..size).map(|_| rng.gen_range(0..size * 16)).collect();
        let encoded = set.encode().to_vec();
        c.bench_function(&format!("{}/fn=encode size={size}", module_path!()), |b| {
            b.iter(|| black_box(&set).encode());
        });
        c.bench_function(&format!("{}/fn=decode size={size}", module_path!()), |b| {
            b.iter(|| {
                SparseBitSet::decode_cfg(black_box(encoded.as_slice()), &(..).into()).unwrap()
            });
        });
        c.bench_function(&format!("{}/fn=write_to size={size}", module_path!()), |b| {
            let mut buf = Vec::with_capacity(set.binary_storage_size());
            b.iter(|| {
                buf.clear();
                black_box(&set).write_to(&mut buf).unwrap()
            });
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_codec,
}
