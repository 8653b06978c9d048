//! Benchmarks for excitation noise generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluckline::dsp::noise::NoiseSource;

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut noise = NoiseSource::seeded(42);
        let mut buffer = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("fill", size), &size, |b, _| {
            b.iter(|| {
                for slot in buffer.iter_mut() {
                    *slot = noise.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
