//! Benchmarks for the Karplus-Strong delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluckline::dsp::{noise::NoiseSource, string::PluckedString, tuning::buffer_len};

use crate::BLOCK_SIZES;

pub fn bench_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/string");
    let mut noise = NoiseSource::seeded(1);

    // Short, middle and long delay lines
    let pitches: &[u8] = &[24, 69, 108];

    for &size in BLOCK_SIZES {
        for &pitch in pitches {
            let mut string = PluckedString::new(buffer_len(44_100, pitch), 0.498);
            string.pluck(1.0, &mut noise);

            group.bench_with_input(
                BenchmarkId::new(format!("average_p{pitch}"), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for _ in 0..size {
                            sum += string.average();
                        }
                        black_box(sum)
                    })
                },
            );
        }
    }

    // Excitation cost is proportional to the buffer length.
    for &pitch in &[0u8, 69, 119] {
        let len = buffer_len(44_100, pitch);
        let mut string = PluckedString::new(len, 0.498);
        group.bench_with_input(BenchmarkId::new("pluck", len), &len, |b, _| {
            b.iter(|| string.pluck(black_box(0.8), &mut noise))
        });
    }

    group.finish();
}
