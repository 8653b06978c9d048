//! Benchmarks for mixing the active voice set.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluckline::{SynthConfig, VoicePool};

use crate::BLOCK_SIZES;

pub fn bench_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pool");
    let config = SynthConfig::seeded(7);

    // Voices ringing at once
    let polyphony: &[usize] = &[1, 8, 32, 120];

    for &size in BLOCK_SIZES {
        for &voices in polyphony {
            let mut pool = VoicePool::new(&config).expect("default config is valid");
            let mut tick = 0u64;

            group.bench_with_input(
                BenchmarkId::new(format!("mix_{voices}_voices"), size),
                &size,
                |b, &size| {
                    b.iter(|| {
                        // Keep the set full: re-pluck anything that retired.
                        if pool.active_count() < voices {
                            for pitch in 0..voices as i16 {
                                let _ = pool.excite(pitch, 1.0, tick);
                            }
                        }
                        let mut sum = 0.0f32;
                        for _ in 0..size {
                            sum += pool.mix_tick(tick);
                            tick += 1;
                        }
                        black_box(sum)
                    })
                },
            );
        }
    }

    group.finish();
}
