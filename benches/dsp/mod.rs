//! Benchmarks for low-level DSP primitives.

mod noise;
mod string;

pub use noise::bench_noise;
pub use string::bench_string;
