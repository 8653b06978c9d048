//! Real-world scenario benchmarks.
//!
//! Pool mixing at different polyphony and complete renders of short songs.

mod pool;
mod render;

pub use pool::bench_pool;
pub use render::bench_render;
