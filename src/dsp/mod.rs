//! Low-level DSP primitives used by the voices.
//!
//! These components allocate once at construction and are realtime-safe
//! afterwards, making them safe to embed directly inside voice structs. They
//! stay focused on the signal-processing math so the voice pool can layer on
//! lifecycle and mixing.

/// Seeded white-noise source used to excite strings.
pub mod noise;
/// Fixed-capacity circular sample buffer.
pub mod ring;
/// Karplus-Strong plucked string (delay line plus averaging filter).
pub mod string;
/// MIDI pitch to frequency and delay-line length.
pub mod tuning;

pub use noise::NoiseSource;
pub use ring::RingBuffer;
pub use string::PluckedString;
pub use tuning::TuningTable;
