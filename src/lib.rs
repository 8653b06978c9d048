pub mod analysis; // Spectrum and level measurement of rendered PCM
pub mod config;
pub mod dsp;
pub mod engine; // Millisecond-block scheduler and tempo arithmetic
pub mod error;
pub mod io;
pub mod synth; // Voices, the voice pool and note events

pub use config::{Retirement, SynthConfig};
pub use engine::{RenderSummary, Scheduler, SchedulerState, Tempo};
pub use error::EngineError;
pub use synth::{NoteEvent, Pitch, VoicePool};

/// Output sample rate the engine is tuned for.
pub const SAMPLE_RATE: u32 = 44_100;
/// Number of supported pitches (MIDI 0..=119), one voice slot each.
pub const PITCH_COUNT: usize = 120;
/// Default active-set capacity.
pub const MAX_POLYPHONY: usize = PITCH_COUNT;
/// MIDI note number of A4, the tuning reference.
pub const MIDI_A4: f64 = 69.0;
/// Frequency of A4 in Hz.
pub const A4_HZ: f64 = 440.0;
