use crate::{synth::poly::Excitation, EngineError};

/// The scheduler's view of the voices it drives.
pub trait VoiceAllocator {
    /// Pluck the string for `key` at sample `tick`.
    fn excite(&mut self, key: i16, volume: f32, tick: u64) -> Result<Excitation, EngineError>;
    /// Mixed output of every active voice for sample `tick`.
    fn mix_tick(&mut self, tick: u64) -> f32;
    fn active_count(&self) -> usize;
}
