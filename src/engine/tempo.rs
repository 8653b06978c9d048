use crate::EngineError;

pub const MIN_TEMPO: f32 = 0.25;
pub const MAX_TEMPO: f32 = 4.0;

/// Playback speed. 2.0 plays twice as fast, 0.5 half as fast; pitch is
/// unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tempo(f32);

impl Tempo {
    pub fn new(tempo: f32) -> Result<Self, EngineError> {
        if (MIN_TEMPO..=MAX_TEMPO).contains(&tempo) {
            Ok(Self(tempo))
        } else {
            Err(EngineError::InvalidTempo(tempo))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Song time to playback time: `floor(onset_ms / tempo)`.
    pub fn scale_ms(self, onset_ms: u32) -> u64 {
        (onset_ms as f64 / self.0 as f64).floor() as u64
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Number of samples that lie before millisecond `ms`.
///
/// Millisecond `m` owns ticks `samples_before_ms(m)..samples_before_ms(m + 1)`,
/// so at 44.1 kHz the blocks alternate between 44 and 45 samples and no
/// rounding error builds up.
#[inline]
pub fn samples_before_ms(ms: u64, sample_rate: u32) -> u64 {
    ms * sample_rate as u64 / 1_000
}
