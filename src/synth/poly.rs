use tracing::debug;

use crate::{
    config::SynthConfig,
    dsp::{noise::NoiseSource, tuning::TuningTable},
    engine::allocator::VoiceAllocator,
    synth::voice::Voice,
    EngineError,
};

/// What an excitation did to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Excitation {
    /// A silent voice joined the active set.
    Started,
    /// An already-ringing voice was plucked again in place.
    Retriggered,
}

/// Every string the engine can play, one per pitch, plus the set of strings
/// currently ringing.
///
/// All delay lines are allocated up front; plucking never allocates. The
/// active set is unordered and shrinks by swap-removal.
pub struct VoicePool {
    voices: Vec<Voice>,
    active: Vec<u8>,
    max_polyphony: usize,
    noise: NoiseSource,
}

impl VoicePool {
    pub fn new(config: &SynthConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let tuning = TuningTable::new(config.sample_rate, config.pitch_count);
        let voices = tuning
            .iter()
            .map(|(pitch, len)| Voice::new(pitch, len, config.damping, config.retirement))
            .collect();

        debug!(
            pitches = tuning.pitch_count(),
            footprint = tuning.footprint(),
            max_polyphony = config.max_polyphony,
            "voice pool allocated"
        );

        Ok(Self {
            voices,
            active: Vec::with_capacity(config.max_polyphony),
            max_polyphony: config.max_polyphony,
            noise: NoiseSource::new(config.seed),
        })
    }

    /// Pluck the string for `key` at sample `tick`.
    pub fn excite(&mut self, key: i16, volume: f32, tick: u64) -> Result<Excitation, EngineError> {
        let pitch = u8::try_from(key)
            .ok()
            .filter(|&p| (p as usize) < self.voices.len())
            .ok_or(EngineError::UnsupportedPitch(key))?;

        let voice = &mut self.voices[pitch as usize];
        if voice.is_active() {
            voice.start(volume, tick, &mut self.noise);
            return Ok(Excitation::Retriggered);
        }

        if self.active.len() >= self.max_polyphony {
            return Err(EngineError::PolyphonyExhausted(self.max_polyphony));
        }

        voice.start(volume, tick, &mut self.noise);
        self.active.push(pitch);
        Ok(Excitation::Started)
    }

    /// Sum every active voice for sample `tick`, dropping voices that
    /// retired on the way.
    pub fn mix_tick(&mut self, tick: u64) -> f32 {
        let mut sum = 0.0;
        let mut i = 0;
        while i < self.active.len() {
            let pitch = self.active[i] as usize;
            match self.voices[pitch].next_sample(tick) {
                Some(value) => {
                    sum += value;
                    i += 1;
                }
                None => {
                    self.active.swap_remove(i);
                }
            }
        }
        sum
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Pitches currently ringing, in no particular order.
    pub fn active_pitches(&self) -> &[u8] {
        &self.active
    }

    pub fn is_active(&self, pitch: u8) -> bool {
        self.voice(pitch).is_some_and(Voice::is_active)
    }

    pub fn voice(&self, pitch: u8) -> Option<&Voice> {
        self.voices.get(pitch as usize)
    }

    /// Retire every voice at once.
    pub fn silence_all(&mut self) {
        for &pitch in &self.active {
            self.voices[pitch as usize].free();
        }
        self.active.clear();
    }
}

impl VoiceAllocator for VoicePool {
    fn excite(&mut self, key: i16, volume: f32, tick: u64) -> Result<Excitation, EngineError> {
        VoicePool::excite(self, key, volume, tick)
    }

    fn mix_tick(&mut self, tick: u64) -> f32 {
        VoicePool::mix_tick(self, tick)
    }

    fn active_count(&self) -> usize {
        VoicePool::active_count(self)
    }
}
