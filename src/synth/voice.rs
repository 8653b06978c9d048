use crate::{
    config::Retirement,
    dsp::{noise::NoiseSource, string::PluckedString},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,   // Silent, line contents are stale
    Active, // Ringing, contributes to the mix every tick
}

/// One string bound to one pitch for the life of the pool.
///
/// The delay line is sized once from the pitch and reused by every pluck of
/// that pitch; retiring a voice only flips its state.
pub struct Voice {
    pitch: u8,
    state: VoiceState,
    string: PluckedString,
    retirement: Retirement,
    /// Largest magnitude seen in the current cycle
    peak_amplitude: f32,
    /// Tick at which a budgeted voice is cut off
    expiry_tick: Option<u64>,
    /// Tick of the last pluck
    age: u64,
}

impl Voice {
    pub fn new(pitch: u8, len: usize, damping: f32, retirement: Retirement) -> Self {
        Self {
            pitch,
            state: VoiceState::Free,
            string: PluckedString::new(len, damping),
            retirement,
            peak_amplitude: 0.0,
            expiry_tick: None,
            age: 0,
        }
    }

    /// Pluck the string at `tick`, discarding whatever it was doing.
    pub fn start(&mut self, volume: f32, tick: u64, noise: &mut NoiseSource) {
        self.string.pluck(volume, noise);
        self.state = VoiceState::Active;
        self.peak_amplitude = volume;
        self.age = tick;
        self.expiry_tick = match self.retirement {
            Retirement::Threshold { .. } => None,
            Retirement::Budget { cycles } => {
                Some(tick + self.string.len() as u64 * cycles as u64)
            }
        };
    }

    /// Produce this voice's contribution to sample `tick`.
    ///
    /// Returns `None` once the voice is free; a voice that retires on this
    /// tick contributes nothing to it.
    pub fn next_sample(&mut self, tick: u64) -> Option<f32> {
        if self.state == VoiceState::Free {
            return None;
        }

        let cycle_start = self.string.position() == 0;
        if self.should_retire(tick, cycle_start) {
            self.free();
            return None;
        }

        let value = self.string.average();
        let magnitude = value.abs();
        if cycle_start || magnitude > self.peak_amplitude {
            self.peak_amplitude = magnitude;
        }
        Some(value)
    }

    fn should_retire(&self, tick: u64, cycle_start: bool) -> bool {
        match self.retirement {
            // Judged once per cycle, on the peak of the cycle just finished.
            Retirement::Threshold { cutoff } => cycle_start && self.peak_amplitude < cutoff,
            Retirement::Budget { .. } => self.expiry_tick.is_some_and(|expiry| tick >= expiry),
        }
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.expiry_tick = None;
    }

    pub fn is_active(&self) -> bool {
        self.state == VoiceState::Active
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn buffer_len(&self) -> usize {
        self.string.len()
    }

    pub fn position(&self) -> usize {
        self.string.position()
    }

    pub fn peak_amplitude(&self) -> f32 {
        self.peak_amplitude
    }

    pub fn expiry_tick(&self) -> Option<u64> {
        self.expiry_tick
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Current delay-line contents.
    pub fn samples(&self) -> &[f32] {
        self.string.samples()
    }
}
