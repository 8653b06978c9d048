use crate::{A4_HZ, MIDI_A4};

/// Convert a MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69, twelve equal steps per octave.
#[inline]
pub fn frequency(pitch: u8) -> f64 {
    A4_HZ * 2.0_f64.powf((pitch as f64 - MIDI_A4) / 12.0)
}

/// Delay-line length that makes a string ring at `pitch`.
///
/// One trip around the line is one period of the fundamental, so the length
/// is the period in samples, rounded to the nearest whole sample and never
/// less than one.
pub fn buffer_len(sample_rate: u32, pitch: u8) -> usize {
    let samples = (sample_rate as f64 / frequency(pitch)).round();
    (samples as usize).max(1)
}

/// Delay-line lengths for pitches `0..pitch_count`, computed once.
#[derive(Debug, Clone)]
pub struct TuningTable {
    lengths: Vec<usize>,
}

impl TuningTable {
    pub fn new(sample_rate: u32, pitch_count: usize) -> Self {
        let lengths = (0..pitch_count)
            .map(|pitch| buffer_len(sample_rate, pitch as u8))
            .collect();

        Self { lengths }
    }

    pub fn pitch_count(&self) -> usize {
        self.lengths.len()
    }

    /// Length for `pitch`, or `None` when the pitch has no slot.
    #[inline]
    pub fn len_for(&self, pitch: u8) -> Option<usize> {
        self.lengths.get(pitch as usize).copied()
    }

    /// Total samples needed to give every pitch its own line.
    pub fn footprint(&self) -> usize {
        self.lengths.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.lengths
            .iter()
            .enumerate()
            .map(|(pitch, &len)| (pitch as u8, len))
    }
}
