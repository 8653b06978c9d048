/// What a note event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// Pluck the string for this MIDI note number. Values outside the
    /// supported range are carried through and rejected at dispatch.
    Key(i16),
    /// Stop at this event's onset time.
    EndOfSong,
}

/// One timed instruction from the song.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Milliseconds from the start of the song, before tempo scaling
    pub onset_ms: u32,
    pub pitch: Pitch,
    /// Relative loudness, 0.0 to 1.0
    pub volume: f32,
}

impl NoteEvent {
    pub fn pluck(onset_ms: u32, key: i16, volume: f32) -> Self {
        Self {
            onset_ms,
            pitch: Pitch::Key(key),
            volume,
        }
    }

    pub fn end(onset_ms: u32) -> Self {
        Self {
            onset_ms,
            pitch: Pitch::EndOfSong,
            volume: 0.0,
        }
    }

    pub fn is_end(&self) -> bool {
        self.pitch == Pitch::EndOfSong
    }

    /// Volume clamped into `[0, 1]`; NaN counts as silence.
    pub fn clamped_volume(&self) -> f32 {
        if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_marker() {
        assert!(NoteEvent::end(1_000).is_end());
        assert!(!NoteEvent::pluck(0, 69, 1.0).is_end());
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(NoteEvent::pluck(0, 60, 1.5).clamped_volume(), 1.0);
        assert_eq!(NoteEvent::pluck(0, 60, -0.2).clamped_volume(), 0.0);
        assert_eq!(NoteEvent::pluck(0, 60, f32::NAN).clamped_volume(), 0.0);
        assert_eq!(NoteEvent::pluck(0, 60, 0.3).clamped_volume(), 0.3);
    }
}
