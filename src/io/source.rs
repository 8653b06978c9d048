use crate::{synth::message::NoteEvent, EngineError};

/// A song the scheduler can read twice: once to find where it ends, once to
/// play it.
pub trait EventSource {
    /// Go back to the first event.
    fn rewind(&mut self) -> Result<(), EngineError>;

    /// Next event in file order, or `None` when the source is exhausted.
    fn next_event(&mut self) -> Result<Option<NoteEvent>, EngineError>;
}

/// In-memory song; replays by resetting a cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Song {
    events: Vec<NoteEvent>,
    cursor: usize,
}

impl Song {
    pub fn new(events: Vec<NoteEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    pub fn push(&mut self, event: NoteEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Onset of the first end-of-song marker.
    pub fn end_ms(&self) -> Option<u32> {
        self.events.iter().find(|e| e.is_end()).map(|e| e.onset_ms)
    }
}

impl FromIterator<NoteEvent> for Song {
    fn from_iter<I: IntoIterator<Item = NoteEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl EventSource for Song {
    fn rewind(&mut self) -> Result<(), EngineError> {
        self.cursor = 0;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<NoteEvent>, EngineError> {
        let event = self.events.get(self.cursor).copied();
        if event.is_some() {
            self.cursor += 1;
        }
        Ok(event)
    }
}
