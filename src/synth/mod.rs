// Purpose: Voice lifecycle, polyphony, note events
// This layer sits above the DSP primitives and owns every string

pub mod message;
pub mod poly;
pub mod voice;

pub use message::{NoteEvent, Pitch};
pub use poly::{Excitation, VoicePool};
pub use voice::{Voice, VoiceState};
