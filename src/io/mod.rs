// Purpose - external collaborators: event sources, sample sinks, file formats

pub mod notes;
pub mod sink;
pub mod source;
#[cfg(feature = "rtrb")]
pub mod stream;
pub mod wav;

pub use notes::{open_source, parse_text_notes, NotesReader, NotesWriter};
pub use sink::{RawPcmSink, SampleSink};
pub use source::{EventSource, Song};
#[cfg(feature = "rtrb")]
pub use stream::{StreamReader, StreamSink};
pub use wav::WavSink;
