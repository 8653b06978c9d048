//! Song files.
//!
//! Binary `.notes` files are a flat array of 8-byte little-endian records:
//!
//! ```text
//! offset  size  field
//! 0       4     onset time, milliseconds (i32)
//! 4       2     MIDI note (i16); 1 marks the end of the song
//! 6       2     volume, 0..=32767 (i16)
//! ```
//!
//! Text files hold one `time note volume` triplet per line. `#` starts a
//! comment, and the note of the final line may be written as `end`:
//!
//! ```text
//! 0     69  1.0   # A4
//! 500   64  0.5
//! 2000  end
//! ```

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::{
    io::source::{EventSource, Song},
    synth::message::{NoteEvent, Pitch},
    EngineError,
};

pub const RECORD_LEN: usize = 8;
/// Note value that marks the end of a binary song.
pub const END_OF_SONG_NOTE: i16 = 1;
/// Volume field value for full volume.
pub const FULL_VOLUME: i16 = i16::MAX;

fn decode_record(bytes: &[u8; RECORD_LEN], index: usize) -> Result<NoteEvent, EngineError> {
    let time = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let note = i16::from_le_bytes([bytes[4], bytes[5]]);
    let volume = i16::from_le_bytes([bytes[6], bytes[7]]);

    let onset_ms = u32::try_from(time).map_err(|_| EngineError::Parse {
        line: index + 1,
        message: format!("negative onset time {time}"),
    })?;

    if note == END_OF_SONG_NOTE {
        return Ok(NoteEvent::end(onset_ms));
    }
    Ok(NoteEvent::pluck(
        onset_ms,
        note,
        volume as f32 / FULL_VOLUME as f32,
    ))
}

fn encode_record(event: &NoteEvent) -> io::Result<[u8; RECORD_LEN]> {
    let time = i32::try_from(event.onset_ms)
        .map_err(|_| io::Error::new(ErrorKind::InvalidInput, "onset does not fit in 31 bits"))?;
    let (note, volume) = match event.pitch {
        Pitch::EndOfSong => (END_OF_SONG_NOTE, 0),
        Pitch::Key(END_OF_SONG_NOTE) => {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "note 1 is reserved for the end-of-song marker",
            ))
        }
        Pitch::Key(key) => (
            key,
            (event.clamped_volume() * FULL_VOLUME as f32).round() as i16,
        ),
    };

    let mut record = [0u8; RECORD_LEN];
    record[0..4].copy_from_slice(&time.to_le_bytes());
    record[4..6].copy_from_slice(&note.to_le_bytes());
    record[6..8].copy_from_slice(&volume.to_le_bytes());
    Ok(record)
}

/// Streams records from a seekable reader; rewinding seeks back to the
/// start, so the whole file never has to sit in memory.
pub struct NotesReader<R: Read + Seek> {
    inner: R,
    index: usize,
}

impl NotesReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read + Seek> NotesReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, index: 0 }
    }
}

impl<R: Read + Seek> EventSource for NotesReader<R> {
    fn rewind(&mut self) -> Result<(), EngineError> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.index = 0;
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<NoteEvent>, EngineError> {
        let mut record = [0u8; RECORD_LEN];
        let mut filled = 0;
        while filled < RECORD_LEN {
            match self.inner.read(&mut record[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            RECORD_LEN => {
                let event = decode_record(&record, self.index)?;
                self.index += 1;
                Ok(Some(event))
            }
            partial => Err(EngineError::Parse {
                line: self.index + 1,
                message: format!("truncated record ({partial} of {RECORD_LEN} bytes)"),
            }),
        }
    }
}

/// Writes binary `.notes` records.
pub struct NotesWriter<W: Write> {
    inner: BufWriter<W>,
}

impl NotesWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> NotesWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
        }
    }

    pub fn write_event(&mut self, event: &NoteEvent) -> io::Result<()> {
        self.inner.write_all(&encode_record(event)?)
    }

    pub fn write_song(&mut self, events: &[NoteEvent]) -> io::Result<()> {
        for event in events {
            self.write_event(event)?;
        }
        self.inner.flush()
    }
}

/// Parse the text triplet format into an in-memory song.
pub fn parse_text_notes(text: &str) -> Result<Song, EngineError> {
    let mut song = Song::default();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let parse_err = |message: String| EngineError::Parse { line, message };
        let fields: Vec<&str> = content.split_whitespace().collect();

        let onset_ms = fields[0]
            .parse::<u32>()
            .map_err(|_| parse_err(format!("invalid time {:?}", fields[0])))?;
        let note = fields
            .get(1)
            .ok_or_else(|| parse_err("missing note".to_string()))?;

        if note.eq_ignore_ascii_case("end") {
            if fields.len() > 3 {
                return Err(parse_err("too many fields".to_string()));
            }
            song.push(NoteEvent::end(onset_ms));
            continue;
        }

        if fields.len() != 3 {
            return Err(parse_err(format!(
                "expected `time note volume`, found {} fields",
                fields.len()
            )));
        }
        let key = note
            .parse::<i16>()
            .map_err(|_| parse_err(format!("invalid note {note:?}")))?;
        let volume = fields[2]
            .parse::<f32>()
            .map_err(|_| parse_err(format!("invalid volume {:?}", fields[2])))?;

        song.push(NoteEvent::pluck(onset_ms, key, volume));
    }

    Ok(song)
}

/// Open a song file, picking the format from the extension: `.txt` is the
/// text format, anything else is binary.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn EventSource + Send>, EngineError> {
    let path = path.as_ref();
    let is_text = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    if is_text {
        let text = std::fs::read_to_string(path)?;
        Ok(Box::new(parse_text_notes(&text)?))
    } else {
        Ok(Box::new(NotesReader::open(path)?))
    }
}
