use std::io;

/// Errors surfaced by the synthesis engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("tempo {0} is outside the supported range 0.25..=4.0")]
    InvalidTempo(f32),

    #[error("event {index} starts at {onset_ms} ms, before the previous event at {previous_ms} ms")]
    OutOfOrderEvent {
        index: usize,
        onset_ms: u32,
        previous_ms: u32,
    },

    #[error("event sequence has no end-of-song marker")]
    MissingEndOfSong,

    #[error("pitch {0} is outside the supported range")]
    UnsupportedPitch(i16),

    #[error("all {0} voices are busy")]
    PolyphonyExhausted(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("event source failed: {0}")]
    Source(#[from] io::Error),

    #[error("sample sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Errors that only invalidate a single event; the scheduler skips the
    /// event and keeps rendering.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::UnsupportedPitch(_) | EngineError::PolyphonyExhausted(_)
        )
    }

    pub(crate) fn sink<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::Sink(Box::new(err))
    }
}
