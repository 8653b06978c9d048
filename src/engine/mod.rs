pub mod allocator;
pub mod scheduler;
pub mod tempo;

pub use allocator::VoiceAllocator;
pub use scheduler::{to_pcm, RenderSummary, Scheduler, SchedulerState};
pub use tempo::{samples_before_ms, Tempo};
