// Purpose: buffer caching and the engine that renders events through it
// This layer sits above the pure dsp functions and below playback

pub mod cache;
pub mod engine;

pub use cache::{BufferCache, CacheKey, CacheStats};
pub use engine::Synth;
