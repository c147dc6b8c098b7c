//! Real-world scenario benchmarks.
//!
//! These go through the synth and sequencer the way the binary does,
//! with an in-memory output in place of the audio device.

mod cache;
mod playback;

pub use cache::bench_cache;
pub use playback::bench_playback;
