pub mod config;
pub mod dsp; // Waveform generation and mixing
pub mod engine; // Playback sequencing onto an output stream
pub mod io;
pub mod sequencing; // Pitches, notes, chords and sequences
pub mod synth; // Buffer cache and the synthesis engine that owns it

pub use config::EngineConfig;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_CHANNELS: u16 = 1;
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
