#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::MixMode;
use crate::io::{SampleFormat, StreamSettings};
use crate::{DEFAULT_CHANNELS, DEFAULT_CHUNK_SIZE, DEFAULT_SAMPLE_RATE};

/// Engine-wide settings shared by synthesis and the output stream.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// The sample rate of generated buffers and the output stream, in Hz.
    pub sample_rate: u32,
    /// Channels to open on the device. Mono samples are copied to each.
    pub channels: u16,
    /// Samples per device write chunk.
    pub chunk_size: usize,
    /// Preferred device sample format.
    pub sample_format: SampleFormat,
    /// Whether chords are summed as-is or averaged.
    pub mix_mode: MixMode,
    /// Maximum cached note buffers. `None` keeps everything.
    pub cache_capacity: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            sample_format: SampleFormat::I32,
            mix_mode: MixMode::Sum,
            cache_capacity: None,
        }
    }
}

impl EngineConfig {
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn mix_mode(mut self, mix_mode: MixMode) -> Self {
        self.mix_mode = mix_mode;
        self
    }

    pub fn cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Settings for opening an output stream that matches this engine.
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            sample_format: self.sample_format,
            channels: self.channels,
            sample_rate: self.sample_rate,
            chunk_size: self.chunk_size,
        }
    }
}
