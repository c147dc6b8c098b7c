//! Pure sample-level building blocks.
//!
//! Everything here is a computation over its inputs: no device access, no
//! shared state. Buffers produced by these functions are immutable and can be
//! handed to any number of readers.

/// Immutable, shareable sample storage.
pub mod buffer;
/// Summing of equally shaped buffers into chords.
pub mod mix;
/// Sine, square, triangle and sawtooth generation.
pub mod oscillator;

pub use buffer::SampleBuffer;
pub use mix::MixMode;
pub use oscillator::{OscillatorBlock, Waveform};

use std::fmt;

/// Errors raised by the pure synthesis functions
#[derive(Debug, Clone, PartialEq)]
pub enum DspError {
    /// Frequency was zero, negative, or not finite
    InvalidFrequency(f64),
    /// Sample rate was zero
    InvalidSampleRate(u32),
    /// Duration was NaN, infinite, or too long to allocate
    InvalidDuration(f64),
    /// Buffers handed to the mixer differ in length or sample rate
    MismatchedBufferShape {
        expected_len: usize,
        expected_rate: u32,
        actual_len: usize,
        actual_rate: u32,
    },
    /// The mixer was given no buffers at all
    EmptyMix,
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DspError::InvalidFrequency(freq) => {
                write!(f, "invalid frequency {} Hz: must be positive and finite", freq)
            }
            DspError::InvalidSampleRate(rate) => {
                write!(f, "invalid sample rate {} Hz", rate)
            }
            DspError::InvalidDuration(duration) => {
                write!(f, "invalid duration {}s: must be finite and fit in memory", duration)
            }
            DspError::MismatchedBufferShape {
                expected_len,
                expected_rate,
                actual_len,
                actual_rate,
            } => write!(
                f,
                "cannot mix buffers of different shape: expected {} samples at {} Hz, got {} samples at {} Hz",
                expected_len, expected_rate, actual_len, actual_rate
            ),
            DspError::EmptyMix => write!(f, "cannot mix an empty set of buffers"),
        }
    }
}

impl std::error::Error for DspError {}
