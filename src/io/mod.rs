// Purpose - external interfaces, format conversions

pub mod converter;
#[cfg(feature = "rtrb")]
pub mod cpal_output;
pub mod input;
pub mod memory;
pub mod wav;

#[cfg(feature = "rtrb")]
pub use cpal_output::CpalOutput;
pub use input::{KeyMap, Trigger, TriggerReceiver, UnknownKeyMapping};
pub use memory::RecordingOutput;
pub use wav::WavOutput;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sample formats an output stream can be asked for
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    I16,
    I32,
    F32,
}

/// What to open: format, channel count, rate and write chunk size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub sample_format: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
    pub chunk_size: usize,
}

/// A mono PCM sink that plays (or stores) samples in write order.
///
/// There is exactly one writer per stream. `write` may block while the sink
/// is full. After `stop` every further `write` fails with
/// `DeviceError::Closed`; dropping the stream releases the device.
pub trait OutputStream {
    fn sample_rate(&self) -> u32;

    /// Queue `samples` for playback, blocking until they are accepted.
    fn write(&mut self, samples: &[f32]) -> Result<(), DeviceError>;

    /// Let queued samples finish, then stop. Calling it twice is a no-op.
    fn stop(&mut self) -> Result<(), DeviceError>;
}

/// Allow boxed streams to be used as streams (for runtime selection)
impl OutputStream for Box<dyn OutputStream> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), DeviceError> {
        (**self).write(samples)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        (**self).stop()
    }
}

/// Output device failures. All of these end a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device could not be found, configured or opened
    Unavailable(String),
    /// The device failed while playing or writing
    Write(String),
    /// The device stopped consuming samples
    Stalled,
    /// The stream was already stopped
    Closed,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Unavailable(reason) => write!(f, "output device unavailable: {}", reason),
            DeviceError::Write(reason) => write!(f, "output device write failed: {}", reason),
            DeviceError::Stalled => write!(f, "output device stopped consuming samples"),
            DeviceError::Closed => write!(f, "output stream is closed"),
        }
    }
}

impl std::error::Error for DeviceError {}
