/*
Waveform Generation
===================

Every waveform is computed directly from the sample index. With

    x     = frequency * i / sample_rate     (cycles elapsed at sample i)
    phase = x - floor(x)                    (position inside the period, 0..1)

the four shapes are:

  sine       sin(2π·x)

  square     sign of the sine, read from the phase:
               +1 for 0 < phase < 1/2
               -1 for 1/2 < phase < 1
                0 at phase 0 and 1/2, the zero crossings

             x is computed as (frequency * i) / sample_rate so crossings that
             fall on a sample come out exact (441 Hz at 44100 Hz crosses at
             i = 0, 50, 100, ...). sin(2π·x) is only ~1e-16 there.

  sawtooth   2·phase - 1

               +1 |    /|    /|
                  |   / |   / |
                  |  /  |  /  |
               -1 | /   | /   |

  triangle   4·phase - 1   for phase < 1/2   (rising  -1 → +1)
             3 - 4·phase   for phase ≥ 1/2   (falling +1 → -1)

               +1 |   /\    /\
                  |  /  \  /  \
               -1 | /    \/    \

All four stay inside [-1, 1].

A period is sample_rate / frequency samples long. When that is not a whole
number, period boundaries fall between samples and the sampled shape shifts
slightly from one period to the next. This is the expected result of
sampling, not something the generator corrects.

Buffer length is round(sample_rate * duration). A duration of zero or less
gives an empty buffer. A frequency of zero or less (or NaN/∞) is an error, as
is a NaN/∞ duration or one too long to allocate.

`generate` builds one fixed-length buffer. `OscillatorBlock` produces the
same samples chunk by chunk for callers that stream.
*/

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DspError, SampleBuffer};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }

    /// Value of this waveform after `cycles` periods.
    #[inline]
    fn sample_at(self, cycles: f64) -> f32 {
        match self {
            Waveform::Sine => (TAU * cycles).sin() as f32,
            Waveform::Square => {
                let phase = cycles - cycles.floor();
                if phase == 0.0 || phase == 0.5 {
                    0.0
                } else if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                let phase = cycles - cycles.floor();
                (2.0 * phase - 1.0) as f32
            }
            Waveform::Triangle => {
                let phase = cycles - cycles.floor();
                let value = if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                };
                value as f32
            }
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned for an unrecognised waveform name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWaveformError(pub String);

impl fmt::Display for ParseWaveformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown waveform '{}' (expected sine, square, triangle or sawtooth)",
            self.0
        )
    }
}

impl std::error::Error for ParseWaveformError {}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "square" | "sqr" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            _ => Err(ParseWaveformError(s.to_string())),
        }
    }
}

// Largest buffer a Vec<f32> can hold
const MAX_SAMPLES: f64 = (isize::MAX as usize / std::mem::size_of::<f32>()) as f64;

/// Number of samples in `duration` seconds at `sample_rate`.
///
/// Durations that are not positive give 0. Callers must have run
/// `validate_duration` for anything else.
pub fn sample_count(duration: f64, sample_rate: u32) -> usize {
    // Also catches NaN.
    if !(duration > 0.0) {
        return 0;
    }
    (sample_rate as f64 * duration).round() as usize
}

/// Check that `duration` seconds at `sample_rate` can be rendered.
pub fn validate_duration(duration: f64, sample_rate: u32) -> Result<(), DspError> {
    if !duration.is_finite() || (sample_rate as f64 * duration).round() > MAX_SAMPLES {
        return Err(DspError::InvalidDuration(duration));
    }
    Ok(())
}

/// Check that a frequency/sample rate pair can be rendered.
pub fn validate(frequency: f64, sample_rate: u32) -> Result<(), DspError> {
    if !(frequency > 0.0) || !frequency.is_finite() {
        return Err(DspError::InvalidFrequency(frequency));
    }
    if sample_rate == 0 {
        return Err(DspError::InvalidSampleRate(sample_rate));
    }
    Ok(())
}

/// Generate a fixed-length buffer of `waveform` at `frequency` Hz.
pub fn generate(
    waveform: Waveform,
    frequency: f64,
    duration: f64,
    sample_rate: u32,
) -> Result<SampleBuffer, DspError> {
    validate(frequency, sample_rate)?;
    validate_duration(duration, sample_rate)?;
    Ok(render_buffer(waveform, frequency, duration, sample_rate))
}

/// `generate` without validation. Callers must have run `validate` and
/// `validate_duration`.
pub(crate) fn render_buffer(
    waveform: Waveform,
    frequency: f64,
    duration: f64,
    sample_rate: u32,
) -> SampleBuffer {
    let len = sample_count(duration, sample_rate);
    let mut samples = vec![0.0f32; len];
    let mut osc = OscillatorBlock {
        waveform,
        frequency,
        sample_rate,
        position: 0,
    };
    osc.render(&mut samples);
    SampleBuffer::new(samples, sample_rate)
}

/// Streaming oscillator: each `render` call continues where the last one
/// stopped.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    frequency: f64,
    sample_rate: u32,
    /// Index of the next sample to produce
    position: u64,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: u32) -> Result<Self, DspError> {
        validate(frequency, sample_rate)?;
        Ok(Self {
            waveform,
            frequency,
            sample_rate,
            position: 0,
        })
    }

    pub fn sine(frequency: f64, sample_rate: u32) -> Result<Self, DspError> {
        Self::new(Waveform::Sine, frequency, sample_rate)
    }

    pub fn square(frequency: f64, sample_rate: u32) -> Result<Self, DspError> {
        Self::new(Waveform::Square, frequency, sample_rate)
    }

    pub fn triangle(frequency: f64, sample_rate: u32) -> Result<Self, DspError> {
        Self::new(Waveform::Triangle, frequency, sample_rate)
    }

    pub fn sawtooth(frequency: f64, sample_rate: u32) -> Result<Self, DspError> {
        Self::new(Waveform::Sawtooth, frequency, sample_rate)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Samples produced so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Period length in samples (not necessarily whole).
    pub fn period(&self) -> f64 {
        self.sample_rate as f64 / self.frequency
    }

    /// Fill `destination` with the next `destination.len()` samples.
    pub fn render(&mut self, destination: &mut [f32]) {
        let rate = self.sample_rate as f64;
        for (offset, out) in destination.iter_mut().enumerate() {
            let index = self.position + offset as u64;
            *out = self.waveform.sample_at(self.frequency * index as f64 / rate);
        }
        self.position += destination.len() as u64;
    }

    /// Restart from sample 0.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
