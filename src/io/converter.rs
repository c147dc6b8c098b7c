//! Float samples to device integer formats.
//!
//! Synthesis works in f32 with a nominal range of [-1, 1], but summed chords
//! can go past it. Every conversion clips first, then scales to the full
//! range of the target type.

/// Clamp to [-1, 1]. NaN becomes silence.
#[inline]
pub fn clip(sample: f32) -> f32 {
    if sample.is_nan() {
        return 0.0;
    }
    sample.clamp(-1.0, 1.0)
}

/// Scale to a signed 32-bit sample.
#[inline]
pub fn to_i32(sample: f32) -> i32 {
    (clip(sample) as f64 * i32::MAX as f64).round() as i32
}

/// Scale to a signed 16-bit sample.
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    (clip(sample) * i16::MAX as f32).round() as i16
}

/// Convert a block of samples to 32-bit integers.
pub fn to_i32_block(samples: &[f32], out: &mut Vec<i32>) {
    out.clear();
    out.extend(samples.iter().map(|&s| to_i32(s)));
}

/// Sample types a device callback can be fed with.
pub trait DeviceSample: Copy + Send + 'static {
    fn from_f32(sample: f32) -> Self;
}

impl DeviceSample for i32 {
    fn from_f32(sample: f32) -> Self {
        to_i32(sample)
    }
}

impl DeviceSample for i16 {
    fn from_f32(sample: f32) -> Self {
        to_i16(sample)
    }
}

impl DeviceSample for f32 {
    fn from_f32(sample: f32) -> Self {
        clip(sample)
    }
}
