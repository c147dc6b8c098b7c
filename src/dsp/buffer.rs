use std::ops::Deref;
use std::sync::Arc;

/// A fixed-length, fixed-rate run of mono samples.
///
/// Samples are stored behind an `Arc`, so cloning a buffer (for example on a
/// cache hit) shares the storage instead of copying it. There is no way to
/// mutate a buffer once it has been built.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// `len` samples of silence.
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// An empty buffer at `sample_rate`.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value (0.0 for an empty buffer).
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// True when both buffers point at the same storage.
    pub fn shares_storage(&self, other: &SampleBuffer) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }
}

impl Deref for SampleBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

impl AsRef<[f32]> for SampleBuffer {
    fn as_ref(&self) -> &[f32] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_storage() {
        let buffer = SampleBuffer::new(vec![0.5, -0.5], 44_100);
        let copy = buffer.clone();
        assert!(buffer.shares_storage(&copy));
        assert_eq!(buffer, copy);
    }

    #[test]
    fn equal_contents_compare_equal() {
        let a = SampleBuffer::new(vec![0.1, 0.2], 48_000);
        let b = SampleBuffer::new(vec![0.1, 0.2], 48_000);
        assert_eq!(a, b);
        assert!(!a.shares_storage(&b));
    }

    #[test]
    fn duration_and_peak() {
        let buffer = SampleBuffer::new(vec![0.25, -1.5, 0.75, 0.0], 4);
        assert_eq!(buffer.duration(), 1.0);
        assert_eq!(buffer.peak(), 1.5);
        assert_eq!(SampleBuffer::empty(4).peak(), 0.0);
    }

    #[test]
    fn silence_is_zeroed() {
        let buffer = SampleBuffer::silence(8, 44_100);
        assert_eq!(buffer.len(), 8);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }
}
