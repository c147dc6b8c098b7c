use super::{DeviceError, OutputStream};

/// In-memory output that keeps every write as its own block.
///
/// Useful for offline rendering and for checking exactly what a sequencer
/// sent to its stream.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    sample_rate: u32,
    writes: Vec<Vec<f32>>,
    stopped: bool,
}

impl RecordingOutput {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            writes: Vec::new(),
            stopped: false,
        }
    }

    /// Every write, in order.
    pub fn writes(&self) -> &[Vec<f32>] {
        &self.writes
    }

    /// All written samples concatenated.
    pub fn samples(&self) -> Vec<f32> {
        self.writes.concat()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl OutputStream for RecordingOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), DeviceError> {
        if self.stopped {
            return Err(DeviceError::Closed);
        }
        self.writes.push(samples.to_vec());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.stopped = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes_in_order() {
        let mut out = RecordingOutput::new(44_100);
        out.write(&[0.1, 0.2]).unwrap();
        out.write(&[0.3]).unwrap();
        assert_eq!(out.writes(), &[vec![0.1, 0.2], vec![0.3]]);
        assert_eq!(out.samples(), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn rejects_writes_after_stop() {
        let mut out = RecordingOutput::new(44_100);
        out.stop().unwrap();
        assert_eq!(out.write(&[0.0]), Err(DeviceError::Closed));
        assert!(out.is_stopped());
    }
}
