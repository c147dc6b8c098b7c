use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{converter, DeviceError, OutputStream};

/// Offline output: writes mono 32-bit integer PCM to a WAV file.
///
/// The file header is finalized by `stop`. Dropping the stream without
/// stopping still finalizes it (hound does so on drop), but any error is
/// lost.
pub struct WavOutput {
    path: PathBuf,
    sample_rate: u32,
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    scratch: Vec<i32>,
    frames: u64,
}

impl WavOutput {
    pub fn create(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self, DeviceError> {
        let path = path.as_ref().to_path_buf();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(&path, spec)
            .map_err(|e| DeviceError::Unavailable(format!("{}: {}", path.display(), e)))?;

        debug!(path = %path.display(), sample_rate, "opened wav output");
        Ok(Self {
            path,
            sample_rate,
            writer: Some(writer),
            scratch: Vec::new(),
            frames: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Samples written so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl OutputStream for WavOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), DeviceError> {
        let writer = self.writer.as_mut().ok_or(DeviceError::Closed)?;

        converter::to_i32_block(samples, &mut self.scratch);
        for &sample in &self.scratch {
            writer
                .write_sample(sample)
                .map_err(|e| DeviceError::Write(e.to_string()))?;
        }
        self.frames += samples.len() as u64;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .map_err(|e| DeviceError::Write(e.to_string()))?;
            info!(path = %self.path.display(), frames = self.frames, "wrote wav file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let mut out = WavOutput::create(&path, 44_100).unwrap();
        out.write(&[0.0, 0.5, -0.5]).unwrap();
        out.write(&[1.0, -2.0]).unwrap();
        out.stop().unwrap();
        assert_eq!(out.frames(), 5);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 32);

        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(
            samples,
            [
                0,
                converter::to_i32(0.5),
                converter::to_i32(-0.5),
                i32::MAX,
                -i32::MAX
            ]
        );
    }

    #[test]
    fn write_after_stop_is_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = WavOutput::create(dir.path().join("x.wav"), 8_000).unwrap();
        out.stop().unwrap();
        out.stop().unwrap();
        assert_eq!(out.write(&[0.0]), Err(DeviceError::Closed));
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = WavOutput::create(dir.path().join("nope").join("x.wav"), 8_000);
        assert!(matches!(result, Err(DeviceError::Unavailable(_))));
    }
}
