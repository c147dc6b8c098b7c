//! Real-time output through cpal.
//!
//! The caller's thread pushes mono f32 samples into a lock-free ring
//! (`rtrb`); the device callback pops them, converts to the device format and
//! copies each sample to every channel. When the ring is full `write`
//! sleeps until the device has consumed enough, which is the backpressure
//! that paces playback. An underrun plays silence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SizedSample;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, error, info, warn};

use super::converter::DeviceSample;
use super::{DeviceError, OutputStream, SampleFormat, StreamSettings};

// Ring capacity in chunks
const RING_CHUNKS: usize = 8;
const POLL_INTERVAL: Duration = Duration::from_millis(1);
const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(2);

pub struct CpalOutput {
    stream: Option<cpal::Stream>,
    producer: Producer<f32>,
    capacity: usize,
    sample_rate: u32,
    channels: u16,
    chunk_size: usize,
    /// Set by the stream error callback
    failed: Arc<AtomicBool>,
    stall_timeout: Duration,
}

impl CpalOutput {
    /// Open the host's default output device.
    pub fn open(settings: &StreamSettings) -> Result<Self, DeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| DeviceError::Unavailable("no default output device available".into()))?;
        Self::open_device(&device, settings)
    }

    /// Open a specific device at `settings.sample_rate`, preferring the
    /// requested sample format and channel count.
    pub fn open_device(device: &cpal::Device, settings: &StreamSettings) -> Result<Self, DeviceError> {
        let supported = choose_config(device, settings)?;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let chunk_size = settings.chunk_size.max(1);
        let capacity = chunk_size * RING_CHUNKS;
        let (producer, consumer) = RingBuffer::<f32>::new(capacity);
        let failed = Arc::new(AtomicBool::new(false));

        let stream = match format {
            cpal::SampleFormat::I32 => build_stream::<i32>(device, &config, consumer, failed.clone()),
            cpal::SampleFormat::I16 => build_stream::<i16>(device, &config, consumer, failed.clone()),
            cpal::SampleFormat::F32 => build_stream::<f32>(device, &config, consumer, failed.clone()),
            other => Err(DeviceError::Unavailable(format!(
                "unsupported device sample format {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| DeviceError::Unavailable(format!("failed to start output stream: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?format,
            "opened output stream"
        );

        Ok(Self {
            stream: Some(stream),
            producer,
            capacity,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            chunk_size,
            failed,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
        })
    }

    /// How long `write` waits for the device to make progress before giving
    /// up with `DeviceError::Stalled`.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    fn check_health(&self) -> Result<(), DeviceError> {
        if self.failed.load(Ordering::Acquire) {
            return Err(DeviceError::Write("output stream reported an error".into()));
        }
        Ok(())
    }

    /// Block until at least `wanted` ring slots are free.
    fn wait_for_slots(&self, wanted: usize) -> Result<usize, DeviceError> {
        let mut last = self.producer.slots();
        let mut last_progress = Instant::now();
        loop {
            self.check_health()?;
            let slots = self.producer.slots();
            if slots >= wanted {
                return Ok(slots);
            }
            if slots != last {
                last = slots;
                last_progress = Instant::now();
            } else if last_progress.elapsed() > self.stall_timeout {
                warn!(queued = self.capacity - slots, "output device stalled");
                return Err(DeviceError::Stalled);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn chunk_duration(&self) -> Duration {
        Duration::from_secs_f64(self.chunk_size as f64 / self.sample_rate.max(1) as f64)
    }
}

impl OutputStream for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[f32]) -> Result<(), DeviceError> {
        if self.stream.is_none() {
            return Err(DeviceError::Closed);
        }

        let mut pending = samples;
        while !pending.is_empty() {
            let free = self.wait_for_slots(1)?;
            let n = free.min(pending.len());
            let chunk = self
                .producer
                .write_chunk_uninit(n)
                .map_err(|_| DeviceError::Write("ring buffer rejected chunk".into()))?;
            let written = chunk.fill_from_iter(pending[..n].iter().copied());
            pending = &pending[written..];
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        if self.stream.is_none() {
            return Ok(());
        }

        let drained = self.wait_for_slots(self.capacity);
        // The last callback may still be playing what it popped
        thread::sleep(self.chunk_duration());

        let paused = match self.stream.take() {
            Some(stream) => stream
                .pause()
                .map_err(|e| DeviceError::Write(format!("failed to pause output stream: {}", e))),
            None => Ok(()),
        };
        debug!("output stream stopped");
        drained.and(paused)
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Dropped without stop (error path): cut playback immediately
            if let Err(err) = stream.pause() {
                debug!(%err, "pause on drop failed");
            }
        }
    }
}

fn to_cpal_format(format: SampleFormat) -> cpal::SampleFormat {
    match format {
        SampleFormat::I16 => cpal::SampleFormat::I16,
        SampleFormat::I32 => cpal::SampleFormat::I32,
        SampleFormat::F32 => cpal::SampleFormat::F32,
    }
}

fn is_supported_format(format: cpal::SampleFormat) -> bool {
    matches!(
        format,
        cpal::SampleFormat::I16 | cpal::SampleFormat::I32 | cpal::SampleFormat::F32
    )
}

fn choose_config(
    device: &cpal::Device,
    settings: &StreamSettings,
) -> Result<cpal::SupportedStreamConfig, DeviceError> {
    let rate = settings.sample_rate;
    let wanted_format = to_cpal_format(settings.sample_format);

    let ranges = device
        .supported_output_configs()
        .map_err(|e| DeviceError::Unavailable(format!("failed to query output configs: {}", e)))?;

    ranges
        .filter(|r| r.min_sample_rate().0 <= rate && rate <= r.max_sample_rate().0)
        .filter(|r| is_supported_format(r.sample_format()))
        .min_by_key(|r| {
            (
                r.sample_format() != wanted_format,
                r.channels() != settings.channels,
                r.channels(),
            )
        })
        .map(|r| r.with_sample_rate(cpal::SampleRate(rate)))
        .ok_or_else(|| {
            DeviceError::Unavailable(format!("no output configuration supports {} Hz", rate))
        })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: Consumer<f32>,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, DeviceError>
where
    T: SizedSample + DeviceSample,
{
    let channels = config.channels.max(1) as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Duplicate mono to all channels
                for frame in data.chunks_mut(channels) {
                    let sample = consumer.pop().unwrap_or(0.0);
                    frame.fill(T::from_f32(sample));
                }
            },
            move |err| {
                error!(%err, "output stream error");
                failed.store(true, Ordering::Release);
            },
            None,
        )
        .map_err(|e| DeviceError::Unavailable(format!("failed to build output stream: {}", e)))
}
