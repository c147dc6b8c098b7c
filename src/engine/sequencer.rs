//! Sequencer - ordered playback onto a single output stream
//!
//! Steps are rendered one at a time and written in order. A write blocks
//! until the stream accepts it, so nothing from one step overlaps the next;
//! the notes of a chord sound together only because they were mixed into a
//! single buffer first.
//!
//! Delays are written as silence, which keeps timing tied to the stream
//! rather than to wall-clock sleeps. A held step is instead rendered for its
//! duration plus the delay.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dsp::{DspError, SampleBuffer, Waveform};
use crate::io::{DeviceError, OutputStream, TriggerReceiver};
use crate::sequencing::{NoteEvent, Pitch, Sequence};
use crate::synth::Synth;

/// An event that could not be rendered and was left out
#[derive(Debug, Clone, PartialEq)]
pub struct EventFailure {
    /// Position of the step in its sequence
    pub index: usize,
    pub error: DspError,
}

/// What happened during one `play_sequence` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackReport {
    /// Events rendered and written
    pub events_played: usize,
    /// Samples written, silence included
    pub samples_written: usize,
    pub failures: Vec<EventFailure>,
}

impl PlaybackReport {
    /// True when every event played.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// An event could not be rendered. The session can continue.
    Generation(DspError),
    /// The output device failed. The stream has been stopped.
    Device(DeviceError),
    /// The output stream runs at a different rate than the synth
    SampleRateMismatch { synth: u32, output: u32 },
}

impl PlaybackError {
    /// Whether the session is over.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PlaybackError::Generation(_))
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Generation(err) => write!(f, "event could not be rendered: {}", err),
            PlaybackError::Device(err) => write!(f, "playback aborted: {}", err),
            PlaybackError::SampleRateMismatch { synth, output } => write!(
                f,
                "synth renders at {} Hz but the output stream runs at {} Hz",
                synth, output
            ),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::Generation(err) => Some(err),
            PlaybackError::Device(err) => Some(err),
            PlaybackError::SampleRateMismatch { .. } => None,
        }
    }
}

impl From<DeviceError> for PlaybackError {
    fn from(err: DeviceError) -> Self {
        PlaybackError::Device(err)
    }
}

impl From<DspError> for PlaybackError {
    fn from(err: DspError) -> Self {
        PlaybackError::Generation(err)
    }
}

/// Drives events through a synth and into exactly one output stream.
pub struct Sequencer<O: OutputStream> {
    synth: Arc<Synth>,
    output: O,
}

impl<O: OutputStream> Sequencer<O> {
    /// Pair a synth with an output. Both must run at the same sample rate.
    pub fn new(synth: Arc<Synth>, output: O) -> Result<Self, PlaybackError> {
        if synth.sample_rate() != output.sample_rate() {
            return Err(PlaybackError::SampleRateMismatch {
                synth: synth.sample_rate(),
                output: output.sample_rate(),
            });
        }
        Ok(Self { synth, output })
    }

    pub fn synth(&self) -> &Arc<Synth> {
        &self.synth
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Play every step in order and return once the last one is written.
    ///
    /// A step that fails to render is skipped (its delay is still honoured)
    /// and listed in the report. A device error stops the stream and ends
    /// the call.
    pub fn play_sequence(&mut self, sequence: &Sequence) -> Result<PlaybackReport, PlaybackError> {
        let mut report = PlaybackReport::default();
        info!(steps = sequence.len(), seconds = sequence.total_duration(), "playing sequence");

        for (index, step) in sequence.steps().iter().enumerate() {
            match self.synth.render_step(step) {
                Ok(buffer) => {
                    debug!(index, samples = buffer.len(), "writing event");
                    report.samples_written += self.write(&buffer)?;
                    report.events_played += 1;
                }
                Err(err) => {
                    error!(index, %err, "event aborted");
                    report.failures.push(EventFailure { index, error: err });
                }
            }

            let delay = step.silent_delay();
            if delay > 0.0 {
                match self.synth.silence(delay) {
                    Ok(silence) => report.samples_written += self.write(&silence)?,
                    Err(err) => {
                        error!(index, %err, "delay skipped");
                        report.failures.push(EventFailure { index, error: err });
                    }
                }
            }
        }

        info!(
            played = report.events_played,
            failed = report.failures.len(),
            "sequence finished"
        );
        Ok(report)
    }

    /// Play one note right away. Generation errors are returned but leave
    /// the stream open.
    pub fn on_trigger(&mut self, pitch: Pitch, waveform: Waveform, duration: f64) -> Result<(), PlaybackError> {
        let note = NoteEvent::new(pitch, waveform, duration);
        let buffer = self.synth.render_note(&note)?;
        debug!(note = %pitch, %waveform, duration, "trigger");
        self.write(&buffer)?;
        Ok(())
    }

    /// Play every trigger currently queued. Returns how many played;
    /// triggers that fail to render are logged and dropped.
    pub fn drain_triggers(&mut self, receiver: &mut impl TriggerReceiver) -> Result<usize, PlaybackError> {
        let mut played = 0;
        while let Some(trigger) = receiver.pop() {
            match self.on_trigger(trigger.pitch, trigger.waveform, trigger.duration) {
                Ok(()) => played += 1,
                Err(err) if !err.is_fatal() => warn!(%err, "trigger dropped"),
                Err(err) => return Err(err),
            }
        }
        Ok(played)
    }

    /// Stop the stream (letting queued audio finish) and hand it back.
    /// Dropping the returned stream closes it.
    pub fn finish(mut self) -> Result<O, PlaybackError> {
        self.output.stop()?;
        Ok(self.output)
    }

    fn write(&mut self, buffer: &SampleBuffer) -> Result<usize, PlaybackError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        if let Err(err) = self.output.write(buffer) {
            error!(%err, "output write failed, stopping stream");
            if let Err(stop_err) = self.output.stop() {
                warn!(%stop_err, "stream did not stop cleanly");
            }
            return Err(PlaybackError::Device(err));
        }
        Ok(buffer.len())
    }
}
