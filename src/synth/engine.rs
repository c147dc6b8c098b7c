use tracing::warn;

use super::cache::BufferCache;
use crate::config::EngineConfig;
use crate::dsp::{mix, oscillator, DspError, MixMode, SampleBuffer};
use crate::sequencing::{ChordEvent, Event, NoteEvent, Step};

/// The synthesis engine: turns note and chord events into sample buffers.
///
/// Owns the buffer cache for its whole lifetime. All rendering goes through
/// `&self`, so one engine can be shared (e.g. behind an `Arc`) by a thread
/// that renders ahead of playback.
#[derive(Debug)]
pub struct Synth {
    sample_rate: u32,
    mix_mode: MixMode,
    cache: BufferCache,
}

impl Synth {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_cache(config, BufferCache::new(config.cache_capacity))
    }

    /// Use a caller-provided cache (e.g. a bounded one for tests).
    pub fn with_cache(config: &EngineConfig, cache: BufferCache) -> Self {
        Self {
            sample_rate: config.sample_rate,
            mix_mode: config.mix_mode,
            cache,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn mix_mode(&self) -> MixMode {
        self.mix_mode
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    /// Render a single note at its own duration.
    pub fn render_note(&self, note: &NoteEvent) -> Result<SampleBuffer, DspError> {
        self.render_note_for(note, note.duration)
    }

    /// Render every note of a chord and mix them into one buffer.
    pub fn render_chord(&self, chord: &ChordEvent) -> Result<SampleBuffer, DspError> {
        self.render_chord_for(chord, chord.duration())
    }

    /// Render the event of `step`, extended through the delay when held.
    pub fn render_step(&self, step: &Step) -> Result<SampleBuffer, DspError> {
        let duration = step.sounding_duration();
        match &step.event {
            Event::Note(note) => self.render_note_for(note, duration),
            Event::Chord(chord) => self.render_chord_for(chord, duration),
            Event::Rest(_) => self.silence(duration),
        }
    }

    /// Silence of `duration` seconds at the engine's rate.
    pub fn silence(&self, duration: f64) -> Result<SampleBuffer, DspError> {
        oscillator::validate_duration(duration, self.sample_rate)?;
        Ok(SampleBuffer::silence(
            oscillator::sample_count(duration, self.sample_rate),
            self.sample_rate,
        ))
    }

    fn render_note_for(&self, note: &NoteEvent, duration: f64) -> Result<SampleBuffer, DspError> {
        self.cache
            .get_or_generate(note.pitch, note.waveform, duration, self.sample_rate)
    }

    fn render_chord_for(&self, chord: &ChordEvent, duration: f64) -> Result<SampleBuffer, DspError> {
        let buffers = chord
            .notes()
            .iter()
            .map(|note| self.render_note_for(note, duration))
            .collect::<Result<Vec<_>, _>>()?;

        let mixed = mix::mix_with(&buffers, self.mix_mode)?;
        if mixed.peak() > 1.0 {
            warn!(
                notes = buffers.len(),
                peak = mixed.peak(),
                "chord exceeds full scale and will clip at the output"
            );
        }
        Ok(mixed)
    }

    /// Release every cached buffer.
    pub fn shutdown(&self) {
        self.cache.clear();
    }
}
