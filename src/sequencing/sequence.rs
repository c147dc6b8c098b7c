use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::notes::Pitch;
use crate::dsp::Waveform;

/// A single note to be rendered and played once
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: Pitch,
    pub waveform: Waveform,
    /// Sounding length in seconds
    pub duration: f64,
    /// Keep sounding through the post-event delay instead of going silent
    pub held: bool,
}

impl NoteEvent {
    pub fn new(pitch: Pitch, waveform: Waveform, duration: f64) -> Self {
        Self {
            pitch,
            waveform,
            duration,
            held: false,
        }
    }

    /// Mark this note as held through the following delay
    pub fn held(mut self) -> Self {
        self.held = true;
        self
    }
}

/// Notes that start together and share one duration
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<NoteEvent>", into = "Vec<NoteEvent>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    notes: Vec<NoteEvent>,
}

impl ChordEvent {
    /// Build a chord from notes. All notes must share the first note's
    /// duration.
    pub fn new(notes: Vec<NoteEvent>) -> Result<Self, SequenceError> {
        let first = notes.first().ok_or(SequenceError::EmptyChord)?;
        if let Some(other) = notes.iter().find(|n| n.duration != first.duration) {
            return Err(SequenceError::ChordDurationMismatch {
                expected: first.duration,
                actual: other.duration,
            });
        }
        Ok(Self { notes })
    }

    /// Chord of `pitches`, all with the same waveform and duration
    pub fn uniform(pitches: &[Pitch], waveform: Waveform, duration: f64) -> Result<Self, SequenceError> {
        Self::new(
            pitches
                .iter()
                .map(|&pitch| NoteEvent::new(pitch, waveform, duration))
                .collect(),
        )
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn duration(&self) -> f64 {
        self.notes.first().map_or(0.0, |n| n.duration)
    }

    /// A chord is held when every one of its notes is held
    pub fn is_held(&self) -> bool {
        self.notes.iter().all(|n| n.held)
    }

    /// Mark every note as held
    pub fn held(mut self) -> Self {
        for note in &mut self.notes {
            note.held = true;
        }
        self
    }
}

impl TryFrom<Vec<NoteEvent>> for ChordEvent {
    type Error = SequenceError;

    fn try_from(notes: Vec<NoteEvent>) -> Result<Self, Self::Error> {
        Self::new(notes)
    }
}

impl From<ChordEvent> for Vec<NoteEvent> {
    fn from(chord: ChordEvent) -> Self {
        chord.notes
    }
}

/// Anything a sequence step can play
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note(NoteEvent),
    Chord(ChordEvent),
    /// Silence for the given number of seconds
    Rest(f64),
}

impl Event {
    pub fn duration(&self) -> f64 {
        match self {
            Event::Note(note) => note.duration,
            Event::Chord(chord) => chord.duration(),
            Event::Rest(duration) => *duration,
        }
    }

    pub fn is_held(&self) -> bool {
        match self {
            Event::Note(note) => note.held,
            Event::Chord(chord) => chord.is_held(),
            Event::Rest(_) => false,
        }
    }
}

impl From<NoteEvent> for Event {
    fn from(note: NoteEvent) -> Self {
        Event::Note(note)
    }
}

impl From<ChordEvent> for Event {
    fn from(chord: ChordEvent) -> Self {
        Event::Chord(chord)
    }
}

/// One event plus the delay that follows it
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub event: Event,
    /// Seconds between the end of this event and the start of the next
    pub delay: f64,
}

impl Step {
    pub fn new(event: impl Into<Event>, delay: f64) -> Self {
        Self {
            event: event.into(),
            delay,
        }
    }

    /// Length this step's event is rendered at: held events absorb the delay
    pub fn sounding_duration(&self) -> f64 {
        if self.event.is_held() {
            self.event.duration() + self.delay
        } else {
            self.event.duration()
        }
    }

    /// Silence written after the event (zero for held events)
    pub fn silent_delay(&self) -> f64 {
        if self.event.is_held() {
            0.0
        } else {
            self.delay
        }
    }
}

/// An ordered list of steps, played strictly one after another
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Step>", into = "Vec<Step>"))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    /// Create a new sequence builder (sine by default)
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    /// Build a sequence from pre-made steps, validating every duration and
    /// delay
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, SequenceError> {
        for step in &steps {
            if !step.event.duration().is_finite() {
                return Err(SequenceError::InvalidDuration(step.event.duration()));
            }
            if !valid_delay(step.delay) {
                return Err(SequenceError::InvalidDelay(step.delay));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total playing time in seconds, delays included
    pub fn total_duration(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| s.event.duration().max(0.0) + s.delay)
            .sum()
    }
}

impl TryFrom<Vec<Step>> for Sequence {
    type Error = SequenceError;

    fn try_from(steps: Vec<Step>) -> Result<Self, Self::Error> {
        Self::from_steps(steps)
    }
}

impl From<Sequence> for Vec<Step> {
    fn from(sequence: Sequence) -> Self {
        sequence.steps
    }
}

fn valid_delay(delay: f64) -> bool {
    delay >= 0.0 && delay.is_finite()
}

/// Builder for constructing sequences with a fluent API
pub struct SequenceBuilder {
    steps: Vec<Step>,
    waveform: Waveform,
    error: Option<SequenceError>,
}

impl SequenceBuilder {
    fn new() -> Self {
        Self {
            steps: Vec::new(),
            waveform: Waveform::Sine,
            error: None,
        }
    }

    /// Waveform used by notes and chords added after this call
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Add a note
    pub fn note(self, pitch: Pitch, duration: f64) -> Self {
        let note = NoteEvent::new(pitch, self.waveform, duration);
        self.event(note)
    }

    /// Add a chord of `pitches`
    pub fn chord(mut self, pitches: &[Pitch], duration: f64) -> Self {
        match ChordEvent::uniform(pitches, self.waveform, duration) {
            Ok(chord) => self.event(chord),
            Err(err) => {
                self.record(err);
                self
            }
        }
    }

    /// Add a rest (silence) of `duration` seconds
    pub fn rest(self, duration: f64) -> Self {
        self.event(Event::Rest(duration))
    }

    /// Add any pre-built event. Its duration must be finite.
    pub fn event(mut self, event: impl Into<Event>) -> Self {
        let event = event.into();
        if !event.duration().is_finite() {
            self.record(SequenceError::InvalidDuration(event.duration()));
        }
        self.steps.push(Step::new(event, 0.0));
        self
    }

    /// Set the delay after the last added event
    pub fn wait(mut self, delay: f64) -> Self {
        if !valid_delay(delay) {
            self.record(SequenceError::InvalidDelay(delay));
        } else if let Some(step) = self.steps.last_mut() {
            step.delay = delay;
        }
        self
    }

    /// Hold the last added note or chord through its delay
    pub fn hold(mut self) -> Self {
        if let Some(step) = self.steps.last_mut() {
            match &mut step.event {
                Event::Note(note) => note.held = true,
                Event::Chord(chord) => *chord = chord.clone().held(),
                Event::Rest(_) => {}
            }
        }
        self
    }

    fn record(&mut self, err: SequenceError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Build the final sequence, returning the first error hit while
    /// building
    pub fn build(self) -> Result<Sequence, SequenceError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Sequence { steps: self.steps }),
        }
    }
}

/// Errors that can occur when building chords and sequences
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// A chord needs at least one note
    EmptyChord,
    /// Chord notes must share one duration
    ChordDurationMismatch { expected: f64, actual: f64 },
    /// Delays must be finite and non-negative
    InvalidDelay(f64),
    /// Event durations must be finite
    InvalidDuration(f64),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::EmptyChord => write!(f, "a chord needs at least one note"),
            SequenceError::ChordDurationMismatch { expected, actual } => write!(
                f,
                "chord notes must share one duration: expected {}s, got {}s",
                expected, actual
            ),
            SequenceError::InvalidDelay(delay) => {
                write!(f, "invalid delay {}s: must be finite and non-negative", delay)
            }
            SequenceError::InvalidDuration(duration) => {
                write!(f, "invalid duration {}s: must be finite", duration)
            }
        }
    }
}

impl std::error::Error for SequenceError {}
