use std::collections::{HashMap, VecDeque};
use std::fmt;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::Waveform;
use crate::sequencing::notes::{NoteClass, Pitch, MAX_OCTAVE, MIN_OCTAVE};

/// "Play this note now", as produced by an input source
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Trigger {
    pub pitch: Pitch,
    pub waveform: Waveform,
    /// Seconds
    pub duration: f64,
}

/// Queue of triggers consumed by the sequencer
pub trait TriggerReceiver {
    fn pop(&mut self) -> Option<Trigger>;
}

#[cfg(feature = "rtrb")]
impl TriggerReceiver for Consumer<Trigger> {
    fn pop(&mut self) -> Option<Trigger> {
        Consumer::pop(self).ok()
    }
}

impl TriggerReceiver for VecDeque<Trigger> {
    fn pop(&mut self) -> Option<Trigger> {
        self.pop_front()
    }
}

/// A key press that does not map to a playable pitch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyMapping {
    pub key: char,
    /// Set when the key is bound but lands outside octaves 0-10
    pub octave: Option<i32>,
}

impl fmt::Display for UnknownKeyMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.octave {
            Some(octave) => write!(
                f,
                "key '{}' maps to octave {}, outside the supported {}-{}",
                self.key, octave, MIN_OCTAVE, MAX_OCTAVE
            ),
            None => write!(f, "key '{}' is not mapped to a note", self.key),
        }
    }
}

impl std::error::Error for UnknownKeyMapping {}

/// Maps keyboard characters to pitches relative to a movable base octave.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: HashMap<char, (NoteClass, i32)>,
    base_octave: i32,
}

impl KeyMap {
    /// Empty map.
    pub fn new(base_octave: i32) -> Self {
        Self {
            bindings: HashMap::new(),
            base_octave,
        }
    }

    /// Two-row piano layout starting at A of `base_octave`:
    ///
    /// ```text
    ///    w   r t   u i
    ///   a s d f g h j k
    ///   A B C D E F G A'
    /// ```
    ///
    /// Upper-row keys are the sharps; `k` is A one octave up.
    pub fn piano(base_octave: i32) -> Self {
        const LAYOUT: [(char, NoteClass, i32); 13] = [
            ('a', NoteClass::A, 0),
            ('w', NoteClass::ASharp, 0),
            ('s', NoteClass::B, 0),
            ('d', NoteClass::C, 0),
            ('r', NoteClass::CSharp, 0),
            ('f', NoteClass::D, 0),
            ('t', NoteClass::DSharp, 0),
            ('g', NoteClass::E, 0),
            ('h', NoteClass::F, 0),
            ('u', NoteClass::FSharp, 0),
            ('j', NoteClass::G, 0),
            ('i', NoteClass::GSharp, 0),
            ('k', NoteClass::A, 1),
        ];

        let mut map = Self::new(base_octave);
        for (key, class, offset) in LAYOUT {
            map.bind(key, class, offset);
        }
        map
    }

    /// Bind `key` to `class`, `octave_offset` octaves above the base.
    pub fn bind(&mut self, key: char, class: NoteClass, octave_offset: i32) {
        self.bindings.insert(key.to_ascii_lowercase(), (class, octave_offset));
    }

    pub fn base_octave(&self) -> i32 {
        self.base_octave
    }

    /// Move the base octave, staying inside the supported range.
    pub fn shift_octave(&mut self, delta: i32) -> i32 {
        self.base_octave = (self.base_octave + delta).clamp(MIN_OCTAVE, MAX_OCTAVE);
        self.base_octave
    }

    /// Pitch for `key`, or why there is none.
    pub fn resolve(&self, key: char) -> Result<Pitch, UnknownKeyMapping> {
        let &(class, offset) = self
            .bindings
            .get(&key.to_ascii_lowercase())
            .ok_or(UnknownKeyMapping { key, octave: None })?;

        let pitch = Pitch::new(class, self.base_octave.saturating_add(offset));
        if !pitch.in_table() {
            return Err(UnknownKeyMapping {
                key,
                octave: Some(pitch.octave),
            });
        }
        Ok(pitch)
    }

    /// Trigger for `key` with the given sound.
    pub fn trigger(&self, key: char, waveform: Waveform, duration: f64) -> Result<Trigger, UnknownKeyMapping> {
        Ok(Trigger {
            pitch: self.resolve(key)?,
            waveform,
            duration,
        })
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::piano(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piano_layout_resolves() {
        let map = KeyMap::piano(4);
        assert_eq!(map.resolve('a'), Ok(Pitch::new(NoteClass::A, 4)));
        assert_eq!(map.resolve('W'), Ok(Pitch::new(NoteClass::ASharp, 4)));
        assert_eq!(map.resolve('k'), Ok(Pitch::new(NoteClass::A, 5)));
    }

    #[test]
    fn unmapped_key_is_reported() {
        let map = KeyMap::piano(4);
        assert_eq!(map.resolve('q'), Err(UnknownKeyMapping { key: 'q', octave: None }));
    }

    #[test]
    fn out_of_table_octave_is_reported() {
        let mut map = KeyMap::piano(10);
        assert!(map.resolve('a').is_ok());
        assert_eq!(
            map.resolve('k'),
            Err(UnknownKeyMapping {
                key: 'k',
                octave: Some(11),
            })
        );

        map.bind('z', NoteClass::C, -11);
        assert!(map.resolve('z').is_err());

        map.bind('x', NoteClass::C, i32::MAX);
        assert_eq!(map.resolve('x').unwrap_err().octave, Some(i32::MAX));
    }

    #[test]
    fn octave_shift_is_clamped() {
        let mut map = KeyMap::piano(9);
        assert_eq!(map.shift_octave(1), 10);
        assert_eq!(map.shift_octave(1), 10);
        assert_eq!(map.shift_octave(-12), 0);
        assert_eq!(map.resolve('d'), Ok(Pitch::new(NoteClass::C, 0)));
    }

    #[test]
    fn queue_pops_in_order() {
        let map = KeyMap::default();
        let mut queue: VecDeque<Trigger> = ['a', 's']
            .iter()
            .map(|&k| map.trigger(k, Waveform::Square, 0.2).unwrap())
            .collect();

        assert_eq!(TriggerReceiver::pop(&mut queue).unwrap().pitch, Pitch::new(NoteClass::A, 4));
        assert_eq!(TriggerReceiver::pop(&mut queue).unwrap().pitch, Pitch::new(NoteClass::B, 4));
        assert!(TriggerReceiver::pop(&mut queue).is_none());
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn ring_consumer_receives_triggers() {
        let (mut tx, mut rx) = rtrb::RingBuffer::<Trigger>::new(4);
        let trigger = KeyMap::default().trigger('g', Waveform::Triangle, 0.1).unwrap();
        tx.push(trigger).unwrap();
        assert_eq!(TriggerReceiver::pop(&mut rx), Some(trigger));
        assert_eq!(TriggerReceiver::pop(&mut rx), None);
    }
}
